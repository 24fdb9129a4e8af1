//! Template interpolation for step prompts.
//!
//! Replaces `{{identifier}}` placeholders (identifier = one or more word
//! characters) with the session's recorded answers. Missing keys render as
//! the empty string, and substituted values are never re-scanned.

use std::collections::HashMap;

/// Render a step template against the recorded answers.
///
/// - Every `{{key}}` occurrence is replaced by `answers[key]`, or blanked
///   when the key is unset. Repeated keys are all replaced.
/// - Replacement is non-recursive: a substituted value is emitted verbatim.
/// - Anything that is not a well-formed placeholder (`{{a b}}`, `{{}}`,
///   unterminated braces) passes through unchanged.
pub fn interpolate(template: &str, answers: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let word_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();

        if word_len > 0 && after[word_len..].starts_with("}}") {
            if let Some(value) = answers.get(&after[..word_len]) {
                out.push_str(value);
            }
            rest = &after[word_len + 2..];
        } else {
            // Not a placeholder. Emit one brace and rescan from the next
            // character so overlapping candidates like "{{{x}}" still match.
            out.push('{');
            rest = &rest[open + 1..];
        }
    }

    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
