//! The flow engine: per-message transition algorithm.
//!
//! Given an inbound `(user_id, message_text)` pair, the engine resolves the
//! user's current step, records input, computes the next step, commits the
//! session mutation, and returns a render-ready response descriptor. It
//! performs no I/O: flow loading, persistence, and delivery are adapter
//! concerns. After every commit a `SessionEvent` is published on the event
//! bus for the optional persistence subscriber; publishing never blocks.
//!
//! The engine assumes at most one in-flight transition per user ID; the
//! hosting environment must serialize per-user processing if its channel can
//! deliver concurrent messages for the same user.

use chrono::Utc;
use menuflow_types::event::SessionEvent;
use menuflow_types::flow::{StepDefinition, StepKind};
use menuflow_types::response::{ResponseDescriptor, ResponseOption};
use menuflow_types::session::{HistoryEntry, Session};
use tokio::sync::broadcast;

use crate::event::EventBus;
use crate::flow::definition::FlowDefinition;
use crate::flow::template::interpolate;
use crate::session::SessionStore;

/// Control commands that reset a session, compared case-insensitively
/// against the raw message text (no trimming).
pub const RESET_COMMANDS: [&str; 2] = ["menu", "start"];

/// Shown when a session references a step the flow no longer has.
const RESET_PROMPT: &str =
    "We lost track of this conversation. Please send \"menu\" to start over.";

/// Prefix for the re-prompt shown after an invalid button choice.
const INVALID_CHOICE_PREFIX: &str = "Please choose a valid option.\n\n";

/// The conversation flow engine: one validated flow, one session per user.
pub struct FlowEngine {
    flow: FlowDefinition,
    sessions: SessionStore,
    events: EventBus,
}

impl FlowEngine {
    /// Create an engine over a validated flow definition.
    pub fn new(flow: FlowDefinition) -> Self {
        let sessions = SessionStore::new(flow.start_id());
        Self {
            flow,
            sessions,
            events: EventBus::default(),
        }
    }

    /// The flow this engine serves.
    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    /// Subscribe to committed session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Read-only snapshot of a user's session, if one exists.
    pub fn peek_session(&self, user_id: &str) -> Option<Session> {
        self.sessions.peek(user_id)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Process one inbound message and return what to show the user next.
    ///
    /// Never fails outward: a session pointing at an unknown step (stale or
    /// foreign state) is answered with a reset instruction instead of an
    /// error. The in-memory commit happens before this returns; downstream
    /// delivery or persistence failures cannot roll it back.
    pub fn handle_message(&self, user_id: &str, message_text: &str) -> ResponseDescriptor {
        // 1. Control-command check. Takes precedence over any in-progress
        //    step, including buttons awaiting a choice.
        if is_reset_command(message_text) {
            self.sessions.reset(user_id);
            let session = self.sessions.get_or_create(user_id);
            self.events.publish(SessionEvent::Reset {
                user_id: user_id.to_string(),
                timestamp: Utc::now(),
            });
            tracing::info!(user_id, "session reset by control command");
            return self.render(self.flow.start_step(), &session.answers);
        }

        let mut session = self.sessions.get_or_create(user_id);

        // 2. Resolve current step. Failure means stale/foreign session
        //    state, not a bad flow -- recover with a reset instruction.
        let current = match self.flow.resolve_step(&session.current_step_id) {
            Ok(step) => step,
            Err(err) => {
                tracing::warn!(user_id, %err, "session references unknown step, prompting reset");
                return ResponseDescriptor::text(RESET_PROMPT);
            }
        };

        // 3. Record input, conditionally. The raw text is stored verbatim;
        //    for buttons that means the option ID, not its label. The
        //    default intent only lands if nothing set one earlier.
        if let Some(key) = current.store_key() {
            session
                .answers
                .insert(key.to_string(), message_text.to_string());
            session.history.push(HistoryEntry {
                step_id: current.id.clone(),
                input: message_text.to_string(),
                timestamp: Utc::now(),
            });
            if session.intent.is_none() {
                if let Some(tag) = &current.default_intent {
                    session.intent = Some(tag.clone());
                }
            }
        }

        // 4. Compute the next step ID by kind.
        let next_id = match &current.kind {
            StepKind::Button { branches, .. } => match branches.get(message_text) {
                Some(target) => {
                    // An explicit choice of a reserved intent tag is
                    // authoritative: it overwrites whatever step 3 set.
                    if self.flow.is_intent_tag(message_text) {
                        session.intent = Some(message_text.to_string());
                    }
                    target.clone()
                }
                None => {
                    tracing::debug!(
                        user_id,
                        step_id = %current.id,
                        "invalid choice, re-prompting"
                    );
                    return self.reprompt(current, &session.answers);
                }
            },
            StepKind::Message { next } | StepKind::Input { next, .. } => next.clone(),
            // End steps stay put; only the control command leaves them.
            StepKind::End => current.id.clone(),
        };

        // 5. Commit and render.
        session.current_step_id = next_id.clone();
        let next = match self.flow.resolve_step(&next_id) {
            Ok(step) => step,
            Err(err) => {
                tracing::warn!(user_id, %err, "transition target vanished, prompting reset");
                return ResponseDescriptor::text(RESET_PROMPT);
            }
        };

        let response = self.render(next, &session.answers);
        self.events.publish(SessionEvent::Committed {
            user_id: user_id.to_string(),
            step_id: next_id,
            answers: session.answers.clone(),
            intent: session.intent.clone(),
            timestamp: Utc::now(),
        });
        tracing::debug!(
            user_id,
            from = %current.id,
            to = %session.current_step_id,
            "transition committed"
        );
        response
    }

    /// Render a step's template and classify the response.
    fn render(
        &self,
        step: &StepDefinition,
        answers: &std::collections::HashMap<String, String>,
    ) -> ResponseDescriptor {
        let text = interpolate(&step.text, answers);
        let options: Vec<ResponseOption> = step.options().iter().map(ResponseOption::from).collect();

        if step.is_end() {
            ResponseDescriptor::end(text)
        } else if !options.is_empty() {
            ResponseDescriptor::interactive(text, options)
        } else {
            ResponseDescriptor::text(text)
        }
    }

    /// Re-prompt after an invalid button choice: same text, same options,
    /// session untouched.
    fn reprompt(
        &self,
        step: &StepDefinition,
        answers: &std::collections::HashMap<String, String>,
    ) -> ResponseDescriptor {
        let text = format!(
            "{INVALID_CHOICE_PREFIX}{}",
            interpolate(&step.text, answers)
        );
        let options = step.options().iter().map(ResponseOption::from).collect();
        ResponseDescriptor::interactive(text, options)
    }
}

/// Whether `text` is a reserved reset command (case-insensitive, untrimmed).
fn is_reset_command(text: &str) -> bool {
    RESET_COMMANDS
        .iter()
        .any(|cmd| text.eq_ignore_ascii_case(cmd))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::parse_flow_yaml;
    use menuflow_types::response::ResponseKind;

    /// The phone-shop flow used across these tests: a button menu at the
    /// start, an input chain for the buy branch ending in a terminal
    /// confirmation, and a looping sell branch that returns to the menu.
    const PHONE_SHOP: &str = r#"
name: phone-shop
start: welcome
intents: [buy, sell, repair]
steps:
  - id: welcome
    kind: button
    text: "Welcome! What can we do for you today?"
    store_key: choice
    options:
      - { id: buy, label: "Buy a phone" }
      - { id: sell, label: "Sell a phone" }
      - { id: repair, label: "Repair a phone" }
    branches:
      buy: ask-brand
      sell: sell-info
      repair: repair-info
  - id: ask-brand
    kind: input
    text: "Which brand are you looking for?"
    store_key: brand
    next: ask-budget
  - id: ask-budget
    kind: input
    text: "A {{brand}}, nice choice. What is your budget?"
    store_key: budget
    next: confirm
  - id: confirm
    kind: end
    text: "We'll look for a {{brand}} around {{budget}}."
  - id: sell-info
    kind: input
    text: "Which model would you like to sell?"
    store_key: model
    default_intent: sell
    next: back-to-menu
  - id: repair-info
    kind: input
    text: "What seems to be broken?"
    store_key: issue
    default_intent: repair
    next: back-to-menu
  - id: back-to-menu
    kind: message
    text: "Noted. Anything else?"
    next: welcome
"#;

    fn engine() -> FlowEngine {
        FlowEngine::new(parse_flow_yaml(PHONE_SHOP).expect("test flow is valid"))
    }

    // -----------------------------------------------------------------------
    // Control commands / reset
    // -----------------------------------------------------------------------

    #[test]
    fn test_reset_command_renders_start_step() {
        let engine = engine();
        let resp = engine.handle_message("u1", "menu");
        assert_eq!(resp.kind, ResponseKind::Interactive);
        assert!(resp.text.starts_with("Welcome!"));
        assert_eq!(resp.options.len(), 3);
        assert_eq!(
            engine.peek_session("u1").unwrap().current_step_id,
            "welcome"
        );
    }

    #[test]
    fn test_reset_is_case_insensitive() {
        let engine = engine();
        for cmd in ["MENU", "Menu", "start", "START", "sTaRt"] {
            let resp = engine.handle_message("u1", cmd);
            assert_eq!(resp.kind, ResponseKind::Interactive, "command {cmd}");
        }
    }

    #[test]
    fn test_reset_is_not_trimmed() {
        let engine = engine();
        // " menu" is ordinary text, not a control command: at the welcome
        // button it is an invalid choice.
        let resp = engine.handle_message("u1", " menu");
        assert!(resp.text.starts_with("Please choose a valid option."));
    }

    #[test]
    fn test_reset_discards_answers_intent_and_history() {
        let engine = engine();
        engine.handle_message("u1", "buy");
        engine.handle_message("u1", "iPhone");
        let before = engine.peek_session("u1").unwrap();
        assert!(!before.answers.is_empty());
        assert_eq!(before.intent.as_deref(), Some("buy"));

        let resp = engine.handle_message("u1", "menu");

        let after = engine.peek_session("u1").unwrap();
        assert_eq!(after.current_step_id, "welcome");
        assert!(after.answers.is_empty());
        assert!(after.intent.is_none());
        assert!(after.history.is_empty());
        // Response equals rendering the start step fresh
        assert_eq!(resp.text, "Welcome! What can we do for you today?");
    }

    #[test]
    fn test_reset_takes_precedence_over_button_matching() {
        let engine = engine();
        engine.handle_message("u1", "buy");
        // Positioned at ask-brand; "start" must reset, not be stored as the brand
        engine.handle_message("u1", "start");
        let session = engine.peek_session("u1").unwrap();
        assert_eq!(session.current_step_id, "welcome");
        assert!(!session.answers.contains_key("brand"));
    }

    // -----------------------------------------------------------------------
    // Button steps
    // -----------------------------------------------------------------------

    #[test]
    fn test_valid_choice_transitions_and_records() {
        let engine = engine();
        let resp = engine.handle_message("u1", "buy");

        assert_eq!(resp.kind, ResponseKind::Text);
        assert_eq!(resp.text, "Which brand are you looking for?");

        let session = engine.peek_session("u1").unwrap();
        assert_eq!(session.current_step_id, "ask-brand");
        // The raw option ID is the stored answer, not the label
        assert_eq!(session.answers.get("choice").map(String::as_str), Some("buy"));
        assert_eq!(session.intent.as_deref(), Some("buy"));
    }

    #[test]
    fn test_invalid_choice_leaves_step_unchanged() {
        let engine = engine();
        engine.handle_message("u1", "menu");
        let resp = engine.handle_message("u1", "xyz");

        assert_eq!(resp.kind, ResponseKind::Interactive);
        assert!(resp.text.starts_with("Please choose a valid option."));
        assert!(resp.text.contains("Welcome!"));
        assert_eq!(resp.options.len(), 3);
        assert_eq!(resp.options[0].id, "buy");

        let session = engine.peek_session("u1").unwrap();
        assert_eq!(session.current_step_id, "welcome");
        assert!(session.intent.is_none());
    }

    #[test]
    fn test_invalid_choice_still_records_raw_input() {
        // Input recording (step 3) happens before choice matching (step 4),
        // so a declared store_key captures even an invalid reply.
        let engine = engine();
        engine.handle_message("u1", "xyz");
        let session = engine.peek_session("u1").unwrap();
        assert_eq!(session.answers.get("choice").map(String::as_str), Some("xyz"));
        assert_eq!(session.history.len(), 1);
    }

    #[test]
    fn test_option_matching_is_case_sensitive_and_untrimmed() {
        let engine = engine();
        for text in ["BUY", "Buy", " buy", "buy "] {
            engine.handle_message("u2", "menu");
            let resp = engine.handle_message("u2", text);
            assert!(
                resp.text.starts_with("Please choose a valid option."),
                "'{text}' must not match option 'buy'"
            );
        }
    }

    #[test]
    fn test_explicit_intent_choice_overwrites_default_intent() {
        let engine = engine();
        // The sell choice sets the intent first...
        engine.handle_message("u1", "sell");
        engine.handle_message("u1", "Pixel 6");
        assert_eq!(
            engine.peek_session("u1").unwrap().intent.as_deref(),
            Some("sell")
        );

        // ...back at the menu, a different intent-tagged choice overwrites it.
        engine.handle_message("u1", "anything"); // message step -> welcome
        engine.handle_message("u1", "buy");
        assert_eq!(
            engine.peek_session("u1").unwrap().intent.as_deref(),
            Some("buy")
        );
    }

    #[test]
    fn test_default_intent_is_first_write_wins() {
        const SUPPORT: &str = r#"
name: support
start: topic
intents: [billing]
steps:
  - id: topic
    kind: button
    text: "Topic?"
    options:
      - { id: billing, label: "Billing" }
      - { id: other, label: "Something else" }
    branches: { billing: billing-q, other: other-q }
  - id: billing-q
    kind: input
    text: "What about billing?"
    store_key: question
    default_intent: billing-followup
    next: fin
  - id: other-q
    kind: input
    text: "Tell us more"
    store_key: question
    default_intent: general
    next: fin
  - id: fin
    kind: end
    text: "Thanks"
"#;
        let engine = FlowEngine::new(parse_flow_yaml(SUPPORT).unwrap());

        // An intent set by a button choice is not displaced by a later
        // step's default_intent.
        engine.handle_message("u1", "billing");
        engine.handle_message("u1", "invoice missing");
        assert_eq!(
            engine.peek_session("u1").unwrap().intent.as_deref(),
            Some("billing")
        );

        // With no intent yet, the default_intent lands.
        engine.handle_message("u2", "other");
        engine.handle_message("u2", "just saying hi");
        assert_eq!(
            engine.peek_session("u2").unwrap().intent.as_deref(),
            Some("general")
        );
    }

    // -----------------------------------------------------------------------
    // Input and message steps
    // -----------------------------------------------------------------------

    #[test]
    fn test_input_step_records_and_advances() {
        let engine = engine();
        engine.handle_message("u1", "buy");
        let resp = engine.handle_message("u1", "iPhone");

        assert_eq!(resp.text, "A iPhone, nice choice. What is your budget?");
        let session = engine.peek_session("u1").unwrap();
        assert_eq!(session.current_step_id, "ask-budget");
        assert_eq!(session.answers.get("brand").map(String::as_str), Some("iPhone"));
    }

    #[test]
    fn test_input_overwrites_prior_answer() {
        let engine = engine();
        engine.handle_message("u1", "sell");
        engine.handle_message("u1", "Pixel 6");
        engine.handle_message("u1", "ok"); // back at welcome
        engine.handle_message("u1", "sell");
        engine.handle_message("u1", "Galaxy S24");
        assert_eq!(
            engine.peek_session("u1").unwrap().answers.get("model").map(String::as_str),
            Some("Galaxy S24")
        );
    }

    #[test]
    fn test_message_step_advances_on_any_text() {
        let engine = engine();
        engine.handle_message("u1", "sell");
        engine.handle_message("u1", "Pixel 6"); // -> back-to-menu (message)
        let resp = engine.handle_message("u1", "whatever");
        // message step has a fixed transition back to the welcome button
        assert_eq!(resp.kind, ResponseKind::Interactive);
        assert_eq!(
            engine.peek_session("u1").unwrap().current_step_id,
            "welcome"
        );
    }

    #[test]
    fn test_message_step_does_not_record_input() {
        let engine = engine();
        engine.handle_message("u1", "sell");
        engine.handle_message("u1", "Pixel 6");
        let history_len = engine.peek_session("u1").unwrap().history.len();
        engine.handle_message("u1", "ignored text"); // message step, no store_key
        let session = engine.peek_session("u1").unwrap();
        assert_eq!(session.history.len(), history_len);
        assert!(!session.answers.values().any(|v| v == "ignored text"));
    }

    // -----------------------------------------------------------------------
    // End steps
    // -----------------------------------------------------------------------

    #[test]
    fn test_end_step_is_sticky() {
        let engine = engine();
        engine.handle_message("u1", "buy");
        engine.handle_message("u1", "iPhone");
        let first = engine.handle_message("u1", "5000");
        assert_eq!(first.kind, ResponseKind::End);

        // Arbitrary further text re-renders the terminal message in place
        let again = engine.handle_message("u1", "hello?");
        assert_eq!(again.kind, ResponseKind::End);
        assert_eq!(again.text, first.text);
        assert_eq!(
            engine.peek_session("u1").unwrap().current_step_id,
            "confirm"
        );
    }

    #[test]
    fn test_end_step_yields_to_control_command() {
        let engine = engine();
        engine.handle_message("u1", "buy");
        engine.handle_message("u1", "iPhone");
        engine.handle_message("u1", "5000");

        let resp = engine.handle_message("u1", "menu");
        assert_eq!(resp.kind, ResponseKind::Interactive);
        assert_eq!(
            engine.peek_session("u1").unwrap().current_step_id,
            "welcome"
        );
    }

    // -----------------------------------------------------------------------
    // Unknown current step (stale session state)
    // -----------------------------------------------------------------------

    #[test]
    fn test_unknown_current_step_recovers_with_reset_prompt() {
        let engine = engine();
        engine.sessions.get_or_create("u1").current_step_id = "ghost".to_string();

        let resp = engine.handle_message("u1", "hello");
        assert_eq!(resp.kind, ResponseKind::Text);
        assert!(resp.text.contains("\"menu\""));
        // Session is left for the user to reset explicitly
        assert_eq!(engine.peek_session("u1").unwrap().current_step_id, "ghost");
    }

    #[test]
    fn test_corrupted_session_recovers_after_reset_command() {
        let engine = engine();
        engine.sessions.get_or_create("u1").current_step_id = "ghost".to_string();
        engine.handle_message("u1", "hello");

        let resp = engine.handle_message("u1", "menu");
        assert_eq!(resp.kind, ResponseKind::Interactive);
        assert_eq!(
            engine.peek_session("u1").unwrap().current_step_id,
            "welcome"
        );
    }

    // -----------------------------------------------------------------------
    // Full scenario (spec walkthrough)
    // -----------------------------------------------------------------------

    #[test]
    fn test_full_buy_scenario() {
        let engine = engine();

        let welcome = engine.handle_message("u1", "menu");
        assert_eq!(welcome.kind, ResponseKind::Interactive);
        assert_eq!(welcome.options.len(), 3);

        let ask_brand = engine.handle_message("u1", "buy");
        assert_eq!(ask_brand.text, "Which brand are you looking for?");
        assert_eq!(
            engine.peek_session("u1").unwrap().intent.as_deref(),
            Some("buy")
        );

        let ask_budget = engine.handle_message("u1", "iPhone");
        assert!(ask_budget.text.contains("iPhone"));
        assert_eq!(
            engine.peek_session("u1").unwrap().answers.get("brand").map(String::as_str),
            Some("iPhone")
        );

        let confirm = engine.handle_message("u1", "5000");
        assert_eq!(confirm.kind, ResponseKind::End);
        assert_eq!(confirm.text, "We'll look for a iPhone around 5000.");
        assert_eq!(
            engine.peek_session("u1").unwrap().current_step_id,
            "confirm"
        );
    }

    #[test]
    fn test_users_do_not_share_state() {
        let engine = engine();
        engine.handle_message("u1", "buy");
        engine.handle_message("u2", "sell");

        assert_eq!(engine.peek_session("u1").unwrap().intent.as_deref(), Some("buy"));
        assert_eq!(engine.peek_session("u2").unwrap().intent.as_deref(), Some("sell"));
        assert_eq!(engine.session_count(), 2);
    }

    // -----------------------------------------------------------------------
    // Event publishing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_commit_publishes_event() {
        let engine = engine();
        let mut rx = engine.subscribe();

        engine.handle_message("u1", "buy");

        let event = rx.recv().await.unwrap();
        match event {
            SessionEvent::Committed {
                user_id,
                step_id,
                answers,
                intent,
                ..
            } => {
                assert_eq!(user_id, "u1");
                assert_eq!(step_id, "ask-brand");
                assert_eq!(answers.get("choice").map(String::as_str), Some("buy"));
                assert_eq!(intent.as_deref(), Some("buy"));
            }
            other => panic!("expected Committed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reset_publishes_event() {
        let engine = engine();
        let mut rx = engine.subscribe();

        engine.handle_message("u1", "menu");

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::Reset { ref user_id, .. } if user_id == "u1"));
    }

    #[tokio::test]
    async fn test_invalid_choice_publishes_nothing() {
        let engine = engine();
        let mut rx = engine.subscribe();

        engine.handle_message("u1", "xyz");

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
