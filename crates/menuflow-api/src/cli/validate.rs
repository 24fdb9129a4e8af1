//! `mflow validate` - load a flow file and report its structure or defects.

use std::path::Path;

use anyhow::bail;
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use menuflow_infra::flow_source::load_flow_file;
use menuflow_types::error::FlowError;

pub fn run(path: &Path, json: bool) -> anyhow::Result<()> {
    let flow = match load_flow_file(path) {
        Ok(flow) => flow,
        Err(FlowError::Invalid(errors)) => {
            if json {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "valid": false,
                        "errors": messages,
                    }))?
                );
            } else {
                println!();
                println!(
                    "  {} Flow '{}' is invalid:",
                    console::style("✗").red().bold(),
                    path.display()
                );
                for error in &errors {
                    println!("    {} {error}", console::style("-").dim());
                }
                println!();
            }
            bail!("flow validation failed with {} error(s)", errors.len());
        }
        Err(other) => return Err(other.into()),
    };

    if json {
        let mut intents: Vec<&str> = flow.intents().iter().map(String::as_str).collect();
        intents.sort();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "valid": true,
                "name": flow.name(),
                "start": flow.start_id(),
                "steps": flow.step_count(),
                "intents": intents,
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Flow '{}' is valid ({} steps, start: {})",
        console::style("✓").green().bold(),
        console::style(flow.name()).cyan(),
        flow.step_count(),
        flow.start_id()
    );
    println!();

    let mut steps: Vec<_> = flow.steps().collect();
    steps.sort_by(|a, b| a.id.cmp(&b.id));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["ID", "KIND", "STORE KEY", "OPTIONS", "TEXT"]);
    for step in steps {
        let text: String = step.text.chars().take(40).collect();
        table.add_row([
            step.id.as_str(),
            step.kind_name(),
            step.store_key().unwrap_or("-"),
            &step.options().len().to_string(),
            &text,
        ]);
    }
    println!("{table}");
    println!();

    Ok(())
}
