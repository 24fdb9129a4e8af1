//! `mflow chat` - drive a flow interactively on the terminal.
//!
//! A local stand-in for a real messaging channel: stdin lines are inbound
//! messages, responses render as styled text with a numbered option list.

use std::io::Write as _;
use std::path::Path;

use menuflow_core::engine::FlowEngine;
use menuflow_infra::flow_source::load_flow_file;
use menuflow_types::response::{ResponseDescriptor, ResponseKind};
use tokio::io::AsyncBufReadExt;

pub async fn run(flow_path: &Path, user: &str) -> anyhow::Result<()> {
    let flow = load_flow_file(flow_path)?;
    let engine = FlowEngine::new(flow);

    println!();
    println!(
        "  {} Chatting with '{}' as '{}'. Type \"menu\" to restart, /quit to leave.",
        console::style("💬").bold(),
        console::style(engine.flow().name()).cyan(),
        console::style(user).cyan()
    );
    println!();

    // Kick off at the start step.
    render(&engine.handle_message(user, "menu"));

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", console::style(">").dim());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line == "/quit" || line == "/exit" {
            break;
        }

        render(&engine.handle_message(user, &line));
    }

    println!("\n  Bye.");
    Ok(())
}

fn render(response: &ResponseDescriptor) {
    println!();
    println!("  {}", response.text.replace('\n', "\n  "));
    for option in &response.options {
        println!(
            "    {} {}",
            console::style(format!("[{}]", option.id)).yellow(),
            option.label
        );
    }
    if response.kind == ResponseKind::End {
        println!(
            "  {}",
            console::style("(conversation ended -- send \"menu\" to restart)").dim()
        );
    }
    println!();
}
