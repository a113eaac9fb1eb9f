//! `venn demo`: run one query through a session and print each stage as
//! plain text lines.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::AppConfig;
use crate::models::{CardStatus, ThoughtProcess, ThoughtStatus, ToolStatus};
use crate::session::ChatSession;

/// Run the demo to completion, printing to stdout.
pub async fn run_demo(config: &AppConfig, query: &str, services: Option<Vec<String>>) -> Result<()> {
    let mut session = ChatSession::new(config);
    if let Some(services) = services {
        session = session.with_services(services);
    }

    println!("> {}", query);
    println!("  services: {}", session.selected_services().join(", "));

    let message_id = session
        .submit(query)
        .ok_or_else(|| eyre!("query is empty"))?;
    let handle = session
        .sequence(&message_id)
        .ok_or_else(|| eyre!("no sequence for message {}", message_id))?;

    let mut rx = handle.subscribe();
    let mut previous: Option<ThoughtProcess> = None;
    loop {
        let current = rx.borrow_and_update().clone();
        for line in describe_changes(previous.as_ref(), &current) {
            println!("{}", line);
        }
        if current.is_completed() {
            break;
        }
        previous = Some(current);
        rx.changed()
            .await
            .map_err(|_| eyre!("sequence stopped before completing"))?;
    }

    session.close();
    Ok(())
}

/// Lines describing what changed between two snapshots of the same thought
/// process. With no previous snapshot everything visible is described.
pub fn describe_changes(previous: Option<&ThoughtProcess>, current: &ThoughtProcess) -> Vec<String> {
    let mut lines = Vec::new();
    let prev_status = previous.map(|p| p.status);

    if prev_status != Some(current.status) && current.status >= ThoughtStatus::Reasoning {
        if prev_status.map_or(true, |s| s < ThoughtStatus::Reasoning) {
            lines.push(format!("[reasoning] {}", current.query_reasoning));
        }
        if current.status == ThoughtStatus::InvokingTools {
            lines.push("[tools] invoking tools".to_string());
        }
    }

    for (index, tool) in current.tool_invocations.iter().enumerate() {
        let before = previous
            .and_then(|p| p.tool_invocations.get(index))
            .map(|t| t.status);
        if before == Some(tool.status) || tool.status == ToolStatus::Pending {
            continue;
        }
        match tool.status {
            ToolStatus::Loading => {
                lines.push(format!("  - {}: {} ...", tool.title(), tool.description));
            }
            ToolStatus::Completed => {
                lines.push(format!(
                    "  - {}: {} ({}) [{}]",
                    tool.title(),
                    tool.description,
                    tool.parameters,
                    tool.result_text()
                ));
                for update in current
                    .visible_progress_updates()
                    .into_iter()
                    .filter(|u| u.tool_index == index)
                {
                    lines.push(format!("    {}", update.message));
                }
            }
            ToolStatus::Error => {
                let message = tool
                    .error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("failed");
                lines.push(format!("  ! {}: {}", tool.title(), message));
            }
            ToolStatus::Pending => {}
        }
    }

    if let Some(reasoning) = &current.final_reasoning {
        let before = previous
            .and_then(|p| p.final_reasoning.as_ref())
            .map(|r| r.status);
        if before != Some(reasoning.status) && reasoning.status == CardStatus::Completed {
            lines.push(format!("[{}]", reasoning.title.to_lowercase()));
            for step in reasoning.sorted_steps() {
                lines.push(format!("  {}. {}: {}", step.order, step.title, step.description));
            }
        }
    }

    if current.is_completed() && prev_status != Some(ThoughtStatus::Completed) {
        lines.push(String::new());
        lines.push(current.final_response.clone());
    }

    lines
}
