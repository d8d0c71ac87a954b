//! Routine nudge: today's usual tasks and the most recent one.

use std::io::IsTerminal;

use anyhow::Result;
use chrono::{Datelike, Duration, Local};
use colored::Colorize;
use dialoguer::Confirm;
use wsa_sdk::patterns::weekday_name;
use wsa_sdk::Workspace;

/// Tasks logged within this window count as "recent".
const RECENT_WINDOW_MINUTES: i64 = 60;

pub fn execute(workspace: &Workspace, remind: Option<u32>) -> Result<()> {
    let today = workspace.routine_patterns()?.for_today();
    let since = Local::now() - Duration::minutes(RECENT_WINDOW_MINUTES);
    let recent = workspace.recent_tasks(since)?;

    println!(
        "{}",
        format!("Nudges for {}", weekday_name(Local::now().weekday())).cyan().bold()
    );
    for line in nudge_lines(&today, recent.first().map(|t| t.task.as_str())) {
        println!("{}", line);
    }

    let Some(first) = today.first() else {
        return Ok(());
    };

    let minutes = match remind {
        Some(minutes) => minutes,
        None => {
            let minutes = workspace.config().reminders.default_followup_minutes;
            if !std::io::stdin().is_terminal() || !ask_to_remind(first, minutes)? {
                return Ok(());
            }
            minutes
        }
    };

    let outcome = workspace.schedule_reminder(first, minutes);
    if outcome.accepted {
        println!("{}", format!("✓ {}", outcome.message).green());
    } else {
        println!("{}", format!("✗ {}", outcome.message).red());
    }
    Ok(())
}

fn ask_to_remind(task: &str, minutes: u32) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Remind you to \"{}\" in {} minutes?", task, minutes))
        .default(false)
        .interact()?)
}

fn nudge_lines(today: &[String], recent: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    if today.is_empty() {
        lines.push("  ○ No routine for today yet".to_string());
    } else {
        lines.push("  You usually:".to_string());
        lines.extend(today.iter().map(|task| format!("    • {}", task)));
    }
    if let Some(task) = recent {
        lines.push(format!("  You recently ran: {}", task));
    }
    lines
}
