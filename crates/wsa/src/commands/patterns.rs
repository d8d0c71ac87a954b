//! Weekday routine listing.

use anyhow::Result;
use colored::Colorize;
use wsa_sdk::patterns::weekday_name;
use wsa_sdk::{RoutinePatterns, Workspace};

pub fn execute(workspace: &Workspace) -> Result<()> {
    let patterns = workspace.routine_patterns()?;

    println!("{}", "Routine patterns".cyan().bold());
    println!("{}", "─".repeat(50));

    if patterns.is_empty() {
        println!("{}", "○ No successful tasks logged yet".yellow());
        return Ok(());
    }

    for line in render(&patterns) {
        println!("{}", line);
    }
    Ok(())
}

/// One header per weekday followed by `task (count)` lines.
fn render(patterns: &RoutinePatterns) -> Vec<String> {
    let mut lines = Vec::new();
    for (day, tasks) in patterns.iter_week() {
        lines.push(format!("{}:", weekday_name(day)));
        if tasks.is_empty() {
            lines.push("  -".to_string());
            continue;
        }
        for (task, count) in patterns.frequency(day) {
            lines.push(format!("  {} ({})", task, count));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate, TimeZone};
    use std::sync::Arc;
    use wsa_core::types::{ClassificationKind, NewTaskLog};
    use wsa_core::Database;
    use wsa_sdk::PatternLearner;

    #[test]
    fn test_render_lists_every_weekday() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        // 2024-01-01 was a Monday
        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let monday = Local.from_local_datetime(&naive).earliest().unwrap();
        for task in ["open slack", "open slack", "review PRs"] {
            let mut entry = NewTaskLog::now(task, ClassificationKind::Manual, Vec::new(), "", true);
            entry.timestamp = monday;
            db.insert_task_log(&entry).unwrap();
        }

        let patterns = PatternLearner::new(db).routine_patterns().unwrap();
        let lines = render(&patterns);
        assert_eq!(lines.iter().filter(|l| l.ends_with(':')).count(), 7);
        assert_eq!(lines[0], "Monday:");
        assert!(lines.contains(&"  open slack (2)".to_string()));
        assert!(lines.contains(&"  review PRs (1)".to_string()));
    }
}
