//! Task log statistics.

use anyhow::Result;
use colored::Colorize;
use wsa_sdk::Workspace;

pub fn execute(workspace: &Workspace, limit: usize, json: bool) -> Result<()> {
    let stats = workspace.task_stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Task statistics".cyan().bold());
    println!("{}", "─".repeat(50));
    println!(
        "  Total: {}  ({} succeeded, {} failed)",
        stats.total(),
        stats.succeeded.to_string().green(),
        stats.failed.to_string().red()
    );

    println!();
    println!("  {}", "Most frequent tasks:".cyan());
    print_counts(&stats.task_frequency, limit);

    println!();
    println!("  {}", "Tags:".cyan());
    print_counts(&stats.tag_frequency, limit);

    Ok(())
}

fn print_counts(counts: &[(String, usize)], limit: usize) {
    if counts.is_empty() {
        println!("    -");
    }
    for (name, count) in counts.iter().take(limit) {
        println!("    {:>4}  {}", count, name);
    }
}
