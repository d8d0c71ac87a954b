//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;
use wsa_core::Database;

use crate::config::Config;

pub async fn execute(config: &Config) -> Result<()> {
    println!("{}", "wsa Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check shell
    print!("  Shell ({}): ", config.executor.shell);
    match which::which(&config.executor.shell) {
        Ok(_) => println!("{}", "✓ installed".green()),
        Err(_) => {
            println!("{}", "✗ not found".red());
            issues.push("Configured shell is not installed".to_string());
        }
    }

    // Check reminder tools
    for tool in ["at", "notify-send"] {
        print!("  {}: ", tool);
        match which::which(tool) {
            Ok(_) => println!("{}", "✓ installed".green()),
            Err(_) => {
                println!("{}", "✗ not found".red());
                issues.push(format!("{} is not installed (reminders will fail)", tool));
            }
        }
    }

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check data directory
    print!("  Data directory: ");
    if config.paths.data_dir.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ will be created".yellow());
    }

    // Check database
    print!("  Database: ");
    let db_path = config.database_path();
    if db_path.exists() {
        match Database::open_path(&db_path).and_then(|db| db.ping()) {
            Ok(_) => println!("{}", "✓ connected".green()),
            Err(e) => {
                println!("{}", format!("✗ {}", e).red());
                issues.push("Database not accessible".to_string());
            }
        }
    } else {
        println!("{}", "○ will be created on first use".yellow());
    }

    // Check agent credentials
    print!("  Agent API key (${}): ", config.agent.api_key_env);
    if std::env::var(&config.agent.api_key_env).is_ok_and(|k| !k.is_empty()) {
        println!("{}", "✓ set".green());
    } else {
        println!("{}", "○ not set (requests are sent without a key)".yellow());
    }

    // Check hot-command programs
    println!();
    println!("  {}", "Hot commands:".cyan());
    for hot in &config.hot_commands {
        print!("    {}: ", hot.prefix);
        match which::which(&hot.program) {
            Ok(_) => println!("{}", format!("✓ {}", hot.program).green()),
            Err(_) => {
                println!("{}", format!("✗ {} not found", hot.program).red());
                issues.push(format!("{} is not installed", hot.program));
            }
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}
