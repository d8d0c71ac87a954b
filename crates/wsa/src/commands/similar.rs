//! Similar-command suggestions from command memory.

use anyhow::Result;
use colored::Colorize;
use wsa_sdk::{SimilarCommand, Workspace};

pub async fn execute(workspace: &Workspace, query: &str, top: Option<usize>, json: bool) -> Result<()> {
    let hits = workspace.similar(query, top).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("{}", "No remembered commands yet".yellow());
        return Ok(());
    }

    println!("{}", format!("Similar to \"{}\":", query).cyan().bold());
    for hit in &hits {
        println!("{}", format_hit(hit));
    }
    Ok(())
}

fn format_hit(hit: &SimilarCommand) -> String {
    let mut line = format!("  {:.2}  {}", hit.score, hit.command);
    if let Some(feedback) = &hit.feedback {
        line.push_str(&format!("  ({})", feedback));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hit() {
        let hit = SimilarCommand {
            command: "open chrome".to_string(),
            output: "Started".to_string(),
            feedback: Some("no thanks".to_string()),
            score: 0.9312,
        };
        assert_eq!(format_hit(&hit), "  0.93  open chrome  (no thanks)");
    }
}
