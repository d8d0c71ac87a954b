//! Summarize a call transcript.

use std::io::{BufRead, BufReader, Read};

use anyhow::{Context, Result};
use colored::Colorize;
use wsa_sdk::{CallSession, Workspace};

use crate::error::WsaError;

pub async fn execute(workspace: &Workspace, source: &str) -> Result<()> {
    let reader: Box<dyn Read> = if source == "-" {
        Box::new(std::io::stdin())
    } else {
        Box::new(
            std::fs::File::open(source)
                .with_context(|| format!("Failed to open transcript {}", source))?,
        )
    };

    let Some(transcript) = collect_transcript(BufReader::new(reader))? else {
        return Err(WsaError::EmptyTranscript(source.to_string()).into());
    };

    let bar = super::spinner("Summarizing call...");
    let report = workspace.call_summarizer().finalize(&transcript).await;
    bar.finish_and_clear();
    let report = report?;

    println!("{}", format!("Call summary #{}", report.id).cyan().bold());
    println!("{}", report.summary);

    match (&report.followup, &report.reminder) {
        (Some(task), Some(reminder)) if reminder.accepted => {
            println!("{}", format!("✓ Follow-up: {} ({})", task, reminder.message).green());
        }
        (Some(task), Some(reminder)) => {
            println!("{}", format!("✗ Follow-up: {} ({})", task, reminder.message).red());
        }
        _ => println!("{}", "○ No follow-up found".yellow()),
    }
    Ok(())
}

/// Feed each line to a recording session as one snippet.
fn collect_transcript(reader: impl BufRead) -> Result<Option<String>> {
    let mut session = CallSession::new();
    session.start();
    for line in reader.lines() {
        session.record_snippet(&line.context("Failed to read transcript")?);
    }
    Ok(session.stop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_collect_transcript() {
        let text = "Hi Bob\n\n  we agreed on the budget  \nI'll send the deck\n";
        assert_eq!(
            collect_transcript(Cursor::new(text)).unwrap().as_deref(),
            Some("Hi Bob we agreed on the budget I'll send the deck")
        );
        assert_eq!(collect_transcript(Cursor::new("\n \n")).unwrap(), None);
    }
}
