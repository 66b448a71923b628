//! Line-oriented console front end.
//!
//! Plain lines are triaged. Lines starting with `/` are commands:
//! `/history`, `/resume N`, `/clear`, `/help`, `/quit`.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::models::ChatHistoryEntry;
use crate::triage::compose::NO_MATCH_RESPONSE;
use crate::triage::TriageEngine;

const PREVIEW_CHARS: usize = 60;

const HELP: &str = "Describe your symptoms, or use a command:
  /history    list saved conversations (newest first)
  /resume N   show saved conversation N
  /clear      delete all saved conversations
  /quit       exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    History,
    Resume(usize),
    Clear,
    Help,
    Quit,
    /// Blank input; nothing is sent.
    Skip,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Skip;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("history"), None) => Command::History,
        (Some("clear"), None) => Command::Clear,
        (Some("help"), None) => Command::Help,
        (Some("quit" | "exit"), None) => Command::Quit,
        (Some("resume"), Some(n)) => match n.parse() {
            Ok(index) => Command::Resume(index),
            Err(_) => Command::Invalid(format!("Not a conversation number: {n}")),
        },
        _ => Command::Invalid(format!("Unknown command: /{command}")),
    }
}

/// Read commands from `input` until EOF or `/quit`, writing replies to `output`.
pub async fn repl<R, W>(engine: Arc<TriageEngine>, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(format!("{HELP}\n\n").as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let text = match parse_command(&line) {
            Command::Skip => continue,
            Command::Quit => break,
            Command::Help => HELP.to_string(),
            Command::Invalid(message) => message,
            Command::History => format_history(&engine.history().list()),
            Command::Resume(index) => match engine.history().get(index) {
                Some(entry) => format_resumed(&entry),
                None => format!("No saved conversation at {index}."),
            },
            Command::Clear => {
                engine.history().clear();
                "Chat history cleared.".to_string()
            }
            Command::Ask(query) => match engine.submit(query).await {
                Ok(reply) => reply.response,
                Err(e) => {
                    tracing::error!(error = %e, "Triage task failed");
                    NO_MATCH_RESPONSE.to_string()
                }
            },
        };
        output.write_all(format!("{text}\n\n").as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

fn format_history(entries: &[ChatHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No saved conversations.".to_string();
    }
    let mut out = format!("Chat History ({})", entries.len());
    for (index, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "\n  [{index}] {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            preview(&entry.query)
        ));
    }
    out
}

fn format_resumed(entry: &ChatHistoryEntry) -> String {
    format!("You: {}\n\n{}", entry.query, entry.response)
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::TriageConfig;
    use crate::history::HistoryStore;
    use crate::triage::corpus::CorpusSource;
    use crate::triage::emergency::emergency_message;

    fn engine() -> Arc<TriageEngine> {
        let config = TriageConfig {
            corpus: CorpusSource::Inline("header\n".into()),
            thinking_delay: Duration::ZERO,
            ..TriageConfig::default()
        };
        Arc::new(TriageEngine::new(config, HistoryStore::in_memory()))
    }

    async fn run(engine: Arc<TriageEngine>, script: &str) -> String {
        let mut output = Vec::new();
        repl(engine, script.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/history"), Command::History);
        assert_eq!(parse_command("  /resume 3 "), Command::Resume(3));
        assert_eq!(parse_command("/clear"), Command::Clear);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("   "), Command::Skip);
        assert_eq!(parse_command("I feel dizzy"), Command::Ask("I feel dizzy".into()));
        assert!(matches!(parse_command("/resume x"), Command::Invalid(_)));
        assert!(matches!(parse_command("/dance"), Command::Invalid(_)));
    }

    #[test]
    fn preview_truncates_long_queries() {
        let long = "a".repeat(80);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn ask_then_resume() {
        let engine = engine();
        let output = run(Arc::clone(&engine), "I have chest pain\n/history\n/resume 0\n/quit\n").await;

        let message = emergency_message("chest pain").unwrap();
        assert!(output.contains(message));
        assert!(output.contains("Chat History (1)"));
        assert!(output.contains("You: I have chest pain"));
        assert_eq!(engine.history().list().len(), 1);
    }

    #[tokio::test]
    async fn blank_lines_are_not_sent() {
        let engine = engine();
        run(Arc::clone(&engine), "\n   \n").await;
        assert!(engine.history().list().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let engine = engine();
        let output = run(Arc::clone(&engine), "my knee aches\n/clear\n/history\n").await;
        assert!(output.contains("Chat history cleared."));
        assert!(output.contains("No saved conversations."));
        assert!(engine.history().list().is_empty());
    }

    #[tokio::test]
    async fn resume_out_of_range() {
        let output = run(engine(), "/resume 5\n").await;
        assert!(output.contains("No saved conversation at 5."));
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let engine = engine();
        run(Arc::clone(&engine), "/quit\nmy knee aches\n").await;
        assert!(engine.history().list().is_empty());
    }
}
