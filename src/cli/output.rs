//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::classifier::Verdict;
use crate::compose::CompositionReport;
use crate::config::AssemblyConfig;
use crate::core::ConversationTurn;
use crate::engine::Assembly;
use crate::error::Error;
use crate::knowledge::{KnowledgeExcerpt, KnowledgeSection};
use crate::storage::{SessionSummary, StoreStats};
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StoreStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats),
        OutputFormat::Json => format_json(stats),
    }
}

fn format_status_text(stats: &StoreStats) -> String {
    let mut output = String::new();
    output.push_str("Ekko Status\n");
    output.push_str("===========\n\n");
    let _ = writeln!(output, "  Sessions:      {}", stats.session_count);
    let _ = writeln!(output, "  Turns:         {}", stats.turn_count);
    let _ = writeln!(output, "  Schema:        v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:       {}", format_size(size));
    }
    output
}

/// Formats the result of preparing a message.
///
/// Text output is the bare prompt (or redirect reply) so it can be piped
/// straight to a model.
#[must_use]
pub fn format_assembly(assembly: &Assembly, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = assembly.text().to_string();
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => format_json(assembly),
    }
}

/// Formats a composition report as a short summary.
#[must_use]
pub fn format_report(report: &CompositionReport) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Context: {} / {} chars",
        report.total_chars, report.budget
    );
    for slot in &report.slots {
        let mut notes = Vec::new();
        if slot.dropped > 0 {
            notes.push(format!("{} dropped", slot.dropped));
        }
        if slot.truncated {
            notes.push("truncated".to_string());
        }
        let _ = writeln!(
            output,
            "  {:<10} {:>6} chars {}",
            slot.name.as_str(),
            slot.chars,
            notes.join(", ")
        );
    }
    output
}

/// Formats a classifier verdict.
#[must_use]
pub fn format_verdict(verdict: &Verdict, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let label = match (verdict.in_domain, verdict.follow_up) {
                (true, true) => "in-domain (follow-up)",
                (true, false) => "in-domain",
                (false, _) => "out-of-domain",
            };
            let _ = writeln!(output, "Verdict: {label}");
            if !verdict.matched_terms.is_empty() {
                let terms: Vec<&str> = verdict.matched_terms.iter().map(String::as_str).collect();
                let _ = writeln!(output, "  Terms:  {}", terms.join(", "));
                let topics: Vec<&str> = verdict.topics.iter().copied().collect();
                let _ = writeln!(output, "  Topics: {}", topics.join(", "));
            }
            output
        }
        OutputFormat::Json => format_json(verdict),
    }
}

/// Formats knowledge lookup results.
#[must_use]
pub fn format_excerpts(excerpts: &[KnowledgeExcerpt], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if excerpts.is_empty() {
                return "No matching knowledge sections.\n".to_string();
            }
            let mut output = String::new();
            for excerpt in excerpts {
                let _ = writeln!(
                    output,
                    "[{}] {} (score {}{})",
                    excerpt.section_id,
                    excerpt.title,
                    excerpt.score,
                    if excerpt.truncated { ", truncated" } else { "" }
                );
                let _ = writeln!(output, "{}\n", excerpt.text);
            }
            output
        }
        OutputFormat::Json => format_json(&excerpts),
    }
}

/// Formats conversation turns.
#[must_use]
pub fn format_history(turns: &[ConversationTurn], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if turns.is_empty() {
                return "No turns recorded.\n".to_string();
            }
            let mut output = String::new();
            for turn in turns {
                let _ = writeln!(output, "{}: {}", turn.role.label(), turn.text);
            }
            output
        }
        OutputFormat::Json => format_json(&turns),
    }
}

/// Formats a session list.
#[must_use]
pub fn format_session_list(sessions: &[SessionSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if sessions.is_empty() {
                return "No sessions found.\n".to_string();
            }
            let mut output = String::new();
            output.push_str("Sessions:\n");
            let _ = writeln!(
                output,
                "{:<24} {:<8} {:<12} Last active",
                "ID", "Turns", "Created"
            );
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for session in sessions {
                let _ = writeln!(
                    output,
                    "{:<24} {:<8} {:<12} {}",
                    truncate(&session.id, 24),
                    session.turn_count,
                    session.created_at,
                    session.updated_at
                );
            }
            output
        }
        OutputFormat::Json => format_json(&sessions),
    }
}

/// Formats the knowledge section listing.
#[must_use]
pub fn format_sections(sections: &[KnowledgeSection], version: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Knowledge base ({version}):");
            for section in sections {
                let _ = writeln!(
                    output,
                    "  {:<28} {:<32} {} keywords",
                    section.id,
                    truncate(&section.title, 32),
                    section.keywords.len()
                );
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Listing<'a> {
                version: &'a str,
                sections: &'a [KnowledgeSection],
            }
            format_json(&Listing { version, sections })
        }
    }
}

/// Formats a single knowledge section.
#[must_use]
pub fn format_section(section: &KnowledgeSection, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let keywords: Vec<&str> = section.keywords.iter().map(String::as_str).collect();
            let mut output = String::new();
            let _ = writeln!(output, "=== {} ===", section.title);
            let _ = writeln!(output, "Keywords: {}\n", keywords.join(", "));
            let _ = writeln!(output, "{}", section.body);
            output
        }
        OutputFormat::Json => format_json(section),
    }
}

/// Formats the effective configuration.
#[must_use]
pub fn format_config(config: &AssemblyConfig, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Assembly configuration:\n");
            let _ = writeln!(output, "  history_max_turns:        {}", config.history_max_turns);
            let _ = writeln!(output, "  history_max_chars:        {}", config.history_max_chars);
            let _ = writeln!(output, "  knowledge_top_k:          {}", config.knowledge_top_k);
            let _ = writeln!(
                output,
                "  knowledge_excerpt_chars:  {}",
                config.knowledge_excerpt_chars
            );
            let _ = writeln!(output, "  context_max_chars:        {}", config.context_max_chars);
            let _ = writeln!(output, "  prompt_max_chars:         {}", config.prompt_max_chars);
            let _ = writeln!(output, "  follow_up_max_words:      {}", config.follow_up_max_words);
            let _ = writeln!(
                output,
                "  follow_up_lookback_turns: {}",
                config.follow_up_lookback_turns
            );
            output
        }
        OutputFormat::Json => format_json(config),
    }
}

/// Formats a simple confirmation message.
#[must_use]
pub fn format_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "message": message })),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "error": error.to_string(),
            "fatal": error.is_fatal(),
        })),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Truncates a string to a maximum number of characters with ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;
    use std::collections::BTreeSet;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Irrigação por gotejamento", 10), "Irrigaç...");
    }

    #[test]
    fn test_format_status() {
        let stats = StoreStats {
            session_count: 2,
            turn_count: 10,
            schema_version: 1,
            db_size: Some(4096),
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Sessions:      2"));
        assert!(text.contains("Turns:         10"));
        assert!(text.contains("4.0 KB"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"session_count\": 2"));
    }

    #[test]
    fn test_format_verdict() {
        let verdict = Verdict {
            in_domain: true,
            matched_terms: BTreeSet::from(["cafe".to_string(), "ph".to_string()]),
            topics: BTreeSet::from(["cultivos", "solo"]),
            follow_up: false,
        };
        let text = format_verdict(&verdict, OutputFormat::Text);
        assert!(text.starts_with("Verdict: in-domain\n"));
        assert!(text.contains("Terms:  cafe, ph"));

        let json = format_verdict(&verdict, OutputFormat::Json);
        assert!(json.contains("\"in_domain\": true"));
    }

    #[test]
    fn test_format_history() {
        let turns = vec![
            ConversationTurn::at(Role::User, "oi", 1),
            ConversationTurn::at(Role::Assistant, "Ola!", 2),
        ];
        assert_eq!(
            format_history(&turns, OutputFormat::Text),
            "Usuario: oi\nEkko: Ola!\n"
        );
        assert_eq!(format_history(&[], OutputFormat::Text), "No turns recorded.\n");
    }

    #[test]
    fn test_format_error_json() {
        let err = Error::BudgetExceeded {
            required: 10,
            ceiling: 5,
        };
        let json = format_error(&err, OutputFormat::Json);
        assert!(json.contains("\"fatal\": true"));
        assert!(json.contains("prompt budget exceeded"));
    }
}
