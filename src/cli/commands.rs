//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{
    OutputFormat, format_assembly, format_config, format_excerpts, format_history,
    format_message, format_report, format_section, format_sections, format_session_list,
    format_status, format_verdict,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::AssemblyConfig;
use crate::core::{ConversationTurn, FarmerRecord};
use crate::engine::{Assembly, AssemblyRequest, ContextEngine};
use crate::error::{CommandError, Result, StorageError};
use crate::history::HistoryWindow;
use crate::io::{read_file, read_json};
use crate::knowledge::KnowledgeStore;
use crate::storage::{SessionStore, SqliteStorage};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Reset { yes } => cmd_reset(&db_path, *yes, format),
        Commands::Ask {
            message,
            session,
            farmer,
            web,
            web_file,
            weather,
            weather_file,
            no_record,
        } => {
            let request = AssemblyRequest {
                message: message.clone(),
                farmer: farmer.as_deref().map(read_json::<FarmerRecord, _>).transpose()?,
                web: text_source(web.as_deref(), web_file.as_deref())?,
                weather: text_source(weather.as_deref(), weather_file.as_deref())?,
            };
            cmd_ask(cli, &db_path, &request, session.as_deref(), *no_record, format)
        }
        Commands::Reply { session, text } => cmd_reply(&db_path, session, text.as_deref(), format),
        Commands::Classify { message, session } => {
            cmd_classify(cli, &db_path, message, session.as_deref(), format)
        }
        Commands::Lookup { message, top_k } => cmd_lookup(cli, message, *top_k, format),
        Commands::History { session, all } => cmd_history(cli, &db_path, session, *all, format),
        Commands::Sessions => cmd_sessions(&db_path, format),
        Commands::Forget { session, yes } => cmd_forget(&db_path, session, *yes, format),
        Commands::KnowledgeSections { section } => {
            cmd_knowledge(cli, section.as_deref(), format)
        }
        Commands::ShowConfig => cmd_config(cli, format),
    }
}

/// Opens storage and ensures it's initialized.
fn open_storage(db_path: &Path) -> Result<SqliteStorage> {
    let storage = SqliteStorage::open(db_path)?;

    if !storage.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }

    Ok(storage)
}

/// Loads the assembly configuration (file or defaults).
fn load_config(cli: &Cli) -> Result<AssemblyConfig> {
    cli.config
        .as_ref()
        .map_or_else(|| Ok(AssemblyConfig::default()), AssemblyConfig::from_file)
}

/// Loads the knowledge store (custom file or bundled).
fn load_knowledge(cli: &Cli, config: &AssemblyConfig) -> Result<KnowledgeStore> {
    match &cli.knowledge {
        Some(path) => KnowledgeStore::from_json_file(path, config.knowledge_excerpt_chars),
        None => KnowledgeStore::builtin(config.knowledge_excerpt_chars),
    }
}

fn load_engine(cli: &Cli) -> Result<ContextEngine> {
    let config = load_config(cli)?;
    let knowledge = load_knowledge(cli, &config)?;
    debug!(
        sections = knowledge.len(),
        version = knowledge.version(),
        "engine ready"
    );
    ContextEngine::new(config, knowledge)
}

/// Resolves an optional inline text or file into text.
fn text_source(inline: Option<&str>, file: Option<&Path>) -> Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text.to_string())),
        (None, Some(path)) => read_file(path).map(Some),
        (None, None) => Ok(None),
    }
}

fn load_session_history(storage: &SqliteStorage, session_id: &str) -> Result<HistoryWindow> {
    storage
        .load_session(session_id)?
        .map(|session| session.window)
        .ok_or_else(|| {
            StorageError::SessionNotFound {
                id: session_id.to_string(),
            }
            .into()
        })
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
    }

    let mut storage = SqliteStorage::open(db_path)?;
    storage.init()?;

    Ok(format_message(
        &format!("Initialized Ekko session store at: {}", db_path.display()),
        format,
    ))
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let stats = storage.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_reset(db_path: &Path, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm reset. This will delete all sessions.".to_string(),
        )
        .into());
    }

    let mut storage = open_storage(db_path)?;
    storage.reset()?;

    Ok(format_message("All sessions deleted.", format))
}

fn cmd_ask(
    cli: &Cli,
    db_path: &Path,
    request: &AssemblyRequest,
    session: Option<&str>,
    no_record: bool,
    format: OutputFormat,
) -> Result<String> {
    let engine = load_engine(cli)?;

    let Some(session_id) = session else {
        let assembly = engine.prepare(request, &HistoryWindow::new())?;
        log_report(&assembly);
        return Ok(format_assembly(&assembly, format));
    };

    let mut storage = open_storage(db_path)?;
    let history = storage.load_history(session_id)?;
    let assembly = engine.prepare(request, &history)?;
    log_report(&assembly);

    if !no_record {
        storage.append_turn(session_id, &ConversationTurn::user(request.message.as_str()))?;
        // A redirect is the final reply; nothing else will record it
        if let Assembly::Redirect { response, .. } = &assembly {
            storage.append_turn(session_id, &ConversationTurn::assistant(response.text.as_str()))?;
        }
    }

    Ok(format_assembly(&assembly, format))
}

fn log_report(assembly: &Assembly) {
    if let Assembly::Prompt { prompt, .. } = assembly {
        debug!("composition report\n{}", format_report(prompt.report()));
    }
}

fn cmd_reply(
    db_path: &Path,
    session_id: &str,
    text: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    load_session_history(&storage, session_id)?;

    let text = if let Some(t) = text {
        t.to_string()
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to read from stdin: {e}"))
        })?;
        buffer
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(CommandError::MissingArgument("reply text".to_string()).into());
    }

    storage.append_turn(session_id, &ConversationTurn::assistant(text))?;

    Ok(format_message(
        &format!("Recorded reply in session '{session_id}'."),
        format,
    ))
}

fn cmd_classify(
    cli: &Cli,
    db_path: &Path,
    message: &str,
    session: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let engine = load_engine(cli)?;
    let history = match session {
        Some(session_id) => open_storage(db_path)?.load_history(session_id)?,
        None => HistoryWindow::new(),
    };
    let verdict = engine
        .classifier()
        .classify_in_conversation(message, &history);
    Ok(format_verdict(&verdict, format))
}

fn cmd_lookup(
    cli: &Cli,
    message: &str,
    top_k: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    let engine = load_engine(cli)?;
    let top_k = top_k.unwrap_or(engine.config().knowledge_top_k);
    if top_k == 0 {
        return Err(CommandError::InvalidArgument("top-k must be > 0".to_string()).into());
    }
    let excerpts = engine.knowledge().lookup(message, top_k);
    Ok(format_excerpts(&excerpts, format))
}

fn cmd_history(
    cli: &Cli,
    db_path: &Path,
    session_id: &str,
    all: bool,
    format: OutputFormat,
) -> Result<String> {
    let storage = open_storage(db_path)?;
    let window = load_session_history(&storage, session_id)?;

    if all {
        return Ok(format_history(window.turns(), format));
    }

    let config = load_config(cli)?;
    let snapshot = window.snapshot(config.history_max_turns, config.history_max_chars);
    Ok(format_history(&snapshot, format))
}

fn cmd_sessions(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let sessions = storage.list_sessions()?;
    Ok(format_session_list(&sessions, format))
}

fn cmd_forget(db_path: &Path, session_id: &str, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(format!(
            "Use --yes to confirm deleting session '{session_id}'."
        ))
        .into());
    }

    let mut storage = open_storage(db_path)?;
    storage.delete_session(session_id)?;

    Ok(format_message(
        &format!("Deleted session '{session_id}'."),
        format,
    ))
}

fn cmd_knowledge(cli: &Cli, section: Option<&str>, format: OutputFormat) -> Result<String> {
    let config = load_config(cli)?;
    let store = load_knowledge(cli, &config)?;

    match section {
        Some(id) => store.get(id).map_or_else(
            || {
                Err(CommandError::InvalidArgument(format!("unknown knowledge section: {id}"))
                    .into())
            },
            |section| Ok(format_section(section, format)),
        ),
        None => Ok(format_sections(store.sections(), store.version(), format)),
    }
}

fn cmd_config(cli: &Cli, format: OutputFormat) -> Result<String> {
    let config = load_config(cli)?;
    Ok(format_config(&config, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_for(dir: &TempDir, command: Commands) -> Cli {
        Cli {
            db_path: Some(dir.path().join("ekko.db")),
            config: None,
            knowledge: None,
            verbose: false,
            format: "text".to_string(),
            command,
        }
    }

    #[test]
    fn test_text_source_prefers_inline() {
        assert_eq!(
            text_source(Some("sol"), None).unwrap().as_deref(),
            Some("sol")
        );
        assert!(text_source(None, None).unwrap().is_none());
    }

    #[test]
    fn test_status_requires_init() {
        let dir = TempDir::new().unwrap();
        let err = execute(&cli_for(&dir, Commands::Status)).unwrap_err();
        assert!(err.to_string().contains("ekko init"));
    }

    #[test]
    fn test_lookup_zero_top_k() {
        let dir = TempDir::new().unwrap();
        let cli = cli_for(
            &dir,
            Commands::Lookup {
                message: "soja".to_string(),
                top_k: Some(0),
            },
        );
        assert!(execute(&cli).is_err());
    }

    #[test]
    fn test_unknown_knowledge_section() {
        let dir = TempDir::new().unwrap();
        let cli = cli_for(
            &dir,
            Commands::KnowledgeSections {
                section: Some("nada".to_string()),
            },
        );
        assert!(execute(&cli).is_err());
    }
}
