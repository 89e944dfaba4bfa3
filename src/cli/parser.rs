//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ekko: context assembly for a Brazilian agriculture assistant.
///
/// Classifies farmer questions, gathers knowledge, history and external
/// context, and prints the prompt to send to the model.
#[derive(Parser, Debug)]
#[command(name = "ekko")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the session database file.
    ///
    /// Defaults to `.ekko/ekko-sessions.db` in the current directory.
    #[arg(short, long, env = "EKKO_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Path to a JSON file with assembly budgets.
    #[arg(short, long, env = "EKKO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path to a JSON knowledge file replacing the bundled knowledge base.
    #[arg(short, long, env = "EKKO_KNOWLEDGE", global = true)]
    pub knowledge: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the session database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing sessions).
        #[arg(short, long)]
        force: bool,
    },

    /// Show session database status.
    Status,

    /// Delete all sessions.
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Prepare the model prompt for a farmer message.
    ///
    /// With `--session`, the conversation history is loaded from the
    /// database and the message is recorded as a new user turn.
    #[command(alias = "assemble")]
    Ask {
        /// The farmer's message.
        message: String,

        /// Conversation session ID.
        #[arg(short, long)]
        session: Option<String>,

        /// JSON file with the farmer/property record.
        #[arg(long)]
        farmer: Option<PathBuf>,

        /// Web search text.
        #[arg(long, conflicts_with = "web_file")]
        web: Option<String>,

        /// File with web search text.
        #[arg(long)]
        web_file: Option<PathBuf>,

        /// Current weather text.
        #[arg(long, conflicts_with = "weather_file")]
        weather: Option<String>,

        /// File with current weather text.
        #[arg(long)]
        weather_file: Option<PathBuf>,

        /// Do not record the message in the session.
        #[arg(long, requires = "session")]
        no_record: bool,
    },

    /// Record the assistant's reply in a session.
    Reply {
        /// Conversation session ID.
        session: String,

        /// Reply text (reads from stdin if not provided).
        text: Option<String>,
    },

    /// Classify a message against the agriculture domain.
    Classify {
        /// The message to classify.
        message: String,

        /// Session whose history enables follow-up detection.
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Look up knowledge base sections for a message.
    Lookup {
        /// The message to look up.
        message: String,

        /// Maximum number of sections (defaults to the configured top-k).
        #[arg(short = 'n', long)]
        top_k: Option<usize>,
    },

    /// Show the history window of a session.
    History {
        /// Conversation session ID.
        session: String,

        /// Show every recorded turn instead of the budgeted window.
        #[arg(short, long)]
        all: bool,
    },

    /// List conversation sessions.
    #[command(alias = "ls")]
    Sessions,

    /// Delete a conversation session.
    #[command(alias = "rm")]
    Forget {
        /// Conversation session ID.
        session: String,

        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List knowledge base sections, or show one.
    #[command(name = "knowledge")]
    KnowledgeSections {
        /// Section ID to show in full.
        section: Option<String>,
    },

    /// Show the effective assembly configuration.
    #[command(name = "config")]
    ShowConfig,
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
