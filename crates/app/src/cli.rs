use std::path::PathBuf;

use academy_core::model::ApiProvider;
use clap::{Parser, Subcommand, ValueEnum};

const DEFAULT_DB_URL: &str = "sqlite:academy.sqlite3";

/// Local AI learning courses: browse the catalog, track progress, try prompts.
#[derive(Debug, Parser)]
#[command(name = "academy", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database URL or path
    #[arg(long = "db", env = "ACADEMY_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// Course catalog JSON file (defaults to the built-in catalog)
    #[arg(long, env = "ACADEMY_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List courses, optionally filtered by a search term
    Courses {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a course outline with progress
    Course { slug: String },
    /// Show a lesson and its neighbours
    Lesson {
        course_slug: String,
        lesson_slug: String,
    },
    /// Start a lesson (and its module and course)
    Start { lesson_id: String },
    /// Complete a lesson
    Complete { lesson_id: String },
    /// Lesson after the given one
    Next { lesson_id: String },
    /// Lesson before the given one
    Prev { lesson_id: String },
    /// Progress summary
    Progress {
        /// Print the raw aggregate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Unlocked achievements
    Achievements,
    /// Wipe all progress
    Reset,
    #[command(subcommand)]
    Settings(SettingsCommand),
    #[command(subcommand)]
    Playground(PlaygroundCommand),
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    /// Store an API key; an empty key clears it
    SetKey { provider: Provider, key: String },
    /// Override the model API base URL; an empty value restores the default
    SetBaseUrl { url: String },
    ClearKeys,
    ToggleTheme,
}

#[derive(Debug, Subcommand)]
pub enum PlaygroundCommand {
    /// Send one prompt to the model
    Run {
        prompt: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    History,
    /// Write history as JSON to a file or stdout
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge sessions from an exported JSON file
    Import { path: PathBuf },
    Stats,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Anthropic,
    Openai,
}

impl From<Provider> for ApiProvider {
    fn from(value: Provider) -> Self {
        match value {
            Provider::Anthropic => ApiProvider::Anthropic,
            Provider::Openai => ApiProvider::Openai,
        }
    }
}
