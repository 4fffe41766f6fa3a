use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use storylib_core::DEFAULT_MAX_BACKUPS;

#[derive(Debug, Parser, Clone)]
#[command(name = "storylib", version, about = "Manage the Twine story library folder")]
pub struct Cli {
    /// Folder holding the Twine folder (defaults to the OS documents dir)
    #[arg(long, global = true, env = "STORYLIB_DOCUMENTS_DIR")]
    pub documents_dir: Option<PathBuf>,

    /// Application data folder for JSON files (defaults to the OS app data dir)
    #[arg(long, global = true, env = "STORYLIB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON object translating "Twine", "Stories" and "Backups"
    #[arg(long, global = true, env = "STORYLIB_LOCALE_FILE")]
    pub locale_file: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the story library path
    Path,
    /// Create the story library folder
    Create,
    /// Make the story library read-only
    Lock,
    /// Make the story library writable again
    Unlock,
    /// Show whether the library is locked
    Status,
    /// Open the story library in the file browser
    Reveal,
    /// Back up the story library once
    Backup(RetentionArgs),
    /// List existing backups, oldest first
    Backups,
    /// Back up on a fixed interval until interrupted
    Watch(WatchCmd),
    /// JSON files in the application data folder
    #[command(subcommand)]
    Json(JsonCmd),
}

#[derive(Debug, Args, Clone)]
pub struct RetentionArgs {
    /// Number of backups to keep
    #[arg(long, env = "STORYLIB_MAX_BACKUPS", default_value_t = DEFAULT_MAX_BACKUPS)]
    pub max: usize,
}

#[derive(Debug, Args, Clone)]
pub struct WatchCmd {
    /// Seconds between backups
    #[arg(long, default_value_t = 1200)]
    pub every: u64,
    #[command(flatten)]
    pub retention: RetentionArgs,
}

#[derive(Debug, Subcommand, Clone)]
pub enum JsonCmd {
    Load { file: String },
    Save { file: String, json: String },
}
