use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Terminal emulator for an in-memory virtual filesystem
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// CSV table (path,type,content) describing the virtual filesystem
    #[clap(long)]
    pub vfs: Option<PathBuf>,

    /// Script of commands to run before the interactive session
    #[clap(long)]
    pub script: Option<PathBuf>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
