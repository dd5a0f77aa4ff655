use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dutrail")]
#[command(about = "Records per-directory disk usage over time and browses its history")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./config.txt, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Size every directory under the targets and store the ones that changed
    Record(RecordArgs),

    /// Browse directories and their size history interactively
    Browse(BrowseArgs),

    /// Print the recorded sizes of one directory
    History(HistoryArgs),
}

#[derive(Parser)]
pub struct RecordArgs {
    /// Directories to record (defaults to the current directory)
    pub paths: Vec<PathBuf>,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show run statistics and diagnostics
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct BrowseArgs {
    /// Starting directory (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Write debug logs next to the snapshot database
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Directory whose history to print
    pub path: PathBuf,

    /// Only show snapshots newer than this, e.g. "7d" or "12h"
    #[arg(long)]
    pub since: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
