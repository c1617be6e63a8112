use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "launchdeck")]
#[command(about = "Config-driven application launcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: <launcher name>.conf next to the executable)
    #[arg(long, global = true)]
    pub conf: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the configured apps with their icons (default)
    List,
    /// Regenerate missing or outdated icons
    Refresh {
        /// Regenerate every icon, even if the cache looks current
        #[arg(long)]
        force: bool,
    },
    /// Show icon cache state
    Status,
    /// Start an app by its number in `list`
    Launch {
        /// 1-based row number
        index: usize,
    },
}
