//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Breaker hierarchies: cycle-safe parent links and best-effort state cascades
#[derive(Parser, Debug)]
#[command(name = "breakertree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Node store file (overrides configuration)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// On/off argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn as_bool(self) -> bool {
        matches!(self, SwitchState::On)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the node forest
    Tree,

    /// List root nodes
    Roots,

    /// List direct children of a node
    Children { id: String },

    /// List all descendants of a node (cascade order)
    Descendants { id: String },

    /// List ancestors of a node, nearest first
    Ancestors { id: String },

    /// Check whether a parent change would create a cycle
    CheckParent { id: String, parent: String },

    /// Change the parent of a node (omit PARENT to make it a root)
    SetParent { id: String, parent: Option<String> },

    /// Switch a node and cascade the new state to its subtree
    Switch {
        id: String,
        #[arg(value_enum)]
        state: SwitchState,
    },

    /// Cascade a state to the subtree of a node without touching the node
    Cascade {
        id: String,
        #[arg(value_enum)]
        state: SwitchState,
    },

    /// Set many nodes at once (unordered)
    Bulk {
        #[arg(value_enum)]
        state: SwitchState,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add a node
    Add {
        /// Node id (default: random uuid)
        #[arg(long)]
        id: Option<String>,
        /// Parent node id
        #[arg(long)]
        parent: Option<String>,
        /// Node kind (default: configured kind)
        #[arg(long)]
        kind: Option<String>,
        /// Create the node switched off
        #[arg(long)]
        off: bool,
    },

    /// Remove a node; its children become roots
    Remove { id: String },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show config file locations
    Path,
}
