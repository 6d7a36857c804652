//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::{CompanyId, UnitId};

/// Business unit hierarchy engine: bounded-depth, capacity-contained unit forests per company
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory to look for a local .orgtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Data file (overrides configuration)
    #[arg(long, global = true, env = "ORGTREE_DATA_FILE", value_hint = ValueHint::FilePath)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Register processes that reference business units
    Process {
        #[command(subcommand)]
        command: ProcessCommands,
    },

    /// Create, change and remove business units
    Unit {
        #[command(subcommand)]
        command: UnitCommands,
    },

    /// Show the unit hierarchy as a tree
    Tree {
        /// Restrict to one company
        #[arg(long)]
        company: Option<CompanyId>,
        /// Emit nested JSON instead of a drawing
        #[arg(long)]
        json: bool,
    },

    /// Show the unit hierarchy as a depth-ordered list
    Flat {
        /// Restrict to one company
        #[arg(long)]
        company: Option<CompanyId>,
        /// Emit JSON instead of an indented list
        #[arg(long)]
        json: bool,
    },

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
pub enum CompanyCommands {
    /// Add a company and print its id
    Add {
        /// Company name
        name: String,
    },
    /// List companies
    List,
}

#[derive(Subcommand, Debug)]
pub enum ProcessCommands {
    /// Record a process owned by a unit (blocks deleting the unit)
    Add {
        /// Owning business unit
        unit: UnitId,
        /// Process name
        name: String,
    },
}

/// Target position for update and move.
#[derive(Args, Debug, Clone, Default)]
pub struct PositionArgs {
    /// New parent unit
    #[arg(long, conflicts_with = "root")]
    pub parent: Option<UnitId>,
    /// Make the unit a root
    #[arg(long)]
    pub root: bool,
}

#[derive(Subcommand, Debug)]
pub enum UnitCommands {
    /// Create a business unit
    Create {
        /// Owning company
        #[arg(long)]
        company: CompanyId,
        /// Display name
        #[arg(long)]
        name: String,
        /// Capacity (FTE); fractions are floored
        #[arg(long, allow_negative_numbers = true)]
        fte: f64,
        /// Free text description
        #[arg(long)]
        description: Option<String>,
        /// Parent unit (default: root)
        #[arg(long)]
        parent: Option<UnitId>,
    },

    /// Update a business unit
    Update {
        /// Unit to update
        id: UnitId,
        /// Display name
        #[arg(long)]
        name: String,
        /// Capacity (FTE); fractions are floored
        #[arg(long, allow_negative_numbers = true)]
        fte: f64,
        /// Free text description (empty string clears it)
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Move a unit and its subtree
    Move {
        /// Unit to move
        id: UnitId,
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Delete a leaf unit without dependent processes
    Delete {
        /// Unit to delete
        id: UnitId,
    },

    /// Show one unit as JSON
    Show {
        /// Unit to show
        id: UnitId,
    },

    /// Show capacity allocation of a unit
    Capacity {
        /// Unit to inspect
        id: UnitId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a configuration template
    Template,
    /// Show configuration file locations
    Path,
}
