use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "studio-flow")]
#[command(about = "Status workflows for studio bookings, invoices and editing jobs")]
#[command(long_about = "studio-flow checks and applies status transitions for bookings, invoices \
                       and editing jobs. Query the transition table with 'studio-flow transitions', \
                       or apply a change to a JSON dataset with 'studio-flow transition'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List statuses with their display labels and badge tones
    Statuses {
        /// Restrict to one entity kind (booking, invoice, editing)
        #[arg(long, help = "Only show statuses of this entity kind")]
        kind: Option<String>,
    },
    /// Show which statuses an entity can move to
    Transitions {
        /// Entity kind (booking, invoice, editing)
        kind: String,
        /// Current status; omit for an entity with no status yet
        status: Option<String>,
    },
    /// Check whether a single transition is legal
    Check {
        /// Entity kind (booking, invoice, editing)
        kind: String,
        /// Current status ("none" for an entity with no status yet)
        from: String,
        /// Target status
        to: String,
    },
    /// Apply a transition to an entity stored in a JSON dataset
    Transition {
        /// Dataset file holding entities and transition history
        #[arg(long, help = "Path to the JSON dataset")]
        data: PathBuf,
        /// Entity kind (booking, invoice, editing)
        #[arg(long)]
        kind: String,
        /// Entity id
        #[arg(long)]
        id: String,
        /// Target status
        #[arg(long)]
        to: String,
        /// Note recorded in the transition history
        #[arg(long, help = "Free-text note stored with the history entry")]
        note: Option<String>,
        /// Report the outcome without writing the dataset back
        #[arg(long, help = "Run the transition but do not save the dataset")]
        dry_run: bool,
    },
    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(long, default_value = "studio-flow.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
