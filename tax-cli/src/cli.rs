use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Thai personal income tax calculator (tax year 2568 BE / 2025).
///
/// Computes tax from a TOML input file, keeps named input profiles and a
/// history of past calculations in a local database.
#[derive(Debug, Parser)]
#[command(name = "thai-tax", version)]
pub struct Cli {
    /// Database backend to use.
    #[arg(long, global = true, default_value = "sqlite")]
    pub backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `thai-tax.db`) or `:memory:`.
    #[arg(long, global = true, default_value = "thai-tax.db")]
    pub db: String,

    /// Gregorian tax year (2025 is 2568 BE).
    #[arg(long, global = true, default_value = "2025")]
    pub year: i32,

    /// CSV bracket schedule replacing the built-in brackets.
    #[arg(long, global = true, value_name = "CSV")]
    pub brackets: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,tax_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate tax for a TOML input file.
    Calculate(CalculateArgs),

    /// Manage saved input profiles.
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Inspect recorded calculations.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Debug, Args)]
pub struct CalculateArgs {
    /// TOML file with `[income]`, `[salary]` and `[deductions]` sections.
    #[arg(long, short, value_name = "TOML")]
    pub input: PathBuf,

    /// Store the inputs as a profile under the file's `name`.
    #[arg(long)]
    pub save_profile: bool,

    /// Append the result to the calculation history.
    #[arg(long)]
    pub record: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// List saved profiles.
    List,

    /// Print a profile's inputs as TOML.
    Show { name: String },

    /// Delete a profile.
    Delete { name: String },

    /// Calculate tax from a saved profile.
    Calculate {
        name: String,

        /// Append the result to the calculation history.
        #[arg(long)]
        record: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List recorded calculations, newest first.
    List {
        /// Show at most this many records.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show one calculation with its breakdown.
    Show { id: i64 },

    /// Delete one calculation.
    Delete { id: i64 },

    /// Count, totals and averages over every recorded calculation.
    Stats,
}
