//! UserDB CLI
//!
//! Command-line driver for the in-memory user store.
//!
//! # Commands
//!
//! - `demo` - Walk through CRUD, bulk insert, search and transactions
//! - `workload` - Run a concurrent mixed read/write workload and report stats
//! - `version` - Print the binary version

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// UserDB command-line tools.
#[derive(Parser)]
#[command(name = "userdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(global = true, short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the store's operations on a fresh store
    Demo,

    /// Run a concurrent mixed workload
    Workload {
        /// Number of worker threads
        #[arg(short, long, default_value_t = 4)]
        threads: usize,

        /// Operations per thread
        #[arg(short, long, default_value_t = 10_000)]
        ops: usize,

        /// Share of operations that are reads, from 0.0 to 1.0
        #[arg(short, long, default_value_t = 0.8)]
        read_ratio: f64,

        /// Users inserted before the workload starts
        #[arg(short, long, default_value_t = 1_000)]
        seed: usize,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Demo => {
            commands::demo::run(cli.format)?;
        }
        Commands::Workload {
            threads,
            ops,
            read_ratio,
            seed,
        } => {
            let config = commands::workload::WorkloadConfig {
                threads,
                ops_per_thread: ops,
                read_ratio,
                seed_users: seed,
            };
            commands::workload::run(&config, cli.format)?;
        }
        Commands::Version => {
            println!("userdb {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
