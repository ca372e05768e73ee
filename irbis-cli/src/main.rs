//! irbis-cli - Command-line interface for IRBIS64 servers
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use irbis_client::{AsyncConnection, ClientConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "irbis-cli")]
#[command(about = "Command-line interface for IRBIS64 servers")]
#[command(version)]
struct Cli {
    /// Connection string (host=..;port=..;user=..;password=..;db=..;)
    #[arg(short = 'c', long, env = "IRBIS_CONNECTION_STRING")]
    connection_string: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "IRBIS_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start interactive REPL
    Repl,

    /// Check that the server answers
    Ping,

    /// Get server version and client counts
    Version,

    /// Get the maximum MFN of a database
    MaxMfn {
        /// Database name (defaults to the current one)
        database: Option<String>,
    },

    /// Search the dictionary
    Search {
        /// Search expression, e.g. K=ALGEBRA$
        expression: String,

        /// Format found records with this script
        #[arg(short, long)]
        format: Option<String>,

        /// Maximum number of results (0 = all)
        #[arg(short = 'n', long, default_value = "0")]
        limit: usize,
    },

    /// Count records matching an expression
    Count {
        /// Search expression
        expression: String,
    },

    /// Read a record
    Read {
        /// Record MFN
        mfn: u32,
    },

    /// Format a record
    Format {
        /// Record MFN
        mfn: u32,

        /// Format script, e.g. @brief
        #[arg(default_value = "@brief")]
        script: String,
    },

    /// List dictionary terms
    Terms {
        /// Start term, e.g. K=
        start: String,

        /// Number of terms
        #[arg(short = 'n', long, default_value = "10")]
        count: u32,

        /// Read backwards from the start term
        #[arg(short, long)]
        reverse: bool,
    },

    /// List server processes
    Processes,

    /// List registered users
    Users,

    /// Get server statistics
    Stat,

    /// Get database information
    DbInfo {
        /// Database name (defaults to the current one)
        database: Option<String>,
    },

    /// Print a text file, e.g. 2.IBIS.brief.pft
    File {
        /// File specification path.database.filename
        specification: String,
    },

    /// List server files matching wildcard specifications
    ListFiles {
        /// Specifications, e.g. 2.IBIS.*.pft
        #[arg(required = true)]
        specifications: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load_from(cli.config.as_deref())?;
    if let Some(ref text) = cli.connection_string {
        config.apply_connection_string(text);
    }
    let mut conn = AsyncConnection::with_config(config.to_session(), config.connection_config());

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(conn, cli.json).await?;
        }
        Some(cmd) => {
            conn.connect().await.map_err(|e| {
                eprintln!("{}: {}", "Connection failed".red(), e);
                e
            })?;

            let result = commands::execute(&mut conn, cmd, cli.json).await;
            let _ = conn.disconnect().await;

            match result {
                Ok(output) => {
                    println!("{}", output);
                }
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
