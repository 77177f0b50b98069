//! oxide-tsql CLI
//!
//! Command-line tool converting SQL Server scripts to PostgreSQL.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Converts T-SQL scripts to PostgreSQL.
#[derive(Parser)]
#[command(name = "oxide-tsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script to read (stdin if not specified).
    #[arg(short, long, env = "OXIDE_TSQL_INPUT")]
    input: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CREATE VIEW script.
    View,

    /// Convert a procedure body or plain batch.
    Batch,

    /// Show the statements the boundary scanner cuts the script into.
    Split,

    /// Print the recognized ALTER TABLE statements as JSON.
    Alter,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let sql = oxide_tsql::read_input(cli.input.as_deref())?;
    debug!(bytes = sql.len(), "Read input");

    let output = match cli.command {
        Commands::View => oxide_tsql::convert_view(&sql)?,
        Commands::Batch => oxide_tsql::convert_batch(&sql)?,
        Commands::Split => oxide_tsql::split_script(&sql)?,
        Commands::Alter => oxide_tsql::extract_alters(&sql)?,
    };
    println!("{output}");

    Ok(())
}
