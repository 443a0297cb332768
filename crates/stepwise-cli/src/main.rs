//! Stepwise Command-Line Tool
//!
//! Inspects and repairs the migration control record of a sled data
//! directory.

mod commands;

use clap::Parser;
use commands::Command;
use std::path::PathBuf;
use stepwise_core::{Migrator, MigratorOptions, DEFAULT_COLLECTION_NAME};

/// Stepwise Command-Line Tool
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(version, about = "Inspect and repair stepwise migration control records")]
pub struct Args {
    /// Path to the sled data directory
    #[arg(short, long, default_value = "./data")]
    pub data_path: PathBuf,

    /// Collection holding the control record
    #[arg(short, long, default_value = DEFAULT_COLLECTION_NAME)]
    pub collection: String,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepwise=info".into()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(
        data_path = %args.data_path.display(),
        collection = %args.collection,
        "opening data directory"
    );

    let db = sled::open(&args.data_path)?;
    let mut migrator = Migrator::new(
        MigratorOptions::new().with_collection_name(args.collection.as_str()),
    );
    migrator.config(db)?;

    let output = commands::execute(&migrator, &args.command, args.json)?;
    println!("{}", output);
    Ok(())
}
