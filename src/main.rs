//! Command-line interface for schema-drift
//!
//! # Usage Examples
//!
//! ```bash
//! # Run a simulation, recreating the table first
//! schema-drift run --config demos/sales.yaml \
//!   --postgresql-connection-string "host=localhost user=postgres password=postgres dbname=testdb"
//!
//! # Validate the config and print the plan without connecting
//! schema-drift run --config demos/sales.yaml --dry-run
//!
//! # Print the CREATE TABLE statement for the initial schema
//! schema-drift ddl --config demos/sales.yaml
//!
//! # Check a config file
//! schema-drift validate --config demos/sales.yaml
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_drift::commands::{create_table_sql, dry_run, run_simulation};
use schema_drift::logging::init_tracing;
use schema_drift::SimulationConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-drift")]
#[command(about = "Generate table traffic against a schema that drifts over time")]
#[command(long_about = None)]
struct Cli {
    /// Log filter (e.g. "info", "schema_drift=debug"); defaults to RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation against PostgreSQL
    Run {
        /// Simulation config file (YAML)
        #[arg(long, value_name = "PATH")]
        config: PathBuf,

        /// PostgreSQL connection string
        #[arg(long, env = "POSTGRESQL_CONNECTION_STRING")]
        postgresql_connection_string: Option<String>,

        /// Override the seed from the config file
        #[arg(long)]
        seed: Option<u64>,

        /// Keep an existing table instead of dropping it first
        #[arg(long)]
        keep_table: bool,

        /// Validate and print the plan without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the CREATE TABLE statement for the initial schema
    Ddl {
        /// Simulation config file (YAML)
        #[arg(long, value_name = "PATH")]
        config: PathBuf,
    },

    /// Validate a simulation config file
    Validate {
        /// Simulation config file (YAML)
        #[arg(long, value_name = "PATH")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Run {
            config,
            postgresql_connection_string,
            seed,
            keep_table,
            dry_run: is_dry_run,
        } => {
            let mut config = SimulationConfig::from_file(&config)?;
            if let Some(seed) = seed {
                config.seed = seed;
            }

            if is_dry_run {
                return dry_run(&config);
            }

            let connection_string = postgresql_connection_string.context(
                "--postgresql-connection-string or POSTGRESQL_CONNECTION_STRING is required",
            )?;
            let report = run_simulation(&config, &connection_string, !keep_table).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
        Commands::Ddl { config } => {
            let config = SimulationConfig::from_file(&config)?;
            println!("{};", create_table_sql(&config)?);
        }
        Commands::Validate { config } => {
            let config = SimulationConfig::from_file(&config)?;
            config.build()?;
            tracing::info!(
                "Config for {} is valid ({} columns)",
                config.table_ref(),
                config.columns.len()
            );
        }
    }

    Ok(())
}
