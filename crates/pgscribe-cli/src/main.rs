//! `pgscribe` - Postgres schema snapshots and Markdown documentation.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use pgscribe::{Config, Result, apply_file, connect, docs, introspect, snapshot};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Postgres schema snapshots and Markdown documentation.
#[derive(Parser, Debug)]
#[command(name = "pgscribe", version)]
struct Cli {
    /// Database connection URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Introspect the database and write a JSON schema snapshot
    Fetch {
        /// Snapshot output path
        #[arg(long, default_value = "database_schema.json")]
        output: PathBuf,

        /// Schema namespace to introspect (overrides PGSCRIBE_SCHEMA)
        #[arg(long)]
        schema: Option<String>,
    },
    /// Render Markdown documentation from a schema snapshot
    Docs {
        /// Snapshot input path
        #[arg(long, default_value = "database_schema.json")]
        input: PathBuf,

        /// Markdown output path
        #[arg(long, default_value = "DATABASE_SCHEMA.md")]
        output: PathBuf,
    },
    /// Apply a SQL file statement by statement, skipping existing objects
    Apply {
        /// SQL file to apply
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch { output, schema } => {
            let mut config = Config::from_env(cli.database_url)?;
            if let Some(schema) = schema {
                config.schema = schema;
            }

            let client = connect(&config).await?;
            let schema = introspect(&client, &config.schema).await?;

            for (table, column) in schema.orphan_foreign_keys() {
                tracing::warn!(table, column, "foreign key source column missing from table");
            }

            snapshot::save(&schema, &output)?;
            println!(
                "{} snapshot of {} tables written to {}",
                "ok:".green().bold(),
                schema.tables.len(),
                output.display()
            );
        }
        Commands::Docs { input, output } => {
            let schema = snapshot::load(&input)?;
            docs::write_to(&schema, &output)?;
            println!(
                "{} documentation for {} tables written to {}",
                "ok:".green().bold(),
                schema.tables.len(),
                output.display()
            );
        }
        Commands::Apply { file } => {
            let config = Config::from_env(cli.database_url)?;
            let mut client = connect(&config).await?;
            let report = apply_file(&mut client, &file).await?;

            println!();
            println!("=== Summary ===");
            println!("{} {}", "succeeded:".green(), report.succeeded);
            println!("{} {}", "skipped:  ".yellow(), report.skipped);
            if report.failed > 0 {
                println!("{} {}", "failed:   ".red(), report.failed);
            }
            println!("total:     {}", report.total);

            if !report.is_clean() {
                println!(
                    "{} some statements failed; see the log above",
                    "warning:".yellow().bold()
                );
            }
        }
    }

    Ok(())
}
