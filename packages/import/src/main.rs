#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the census bulk-import tooling.

use clap::{Parser, Subcommand};
use fishcensus_database::{db, run_migrations};
use fishcensus_import::backfill::{DEFAULT_DECAY, backfill_year};
use fishcensus_import::{ImportOptions, import_file, seed};
use fishcensus_models::RecordKind;

#[derive(Parser)]
#[command(name = "fishcensus_import", about = "Census bulk-import tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one tabular file of the given kind
    Import {
        /// Path to the CSV file
        file: String,
        /// Record kind: `demographics`, `localities`, or `census-year`
        #[arg(long)]
        kind: String,
        /// Reject rows with blank/non-numeric counts instead of coercing
        /// them to 0 (overrides `FISHCENSUS_STRICT_NUMBERS`)
        #[arg(long)]
        strict_numbers: bool,
    },
    /// Derive an earlier census year by applying a decay factor
    Backfill {
        /// Year to read counts from
        #[arg(long)]
        from_year: i32,
        /// Year to derive records for
        #[arg(long)]
        to_year: i32,
        /// Multiplicative decay applied to each count
        #[arg(long, default_value_t = DEFAULT_DECAY)]
        decay: f64,
    },
    /// Insert idempotent sample data (requires `FISHCENSUS_SEED=1`)
    Seed,
    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let db_conn = db::connect_from_env().await?;
    run_migrations(db_conn.as_ref()).await?;

    match cli.command {
        Commands::Import {
            file,
            kind,
            strict_numbers,
        } => {
            let kind: RecordKind = kind
                .parse()
                .map_err(|_| format!("unknown record kind {kind:?}"))?;

            let mut options = ImportOptions::from_env();
            if strict_numbers {
                options.strict_numbers = true;
            }

            let bytes = std::fs::read(&file)?;
            let file_name = std::path::Path::new(&file)
                .file_name()
                .map_or_else(|| file.clone(), |n| n.to_string_lossy().into_owned());

            let summary =
                import_file(db_conn.as_ref(), kind, &file_name, &bytes, &options).await?;

            log::info!("Imported {} records", summary.records_imported);
            for skip in &summary.skipped {
                log::warn!("Skipped row {}: {}", skip.line, skip.reason);
            }
        }
        Commands::Backfill {
            from_year,
            to_year,
            decay,
        } => {
            let inserted = backfill_year(db_conn.as_ref(), from_year, to_year, decay).await?;
            log::info!("Backfilled {inserted} records for {to_year}");
        }
        Commands::Seed => {
            seed::seed(db_conn.as_ref()).await?;
        }
        Commands::Migrate => {
            log::info!("Migrations are up to date");
        }
    }

    Ok(())
}
