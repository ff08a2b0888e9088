#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bulk import reconciler for the fishing census.
//!
//! Takes a tabular file plus a declared record kind, resolves each row's
//! parent entities by case-sensitive name lookup (community lookups are
//! scoped to the named municipality), and inserts the survivors inside
//! one transaction per file. Unresolvable or malformed rows are skipped
//! with a warning; any unexpected failure rolls the entire file back and
//! marks the provenance log `FAILED`. An `import_logs` row is created
//! before the transaction, so the provenance of a failed import survives
//! the rollback.

pub mod backfill;
pub mod parse;
pub mod seed;

use fishcensus_database::{DbError, queries};
use fishcensus_models::RecordKind;
use parse::{ParsedFile, ParsedRow};
use switchy_database::Database;

/// Errors that can occur during a bulk import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Store-level query error.
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// Raw database error (transaction begin/commit/rollback).
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// CSV structure could not be read at all.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O failed (CLI path).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file has no usable header row.
    #[error("File contains no header row")]
    EmptyFile,

    /// The seeding routine was invoked without its environment guard.
    #[error("Refusing to seed: set {guard}=1 to run the seeding routine", guard = seed::SEED_ENV)]
    SeedGuarded,
}

/// Numeric-coercion policy for an import.
///
/// The legacy loaders coerced blank/non-numeric counts to `0`; whether
/// that should instead reject the row is an open question upstream, so
/// the behavior is kept but switchable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// When set, blank or non-numeric numeric cells reject the row
    /// instead of coercing to `0`.
    pub strict_numbers: bool,
}

impl ImportOptions {
    /// Environment variable controlling [`Self::strict_numbers`].
    pub const STRICT_NUMBERS_ENV: &'static str = "FISHCENSUS_STRICT_NUMBERS";

    /// Reads the coercion policy from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let strict = std::env::var(Self::STRICT_NUMBERS_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self {
            strict_numbers: strict,
        }
    }
}

/// One row that did not make it into the store, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    /// 1-based data line number (excluding the header row).
    pub line: usize,
    /// Human-readable skip reason.
    pub reason: String,
}

/// Outcome of a committed import.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Provenance log row for this import, for later inspection.
    pub import_log_id: i32,
    /// Rows actually inserted (duplicates of existing census years do not
    /// count).
    pub records_imported: u64,
    /// Rows skipped during parsing or reconciliation.
    pub skipped: Vec<SkippedRow>,
}

/// Imports one tabular file of the declared kind.
///
/// All row inserts run in a single transaction. Skipped rows never abort
/// the file; an unexpected store failure rolls everything back, marks the
/// import log `FAILED` with the captured message, and surfaces the error.
///
/// # Errors
///
/// Returns [`ImportError`] if the file cannot be parsed at the structure
/// level or the transaction fails.
pub async fn import_file(
    db: &dyn Database,
    kind: RecordKind,
    file_name: &str,
    bytes: &[u8],
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    let data_source_id = queries::upsert_data_source(db, file_name).await?;
    let log_id = queries::create_import_log(db, Some(data_source_id), kind, file_name).await?;

    let parsed = match parse::parse_rows(kind, bytes, options) {
        Ok(parsed) => parsed,
        Err(e) => {
            queries::mark_import_failed(db, log_id, &e.to_string()).await?;
            return Err(e);
        }
    };

    match reconcile_rows(db, &parsed, data_source_id).await {
        Ok(mut summary) => {
            let mut skipped = parsed.skipped;
            skipped.append(&mut summary.skipped);
            skipped.sort_by_key(|s| s.line);

            #[allow(clippy::cast_possible_wrap)]
            queries::mark_import_completed(db, log_id, summary.records_imported as i64).await?;
            log::info!(
                "Import of {file_name} ({kind}) committed: {} inserted, {} skipped",
                summary.records_imported,
                skipped.len()
            );

            Ok(ImportSummary {
                import_log_id: log_id,
                records_imported: summary.records_imported,
                skipped,
            })
        }
        Err(e) => {
            log::error!("Import of {file_name} ({kind}) rolled back: {e}");
            queries::mark_import_failed(db, log_id, &e.to_string()).await?;
            Err(e)
        }
    }
}

/// Runs the per-file transaction: resolve and insert every parsed row,
/// commit on success, roll back on the first unexpected failure.
async fn reconcile_rows(
    db: &dyn Database,
    parsed: &ParsedFile,
    data_source_id: i32,
) -> Result<ImportSummary, ImportError> {
    let txn = db.begin_transaction().await?;

    let mut summary = ImportSummary::default();
    let mut failure: Option<ImportError> = None;

    for (line, row) in &parsed.rows {
        match insert_row(txn.as_ref(), *line, row, data_source_id, &mut summary.skipped).await {
            Ok(inserted) => summary.records_imported += inserted,
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if let Some(e) = failure {
        txn.rollback().await?;
        return Err(e);
    }

    txn.commit().await?;
    Ok(summary)
}

/// Resolves one row's parents and inserts it.
///
/// Returns the number of rows inserted (0 when the row is skipped or is
/// a duplicate census year). Only store failures propagate as errors.
async fn insert_row(
    db: &dyn Database,
    line: usize,
    row: &ParsedRow,
    data_source_id: i32,
    skipped: &mut Vec<SkippedRow>,
) -> Result<u64, ImportError> {
    let (municipality_name, community_name) = match row {
        ParsedRow::Census {
            municipality,
            community,
            ..
        }
        | ParsedRow::Locality {
            municipality,
            community,
            ..
        }
        | ParsedRow::Demographic {
            municipality,
            community,
            ..
        } => (municipality, community),
    };

    let Some(municipality) = queries::find_municipality_by_name(db, municipality_name).await?
    else {
        let reason = format!("unknown municipality {municipality_name:?}");
        log::warn!("Skipping row {line}: {reason}");
        skipped.push(SkippedRow { line, reason });
        return Ok(0);
    };

    let Some(community) = queries::find_community(db, municipality.id, community_name).await?
    else {
        let reason = format!(
            "unknown community {community_name:?} in municipality {municipality_name:?}"
        );
        log::warn!("Skipping row {line}: {reason}");
        skipped.push(SkippedRow { line, reason });
        return Ok(0);
    };

    match row {
        ParsedRow::Census {
            reference_year,
            people,
            families,
            fishermen,
            ..
        } => {
            let inserted = queries::insert_census_record(
                db,
                community.id,
                *reference_year,
                *people,
                *families,
                *fishermen,
                Some(data_source_id),
            )
            .await?;
            if inserted == 0 {
                log::debug!(
                    "Row {line}: census year {reference_year} already present for {}",
                    community.name
                );
            }
            Ok(inserted)
        }
        ParsedRow::Locality { name, .. } => {
            Ok(queries::insert_locality(db, name, community.id).await?)
        }
        ParsedRow::Demographic {
            age_bracket,
            gender,
            ethnicity,
            occupation,
            monthly_income,
            count,
            ..
        } => {
            let record = queries::DemographicInsert {
                age_bracket: age_bracket.as_deref(),
                gender: gender.as_deref(),
                ethnicity: ethnicity.as_deref(),
                occupation: occupation.as_deref(),
                monthly_income: monthly_income.as_deref(),
                count: *count,
            };
            Ok(queries::insert_demographic(db, community.id, &record).await?)
        }
    }
}
