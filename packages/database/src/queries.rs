//! Database query functions for census data.
//!
//! Name lookups used by the import reconciler are case-sensitive exact
//! matches, and community lookups are always scoped to a municipality —
//! never global. Uniqueness guarantees (`(name, state)`,
//! `(name, municipality_id)`, `(community_id, reference_year)`) are
//! enforced by `ON CONFLICT` clauses against the schema's unique indexes.

use chrono::{DateTime, Utc};
use fishcensus_analytics_models::{CommunityCensus, CommunityMotivation};
use fishcensus_models::{
    CensusRecord, Community, DemographicRecord, FishingEnvironment, ImportStatus, Locality,
    Municipality, RecordKind,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

fn conversion(context: &str, e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: format!("{context}: {e}"),
    }
}

fn municipality_from_row(row: &switchy_database::Row) -> Result<Municipality, DbError> {
    Ok(Municipality {
        id: row
            .to_value("id")
            .map_err(|e| conversion("municipality id", e))?,
        name: row.to_value("name").unwrap_or_default(),
        state: row.to_value("state").unwrap_or_default(),
    })
}

fn community_from_row(row: &switchy_database::Row) -> Result<Community, DbError> {
    Ok(Community {
        id: row
            .to_value("id")
            .map_err(|e| conversion("community id", e))?,
        name: row.to_value("name").unwrap_or_default(),
        municipality_id: row
            .to_value("municipality_id")
            .map_err(|e| conversion("community municipality_id", e))?,
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        motivations: row.to_value("motivations").unwrap_or(None),
    })
}

fn census_from_row(row: &switchy_database::Row) -> Result<CensusRecord, DbError> {
    Ok(CensusRecord {
        id: row.to_value("id").map_err(|e| conversion("census id", e))?,
        community_id: row
            .to_value("community_id")
            .map_err(|e| conversion("census community_id", e))?,
        reference_year: row
            .to_value("reference_year")
            .map_err(|e| conversion("census reference_year", e))?,
        people: row.to_value("people").unwrap_or(0),
        families: row.to_value("families").unwrap_or(0),
        fishermen: row.to_value("fishermen").unwrap_or(0),
        data_source_id: row.to_value("data_source_id").unwrap_or(None),
    })
}

fn environment_from_row(row: &switchy_database::Row) -> Result<FishingEnvironment, DbError> {
    Ok(FishingEnvironment {
        id: row
            .to_value("id")
            .map_err(|e| conversion("environment id", e))?,
        name: row.to_value("name").unwrap_or_default(),
        description: row.to_value("description").unwrap_or(None),
    })
}

/// Inserts or retrieves the ID for a municipality, unique by
/// `(name, state)`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_municipality(
    db: &dyn Database,
    name: &str,
    state: &str,
) -> Result<i32, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO municipalities (name, state)
             VALUES ($1, $2)
             ON CONFLICT (name, state) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
            &[
                DatabaseValue::String(name.to_string()),
                DatabaseValue::String(state.to_string()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get municipality id from upsert".to_string(),
    })?;

    row.to_value("id")
        .map_err(|e| conversion("municipality upsert id", e))
}

/// Looks up a municipality by exact, case-sensitive name.
///
/// Import files rarely carry the state, so the match is by name alone;
/// the schema still keeps `(name, state)` unique.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_municipality_by_name(
    db: &dyn Database,
    name: &str,
) -> Result<Option<Municipality>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, state FROM municipalities WHERE name = $1",
            &[DatabaseValue::String(name.to_string())],
        )
        .await?;

    rows.first().map(municipality_from_row).transpose()
}

/// Fetches one municipality by ID.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_municipality(db: &dyn Database, id: i32) -> Result<Option<Municipality>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, state FROM municipalities WHERE id = $1",
            &[DatabaseValue::Int32(id)],
        )
        .await?;

    rows.first().map(municipality_from_row).transpose()
}

/// Lists all municipalities sorted by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_municipalities(db: &dyn Database) -> Result<Vec<Municipality>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, state FROM municipalities ORDER BY name",
            &[],
        )
        .await?;

    rows.iter().map(municipality_from_row).collect()
}

/// Inserts or retrieves the ID for a community, unique by
/// `(name, municipality_id)`. Coordinates are only written on first
/// insert; an existing community keeps its location.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_community(
    db: &dyn Database,
    name: &str,
    municipality_id: i32,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<i32, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO communities (name, municipality_id, latitude, longitude)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (name, municipality_id) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
            &[
                DatabaseValue::String(name.to_string()),
                DatabaseValue::Int32(municipality_id),
                latitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
                longitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get community id from upsert".to_string(),
    })?;

    row.to_value("id")
        .map_err(|e| conversion("community upsert id", e))
}

/// Looks up a community by exact, case-sensitive name within one
/// municipality.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_community(
    db: &dyn Database,
    municipality_id: i32,
    name: &str,
) -> Result<Option<Community>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, municipality_id, latitude, longitude, motivations
             FROM communities
             WHERE municipality_id = $1 AND name = $2",
            &[
                DatabaseValue::Int32(municipality_id),
                DatabaseValue::String(name.to_string()),
            ],
        )
        .await?;

    rows.first().map(community_from_row).transpose()
}

/// Fetches one community by ID.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_community(db: &dyn Database, id: i32) -> Result<Option<Community>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, municipality_id, latitude, longitude, motivations
             FROM communities WHERE id = $1",
            &[DatabaseValue::Int32(id)],
        )
        .await?;

    rows.first().map(community_from_row).transpose()
}

/// Lists the communities of one municipality sorted by name.
///
/// Callers should check the municipality exists first (via
/// [`get_municipality`]) to distinguish "not found" from "no communities
/// yet".
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_communities(
    db: &dyn Database,
    municipality_id: i32,
) -> Result<Vec<Community>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, municipality_id, latitude, longitude, motivations
             FROM communities
             WHERE municipality_id = $1
             ORDER BY name",
            &[DatabaseValue::Int32(municipality_id)],
        )
        .await?;

    rows.iter().map(community_from_row).collect()
}

/// Inserts a census record for `(community, year)` unless that year
/// already exists — re-imports never duplicate or overwrite a year.
///
/// Returns the number of rows actually inserted (0 or 1).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_census_record(
    db: &dyn Database,
    community_id: i32,
    reference_year: i32,
    people: i64,
    families: i64,
    fishermen: i64,
    data_source_id: Option<i32>,
) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "INSERT INTO census_records
                (community_id, reference_year, people, families, fishermen, data_source_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (community_id, reference_year) DO NOTHING",
            &[
                DatabaseValue::Int32(community_id),
                DatabaseValue::Int32(reference_year),
                DatabaseValue::Int64(people),
                DatabaseValue::Int64(families),
                DatabaseValue::Int64(fishermen),
                data_source_id.map_or(DatabaseValue::Null, DatabaseValue::Int32),
            ],
        )
        .await?;

    Ok(affected)
}

/// Fetches a community's census records ordered strictly ascending by
/// year.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn census_time_series(
    db: &dyn Database,
    community_id: i32,
) -> Result<Vec<CensusRecord>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, community_id, reference_year, people, families, fishermen, data_source_id
             FROM census_records
             WHERE community_id = $1
             ORDER BY reference_year ASC",
            &[DatabaseValue::Int32(community_id)],
        )
        .await?;

    rows.iter().map(census_from_row).collect()
}

/// Fetches every community's census record for one reference year.
/// Input for the historical backfill.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn census_for_year(
    db: &dyn Database,
    reference_year: i32,
) -> Result<Vec<CensusRecord>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, community_id, reference_year, people, families, fishermen, data_source_id
             FROM census_records
             WHERE reference_year = $1
             ORDER BY community_id",
            &[DatabaseValue::Int32(reference_year)],
        )
        .await?;

    rows.iter().map(census_from_row).collect()
}

/// Fetches a community's most recent census record, if any.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn latest_census(
    db: &dyn Database,
    community_id: i32,
) -> Result<Option<CensusRecord>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, community_id, reference_year, people, families, fishermen, data_source_id
             FROM census_records
             WHERE community_id = $1
             ORDER BY reference_year DESC
             LIMIT 1",
            &[DatabaseValue::Int32(community_id)],
        )
        .await?;

    rows.first().map(census_from_row).transpose()
}

/// Flattens each community's latest census with its names, optionally
/// scoped to one municipality. Input for the rollup aggregation.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn latest_census_by_community(
    db: &dyn Database,
    municipality_id: Option<i32>,
) -> Result<Vec<CommunityCensus>, DbError> {
    let (filter, params) = municipality_id.map_or_else(
        || (String::new(), Vec::new()),
        |id| (
            "WHERE c.municipality_id = $1".to_string(),
            vec![DatabaseValue::Int32(id)],
        ),
    );

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT DISTINCT ON (c.id)
                    m.name AS municipality, c.name AS community,
                    cr.people, cr.families, cr.fishermen
                 FROM communities c
                 JOIN municipalities m ON m.id = c.municipality_id
                 JOIN census_records cr ON cr.community_id = c.id
                 {filter}
                 ORDER BY c.id, cr.reference_year DESC"
            ),
            &params,
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| CommunityCensus {
            municipality: row.to_value("municipality").unwrap_or_default(),
            community: row.to_value("community").unwrap_or_default(),
            people: row.to_value("people").unwrap_or(0),
            families: row.to_value("families").unwrap_or(0),
            fishermen: row.to_value("fishermen").unwrap_or(0),
        })
        .collect())
}

/// Pairs each community's motivation blob with its latest fisherman
/// count. Input for the motivation aggregation.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn community_motivations(db: &dyn Database) -> Result<Vec<CommunityMotivation>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT DISTINCT ON (c.id)
                c.name AS community, c.motivations, cr.fishermen
             FROM communities c
             JOIN census_records cr ON cr.community_id = c.id
             WHERE c.motivations IS NOT NULL
             ORDER BY c.id, cr.reference_year DESC",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| CommunityMotivation {
            community: row.to_value("community").unwrap_or_default(),
            fishermen: row.to_value("fishermen").unwrap_or(0),
            motivations: row.to_value("motivations").unwrap_or(None),
        })
        .collect())
}

/// Inserts a locality unless `(name, community_id)` already exists.
/// Returns the number of rows actually inserted (0 or 1).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_locality(
    db: &dyn Database,
    name: &str,
    community_id: i32,
) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "INSERT INTO localities (name, community_id)
             VALUES ($1, $2)
             ON CONFLICT (name, community_id) DO NOTHING",
            &[
                DatabaseValue::String(name.to_string()),
                DatabaseValue::Int32(community_id),
            ],
        )
        .await?;

    Ok(affected)
}

/// Lists a community's localities sorted by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_localities(db: &dyn Database, community_id: i32) -> Result<Vec<Locality>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, community_id FROM localities
             WHERE community_id = $1 ORDER BY name",
            &[DatabaseValue::Int32(community_id)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(Locality {
                id: row.to_value("id").map_err(|e| conversion("locality id", e))?,
                name: row.to_value("name").unwrap_or_default(),
                community_id: row
                    .to_value("community_id")
                    .map_err(|e| conversion("locality community_id", e))?,
            })
        })
        .collect()
}

/// Inserts one sparse demographic row for a community.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_demographic(
    db: &dyn Database,
    community_id: i32,
    record: &DemographicInsert<'_>,
) -> Result<u64, DbError> {
    let optional = |v: Option<&str>| {
        v.map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.to_string()))
    };

    let affected = db
        .exec_raw_params(
            "INSERT INTO demographic_records
                (community_id, age_bracket, gender, ethnicity, occupation, monthly_income, count)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                DatabaseValue::Int32(community_id),
                optional(record.age_bracket),
                optional(record.gender),
                optional(record.ethnicity),
                optional(record.occupation),
                optional(record.monthly_income),
                DatabaseValue::Int64(record.count),
            ],
        )
        .await?;

    Ok(affected)
}

/// Field set for one demographic insert. Any `None` stays NULL in the
/// store so aggregations can exclude it instead of bucketing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemographicInsert<'a> {
    /// Age bracket label.
    pub age_bracket: Option<&'a str>,
    /// Gender label.
    pub gender: Option<&'a str>,
    /// Ethnicity label.
    pub ethnicity: Option<&'a str>,
    /// Occupation label.
    pub occupation: Option<&'a str>,
    /// Monthly income bracket label.
    pub monthly_income: Option<&'a str>,
    /// People counted in this bucket.
    pub count: i64,
}

/// Lists a community's demographic rows.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn demographics_for_community(
    db: &dyn Database,
    community_id: i32,
) -> Result<Vec<DemographicRecord>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, community_id, age_bracket, gender, ethnicity, occupation,
                    monthly_income, count
             FROM demographic_records
             WHERE community_id = $1
             ORDER BY id",
            &[DatabaseValue::Int32(community_id)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(DemographicRecord {
                id: row
                    .to_value("id")
                    .map_err(|e| conversion("demographic id", e))?,
                community_id: row
                    .to_value("community_id")
                    .map_err(|e| conversion("demographic community_id", e))?,
                age_bracket: row.to_value("age_bracket").unwrap_or(None),
                gender: row.to_value("gender").unwrap_or(None),
                ethnicity: row.to_value("ethnicity").unwrap_or(None),
                occupation: row.to_value("occupation").unwrap_or(None),
                monthly_income: row.to_value("monthly_income").unwrap_or(None),
                count: row.to_value("count").unwrap_or(0),
            })
        })
        .collect()
}

/// Lists all fishing environments sorted by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_environments(db: &dyn Database) -> Result<Vec<FishingEnvironment>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, description FROM fishing_environments ORDER BY name",
            &[],
        )
        .await?;

    rows.iter().map(environment_from_row).collect()
}

/// Creates (or re-reads, on a name conflict) a fishing environment.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn create_environment(
    db: &dyn Database,
    name: &str,
    description: Option<&str>,
) -> Result<FishingEnvironment, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO fishing_environments (name, description)
             VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
             RETURNING id, name, description",
            &[
                DatabaseValue::String(name.to_string()),
                description.map_or(DatabaseValue::Null, |d| DatabaseValue::String(d.to_string())),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to read environment back from upsert".to_string(),
    })?;

    environment_from_row(row)
}

/// Links a community to a fishing environment (idempotent).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn link_environment(
    db: &dyn Database,
    community_id: i32,
    environment_id: i32,
) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "INSERT INTO community_environments (community_id, environment_id)
             VALUES ($1, $2)
             ON CONFLICT (community_id, environment_id) DO NOTHING",
            &[
                DatabaseValue::Int32(community_id),
                DatabaseValue::Int32(environment_id),
            ],
        )
        .await?;

    Ok(affected)
}

/// Lists the fishing environments linked to one community.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn environments_for_community(
    db: &dyn Database,
    community_id: i32,
) -> Result<Vec<FishingEnvironment>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT e.id, e.name, e.description
             FROM fishing_environments e
             JOIN community_environments ce ON ce.environment_id = e.id
             WHERE ce.community_id = $1
             ORDER BY e.name",
            &[DatabaseValue::Int32(community_id)],
        )
        .await?;

    rows.iter().map(environment_from_row).collect()
}

/// Inserts or retrieves the ID for a data source by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_data_source(db: &dyn Database, name: &str) -> Result<i32, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO data_sources (name)
             VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
            &[DatabaseValue::String(name.to_string())],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get data source id from upsert".to_string(),
    })?;

    row.to_value("id")
        .map_err(|e| conversion("data source upsert id", e))
}

/// Creates an import log in the `PROCESSING` state and returns its ID.
///
/// Created outside the import transaction so the provenance row survives
/// a rollback.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn create_import_log(
    db: &dyn Database,
    data_source_id: Option<i32>,
    kind: RecordKind,
    file_name: &str,
) -> Result<i32, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO import_logs
                (data_source_id, record_kind, file_name, status, records_imported, started_at)
             VALUES ($1, $2, $3, $4, 0, NOW())
             RETURNING id",
            &[
                data_source_id.map_or(DatabaseValue::Null, DatabaseValue::Int32),
                DatabaseValue::String(kind.to_string()),
                DatabaseValue::String(file_name.to_string()),
                DatabaseValue::String(ImportStatus::Processing.to_string()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get import log id".to_string(),
    })?;

    row.to_value("id")
        .map_err(|e| conversion("import log id", e))
}

/// Transitions an import log `PROCESSING → COMPLETED` with its final
/// count.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn mark_import_completed(
    db: &dyn Database,
    log_id: i32,
    records_imported: i64,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE import_logs
         SET status = $2, records_imported = $3, finished_at = NOW()
         WHERE id = $1",
        &[
            DatabaseValue::Int32(log_id),
            DatabaseValue::String(ImportStatus::Completed.to_string()),
            DatabaseValue::Int64(records_imported),
        ],
    )
    .await?;

    Ok(())
}

/// Transitions an import log `PROCESSING → FAILED` with the captured
/// error text.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn mark_import_failed(
    db: &dyn Database,
    log_id: i32,
    error_message: &str,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE import_logs
         SET status = $2, error_message = $3, finished_at = NOW()
         WHERE id = $1",
        &[
            DatabaseValue::Int32(log_id),
            DatabaseValue::String(ImportStatus::Failed.to_string()),
            DatabaseValue::String(error_message.to_string()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches one import log's status and counts, mainly for operational
/// inspection after an upload.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_import_log(
    db: &dyn Database,
    log_id: i32,
) -> Result<Option<fishcensus_models::ImportLog>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, data_source_id, record_kind, file_name, status, error_message,
                    records_imported, started_at, finished_at
             FROM import_logs WHERE id = $1",
            &[DatabaseValue::Int32(log_id)],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let record_kind: String = row.to_value("record_kind").unwrap_or_default();
    let status: String = row.to_value("status").unwrap_or_default();
    let started_at: chrono::NaiveDateTime = row
        .to_value("started_at")
        .map_err(|e| conversion("import log started_at", e))?;
    let finished_at: Option<chrono::NaiveDateTime> =
        row.to_value("finished_at").unwrap_or(None);

    Ok(Some(fishcensus_models::ImportLog {
        id: row.to_value("id").map_err(|e| conversion("import log id", e))?,
        data_source_id: row.to_value("data_source_id").unwrap_or(None),
        record_kind: record_kind
            .parse()
            .map_err(|e| conversion("import log record_kind", e))?,
        file_name: row.to_value("file_name").unwrap_or_default(),
        status: status
            .parse()
            .map_err(|e| conversion("import log status", e))?,
        error_message: row.to_value("error_message").unwrap_or(None),
        records_imported: row.to_value("records_imported").unwrap_or(0),
        started_at: DateTime::<Utc>::from_naive_utc_and_offset(started_at, Utc),
        finished_at: finished_at.map(|n| DateTime::<Utc>::from_naive_utc_and_offset(n, Utc)),
    }))
}
