#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Core entity types for the fishing-communities census.
//!
//! These types mirror the relational schema: municipalities own
//! communities, communities accumulate yearly census records, localities,
//! demographic rows, and fishing-environment tags. Derived metrics
//! (fisherman percentage, family averages, rollups) are never stored on
//! these types — they are recomputed on read by `fishcensus_analytics`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A top-level administrative region grouping communities.
///
/// Unique by `(name, state)`. Never deleted by the normal flow — child
/// communities reference it and deletion would cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Municipality {
    /// Unique municipality ID.
    pub id: i32,
    /// Municipality name (e.g. "São João da Barra").
    pub name: String,
    /// Two-letter state abbreviation (e.g. "RJ").
    pub state: String,
}

/// A fishing settlement within a municipality; the primary subject of
/// census data.
///
/// Unique by `(name, municipality_id)`. Coordinates are optional — a
/// community without a mapped location carries `None`, never `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    /// Unique community ID.
    pub id: i32,
    /// Community name (e.g. "Atafona").
    pub name: String,
    /// Owning municipality.
    pub municipality_id: i32,
    /// Latitude, if the community has been geolocated.
    pub latitude: Option<f64>,
    /// Longitude, if the community has been geolocated.
    pub longitude: Option<f64>,
    /// Raw JSON blob of motivation-category → percentage, as collected in
    /// the field. Parsed and canonicalized by the aggregation engine.
    pub motivations: Option<String>,
}

/// One year's demographic/economic counts for a community.
///
/// Unique by `(community_id, reference_year)` — re-importing a year never
/// duplicates it. A community may have zero, one, or many records across
/// years; consumers must tolerate all three shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusRecord {
    /// Unique record ID.
    pub id: i32,
    /// The community this census covers.
    pub community_id: i32,
    /// Census reference year (e.g. 2020).
    pub reference_year: i32,
    /// Total people counted.
    pub people: i64,
    /// Total families counted.
    pub families: i64,
    /// Total fishermen counted.
    pub fishermen: i64,
    /// Provenance: which bulk import produced this row.
    pub data_source_id: Option<i32>,
}

/// A named sub-area within a community. Many per community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    /// Unique locality ID.
    pub id: i32,
    /// Locality name.
    pub name: String,
    /// The community this locality belongs to.
    pub community_id: i32,
}

/// A sparse demographic breakdown row for a community.
///
/// Any optional field may be `None`; a `None` field excludes the row from
/// the corresponding aggregation rather than defaulting it into a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicRecord {
    /// Unique row ID.
    pub id: i32,
    /// The community this row describes.
    pub community_id: i32,
    /// Age bracket label (e.g. "18-29").
    pub age_bracket: Option<String>,
    /// Gender label.
    pub gender: Option<String>,
    /// Ethnicity label.
    pub ethnicity: Option<String>,
    /// Occupation label.
    pub occupation: Option<String>,
    /// Monthly income bracket label.
    pub monthly_income: Option<String>,
    /// Number of people in this bucket.
    pub count: i64,
}

/// A tag describing a type of fishing habitat/activity, linked
/// many-to-many with communities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishingEnvironment {
    /// Unique environment ID.
    pub id: i32,
    /// Environment name (e.g. "Estuary").
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Provenance: a named origin of bulk-imported data (usually a file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    /// Unique data source ID.
    pub id: i32,
    /// Source name (typically the uploaded file name).
    pub name: String,
}

/// Lifecycle status of a bulk import.
///
/// The only entity with a state machine: `Processing → Completed` or
/// `Processing → Failed`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    /// The import transaction is still running.
    Processing,
    /// All rows committed; `records_imported` is final.
    Completed,
    /// The transaction was rolled back; `error_message` holds the cause.
    Failed,
}

/// The kind of tabular records a bulk import file contains.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RecordKind {
    /// Demographic breakdown rows per community.
    Demographics,
    /// Locality (sub-area) names per community.
    Localities,
    /// One census year of people/families/fishermen counts per community.
    CensusYear,
}

/// Provenance record of a bulk data import attempt and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLog {
    /// Unique log ID.
    pub id: i32,
    /// The data source this import fed, if one was registered.
    pub data_source_id: Option<i32>,
    /// What kind of records the file contained.
    pub record_kind: RecordKind,
    /// Uploaded file name.
    pub file_name: String,
    /// Current lifecycle status.
    pub status: ImportStatus,
    /// Captured error text when `status == Failed`.
    pub error_message: Option<String>,
    /// Number of rows committed (0 until `Completed`).
    pub records_imported: i64,
    /// When the import began.
    pub started_at: DateTime<Utc>,
    /// When the import reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_parses_kebab_case() {
        assert_eq!(
            "census-year".parse::<RecordKind>().unwrap(),
            RecordKind::CensusYear
        );
        assert_eq!(
            "demographics".parse::<RecordKind>().unwrap(),
            RecordKind::Demographics
        );
        assert_eq!(
            "localities".parse::<RecordKind>().unwrap(),
            RecordKind::Localities
        );
        assert!("census_year".parse::<RecordKind>().is_err());
    }

    #[test]
    fn import_status_round_trips_screaming_snake() {
        for status in [
            ImportStatus::Processing,
            ImportStatus::Completed,
            ImportStatus::Failed,
        ] {
            let text = status.to_string();
            assert_eq!(text.parse::<ImportStatus>().unwrap(), status);
            assert!(text.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }
}
