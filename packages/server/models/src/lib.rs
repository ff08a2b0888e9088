#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the fish census server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract.

use fishcensus_analytics_models::MunicipalitySummary;
use fishcensus_models::{
    CensusRecord, Community, DemographicRecord, FishingEnvironment, Municipality,
};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server considers itself healthy.
    pub healthy: bool,
    /// Crate version of the running server.
    pub version: String,
}

/// A municipality as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMunicipality {
    /// Unique municipality ID.
    pub id: i32,
    /// Municipality name.
    pub name: String,
    /// State abbreviation.
    pub state: String,
}

impl From<Municipality> for ApiMunicipality {
    fn from(row: Municipality) -> Self {
        Self {
            id: row.id,
            name: row.name,
            state: row.state,
        }
    }
}

/// A fishing community as returned by listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommunity {
    /// Unique community ID.
    pub id: i32,
    /// Community name.
    pub name: String,
    /// Owning municipality ID.
    pub municipality_id: i32,
    /// Latitude, if the community has been mapped.
    pub latitude: Option<f64>,
    /// Longitude, if the community has been mapped.
    pub longitude: Option<f64>,
}

impl From<Community> for ApiCommunity {
    fn from(row: Community) -> Self {
        Self {
            id: row.id,
            name: row.name,
            municipality_id: row.municipality_id,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// A single community with its latest census figures and linked
/// environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommunityDetail {
    /// The community itself.
    #[serde(flatten)]
    pub community: ApiCommunity,
    /// Owning municipality name.
    pub municipality: String,
    /// Most recent census point, if any exists.
    pub latest_census: Option<ApiCensusPoint>,
    /// Named sub-areas of the community; may be empty.
    pub localities: Vec<String>,
    /// Demographic breakdown rows; may be empty.
    pub demographics: Vec<ApiDemographic>,
    /// Linked fishing environments.
    pub environments: Vec<ApiEnvironment>,
}

/// One demographic breakdown row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDemographic {
    /// Age bracket label, if recorded.
    pub age_bracket: Option<String>,
    /// Gender label, if recorded.
    pub gender: Option<String>,
    /// Ethnicity label, if recorded.
    pub ethnicity: Option<String>,
    /// Occupation label, if recorded.
    pub occupation: Option<String>,
    /// Monthly income band, if recorded.
    pub monthly_income: Option<String>,
    /// People in this bucket.
    pub count: i64,
}

impl From<DemographicRecord> for ApiDemographic {
    fn from(row: DemographicRecord) -> Self {
        Self {
            age_bracket: row.age_bracket,
            gender: row.gender,
            ethnicity: row.ethnicity,
            occupation: row.occupation,
            monthly_income: row.monthly_income,
            count: row.count,
        }
    }
}

/// One census observation with its derived figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCensusPoint {
    /// Reference year of the observation.
    pub reference_year: i32,
    /// Total resident count.
    pub people: i64,
    /// Family count.
    pub families: i64,
    /// Registered fishermen count.
    pub fishermen: i64,
    /// Fishermen as a percentage of residents.
    pub fisherman_percentage: f64,
    /// People per family.
    pub average_family_size: f64,
}

impl From<CensusRecord> for ApiCensusPoint {
    fn from(row: CensusRecord) -> Self {
        Self {
            reference_year: row.reference_year,
            people: row.people,
            families: row.families,
            fishermen: row.fishermen,
            fisherman_percentage: fishcensus_analytics::percentage(row.fishermen, row.people),
            average_family_size: fishcensus_analytics::average_family_size(
                row.people,
                row.families,
            ),
        }
    }
}

/// Per-municipality rollup as returned by the summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMunicipalitySummary {
    /// Municipality name.
    pub municipality: String,
    /// Number of communities with census data.
    pub community_count: u64,
    /// Sum of residents across communities.
    pub total_people: i64,
    /// Sum of families across communities.
    pub total_families: i64,
    /// Sum of fishermen across communities.
    pub total_fishermen: i64,
    /// Fishermen as a percentage of residents, across the rollup.
    pub fisherman_percentage: f64,
}

impl From<MunicipalitySummary> for ApiMunicipalitySummary {
    fn from(summary: MunicipalitySummary) -> Self {
        Self {
            fisherman_percentage: fishcensus_analytics::percentage(
                summary.total_fishermen,
                summary.total_people,
            ),
            municipality: summary.municipality,
            community_count: summary.community_count,
            total_people: summary.total_people,
            total_families: summary.total_families,
            total_fishermen: summary.total_fishermen,
        }
    }
}

/// A fishing environment as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvironment {
    /// Unique environment ID.
    pub id: i32,
    /// Environment name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl From<FishingEnvironment> for ApiEnvironment {
    fn from(row: FishingEnvironment) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

/// Request body for creating a fishing environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentRequest {
    /// Environment name; must be non-empty.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Request body for linking an environment to a community.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEnvironmentRequest {
    /// Environment to link.
    pub environment_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_point_carries_derived_figures() {
        let point = ApiCensusPoint::from(CensusRecord {
            id: 1,
            community_id: 1,
            reference_year: 2020,
            people: 200,
            families: 50,
            fishermen: 80,
            data_source_id: None,
        });
        assert!((point.fisherman_percentage - 40.0).abs() < f64::EPSILON);
        assert!((point.average_family_size - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn census_point_serializes_camel_case() {
        let point = ApiCensusPoint::from(CensusRecord {
            id: 1,
            community_id: 1,
            reference_year: 2020,
            people: 0,
            families: 0,
            fishermen: 0,
            data_source_id: None,
        });
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("fishermanPercentage").is_some());
        assert!(json.get("referenceYear").is_some());
    }
}
