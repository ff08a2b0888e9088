#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Input and result types for the census aggregation engine.
//!
//! The aggregation engine is pure: it operates on already-loaded entity
//! sets. These types are the flattened shapes the store layer produces for
//! it and the summaries it hands back to the API and export layers.

use serde::{Deserialize, Serialize};

/// A community's latest census counts, flattened with its names.
///
/// The store layer resolves "latest" (most-recent `reference_year` per
/// community) before handing rows to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityCensus {
    /// Owning municipality name.
    pub municipality: String,
    /// Community name.
    pub community: String,
    /// Total people in the latest census.
    pub people: i64,
    /// Total families in the latest census.
    pub families: i64,
    /// Total fishermen in the latest census.
    pub fishermen: i64,
}

/// Rollup of one municipality's communities.
///
/// Carries raw totals only. Percentage fields are always computed by the
/// consumer via the engine's `percentage()` so there is exactly one source
/// of derived arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalitySummary {
    /// Municipality name.
    pub municipality: String,
    /// Number of communities with at least one census record.
    pub community_count: u64,
    /// Sum of people over the latest census of each community.
    pub total_people: i64,
    /// Sum of fishermen over the latest census of each community.
    pub total_fishermen: i64,
    /// Sum of families over the latest census of each community.
    pub total_families: i64,
}

/// Ordinary-least-squares regression over a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Y-intercept of the fitted line.
    pub intercept: f64,
    /// Coefficient of determination (squared Pearson correlation).
    pub r_squared: f64,
}

/// One equal-width histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Inclusive lower bound.
    pub lower: f64,
    /// Upper bound; exclusive except for the final bin.
    pub upper: f64,
    /// Number of values that fell in this bin.
    pub count: u64,
}

/// A community's raw motivation blob paired with its fisherman count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMotivation {
    /// Community name (used only for skip warnings).
    pub community: String,
    /// Fisherman count used to weight the community's percentages.
    pub fishermen: i64,
    /// Raw JSON blob of motivation-category → percentage.
    pub motivations: Option<String>,
}

/// A canonical motivation bucket with its summed, fisherman-weighted
/// contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivationBucket {
    /// Canonical motivation label.
    pub label: String,
    /// Sum of `percentage × fishermen` contributions.
    pub weight: f64,
}
