#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet and PDF report formatting for census entities.
//!
//! Consumes fully-resolved report inputs (the server assembles them from
//! the store) and renders workbook/PDF bytes. Derived figures come from
//! `fishcensus_analytics` — this crate never does its own percentage
//! arithmetic. Empty demographic sets omit the optional sheet/section
//! instead of failing.

pub mod pdf;
pub mod spreadsheet;

use fishcensus_models::{CensusRecord, Community, DemographicRecord, FishingEnvironment};

/// Errors that can occur while rendering an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Workbook construction or serialization failed.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// PDF construction or serialization failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// Everything needed to render one community's export.
#[derive(Debug, Clone)]
pub struct CommunityReport {
    /// The community itself.
    pub community: Community,
    /// Owning municipality name.
    pub municipality: String,
    /// Most recent census record, if any exists.
    pub latest_census: Option<CensusRecord>,
    /// Demographic rows; may be empty.
    pub demographics: Vec<DemographicRecord>,
    /// Linked fishing environments; may be empty.
    pub environments: Vec<FishingEnvironment>,
}

/// Label/value pairs for the community overview, shared by the
/// spreadsheet and PDF renderers.
#[must_use]
pub fn overview_rows(report: &CommunityReport) -> Vec<(String, String)> {
    let mut rows = vec![
        ("Community".to_string(), report.community.name.clone()),
        ("Municipality".to_string(), report.municipality.clone()),
    ];

    let coordinates = match (report.community.latitude, report.community.longitude) {
        (Some(lat), Some(lng)) => format!("{lat:.4}, {lng:.4}"),
        _ => "not mapped".to_string(),
    };
    rows.push(("Coordinates".to_string(), coordinates));

    if !report.environments.is_empty() {
        let names: Vec<&str> = report
            .environments
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        rows.push(("Fishing environments".to_string(), names.join(", ")));
    }

    if let Some(census) = &report.latest_census {
        rows.push((
            "Census year".to_string(),
            census.reference_year.to_string(),
        ));
        rows.push(("People".to_string(), census.people.to_string()));
        rows.push(("Families".to_string(), census.families.to_string()));
        rows.push(("Fishermen".to_string(), census.fishermen.to_string()));
        rows.push((
            "Fisherman percentage".to_string(),
            format!(
                "{:.1}%",
                fishcensus_analytics::percentage(census.fishermen, census.people)
            ),
        ));
        rows.push((
            "Average family size".to_string(),
            format!(
                "{:.1}",
                fishcensus_analytics::average_family_size(census.people, census.families)
            ),
        ));
    } else {
        rows.push(("Census data".to_string(), "none recorded".to_string()));
    }

    rows
}

/// Flattens one demographic record into display cells, `""` for absent
/// fields.
#[must_use]
pub fn demographic_cells(record: &DemographicRecord) -> [String; 6] {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        text(&record.age_bracket),
        text(&record.gender),
        text(&record.ethnicity),
        text(&record.occupation),
        text(&record.monthly_income),
        record.count.to_string(),
    ]
}

/// Column headers for the demographics sheet/section.
pub const DEMOGRAPHIC_HEADERS: [&str; 6] = [
    "Age bracket",
    "Gender",
    "Ethnicity",
    "Occupation",
    "Monthly income",
    "Count",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn report(latitude: Option<f64>, census: Option<CensusRecord>) -> CommunityReport {
        CommunityReport {
            community: Community {
                id: 1,
                name: "Atafona".to_string(),
                municipality_id: 1,
                latitude,
                longitude: latitude.map(|_| -41.0076),
                motivations: None,
            },
            municipality: "São João da Barra".to_string(),
            latest_census: census,
            demographics: Vec::new(),
            environments: Vec::new(),
        }
    }

    fn census() -> CensusRecord {
        CensusRecord {
            id: 1,
            community_id: 1,
            reference_year: 2020,
            people: 1340,
            families: 412,
            fishermen: 507,
            data_source_id: None,
        }
    }

    #[test]
    fn overview_includes_derived_percentage() {
        let rows = overview_rows(&report(Some(-21.6186), Some(census())));
        let percentage = rows
            .iter()
            .find(|(label, _)| label == "Fisherman percentage")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert_eq!(percentage, "37.8%");
    }

    #[test]
    fn missing_coordinates_render_as_not_mapped() {
        let rows = overview_rows(&report(None, None));
        let coordinates = rows
            .iter()
            .find(|(label, _)| label == "Coordinates")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert_eq!(coordinates, "not mapped");
    }

    #[test]
    fn missing_census_renders_placeholder_not_zeroes() {
        let rows = overview_rows(&report(None, None));
        assert!(rows.iter().any(|(label, _)| label == "Census data"));
        assert!(!rows.iter().any(|(label, _)| label == "People"));
    }

    #[test]
    fn demographic_cells_leave_absent_fields_blank() {
        let record = DemographicRecord {
            id: 1,
            community_id: 1,
            age_bracket: Some("18-29".to_string()),
            gender: None,
            ethnicity: None,
            occupation: Some("Fisherman".to_string()),
            monthly_income: None,
            count: 12,
        };
        let cells = demographic_cells(&record);
        assert_eq!(cells[0], "18-29");
        assert_eq!(cells[1], "");
        assert_eq!(cells[3], "Fisherman");
        assert_eq!(cells[5], "12");
    }
}
