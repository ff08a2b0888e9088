//! XLSX workbook rendering.

use fishcensus_analytics_models::CommunityCensus;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::{CommunityReport, DEMOGRAPHIC_HEADERS, ExportError, demographic_cells, overview_rows};

fn header_format() -> Format {
    Format::new().set_bold()
}

fn write_label_value_sheet(
    sheet: &mut Worksheet,
    rows: &[(String, String)],
) -> Result<(), ExportError> {
    let bold = header_format();
    sheet.write_string_with_format(0, 0, "Field", &bold)?;
    sheet.write_string_with_format(0, 1, "Value", &bold)?;

    for (i, (label, value)) in rows.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, label)?;
        sheet.write_string(row, 1, value)?;
    }

    sheet.set_column_width(0, 24)?;
    sheet.set_column_width(1, 36)?;
    Ok(())
}

/// Renders a community workbook: a basic-info sheet plus a demographics
/// sheet that is omitted entirely when the community has no demographic
/// rows.
///
/// # Errors
///
/// Returns [`ExportError`] if workbook construction fails.
pub fn community_workbook(report: &CommunityReport) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Basic Info")?;
    write_label_value_sheet(sheet, &overview_rows(report))?;

    if !report.demographics.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Demographics")?;

        let bold = header_format();
        for (col, header) in DEMOGRAPHIC_HEADERS.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        for (i, record) in report.demographics.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let row = (i + 1) as u32;
            for (col, cell) in demographic_cells(record).iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                sheet.write_string(row, col as u16, cell)?;
            }
        }

        for col in 0..DEMOGRAPHIC_HEADERS.len() {
            #[allow(clippy::cast_possible_truncation)]
            sheet.set_column_width(col as u16, 18)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Renders a municipality rollup workbook: one row per community's
/// latest census plus a totals row, with the derived percentage column
/// computed by the aggregation engine.
///
/// # Errors
///
/// Returns [`ExportError`] if workbook construction fails.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn municipality_workbook(
    municipality: &str,
    communities: &[CommunityCensus],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;

    let bold = header_format();
    sheet.write_string_with_format(0, 0, municipality, &bold)?;

    let headers = ["Community", "People", "Families", "Fishermen", "Fishermen %"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(2, col as u16, *header, &bold)?;
    }

    let mut row = 3u32;
    for entry in communities {
        sheet.write_string(row, 0, &entry.community)?;
        sheet.write_number(row, 1, entry.people as f64)?;
        sheet.write_number(row, 2, entry.families as f64)?;
        sheet.write_number(row, 3, entry.fishermen as f64)?;
        sheet.write_number(
            row,
            4,
            fishcensus_analytics::percentage(entry.fishermen, entry.people),
        )?;
        row += 1;
    }

    let total_people: i64 = communities.iter().map(|c| c.people).sum();
    let total_families: i64 = communities.iter().map(|c| c.families).sum();
    let total_fishermen: i64 = communities.iter().map(|c| c.fishermen).sum();

    sheet.write_string_with_format(row, 0, "Total", &bold)?;
    sheet.write_number_with_format(row, 1, total_people as f64, &bold)?;
    sheet.write_number_with_format(row, 2, total_families as f64, &bold)?;
    sheet.write_number_with_format(row, 3, total_fishermen as f64, &bold)?;
    sheet.write_number_with_format(
        row,
        4,
        fishcensus_analytics::percentage(total_fishermen, total_people),
        &bold,
    )?;

    sheet.set_column_width(0, 28)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishcensus_models::{CensusRecord, Community, DemographicRecord};

    fn base_report() -> CommunityReport {
        CommunityReport {
            community: Community {
                id: 1,
                name: "Gargaú".to_string(),
                municipality_id: 1,
                latitude: Some(-21.5841),
                longitude: Some(-41.0389),
                motivations: None,
            },
            municipality: "São Francisco de Itabapoana".to_string(),
            latest_census: Some(CensusRecord {
                id: 1,
                community_id: 1,
                reference_year: 2020,
                people: 980,
                families: 295,
                fishermen: 388,
                data_source_id: None,
            }),
            demographics: Vec::new(),
            environments: Vec::new(),
        }
    }

    #[test]
    fn community_workbook_renders_without_demographics() {
        let bytes = community_workbook(&base_report()).unwrap();
        assert!(!bytes.is_empty());
        // XLSX files are ZIP archives.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn community_workbook_renders_with_demographics() {
        let mut report = base_report();
        report.demographics.push(DemographicRecord {
            id: 1,
            community_id: 1,
            age_bracket: Some("30-44".to_string()),
            gender: Some("F".to_string()),
            ethnicity: None,
            occupation: None,
            monthly_income: None,
            count: 41,
        });

        let with = community_workbook(&report).unwrap();
        let without = community_workbook(&base_report()).unwrap();
        assert!(!with.is_empty());
        // The extra sheet makes the archive strictly larger.
        assert!(with.len() > without.len());
    }

    #[test]
    fn municipality_workbook_renders_empty_rollup() {
        let bytes = municipality_workbook("Quissamã", &[]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
