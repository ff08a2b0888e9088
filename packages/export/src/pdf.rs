//! PDF report rendering.

use chrono::Utc;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::{CommunityReport, DEMOGRAPHIC_HEADERS, ExportError, demographic_cells, overview_rows};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const LINE_HEIGHT_MM: f32 = 7.0;
const BODY_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 16.0;

struct PageWriter<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    /// Writes one visual line made of `(x, text, font)` cells, breaking
    /// to a fresh page first if the cursor has reached the bottom
    /// margin.
    fn row(&mut self, size: f32, cells: &[(f32, &str, &IndirectFontRef)]) {
        if self.y < MARGIN_MM + LINE_HEIGHT_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        for (x, text, font) in cells {
            self.layer.use_text(*text, size, Mm(*x), Mm(self.y), font);
        }
        self.y -= LINE_HEIGHT_MM;
    }

    fn skip(&mut self, lines: f32) {
        self.y -= LINE_HEIGHT_MM * lines;
    }
}

/// Renders a community report as a single PDF document: an overview
/// section, a demographics table when rows exist, and a generation
/// timestamp footer. Empty demographics produce a shorter document, not
/// an error.
///
/// # Errors
///
/// Returns [`ExportError`] if document construction fails.
#[allow(clippy::cast_precision_loss)]
pub fn community_report_pdf(report: &CommunityReport) -> Result<Vec<u8>, ExportError> {
    let title = format!("{} census report", report.community.name);
    let (doc, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    writer.row(HEADING_SIZE, &[(MARGIN_MM, title.as_str(), &bold)]);
    writer.skip(0.5);

    for (label, value) in overview_rows(report) {
        writer.row(
            BODY_SIZE,
            &[
                (MARGIN_MM, label.as_str(), &bold),
                (MARGIN_MM + 60.0, value.as_str(), &regular),
            ],
        );
    }

    if !report.demographics.is_empty() {
        writer.skip(1.0);
        writer.row(12.0, &[(MARGIN_MM, "Demographics", &bold)]);

        let column_width = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / DEMOGRAPHIC_HEADERS.len() as f32;
        let header_cells: Vec<(f32, &str, &IndirectFontRef)> = DEMOGRAPHIC_HEADERS
            .iter()
            .enumerate()
            .map(|(col, header)| (MARGIN_MM + col as f32 * column_width, *header, &bold))
            .collect();
        writer.row(BODY_SIZE, &header_cells);

        for record in &report.demographics {
            let cells = demographic_cells(record);
            let row_cells: Vec<(f32, &str, &IndirectFontRef)> = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| (MARGIN_MM + col as f32 * column_width, cell.as_str(), &regular))
                .collect();
            writer.row(BODY_SIZE, &row_cells);
        }
    }

    writer.skip(2.0);
    let footer = format!("Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    writer.row(8.0, &[(MARGIN_MM, footer.as_str(), &regular)]);

    Ok(doc.save_to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishcensus_models::{CensusRecord, Community, DemographicRecord};

    fn report(demographics: Vec<DemographicRecord>) -> CommunityReport {
        CommunityReport {
            community: Community {
                id: 1,
                name: "Barra do Furado".to_string(),
                municipality_id: 1,
                latitude: None,
                longitude: None,
                motivations: None,
            },
            municipality: "Quissamã".to_string(),
            latest_census: Some(CensusRecord {
                id: 1,
                community_id: 1,
                reference_year: 2019,
                people: 410,
                families: 120,
                fishermen: 188,
                data_source_id: None,
            }),
            demographics,
            environments: Vec::new(),
        }
    }

    #[test]
    fn report_renders_without_demographics() {
        let bytes = community_report_pdf(&report(Vec::new())).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn report_paginates_large_demographic_tables() {
        let rows = (0..80)
            .map(|i| DemographicRecord {
                id: i,
                community_id: 1,
                age_bracket: Some(format!("bracket {i}")),
                gender: None,
                ethnicity: None,
                occupation: None,
                monthly_income: None,
                count: i64::from(i),
            })
            .collect();
        let bytes = community_report_pdf(&report(rows)).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
        // 80 rows cannot fit on one A4 page at this line height.
        assert!(bytes.len() > community_report_pdf(&report(Vec::new())).unwrap().len());
    }
}
