//! Tabular file parsing for bulk imports.
//!
//! Field surveys arrive as loosely-structured CSVs: header names vary
//! between Portuguese and English, columns appear in any order, and
//! numeric cells are frequently blank. Parsing normalizes headers through
//! an alias table and classifies each data row as either a typed record
//! or a skipped row with a line number and reason. No I/O and no store
//! access happens here — resolution against the store is the
//! reconciler's job.

use std::collections::BTreeMap;

use fishcensus_models::RecordKind;

use crate::{ImportError, ImportOptions, SkippedRow};

/// A typed, validated row ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    /// One census year of counts for a community.
    Census {
        /// Municipality name as written in the file.
        municipality: String,
        /// Community name as written in the file.
        community: String,
        /// Census reference year.
        reference_year: i32,
        /// People counted.
        people: i64,
        /// Families counted.
        families: i64,
        /// Fishermen counted.
        fishermen: i64,
    },
    /// One locality name for a community.
    Locality {
        /// Municipality name as written in the file.
        municipality: String,
        /// Community name as written in the file.
        community: String,
        /// Locality name.
        name: String,
    },
    /// One sparse demographic bucket for a community.
    Demographic {
        /// Municipality name as written in the file.
        municipality: String,
        /// Community name as written in the file.
        community: String,
        /// Age bracket label, if present.
        age_bracket: Option<String>,
        /// Gender label, if present.
        gender: Option<String>,
        /// Ethnicity label, if present.
        ethnicity: Option<String>,
        /// Occupation label, if present.
        occupation: Option<String>,
        /// Monthly income bracket, if present.
        monthly_income: Option<String>,
        /// People counted in this bucket.
        count: i64,
    },
}

/// A parsed file: typed rows (with their 1-based data line numbers) plus
/// the rows that could not be parsed.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    /// Rows that passed parsing, in file order.
    pub rows: Vec<(usize, ParsedRow)>,
    /// Rows rejected during parsing, with reasons.
    pub skipped: Vec<SkippedRow>,
}

/// Normalizes a header cell: trim, lowercase, spaces and hyphens to
/// underscores.
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Maps a normalized header onto the canonical field name the row
/// builders look up. Unknown headers pass through unchanged.
fn canonical_field(normalized: &str) -> &str {
    match normalized {
        "municipality" | "municipio" | "município" => "municipality",
        "community" | "comunidade" => "community",
        "year" | "ano" | "reference_year" => "reference_year",
        "people" | "pessoas" | "population" | "habitantes" => "people",
        "families" | "familias" | "famílias" => "families",
        "fishermen" | "fishers" | "pescadores" => "fishermen",
        "locality" | "localidade" => "locality",
        "age_bracket" | "faixa_etaria" | "faixa_etária" => "age_bracket",
        "gender" | "genero" | "gênero" | "sexo" => "gender",
        "ethnicity" | "etnia" => "ethnicity",
        "occupation" | "ocupacao" | "ocupação" | "profissao" | "profissão" => "occupation",
        "monthly_income" | "renda" | "renda_mensal" => "monthly_income",
        "count" | "quantidade" | "qtd" => "count",
        other => other,
    }
}

/// Parses a numeric cell.
///
/// The field surveys leave numeric cells blank or non-numeric often
/// enough that the legacy loaders coerced them to `0`. That behavior is
/// preserved as the default; `strict` turns coercion into a row
/// rejection instead.
fn parse_count(raw: &str, strict: bool) -> Result<i64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if strict {
            Err("empty numeric field".to_string())
        } else {
            Ok(0)
        };
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }

    #[allow(clippy::cast_possible_truncation)]
    if let Ok(value) = trimmed.parse::<f64>() {
        return Ok(value.round() as i64);
    }

    if strict {
        Err(format!("non-numeric value {trimmed:?}"))
    } else {
        Ok(0)
    }
}

fn required<'a>(
    fields: &'a BTreeMap<String, String>,
    name: &str,
) -> Result<&'a str, String> {
    match fields.get(name).map(String::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing required field '{name}'")),
    }
}

fn optional(fields: &BTreeMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn build_row(
    kind: RecordKind,
    fields: &BTreeMap<String, String>,
    options: &ImportOptions,
) -> Result<ParsedRow, String> {
    let municipality = required(fields, "municipality")?.to_owned();
    let community = required(fields, "community")?.to_owned();

    match kind {
        RecordKind::CensusYear => {
            // A bad year would corrupt the (community, year) key, so it is
            // never coerced, regardless of the numeric policy.
            let reference_year = required(fields, "reference_year")?
                .parse::<i32>()
                .map_err(|_| {
                    format!(
                        "invalid reference year {:?}",
                        fields.get("reference_year").map_or("", String::as_str)
                    )
                })?;

            let count_of = |name: &str| {
                parse_count(
                    fields.get(name).map_or("", String::as_str),
                    options.strict_numbers,
                )
                .map_err(|e| format!("{name}: {e}"))
            };

            Ok(ParsedRow::Census {
                municipality,
                community,
                reference_year,
                people: count_of("people")?,
                families: count_of("families")?,
                fishermen: count_of("fishermen")?,
            })
        }
        RecordKind::Localities => Ok(ParsedRow::Locality {
            municipality,
            community,
            name: required(fields, "locality")?.to_owned(),
        }),
        RecordKind::Demographics => {
            let count = parse_count(
                fields.get("count").map_or("", String::as_str),
                options.strict_numbers,
            )
            .map_err(|e| format!("count: {e}"))?;

            Ok(ParsedRow::Demographic {
                municipality,
                community,
                age_bracket: optional(fields, "age_bracket"),
                gender: optional(fields, "gender"),
                ethnicity: optional(fields, "ethnicity"),
                occupation: optional(fields, "occupation"),
                monthly_income: optional(fields, "monthly_income"),
                count,
            })
        }
    }
}

/// Parses raw file bytes into typed rows plus per-row skips.
///
/// Bytes are decoded as UTF-8 with lossy replacement, since survey files
/// arrive in mixed encodings. Rows that fail to parse land in `skipped`
/// with their data line number (1-based, excluding the header); only a
/// file-level problem (no header row) is an error.
///
/// # Errors
///
/// Returns [`ImportError`] if the file has no header row or the CSV
/// structure itself cannot be read.
pub fn parse_rows(
    kind: RecordKind,
    bytes: &[u8],
    options: &ImportOptions,
) -> Result<ParsedFile, ImportError> {
    let text = String::from_utf8_lossy(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| canonical_field(&normalize_header(h)).to_owned())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(ImportError::EmptyFile);
    }

    let mut parsed = ParsedFile::default();

    for (index, result) in reader.records().enumerate() {
        let line = index + 1;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                parsed.skipped.push(SkippedRow {
                    line,
                    reason: format!("unreadable row: {e}"),
                });
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut fields: BTreeMap<String, String> = BTreeMap::new();
        for (i, header) in headers.iter().enumerate() {
            fields.insert(header.clone(), record.get(i).unwrap_or("").to_owned());
        }

        match build_row(kind, &fields, options) {
            Ok(row) => parsed.rows.push((line, row)),
            Err(reason) => {
                log::warn!("Skipping row {line}: {reason}");
                parsed.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERMISSIVE: ImportOptions = ImportOptions {
        strict_numbers: false,
    };
    const STRICT: ImportOptions = ImportOptions {
        strict_numbers: true,
    };

    #[test]
    fn headers_resolve_through_alias_table() {
        let csv = "Município,Comunidade,Ano,Pessoas,Familias,Pescadores\n\
                   Macaé,Barra de Macaé,2020,300,90,120\n";
        let parsed = parse_rows(RecordKind::CensusYear, csv.as_bytes(), &PERMISSIVE).unwrap();

        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(
            parsed.rows[0].1,
            ParsedRow::Census {
                municipality: "Macaé".to_owned(),
                community: "Barra de Macaé".to_owned(),
                reference_year: 2020,
                people: 300,
                families: 90,
                fishermen: 120,
            }
        );
    }

    #[test]
    fn blank_numeric_cells_coerce_to_zero_by_default() {
        let csv = "municipality,community,year,people,families,fishermen\n\
                   Macaé,Barra,2020,,n/a,40\n";
        let parsed = parse_rows(RecordKind::CensusYear, csv.as_bytes(), &PERMISSIVE).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        let ParsedRow::Census {
            people,
            families,
            fishermen,
            ..
        } = &parsed.rows[0].1
        else {
            panic!("expected census row");
        };
        assert_eq!((*people, *families, *fishermen), (0, 0, 40));
    }

    #[test]
    fn strict_numbers_reject_the_row_instead() {
        let csv = "municipality,community,year,people,families,fishermen\n\
                   Macaé,Barra,2020,,30,40\n";
        let parsed = parse_rows(RecordKind::CensusYear, csv.as_bytes(), &STRICT).unwrap();

        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
        assert!(parsed.skipped[0].reason.contains("people"));
    }

    #[test]
    fn one_malformed_row_does_not_reject_the_file() {
        let csv = "municipality,community,year,people,families,fishermen\n\
                   Macaé,Barra,2020,300,90,120\n\
                   Macaé,Imbetiba,not-a-year,10,5,2\n\
                   Campos,Farol,2020,800,250,310\n";
        let parsed = parse_rows(RecordKind::CensusYear, csv.as_bytes(), &PERMISSIVE).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line, 2);
        assert!(parsed.skipped[0].reason.contains("reference year"));
    }

    #[test]
    fn missing_required_name_is_skipped_with_reason() {
        let csv = "municipality,community,locality\n\
                   ,Barra,Ilha da Caieira\n\
                   Macaé,Barra,Ilha da Caieira\n";
        let parsed = parse_rows(RecordKind::Localities, csv.as_bytes(), &PERMISSIVE).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert!(parsed.skipped[0].reason.contains("municipality"));
    }

    #[test]
    fn demographic_rows_keep_absent_fields_as_none() {
        let csv = "municipality,community,faixa etaria,genero,count\n\
                   Macaé,Barra,18-29,,12\n";
        let parsed = parse_rows(RecordKind::Demographics, csv.as_bytes(), &PERMISSIVE).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        let ParsedRow::Demographic {
            age_bracket,
            gender,
            ethnicity,
            count,
            ..
        } = &parsed.rows[0].1
        else {
            panic!("expected demographic row");
        };
        assert_eq!(age_bracket.as_deref(), Some("18-29"));
        assert_eq!(*gender, None);
        assert_eq!(*ethnicity, None);
        assert_eq!(*count, 12);
    }

    #[test]
    fn blank_lines_are_ignored_silently() {
        let csv = "municipality,community,locality\n\
                   Macaé,Barra,Ponta do Leme\n\
                   ,,\n";
        let parsed = parse_rows(RecordKind::Localities, csv.as_bytes(), &PERMISSIVE).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.skipped.is_empty());
    }
}
