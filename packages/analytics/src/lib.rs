#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure aggregation engine for census-derived statistics.
//!
//! Every derived value in the system — fisherman percentages, family
//! averages, municipality rollups, regression and histogram series — is
//! computed here from already-loaded entity sets. No function performs
//! I/O, and no derived value is ever stored back; the raw counts in the
//! store remain the single source of truth.

use std::collections::BTreeMap;

use fishcensus_analytics_models::{
    CommunityCensus, CommunityMotivation, HistogramBin, MotivationBucket, MunicipalitySummary,
    Regression,
};
use fishcensus_models::CensusRecord;

/// Canonical motivation labels and the raw field labels that map onto
/// them. Raw labels are matched after trimming and lowercasing; anything
/// unrecognized falls into `"Other"`.
const MOTIVATION_LABELS: &[(&str, &str)] = &[
    ("tradicao familiar", "Family tradition"),
    ("tradição familiar", "Family tradition"),
    ("family tradition", "Family tradition"),
    ("herança", "Family tradition"),
    ("renda", "Income"),
    ("income", "Income"),
    ("sustento", "Income"),
    ("falta de alternativa", "Lack of alternatives"),
    ("falta de alternativas", "Lack of alternatives"),
    ("lack of alternatives", "Lack of alternatives"),
    ("gosto pela pesca", "Personal preference"),
    ("vocação", "Personal preference"),
    ("personal preference", "Personal preference"),
];

/// Fisherman percentage: `fishermen / people × 100`.
///
/// Returns `0.0` whenever `people <= 0`, so the result is never NaN or
/// infinite regardless of input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(fishermen: i64, people: i64) -> f64 {
    if people <= 0 {
        return 0.0;
    }
    fishermen as f64 / people as f64 * 100.0
}

/// Average family size: `people / families`, with the same zero guard as
/// [`percentage`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_family_size(people: i64, families: i64) -> f64 {
    if families <= 0 {
        return 0.0;
    }
    people as f64 / families as f64
}

/// Groups each community's latest census counts by municipality and sums
/// them into rollups, sorted by municipality name.
///
/// Only raw totals are produced; percentage fields belong to consumers
/// via [`percentage`].
#[must_use]
pub fn summary_by_municipality(communities: &[CommunityCensus]) -> Vec<MunicipalitySummary> {
    let mut grouped: BTreeMap<&str, MunicipalitySummary> = BTreeMap::new();

    for entry in communities {
        let summary = grouped
            .entry(entry.municipality.as_str())
            .or_insert_with(|| MunicipalitySummary {
                municipality: entry.municipality.clone(),
                community_count: 0,
                total_people: 0,
                total_fishermen: 0,
                total_families: 0,
            });
        summary.community_count += 1;
        summary.total_people += entry.people;
        summary.total_fishermen += entry.fishermen;
        summary.total_families += entry.families;
    }

    grouped.into_values().collect()
}

/// Ordinary least squares over a point set, with R² computed as the
/// squared Pearson correlation.
///
/// Fewer than 2 distinct x-values cannot determine a slope; in that case
/// the result degenerates to `slope = 0`, `intercept = mean(y)` (or `0`
/// for an empty set) and `r_squared = 0` instead of panicking on a zero
/// variance.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
pub fn linear_regression(points: &[(f64, f64)]) -> Regression {
    let n = points.len() as f64;

    let distinct_x = {
        let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        xs.len()
    };

    if distinct_x < 2 {
        let intercept = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.1).sum::<f64>() / n
        };
        return Regression {
            slope: 0.0,
            intercept,
            r_squared: 0.0,
        };
    }

    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let slope = cov / var_x;
    let intercept = mean_y - slope * mean_x;

    // A perfectly flat point set fits its own line exactly; Pearson is
    // undefined there (zero y-variance), so report a perfect fit.
    let r_squared = if var_y == 0.0 {
        1.0
    } else {
        (cov * cov) / (var_x * var_y)
    };

    Regression {
        slope,
        intercept,
        r_squared,
    }
}

/// Equal-width histogram over `[min, max]`.
///
/// Bins are half-open except the final bin, which is closed on both ends:
/// a value equal to `max` lands in the last bin by index clamping *and*
/// again by the closed-interval rule, so it is counted twice. That
/// boundary behavior matches the charting code this engine replaced and
/// is pinned by a test; change both together if it is ever corrected.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn histogram_bins(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bin_count as f64;

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &value in values {
        let idx = if width > 0.0 {
            (((value - min) / width).floor() as usize).min(bin_count - 1)
        } else {
            0
        };
        bins[idx].count += 1;

        if value == max {
            bins[bin_count - 1].count += 1;
        }
    }

    bins
}

/// Aggregates per-community motivation blobs into canonical buckets.
///
/// Each blob is a JSON object of raw label → percentage. Raw labels are
/// remapped through the fixed canonical table and each percentage is
/// weighted by that community's fisherman count. Communities whose blob
/// does not parse as a JSON object are skipped with a warning, never
/// fatal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn motivation_aggregate(communities: &[CommunityMotivation]) -> Vec<MotivationBucket> {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();

    for entry in communities {
        let Some(raw) = entry.motivations.as_deref() else {
            continue;
        };

        let parsed: Option<serde_json::Value> = serde_json::from_str(raw).ok();
        let Some(serde_json::Value::Object(map)) = parsed else {
            log::warn!(
                "Skipping unparsable motivation blob for community {}",
                entry.community
            );
            continue;
        };

        for (label, value) in &map {
            let Some(pct) = value.as_f64() else {
                log::warn!(
                    "Skipping non-numeric motivation value for {label:?} in community {}",
                    entry.community
                );
                continue;
            };
            let canonical = canonical_motivation(label);
            *buckets.entry(canonical.to_owned()).or_insert(0.0) +=
                pct * entry.fishermen as f64;
        }
    }

    buckets
        .into_iter()
        .map(|(label, weight)| MotivationBucket { label, weight })
        .collect()
}

/// Maps a raw motivation label onto the canonical label set.
#[must_use]
pub fn canonical_motivation(raw: &str) -> &'static str {
    let needle = raw.trim().to_lowercase();
    MOTIVATION_LABELS
        .iter()
        .find(|(alias, _)| *alias == needle)
        .map_or("Other", |(_, canonical)| canonical)
}

/// Orders a community's census records strictly ascending by year,
/// dropping duplicate years (first occurrence wins).
///
/// The store already enforces year uniqueness per community; this keeps
/// the guarantee for callers that assembled records from other sources.
#[must_use]
pub fn ordered_time_series(mut records: Vec<CensusRecord>) -> Vec<CensusRecord> {
    records.sort_by_key(|r| r.reference_year);
    records.dedup_by_key(|r| r.reference_year);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census(municipality: &str, community: &str, counts: (i64, i64, i64)) -> CommunityCensus {
        CommunityCensus {
            municipality: municipality.to_owned(),
            community: community.to_owned(),
            people: counts.0,
            families: counts.1,
            fishermen: counts.2,
        }
    }

    #[test]
    fn percentage_guards_non_positive_people() {
        for people in [0, -1, -100] {
            let pct = percentage(10, people);
            assert_eq!(pct, 0.0);
            assert!(pct.is_finite());
        }
    }

    #[test]
    fn percentage_of_half_is_fifty() {
        let pct = percentage(50, 100);
        assert!((pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_family_size_guards_zero_families() {
        assert_eq!(average_family_size(120, 0), 0.0);
        assert!((average_family_size(120, 40) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rollup_totals_equal_sum_of_communities() {
        let communities = vec![
            census("Macaé", "Barra de Macaé", (300, 90, 120)),
            census("Campos", "Farol de São Tomé", (800, 250, 310)),
            census("Campos", "Lagoa de Cima", (150, 40, 60)),
        ];

        let summaries = summary_by_municipality(&communities);
        assert_eq!(summaries.len(), 2);

        let campos = &summaries[0];
        assert_eq!(campos.municipality, "Campos");
        assert_eq!(campos.community_count, 2);
        assert_eq!(campos.total_people, 950);
        assert_eq!(campos.total_families, 290);
        assert_eq!(campos.total_fishermen, 370);

        let macae = &summaries[1];
        assert_eq!(macae.municipality, "Macaé");
        assert_eq!(macae.community_count, 1);
        assert_eq!(macae.total_people, 300);
    }

    #[test]
    fn rollup_of_empty_set_is_empty() {
        assert!(summary_by_municipality(&[]).is_empty());
    }

    #[test]
    fn regression_recovers_perfect_line() {
        let result = linear_regression(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        assert!((result.slope - 2.0).abs() < 1e-9);
        assert!(result.intercept.abs() < 1e-9);
        assert!((result.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn regression_degenerates_below_two_distinct_x() {
        let empty = linear_regression(&[]);
        assert_eq!(empty.slope, 0.0);
        assert_eq!(empty.intercept, 0.0);
        assert_eq!(empty.r_squared, 0.0);

        let single = linear_regression(&[(5.0, 7.0), (5.0, 9.0)]);
        assert_eq!(single.slope, 0.0);
        assert!((single.intercept - 8.0).abs() < 1e-9);
        assert_eq!(single.r_squared, 0.0);
    }

    #[test]
    fn regression_flat_line_reports_perfect_fit() {
        let flat = linear_regression(&[(1.0, 3.0), (2.0, 3.0), (4.0, 3.0)]);
        assert_eq!(flat.slope, 0.0);
        assert!((flat.intercept - 3.0).abs() < 1e-9);
        assert!((flat.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_spreads_values_across_bins() {
        let bins = histogram_bins(&[0.0, 1.0, 2.0, 3.0, 9.0], 3);
        assert_eq!(bins.len(), 3);
        assert!((bins[0].lower - 0.0).abs() < f64::EPSILON);
        assert!((bins[2].upper - 9.0).abs() < f64::EPSILON);
        // 0, 1, 2 fall in [0, 3); 3 falls in [3, 6).
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[1].count, 1);
    }

    #[test]
    fn histogram_counts_max_twice_in_final_bin() {
        // The final bin is closed on both ends, so the maximum is counted
        // once by index and once by the closed-interval rule. Deliberate:
        // this pins the legacy charting behavior.
        let bins = histogram_bins(&[0.0, 5.0, 10.0], 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 3);
    }

    #[test]
    fn histogram_handles_degenerate_input() {
        assert!(histogram_bins(&[], 4).is_empty());
        assert!(histogram_bins(&[1.0, 2.0], 0).is_empty());

        // All values identical: zero width, everything in bin 0 (plus the
        // max double count in the final bin).
        let bins = histogram_bins(&[2.0, 2.0], 1);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 4);
    }

    #[test]
    fn motivation_aggregate_remaps_and_weights() {
        let communities = vec![
            CommunityMotivation {
                community: "Atafona".to_owned(),
                fishermen: 100,
                motivations: Some(r#"{"Tradição familiar": 60, "renda": 40}"#.to_owned()),
            },
            CommunityMotivation {
                community: "Gargaú".to_owned(),
                fishermen: 50,
                motivations: Some(r#"{"family tradition": 20, "surfe": 80}"#.to_owned()),
            },
        ];

        let buckets = motivation_aggregate(&communities);
        let weight_of = |label: &str| {
            buckets
                .iter()
                .find(|b| b.label == label)
                .map(|b| b.weight)
                .unwrap_or_default()
        };

        assert!((weight_of("Family tradition") - (60.0 * 100.0 + 20.0 * 50.0)).abs() < 1e-9);
        assert!((weight_of("Income") - 40.0 * 100.0).abs() < 1e-9);
        assert!((weight_of("Other") - 80.0 * 50.0).abs() < 1e-9);
    }

    #[test]
    fn motivation_aggregate_skips_unparsable_blobs() {
        let communities = vec![
            CommunityMotivation {
                community: "Atafona".to_owned(),
                fishermen: 10,
                motivations: Some("not json at all".to_owned()),
            },
            CommunityMotivation {
                community: "Gargaú".to_owned(),
                fishermen: 10,
                motivations: None,
            },
            CommunityMotivation {
                community: "Guaxindiba".to_owned(),
                fishermen: 10,
                motivations: Some(r#"{"renda": 100}"#.to_owned()),
            },
        ];

        let buckets = motivation_aggregate(&communities);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Income");
    }

    #[test]
    fn time_series_sorted_ascending_without_duplicate_years() {
        let record = |id: i32, year: i32| CensusRecord {
            id,
            community_id: 1,
            reference_year: year,
            people: 100,
            families: 30,
            fishermen: 40,
            data_source_id: None,
        };

        let ordered = ordered_time_series(vec![
            record(3, 2020),
            record(1, 2014),
            record(2, 2017),
            record(4, 2017),
        ]);

        let years: Vec<i32> = ordered.iter().map(|r| r.reference_year).collect();
        assert_eq!(years, vec![2014, 2017, 2020]);
        assert!(years.windows(2).all(|w| w[0] < w[1]));
    }
}
