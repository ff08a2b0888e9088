//! Historical census backfill.
//!
//! The program only surveyed some communities from a given year onward;
//! earlier years are estimated by applying a fixed multiplicative decay
//! to a known year's counts. Derived records are inserted only where no
//! record exists for that `(community, year)` pair — existing data is
//! never overwritten, and running the backfill twice is a no-op.

use fishcensus_database::queries;
use switchy_database::Database;

use crate::ImportError;

/// Default per-step decay factor applied to counts when deriving an
/// earlier year.
pub const DEFAULT_DECAY: f64 = 0.9;

/// Applies the decay factor to one count, rounding to nearest.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
pub fn decay_count(value: i64, decay: f64) -> i64 {
    (value as f64 * decay).round() as i64
}

/// Derives a census record per community for `to_year` from the records
/// of `from_year`, scaled by `decay`.
///
/// Returns the number of records actually inserted; communities that
/// already have a `to_year` record contribute nothing.
///
/// # Errors
///
/// Returns [`ImportError`] if a store operation fails.
pub async fn backfill_year(
    db: &dyn Database,
    from_year: i32,
    to_year: i32,
    decay: f64,
) -> Result<u64, ImportError> {
    let source_records = queries::census_for_year(db, from_year).await?;
    if source_records.is_empty() {
        log::warn!("Backfill: no census records found for source year {from_year}");
        return Ok(0);
    }

    let mut inserted = 0u64;
    for record in &source_records {
        inserted += queries::insert_census_record(
            db,
            record.community_id,
            to_year,
            decay_count(record.people, decay),
            decay_count(record.families, decay),
            decay_count(record.fishermen, decay),
            record.data_source_id,
        )
        .await?;
    }

    log::info!(
        "Backfill {from_year} -> {to_year} (decay {decay}): {inserted} of {} communities inserted",
        source_records.len()
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_scales_and_rounds_to_nearest() {
        assert_eq!(decay_count(100, DEFAULT_DECAY), 90);
        assert_eq!(decay_count(40, DEFAULT_DECAY), 36);
        assert_eq!(decay_count(20, DEFAULT_DECAY), 18);
        // 0.9 * 15 = 13.5 rounds up.
        assert_eq!(decay_count(15, DEFAULT_DECAY), 14);
        assert_eq!(decay_count(0, DEFAULT_DECAY), 0);
    }
}
