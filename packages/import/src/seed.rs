//! Idempotent sample-data seeding.
//!
//! Replaces the old truncate-and-reseed scripts: every statement is an
//! upsert or insert-on-absence, the routine only runs when explicitly
//! invoked, and it refuses to run at all unless the environment guard is
//! set. Safe to re-run against a populated database.

use fishcensus_database::queries;
use switchy_database::Database;

use crate::ImportError;

/// Environment variable that must be `1` for [`seed`] to run.
pub const SEED_ENV: &str = "FISHCENSUS_SEED";

/// Reference year the seed census data describes.
const SEED_YEAR: i32 = 2020;

/// `(municipality, state, community, (lat, lng), motivations, (people, families, fishermen))`
type SeedCommunity = (
    &'static str,
    &'static str,
    &'static str,
    Option<(f64, f64)>,
    Option<&'static str>,
    (i64, i64, i64),
);

const SEED_COMMUNITIES: &[SeedCommunity] = &[
    (
        "São João da Barra",
        "RJ",
        "Atafona",
        Some((-21.6186, -41.0076)),
        Some(r#"{"Tradição familiar": 55, "Renda": 30, "Falta de alternativa": 15}"#),
        (1340, 412, 507),
    ),
    (
        "São Francisco de Itabapoana",
        "RJ",
        "Gargaú",
        Some((-21.5841, -41.0389)),
        Some(r#"{"Tradição familiar": 48, "Renda": 40, "Gosto pela pesca": 12}"#),
        (980, 295, 388),
    ),
    (
        "São Francisco de Itabapoana",
        "RJ",
        "Guaxindiba",
        Some((-21.4884, -41.0193)),
        None,
        (610, 188, 231),
    ),
    (
        "Campos dos Goytacazes",
        "RJ",
        "Farol de São Tomé",
        Some((-22.0415, -41.0514)),
        Some(r#"{"Renda": 62, "Tradição familiar": 38}"#),
        (1820, 540, 655),
    ),
    (
        "Macaé",
        "RJ",
        "Barra de Macaé",
        None,
        None,
        (1120, 352, 401),
    ),
    (
        "Quissamã",
        "RJ",
        "Barra do Furado",
        Some((-22.0891, -41.4043)),
        None,
        (450, 132, 186),
    ),
];

const SEED_ENVIRONMENTS: &[(&str, &str)] = &[
    ("Estuary", "River-mouth and mangrove fishing grounds"),
    ("Open sea", "Coastal marine fishing beyond the surf line"),
    ("Lagoon", "Brackish lagoon systems"),
    ("River", "Inland river stretches"),
];

/// Seeds sample municipalities, communities, environments, and one
/// census year.
///
/// # Errors
///
/// Returns [`ImportError::SeedGuarded`] unless `FISHCENSUS_SEED=1`, or a
/// store error if an upsert fails.
pub async fn seed(db: &dyn Database) -> Result<(), ImportError> {
    let guard = std::env::var(SEED_ENV).unwrap_or_default();
    if guard != "1" {
        return Err(ImportError::SeedGuarded);
    }

    let data_source_id = queries::upsert_data_source(db, "seed").await?;

    for (name, description) in SEED_ENVIRONMENTS {
        queries::create_environment(db, name, Some(description)).await?;
    }

    let mut inserted = 0u64;
    for (municipality, state, community, coords, motivations, counts) in SEED_COMMUNITIES {
        let municipality_id = queries::upsert_municipality(db, municipality, state).await?;
        let community_id = queries::upsert_community(
            db,
            community,
            municipality_id,
            coords.map(|c| c.0),
            coords.map(|c| c.1),
        )
        .await?;

        if let Some(blob) = motivations {
            set_motivations(db, community_id, blob).await?;
        }

        inserted += queries::insert_census_record(
            db,
            community_id,
            SEED_YEAR,
            counts.0,
            counts.1,
            counts.2,
            Some(data_source_id),
        )
        .await?;
    }

    log::info!(
        "Seed completed: {} communities, {inserted} new census records for {SEED_YEAR}",
        SEED_COMMUNITIES.len()
    );

    Ok(())
}

/// Writes a community's motivation blob only when it has none yet, so a
/// re-seed never clobbers field-collected data.
async fn set_motivations(
    db: &dyn Database,
    community_id: i32,
    blob: &str,
) -> Result<(), ImportError> {
    db.exec_raw_params(
        "UPDATE communities SET motivations = $2
         WHERE id = $1 AND motivations IS NULL",
        &[
            switchy_database::DatabaseValue::Int32(community_id),
            switchy_database::DatabaseValue::String(blob.to_string()),
        ],
    )
    .await
    .map_err(fishcensus_database::DbError::from)?;

    Ok(())
}
