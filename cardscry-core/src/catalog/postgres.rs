//! PostgreSQL implementation of the card catalog.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::{Catalog, NearestEntry, NewCard};
use crate::error::{Result, ScryError};
use crate::phash::{numeric_distance, HashDistance, PerceptualHash};

/// PostgreSQL-backed card catalog.
///
/// Fingerprints are stored as 32-byte big-endian BYTEA columns. Nearest
/// lookup streams the table and keeps the closest row in the application
/// layer; the numeric-difference metric has no index-friendly SQL form.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

/// Row type for the nearest-entry scan.
#[derive(FromRow)]
struct CardRow {
    scryfall_uri: String,
    phash: Vec<u8>,
}

impl PgCatalog {
    /// Connect with default pool limits and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_limits(database_url, 10, 1).await
    }

    /// Connect with explicit pool limits and run migrations.
    pub async fn connect_with_limits(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(database_url)
            .await
            .map_err(|e| ScryError::StoreUnavailable(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ScryError::StoreUnavailable(e.to_string()))?;

        tracing::info!("card catalog connected and migrations applied");

        Ok(Self { pool })
    }

    /// Wrap an existing pool (for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh one card.
    ///
    /// Upsert semantics: a row with the same scryfall_id gets its
    /// fingerprint and URIs replaced. Each call commits on its own, so an
    /// interrupted ingestion keeps every card stored so far.
    pub async fn insert(&self, card: &NewCard<'_>) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cards (scryfall_id, name, set_code, collector_number, lang, image_uri, scryfall_uri, phash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (scryfall_id) DO UPDATE SET
                phash = EXCLUDED.phash,
                image_uri = EXCLUDED.image_uri,
                scryfall_uri = EXCLUDED.scryfall_uri
            RETURNING id
            "#,
        )
        .bind(card.scryfall_id)
        .bind(card.name)
        .bind(card.set_code)
        .bind(card.collector_number)
        .bind(card.lang)
        .bind(card.image_uri)
        .bind(card.scryfall_uri)
        .bind(card.phash.as_bytes())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ScryError::StoreUnavailable(e.to_string()))?;

        tracing::debug!(scryfall_id = %card.scryfall_id, id, "stored card fingerprint");

        Ok(id)
    }

    /// Count cards in the catalog.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ScryError::StoreUnavailable(e.to_string()))?;

        Ok(count)
    }

    /// Close the pool, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn nearest_by_distance(&self, query: &PerceptualHash) -> Result<NearestEntry> {
        // ORDER BY id plus strict < keeps the oldest row on distance ties
        let mut rows = sqlx::query_as::<_, CardRow>(
            "SELECT scryfall_uri, phash FROM cards ORDER BY id",
        )
        .fetch(&self.pool);

        let mut best: Option<(NearestEntry, HashDistance)> = None;
        while let Some(row) = rows
            .try_next()
            .await
            .map_err(|e| ScryError::StoreUnavailable(e.to_string()))?
        {
            let stored = PerceptualHash::from_slice(&row.phash)?;
            let distance = numeric_distance(query, &stored);
            let closer = match &best {
                Some((_, current)) => distance < *current,
                None => true,
            };
            if closer {
                best = Some((
                    NearestEntry {
                        uri: row.scryfall_uri,
                        hash: stored,
                    },
                    distance,
                ));
            }
        }

        best.map(|(entry, _)| entry).ok_or(ScryError::EmptyCatalog)
    }
}
