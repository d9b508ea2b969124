//! Card catalog: fingerprint persistence and nearest-entry lookup.
//!
//! The lookup contract is numeric, not bitwise: the closest entry is the
//! one whose stored fingerprint has the smallest absolute difference to the
//! query when both are read as 256-bit big-endian integers.
//!
//! ## Backends
//!
//! - [`PgCatalog`] - PostgreSQL persistence (behind the `postgres` feature)
//! - [`MemoryCatalog`] - insertion-ordered in-memory catalog for tests and
//!   small fixed sets
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardscry_core::catalog::{Catalog, MemoryCatalog};
//! use cardscry_core::phash::PerceptualHash;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert(
//!     "https://scryfall.com/card/mh2/299",
//!     PerceptualHash::from_u128(1204),
//! );
//! let entry = catalog
//!     .nearest_by_distance(&PerceptualHash::from_u128(1200))
//!     .await?;
//! println!("matched {}", entry.uri);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PgCatalog;

use async_trait::async_trait;

use crate::error::{Result, ScryError};
use crate::phash::{numeric_distance, HashDistance, PerceptualHash};

/// The closest catalog entry to a query fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestEntry {
    /// Card page URI returned to callers.
    pub uri: String,
    /// The stored fingerprint the entry matched on.
    pub hash: PerceptualHash,
}

/// One card ready for insertion.
#[derive(Debug, Clone, Copy)]
pub struct NewCard<'a> {
    pub scryfall_id: &'a str,
    pub name: &'a str,
    pub set_code: &'a str,
    pub collector_number: &'a str,
    pub lang: &'a str,
    pub image_uri: &'a str,
    pub scryfall_uri: &'a str,
    pub phash: &'a PerceptualHash,
}

/// Nearest-neighbour lookup over stored fingerprints.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Return the entry with the smallest numeric distance to `query`.
    ///
    /// Ties resolve to the earliest stored entry. An empty catalog is
    /// `ScryError::EmptyCatalog`.
    async fn nearest_by_distance(&self, query: &PerceptualHash) -> Result<NearestEntry>;
}

/// In-memory catalog, insertion-ordered.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    entries: Vec<(String, PerceptualHash)>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, hash: PerceptualHash) {
        self.entries.push((uri.into(), hash));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn nearest_by_distance(&self, query: &PerceptualHash) -> Result<NearestEntry> {
        let mut best: Option<(&str, PerceptualHash, HashDistance)> = None;
        for (uri, hash) in &self.entries {
            let distance = numeric_distance(query, hash);
            let closer = match &best {
                Some((_, _, current)) => distance < *current,
                None => true,
            };
            if closer {
                best = Some((uri, *hash, distance));
            }
        }
        best.map(|(uri, hash, _)| NearestEntry {
            uri: uri.to_string(),
            hash,
        })
        .ok_or(ScryError::EmptyCatalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nearest_picks_smallest_numeric_distance() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert("card/a", PerceptualHash::from_u128(100));
        catalog.insert("card/b", PerceptualHash::from_u128(5_000));
        catalog.insert("card/c", PerceptualHash::from_u128(9_000_000));

        let entry = catalog
            .nearest_by_distance(&PerceptualHash::from_u128(120))
            .await
            .unwrap();
        assert_eq!(entry.uri, "card/a");
        assert_eq!(entry.hash, PerceptualHash::from_u128(100));
    }

    #[tokio::test]
    async fn ties_keep_the_earliest_entry() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert("card/low", PerceptualHash::from_u128(90));
        catalog.insert("card/high", PerceptualHash::from_u128(110));

        // both entries sit at distance 10 from the query
        let entry = catalog
            .nearest_by_distance(&PerceptualHash::from_u128(100))
            .await
            .unwrap();
        assert_eq!(entry.uri, "card/low");
    }

    #[tokio::test]
    async fn empty_catalog_is_an_error() {
        let catalog = MemoryCatalog::new();
        assert!(matches!(
            catalog
                .nearest_by_distance(&PerceptualHash::from_u128(1))
                .await,
            Err(ScryError::EmptyCatalog)
        ));
    }
}
