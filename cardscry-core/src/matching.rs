//! Match engine: rank a fingerprint ensemble against a catalog.
//!
//! Each variant queries the catalog independently; the final answer is the
//! global minimum distance across all five. Ties between variants resolve
//! by variant priority, so the original-image fingerprint always beats a
//! binarized one at equal distance.

use image::DynamicImage;

use crate::catalog::Catalog;
use crate::ensemble::{detect, FingerprintSet, Variant};
use crate::error::{Result, ScryError};
use crate::phash::{numeric_distance, HashDistance, PerceptualHash};

/// One variant's nearest catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatch {
    pub variant: Variant,
    pub uri: String,
    pub stored: PerceptualHash,
    pub distance: HashDistance,
}

/// The overall winner across all variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalMatch {
    pub uri: String,
    pub variant: Variant,
    pub distance: HashDistance,
}

/// Query the catalog once per variant, in priority order.
///
/// Any catalog error aborts the whole ranking; partial results never
/// escape.
pub async fn rank_variants<C>(set: &FingerprintSet, catalog: &C) -> Result<Vec<VariantMatch>>
where
    C: Catalog + ?Sized,
{
    let mut matches = Vec::with_capacity(Variant::ALL.len());
    for (variant, query) in set.iter() {
        let entry = catalog.nearest_by_distance(&query).await?;
        let distance = numeric_distance(&query, &entry.hash);
        matches.push(VariantMatch {
            variant,
            uri: entry.uri,
            stored: entry.hash,
            distance,
        });
    }
    Ok(matches)
}

/// Rank all variants and keep the global minimum.
pub async fn best_match<C>(set: &FingerprintSet, catalog: &C) -> Result<FinalMatch>
where
    C: Catalog + ?Sized,
{
    let matches = rank_variants(set, catalog).await?;
    // rank_variants yields one entry per variant, never zero
    let winner = matches
        .into_iter()
        .min_by_key(|m| (m.distance, m.variant))
        .ok_or(ScryError::EmptyCatalog)?;

    Ok(FinalMatch {
        uri: winner.uri,
        variant: winner.variant,
        distance: winner.distance,
    })
}

/// Detect then match.
///
/// A detection failure propagates before any catalog query runs.
pub async fn identify<C>(image: &DynamicImage, catalog: &C) -> Result<FinalMatch>
where
    C: Catalog + ?Sized,
{
    let set = detect(image)?;
    best_match(&set, catalog).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, NearestEntry};
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn uniform_set(value: u128) -> FingerprintSet {
        FingerprintSet {
            original: PerceptualHash::from_u128(value),
            otsu: PerceptualHash::from_u128(value),
            binary_otsu: PerceptualHash::from_u128(value),
            binary: PerceptualHash::from_u128(value),
            adaptive: PerceptualHash::from_u128(value),
        }
    }

    fn three_card_catalog() -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        catalog.insert("https://scryfall.com/card/one", PerceptualHash::from_u128(100));
        catalog.insert("https://scryfall.com/card/two", PerceptualHash::from_u128(5_000));
        catalog.insert(
            "https://scryfall.com/card/three",
            PerceptualHash::from_u128(9_000_000),
        );
        catalog
    }

    #[tokio::test]
    async fn best_match_finds_numerically_closest_card() {
        let catalog = three_card_catalog();
        let winner = best_match(&uniform_set(120), &catalog).await.unwrap();
        assert_eq!(winner.uri, "https://scryfall.com/card/one");
        assert_eq!(winner.distance, HashDistance::from_u128(20));
        assert_eq!(winner.variant, Variant::Original);
    }

    #[tokio::test]
    async fn rank_lists_every_variant_in_priority_order() {
        let catalog = three_card_catalog();
        let matches = rank_variants(&uniform_set(4_900), &catalog).await.unwrap();
        assert_eq!(matches.len(), 5);
        let order: Vec<Variant> = matches.iter().map(|m| m.variant).collect();
        assert_eq!(order.as_slice(), Variant::ALL.as_slice());
        for m in &matches {
            assert_eq!(m.uri, "https://scryfall.com/card/two");
            assert_eq!(m.distance, HashDistance::from_u128(100));
        }
    }

    #[tokio::test]
    async fn distance_tie_resolves_to_higher_priority_variant() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert("card/only", PerceptualHash::from_u128(100));

        // original and adaptive both land at distance 20
        let set = FingerprintSet {
            original: PerceptualHash::from_u128(120),
            otsu: PerceptualHash::from_u128(300),
            binary_otsu: PerceptualHash::from_u128(300),
            binary: PerceptualHash::from_u128(300),
            adaptive: PerceptualHash::from_u128(80),
        };
        let winner = best_match(&set, &catalog).await.unwrap();
        assert_eq!(winner.variant, Variant::Original);
        assert_eq!(winner.distance, HashDistance::from_u128(20));
    }

    #[tokio::test]
    async fn strictly_closer_variant_beats_priority() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert("card/only", PerceptualHash::from_u128(1_000));

        let set = FingerprintSet {
            original: PerceptualHash::from_u128(2_000),
            otsu: PerceptualHash::from_u128(3_000),
            binary_otsu: PerceptualHash::from_u128(3_000),
            binary: PerceptualHash::from_u128(3_000),
            adaptive: PerceptualHash::from_u128(1_010),
        };
        let winner = best_match(&set, &catalog).await.unwrap();
        assert_eq!(winner.variant, Variant::Adaptive);
        assert_eq!(winner.distance, HashDistance::from_u128(10));
    }

    #[tokio::test]
    async fn empty_catalog_aborts_ranking() {
        let catalog = MemoryCatalog::new();
        assert!(matches!(
            best_match(&uniform_set(1), &catalog).await,
            Err(ScryError::EmptyCatalog)
        ));
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let catalog = three_card_catalog();
        let dyn_catalog: &dyn Catalog = &catalog;
        let winner = best_match(&uniform_set(120), dyn_catalog).await.unwrap();
        assert_eq!(winner.uri, "https://scryfall.com/card/one");
    }

    #[tokio::test]
    async fn identify_matches_an_indexed_image_at_distance_zero() {
        // 800 wide, so detection sees exactly the indexed pixels
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(800, 600, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x / 3) % 256) as u8])
        }));
        let set = detect(&image).unwrap();

        let mut catalog = MemoryCatalog::new();
        catalog.insert("https://scryfall.com/card/indexed", set.original);

        let winner = identify(&image, &catalog).await.unwrap();
        assert_eq!(winner.uri, "https://scryfall.com/card/indexed");
        assert_eq!(winner.distance, HashDistance::ZERO);
        assert_eq!(winner.variant, Variant::Original);
    }

    struct CountingCatalog(AtomicUsize);

    #[async_trait]
    impl Catalog for CountingCatalog {
        async fn nearest_by_distance(&self, _query: &PerceptualHash) -> Result<NearestEntry> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ScryError::EmptyCatalog)
        }
    }

    #[tokio::test]
    async fn detection_failure_skips_every_catalog_query() {
        let counting = CountingCatalog(AtomicUsize::new(0));
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));

        let result = identify(&empty, &counting).await;
        assert!(matches!(result, Err(ScryError::HashComputation)));
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);
    }
}
