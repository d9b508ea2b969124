//! Cardscry Core - Trading-card identification by perceptual fingerprints
//!
//! This crate turns card images into compact perceptual fingerprints and
//! matches photos of physical cards against a catalog of indexed prints.
//!
//! # Features
//!
//! - Five-variant fingerprint ensemble: the original image plus four
//!   binarized renditions, hashed independently
//! - 256-bit DCT-median hashes compared as plain big-endian integers
//! - CLAHE contrast normalization on the CIELAB lightness channel
//! - Contour-based cropping with perspective correction
//! - PostgreSQL catalog persistence behind the `postgres` feature
//!
//! # Example
//!
//! ```no_run
//! use cardscry_core::{detect, identify, MemoryCatalog};
//!
//! # async fn example() -> cardscry_core::Result<()> {
//! // index one card image
//! let indexed = image::open("cards/299.jpg")?;
//! let set = detect(&indexed)?;
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert("https://scryfall.com/card/mh2/299", set.original);
//!
//! // identify a photo against the catalog
//! let photo = image::open("photo.jpg")?;
//! let found = identify(&photo, &catalog).await?;
//! println!("{} at distance {}", found.uri, found.distance);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod ensemble;
pub mod error;
pub mod matching;
pub mod normalize;
pub mod phash;
pub mod segment;
pub mod threshold;

// Re-export main types for convenience
pub use catalog::{Catalog, MemoryCatalog, NearestEntry, NewCard};
pub use ensemble::{detect, detect_bytes, hash_image, FingerprintSet, Variant};
pub use error::{Result, ScryError};
pub use matching::{best_match, identify, rank_variants, FinalMatch, VariantMatch};
pub use normalize::{equalize, resize_to_height, resize_to_width, TARGET_WIDTH};
pub use phash::{numeric_distance, HashDistance, PerceptualHash, HASH_BYTES, HASH_GRID_SIZE};
pub use segment::{card_contour, segmentation, warp, CARD_HEIGHT, CARD_WIDTH};
pub use threshold::{preprocess, PreprocessMode};

#[cfg(feature = "postgres")]
pub use catalog::PgCatalog;

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn sample_photo() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(800, 600, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x / 3) % 256) as u8])
        }))
    }

    /// Integration test: detect, index, identify.
    #[tokio::test]
    async fn full_identification_workflow() {
        let photo = sample_photo();
        let set = detect(&photo).expect("detection failed");

        let mut catalog = MemoryCatalog::new();
        catalog.insert("https://scryfall.com/card/a", set.original);
        catalog.insert("https://scryfall.com/card/b", PerceptualHash::from_u128(42));

        let found = identify(&photo, &catalog).await.expect("identify failed");
        assert_eq!(found.uri, "https://scryfall.com/card/a");
        assert_eq!(found.distance, HashDistance::ZERO);
    }

    /// Distinct structured images must not collide on every variant.
    #[tokio::test]
    async fn different_images_produce_different_fingerprints() {
        let a = detect(&sample_photo()).expect("detection failed");
        let b = detect(&DynamicImage::ImageRgb8(RgbImage::from_fn(
            800,
            600,
            |x, y| {
                if (x / 40 + y / 40) % 2 == 0 {
                    Rgb([240, 240, 240])
                } else {
                    Rgb([10, 10, 10])
                }
            },
        )))
        .expect("detection failed");

        assert_ne!(a, b);
    }
}
