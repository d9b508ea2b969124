//! Five-variant fingerprint detection.
//!
//! One fingerprint comes from the resized original, four more from the
//! binarized variants. The set is all-or-nothing: a failure in any member
//! collapses the whole detection, so downstream code never sees a partial
//! set.

use std::fmt;

use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};

use crate::error::{Result, ScryError};
use crate::normalize::{resize_to_width, TARGET_WIDTH};
use crate::phash::{PerceptualHash, HASH_GRID_SIZE};
use crate::threshold::{preprocess, PreprocessMode};

/// One member of the fingerprint ensemble.
///
/// Declaration order is match priority: ties between variants resolve
/// toward the smaller discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    Original,
    Otsu,
    BinaryOtsu,
    Binary,
    Adaptive,
}

impl Variant {
    /// All variants in priority order.
    pub const ALL: [Variant; 5] = [
        Variant::Original,
        Variant::Otsu,
        Variant::BinaryOtsu,
        Variant::Binary,
        Variant::Adaptive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Variant::Original => "original",
            Variant::Otsu => "otsu",
            Variant::BinaryOtsu => "binary_otsu",
            Variant::Binary => "binary",
            Variant::Adaptive => "adaptive",
        }
    }
}

impl From<PreprocessMode> for Variant {
    fn from(mode: PreprocessMode) -> Self {
        match mode {
            PreprocessMode::Otsu => Variant::Otsu,
            PreprocessMode::Binary => Variant::Binary,
            PreprocessMode::BinaryOtsu => Variant::BinaryOtsu,
            PreprocessMode::Adaptive => Variant::Adaptive,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five fingerprints of a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintSet {
    pub original: PerceptualHash,
    pub otsu: PerceptualHash,
    pub binary_otsu: PerceptualHash,
    pub binary: PerceptualHash,
    pub adaptive: PerceptualHash,
}

impl FingerprintSet {
    pub fn get(&self, variant: Variant) -> PerceptualHash {
        match variant {
            Variant::Original => self.original,
            Variant::Otsu => self.otsu,
            Variant::BinaryOtsu => self.binary_otsu,
            Variant::Binary => self.binary,
            Variant::Adaptive => self.adaptive,
        }
    }

    /// Iterate fingerprints in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Variant, PerceptualHash)> + '_ {
        Variant::ALL.iter().map(move |&v| (v, self.get(v)))
    }
}

fn hasher() -> Hasher {
    HasherConfig::new()
        .hash_size(HASH_GRID_SIZE, HASH_GRID_SIZE)
        .hash_alg(HashAlg::Median)
        .preproc_dct()
        .to_hasher()
}

/// Hash one image: DCT-median perceptual hash over a 16×16 grid, read as a
/// 256-bit big-endian integer.
pub fn hash_image(image: &DynamicImage) -> Result<PerceptualHash> {
    let hash = hasher().hash_image(image);
    PerceptualHash::from_slice(hash.as_bytes())
}

/// Compute the full fingerprint set for an already decoded image.
///
/// Any internal failure collapses to `ScryError::HashComputation`; the
/// underlying cause goes to the debug log only.
pub fn detect(image: &DynamicImage) -> Result<FingerprintSet> {
    compute_set(image).map_err(|e| {
        tracing::debug!(error = %e, "fingerprint detection failed");
        ScryError::HashComputation
    })
}

/// Decode raw bytes, then detect.
///
/// Undecodable input surfaces as `ScryError::Decode`, distinct from a
/// detection failure on a valid image.
pub fn detect_bytes(bytes: &[u8]) -> Result<FingerprintSet> {
    let image = image::load_from_memory(bytes)?;
    detect(&image)
}

fn compute_set(image: &DynamicImage) -> Result<FingerprintSet> {
    let resized = resize_to_width(image, TARGET_WIDTH)?;
    let original = hash_image(&resized)?;
    let otsu = hash_mode(&resized, PreprocessMode::Otsu)?;
    let binary_otsu = hash_mode(&resized, PreprocessMode::BinaryOtsu)?;
    let binary = hash_mode(&resized, PreprocessMode::Binary)?;
    let adaptive = hash_mode(&resized, PreprocessMode::Adaptive)?;
    Ok(FingerprintSet {
        original,
        otsu,
        binary_otsu,
        binary,
        adaptive,
    })
}

fn hash_mode(resized: &DynamicImage, mode: PreprocessMode) -> Result<PerceptualHash> {
    let bilevel = preprocess(resized, mode)?;
    hash_image(&DynamicImage::ImageLuma8(bilevel))
}
