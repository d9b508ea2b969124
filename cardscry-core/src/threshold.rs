//! Grayscale preprocessing: the four binarization modes fed to the hash
//! ensemble.

use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::error::{Result, ScryError};
use crate::normalize::{equalize, resize_to_width, TARGET_WIDTH};

/// Fixed cutoff for the `binary` mode.
pub const FIXED_THRESHOLD: u8 = 70;
/// Neighborhood edge length for the `adaptive` mode.
pub const ADAPTIVE_BLOCK: usize = 11;
/// Offset subtracted from the local weighted mean in the `adaptive` mode.
pub const ADAPTIVE_OFFSET: f32 = 10.0;

const BLUR_KERNEL: usize = 3;

/// The binarization modes. No other value exists; strings are parsed only
/// at CLI/API boundaries via [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreprocessMode {
    Otsu,
    Binary,
    BinaryOtsu,
    Adaptive,
}

impl PreprocessMode {
    pub const ALL: [PreprocessMode; 4] = [
        PreprocessMode::Otsu,
        PreprocessMode::Binary,
        PreprocessMode::BinaryOtsu,
        PreprocessMode::Adaptive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreprocessMode::Otsu => "otsu",
            PreprocessMode::Binary => "binary",
            PreprocessMode::BinaryOtsu => "binary_otsu",
            PreprocessMode::Adaptive => "adaptive",
        }
    }
}

impl FromStr for PreprocessMode {
    type Err = ScryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "otsu" => Ok(PreprocessMode::Otsu),
            "binary" => Ok(PreprocessMode::Binary),
            "binary_otsu" => Ok(PreprocessMode::BinaryOtsu),
            "adaptive" => Ok(PreprocessMode::Adaptive),
            other => Err(ScryError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for PreprocessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full preprocessing for one mode: resize → equalize → grayscale → 3×3
/// Gaussian blur → binarize.
///
/// Output is single-channel with the same spatial size as the resized
/// input.
pub fn preprocess(image: &DynamicImage, mode: PreprocessMode) -> Result<GrayImage> {
    let resized = resize_to_width(image, TARGET_WIDTH)?;
    let equalized = equalize(&resized);
    let gray = DynamicImage::ImageRgb8(equalized).to_luma8();
    let blurred = gaussian_blur(&gray, BLUR_KERNEL);
    Ok(binarize(&blurred, mode))
}

/// Binarize an already blurred grayscale image.
pub fn binarize(gray: &GrayImage, mode: PreprocessMode) -> GrayImage {
    match mode {
        PreprocessMode::Otsu => {
            let level = otsu_level(gray);
            threshold(gray, level, ThresholdType::Binary)
        }
        PreprocessMode::Binary => threshold(gray, FIXED_THRESHOLD, ThresholdType::Binary),
        PreprocessMode::BinaryOtsu => {
            // the automatic level supersedes the fixed 70 when refinement
            // is requested alongside it
            let level = otsu_level(gray);
            threshold(gray, level, ThresholdType::Binary)
        }
        PreprocessMode::Adaptive => adaptive_gaussian(gray, ADAPTIVE_BLOCK, ADAPTIVE_OFFSET),
    }
}

/// Gaussian blur with an OpenCV-convention kernel, rounded back to u8.
pub fn gaussian_blur(gray: &GrayImage, ksize: usize) -> GrayImage {
    let kernel = gaussian_kernel(ksize);
    let blurred = separable_filter(gray, &kernel);
    let w = gray.width() as usize;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = blurred[y as usize * w + x as usize];
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Local Gaussian-weighted threshold: foreground where the pixel exceeds
/// the neighborhood's weighted mean minus `offset`.
pub fn adaptive_gaussian(gray: &GrayImage, block: usize, offset: f32) -> GrayImage {
    let kernel = gaussian_kernel(block);
    let means = separable_filter(gray, &kernel);
    let w = gray.width() as usize;
    let raw = gray.as_raw();
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let i = y as usize * w + x as usize;
        if raw[i] as f32 > means[i] - offset {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Separable Gaussian kernel following the OpenCV conventions the pipeline
/// parameters were tuned against: the 3-tap kernel is the fixed
/// [0.25, 0.5, 0.25]; larger sizes use
/// `sigma = 0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    if ksize == 3 {
        return vec![0.25, 0.5, 0.25];
    }
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (ksize / 2) as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Two-pass separable convolution, f32 accumulation, replicate-clamped
/// borders.
fn separable_filter(gray: &GrayImage, kernel: &[f32]) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    let half = (kernel.len() / 2) as i32;
    let raw = gray.as_raw();

    let mut horizontal = vec![0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                let sx = (x as i32 + k as i32 - half).clamp(0, w as i32 - 1) as usize;
                acc += raw[y * w + sx] as f32 * kv;
            }
            horizontal[y * w + x] = acc;
        }
    }

    let mut out = vec![0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                let sy = (y as i32 + k as i32 - half).clamp(0, h as i32 - 1) as usize;
                acc += horizontal[sy * w + x] * kv;
            }
            out[y * w + x] = acc;
        }
    }
    out
}
