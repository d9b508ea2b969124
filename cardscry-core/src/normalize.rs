//! Image normalization: aspect-preserving resize and local contrast
//! equalization.
//!
//! Every analyzed image is first brought to a fixed working width, then its
//! luminance channel is equalized with CLAHE (clip limit 2.0, 8×8 tiles)
//! while chrominance passes through untouched.

use image::{imageops::FilterType, DynamicImage, Rgb, RgbImage};
use palette::{Clamp, FromColor, Lab, Srgb};

use crate::error::{Result, ScryError};

/// Working width every analyzed image is resized to before hashing.
pub const TARGET_WIDTH: u32 = 800;

const CLIP_LIMIT: f32 = 2.0;
const TILE_GRID: usize = 8;

/// Resize to `target_width`, recomputing height to preserve aspect ratio.
///
/// Shrinking uses a triangle filter with scaled support, which averages the
/// source area covered by each output pixel. An image already at the target
/// width passes through unchanged.
pub fn resize_to_width(image: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || target_width == 0 {
        return Err(ScryError::InvalidDimensions { width, height });
    }
    if width == target_width {
        return Ok(image.clone());
    }
    let new_height =
        ((height as f64 * target_width as f64 / width as f64).round() as u32).max(1);
    Ok(image.resize_exact(target_width, new_height, FilterType::Triangle))
}

/// Resize to `target_height`, deriving width symmetrically.
pub fn resize_to_height(image: &DynamicImage, target_height: u32) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || target_height == 0 {
        return Err(ScryError::InvalidDimensions { width, height });
    }
    if height == target_height {
        return Ok(image.clone());
    }
    let new_width =
        ((width as f64 * target_height as f64 / height as f64).round() as u32).max(1);
    Ok(image.resize_exact(new_width, target_height, FilterType::Triangle))
}

/// Equalize local contrast on the luminance channel only.
///
/// Converts sRGB to CIE L*a*b*, runs CLAHE on L (quantized to 8 bits with
/// the usual 0..100 → 0..255 scaling), recombines with the original a/b
/// chrominance, and converts back to sRGB.
pub fn equalize(image: &DynamicImage) -> RgbImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixel_count = (width as usize) * (height as usize);

    let mut luminance = vec![0u8; pixel_count];
    let mut chroma = vec![(0f32, 0f32); pixel_count];

    for (i, px) in rgb.pixels().enumerate() {
        let lab = Lab::from_color(Srgb::new(px[0], px[1], px[2]).into_format::<f32>());
        luminance[i] = (lab.l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
        chroma[i] = (lab.a, lab.b);
    }

    let equalized = clahe(
        &luminance,
        width as usize,
        height as usize,
        TILE_GRID,
        TILE_GRID,
        CLIP_LIMIT,
    );

    let mut out = RgbImage::new(width, height);
    for (i, px) in out.pixels_mut().enumerate() {
        let l = equalized[i] as f32 * 100.0 / 255.0;
        let (a, b) = chroma[i];
        let srgb = Srgb::from_color(Lab::new(l, a, b)).clamp().into_format::<u8>();
        *px = Rgb([srgb.red, srgb.green, srgb.blue]);
    }
    out
}

/// Contrast-limited adaptive histogram equalization on one 8-bit plane.
///
/// Per-tile clipped histogram (clip at `clip_limit * tile_pixels / 256`,
/// minimum 1), uniform redistribution of the clipped excess, CDF lookup
/// table per tile, bilinear interpolation between the four surrounding tile
/// maps for every pixel. Planes smaller than one tile pass through
/// unchanged.
fn clahe(
    plane: &[u8],
    width: usize,
    height: usize,
    tiles_x: usize,
    tiles_y: usize,
    clip_limit: f32,
) -> Vec<u8> {
    if width == 0 || height == 0 || tiles_x == 0 || tiles_y == 0 {
        return plane.to_vec();
    }
    let tile_w = width / tiles_x;
    let tile_h = height / tiles_y;
    if tile_w == 0 || tile_h == 0 {
        return plane.to_vec();
    }

    let mut maps = vec![[0u8; 256]; tiles_x * tiles_y];

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            // the last tile row/column absorbs the division remainder
            let x1 = if tx == tiles_x - 1 { width } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { height } else { y0 + tile_h };
            let tile_pixels = (x1 - x0) * (y1 - y0);

            let mut hist = [0u32; 256];
            for row in y0..y1 {
                for col in x0..x1 {
                    hist[plane[row * width + col] as usize] += 1;
                }
            }

            let clip = ((clip_limit * tile_pixels as f32 / 256.0) as u32).max(1);
            let mut excess = 0u32;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            // uniform redistribution: a share for every bin, the residue
            // spread with a stride across the whole range
            let per_bin = excess / 256;
            for bin in hist.iter_mut() {
                *bin += per_bin;
            }
            let mut residual = (excess % 256) as usize;
            if residual > 0 {
                let step = (256 / residual).max(1);
                let mut i = 0;
                while i < 256 && residual > 0 {
                    hist[i] += 1;
                    residual -= 1;
                    i += step;
                }
            }

            let scale = 255.0 / tile_pixels as f32;
            let map = &mut maps[ty * tiles_x + tx];
            let mut sum = 0u32;
            for i in 0..256 {
                sum += hist[i];
                map[i] = ((sum as f32 * scale).round() as u32).min(255) as u8;
            }
        }
    }

    let mut result = vec![0u8; width * height];
    let tile_wf = tile_w as f32;
    let tile_hf = tile_h as f32;

    for y in 0..height {
        for x in 0..width {
            let value = plane[y * width + x] as usize;

            let fx = (x as f32 + 0.5) / tile_wf - 0.5;
            let fy = (y as f32 + 0.5) / tile_hf - 0.5;

            let tx0 = (fx.floor() as i32).clamp(0, tiles_x as i32 - 1) as usize;
            let tx1 = (fx.floor() as i32 + 1).clamp(0, tiles_x as i32 - 1) as usize;
            let ty0 = (fy.floor() as i32).clamp(0, tiles_y as i32 - 1) as usize;
            let ty1 = (fy.floor() as i32 + 1).clamp(0, tiles_y as i32 - 1) as usize;

            let ax = fx - fx.floor();
            let ay = fy - fy.floor();

            let v00 = maps[ty0 * tiles_x + tx0][value] as f32;
            let v10 = maps[ty0 * tiles_x + tx1][value] as f32;
            let v01 = maps[ty1 * tiles_x + tx0][value] as f32;
            let v11 = maps[ty1 * tiles_x + tx1][value] as f32;

            let top = v00 * (1.0 - ax) + v10 * ax;
            let bottom = v01 * (1.0 - ax) + v11 * ax;
            result[y * width + x] =
                (top * (1.0 - ay) + bottom * ay).round().clamp(0.0, 255.0) as u8;
        }
    }

    result
}
