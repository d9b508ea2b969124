//! Crop command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use cardscry_core::{
    preprocess, resize_to_width, segmentation, PreprocessMode, CARD_HEIGHT, CARD_WIDTH,
    TARGET_WIDTH,
};

use crate::utils::read_image;

/// Build the crop output path from the input path: `scan.jpg` -> `scan-crop.png`.
fn default_output(file: &Path) -> PathBuf {
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("card");
    file.with_file_name(format!("{stem}-crop.png"))
}

/// Execute the crop command.
pub async fn execute(
    file: PathBuf,
    output: Option<PathBuf>,
    mode: PreprocessMode,
    quiet: bool,
) -> Result<()> {
    let image = read_image(&file)?;

    // Segmentation runs on the binarized image and crops from the resized
    // original; both must share dimensions, so resize once up front.
    let resized = resize_to_width(&image, TARGET_WIDTH)?;
    let binary = preprocess(&resized, mode)?;
    let cropped = segmentation(&binary, &resized.to_rgb8())
        .with_context(|| format!("No card outline found in {}", file.display()))?;

    let output = output.unwrap_or_else(|| default_output(&file));
    cropped
        .save(&output)
        .with_context(|| format!("Failed to save cropped card: {}", output.display()))?;

    info!(path = %output.display(), mode = mode.as_str(), "Crop saved");

    if !quiet {
        println!();
        println!("{}", "Card cropped".green().bold());
        println!("   {} {}", "Saved:".dimmed(), output.display());
        println!("   {} {}x{} px", "Size:".dimmed(), CARD_WIDTH, CARD_HEIGHT);
        println!("   {} {}", "Mode:".dimmed(), mode.as_str());
    }

    Ok(())
}
