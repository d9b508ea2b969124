//! Common helpers shared across CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;

/// Resolve the database URL from a flag or the `DATABASE_URL` environment
/// variable, flag first.
pub fn resolve_database_url(flag: Option<String>) -> Result<String> {
    if let Some(url) = flag.filter(|url| !url.is_empty()) {
        return Ok(url);
    }

    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .context("No database URL. Pass --database-url or set DATABASE_URL")
}

/// Read and decode an image file.
pub fn read_image(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode image: {}", path.display()))
}
