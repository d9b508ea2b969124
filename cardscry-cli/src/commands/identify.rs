//! Identify command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::info;

use cardscry_core::{detect, rank_variants, PgCatalog, ScryError};

use crate::utils::{read_image, resolve_database_url};

/// Execute the identify command.
///
/// Detection runs before the database connection: a photo with no usable
/// fingerprint never touches the catalog.
pub async fn execute(file: PathBuf, database_url: Option<String>, quiet: bool) -> Result<()> {
    let database_url = resolve_database_url(database_url)?;

    let image = read_image(&file)?;

    let set = match detect(&image) {
        Ok(set) => set,
        Err(ScryError::HashComputation) => {
            if !quiet {
                eprintln!("{}", "No card detected in the photo".red().bold());
            }
            bail!("No card detected in {}", file.display());
        }
        Err(e) => return Err(e).context("Fingerprint detection failed"),
    };

    let catalog = PgCatalog::connect(&database_url)
        .await
        .context("Failed to connect to the card database")?;

    let matches = rank_variants(&set, &catalog)
        .await
        .context("Catalog lookup failed")?;

    let best_index = matches
        .iter()
        .enumerate()
        .min_by_key(|(_, m)| (m.distance, m.variant))
        .map(|(index, _)| index)
        .context("Catalog returned no candidates")?;
    let best = &matches[best_index];

    catalog.close().await;

    info!(uri = %best.uri, variant = %best.variant, distance = %best.distance, "Card identified");

    if quiet {
        println!("{}", best.uri);
        return Ok(());
    }

    println!();
    println!("{}", "Nearest card by variant".bold());
    for (index, m) in matches.iter().enumerate() {
        let marker = if index == best_index { "→" } else { " " };
        println!(
            "  {} {:<11} {:>8}  {}",
            marker,
            m.variant.label(),
            m.distance.to_string(),
            m.uri.dimmed()
        );
    }

    println!();
    println!("{} {}", "Best match:".green().bold(), best.uri);

    Ok(())
}
