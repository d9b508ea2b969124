//! Ingest command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, info, warn};

use cardscry_core::{hash_image, NewCard, PgCatalog};

use crate::feed::{self, CardRecord};
use crate::utils::resolve_database_url;

/// Execute the ingest command.
pub async fn execute(
    feed_url: String,
    bulk_type: String,
    database_url: Option<String>,
    limit: Option<usize>,
    quiet: bool,
) -> Result<()> {
    let database_url = resolve_database_url(database_url)?;

    let catalog = PgCatalog::connect(&database_url)
        .await
        .context("Failed to connect to the card database")?;

    let client = feed::client()?;

    info!(feed_url = %feed_url, bulk_type = %bulk_type, "Fetching bulk data index");
    let download_uri = feed::bulk_download_uri(&client, &feed_url, &bulk_type).await?;

    info!(uri = %download_uri, "Downloading card records");
    let records = feed::download_records(&client, &download_uri).await?;

    let total = records.len();
    if !quiet {
        println!("Fetched {} card records", total.to_string().cyan());
    }

    let mut ingested = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (index, record) in records.iter().enumerate() {
        if let Some(limit) = limit {
            if ingested >= limit {
                info!(limit, "Ingest limit reached");
                break;
            }
        }

        if !record.is_ingestible() {
            skipped += 1;
            continue;
        }

        match ingest_one(&client, &catalog, record).await {
            Ok(()) => {
                ingested += 1;
                if ingested % 50 == 0 {
                    info!(ingested, total, "Ingest progress");
                    if !quiet {
                        println!("  {} {}/{}", "indexed".dimmed(), ingested, total);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                warn!(index, name = %record.name, error = %e, "Skipping card");
            }
        }
    }

    catalog.close().await;

    if !quiet {
        println!();
        println!("{}", "Ingest complete".green().bold());
        println!("   {} {}", "Indexed:".dimmed(), ingested.to_string().green());
        println!("   {} {}", "Skipped:".dimmed(), skipped);
        println!("   {} {}", "Failed:".dimmed(), failed);
    }

    Ok(())
}

/// Download, fingerprint and store a single card record.
async fn ingest_one(
    client: &reqwest::Client,
    catalog: &PgCatalog,
    record: &CardRecord,
) -> Result<()> {
    let uri = record
        .best_image_uri()
        .context("Record has no usable image URI")?;

    let bytes = feed::fetch_image(client, uri).await?;
    let image = image::load_from_memory(&bytes).context("Failed to decode card image")?;
    let phash = hash_image(&image).context("Failed to fingerprint card image")?;

    let id = catalog
        .insert(&NewCard {
            scryfall_id: &record.id,
            name: &record.name,
            set_code: &record.set_code,
            collector_number: &record.collector_number,
            lang: &record.lang,
            image_uri: uri,
            scryfall_uri: &record.scryfall_uri,
            phash: &phash,
        })
        .await
        .context("Failed to store card fingerprint")?;

    debug!(id, name = %record.name, "Card indexed");
    Ok(())
}
