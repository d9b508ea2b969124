//! Scryfall bulk data feed client.
//!
//! The feed is a two-step download: an index of bulk entries, then the
//! actual card payload behind the selected entry's `download_uri`. Card
//! records carry print metadata plus a set of image URIs at several sizes.

use anyhow::{Context, Result};
use serde::Deserialize;

const USER_AGENT: &str = concat!("cardscry/", env!("CARGO_PKG_VERSION"));

/// Top-level bulk data index.
#[derive(Debug, Deserialize)]
pub struct BulkIndex {
    pub data: Vec<BulkEntry>,
}

/// One downloadable bulk payload in the index.
#[derive(Debug, Deserialize)]
pub struct BulkEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub download_uri: String,
}

/// Image URIs at the sizes the feed publishes.
#[derive(Debug, Deserialize)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
}

/// One card print from the bulk payload.
#[derive(Debug, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    pub lang: String,
    #[serde(rename = "set")]
    pub set_code: String,
    pub collector_number: String,
    pub scryfall_uri: String,
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub image_status: String,
    pub image_uris: Option<ImageUris>,
}

impl CardRecord {
    /// Cards worth indexing: physical prints with a finished
    /// high-resolution scan and at least one image URI.
    pub fn is_ingestible(&self) -> bool {
        !self.digital && self.image_status == "highres_scan" && self.image_uris.is_some()
    }

    /// Best available image URI: large, then normal, then small.
    pub fn best_image_uri(&self) -> Option<&str> {
        let uris = self.image_uris.as_ref()?;
        uris.large
            .as_deref()
            .or(uris.normal.as_deref())
            .or(uris.small.as_deref())
            .filter(|uri| !uri.is_empty())
    }
}

/// HTTP client with the feed's required User-Agent.
pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch the bulk index and return the download URI of the requested entry.
pub async fn bulk_download_uri(
    client: &reqwest::Client,
    feed_url: &str,
    bulk_type: &str,
) -> Result<String> {
    let index: BulkIndex = client
        .get(feed_url)
        .send()
        .await
        .context("Failed to fetch bulk data index")?
        .error_for_status()
        .context("Bulk data index request rejected")?
        .json()
        .await
        .context("Failed to parse bulk data index")?;

    index
        .data
        .into_iter()
        .find(|entry| entry.kind == bulk_type)
        .map(|entry| entry.download_uri)
        .with_context(|| format!("No bulk entry of type '{bulk_type}' in the feed"))
}

/// Download and parse the card payload behind a bulk entry.
pub async fn download_records(
    client: &reqwest::Client,
    download_uri: &str,
) -> Result<Vec<CardRecord>> {
    let body = client
        .get(download_uri)
        .send()
        .await
        .context("Failed to fetch bulk card data")?
        .error_for_status()
        .context("Bulk card download rejected")?
        .bytes()
        .await
        .context("Failed to read bulk card data")?;

    serde_json::from_slice(&body).context("Failed to parse bulk card data")
}

/// Fetch one card image.
pub async fn fetch_image(client: &reqwest::Client, uri: &str) -> Result<Vec<u8>> {
    let bytes = client
        .get(uri)
        .send()
        .await
        .with_context(|| format!("Failed to fetch card image: {uri}"))?
        .error_for_status()
        .with_context(|| format!("Card image request rejected: {uri}"))?
        .bytes()
        .await
        .context("Failed to read card image bytes")?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(json: &str) -> CardRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn bulk_index_finds_entry_by_type() {
        let index: BulkIndex = serde_json::from_str(
            r#"{"data": [
                {"type": "oracle_cards", "download_uri": "https://example.com/oracle.json"},
                {"type": "default_cards", "download_uri": "https://example.com/default.json"}
            ]}"#,
        )
        .unwrap();

        let entry = index.data.iter().find(|e| e.kind == "default_cards").unwrap();
        assert_eq!(entry.download_uri, "https://example.com/default.json");
    }

    #[test]
    fn physical_highres_card_is_ingestible() {
        let record = sample_record(
            r#"{
                "id": "0000419b-0bba-4488-8f7a-6194544ce91e",
                "name": "Forest",
                "lang": "en",
                "set": "blb",
                "collector_number": "280",
                "scryfall_uri": "https://scryfall.com/card/blb/280/forest",
                "digital": false,
                "image_status": "highres_scan",
                "image_uris": {"small": "https://img/s.jpg", "normal": "https://img/n.jpg", "large": "https://img/l.jpg"}
            }"#,
        );

        assert!(record.is_ingestible());
        assert_eq!(record.best_image_uri(), Some("https://img/l.jpg"));
    }

    #[test]
    fn digital_prints_are_skipped() {
        let record = sample_record(
            r#"{
                "id": "x", "name": "Arena Forest", "lang": "en", "set": "ana",
                "collector_number": "60", "scryfall_uri": "https://scryfall.com/x",
                "digital": true, "image_status": "highres_scan",
                "image_uris": {"small": null, "normal": "https://img/n.jpg", "large": null}
            }"#,
        );

        assert!(!record.is_ingestible());
    }

    #[test]
    fn lowres_scans_are_skipped() {
        let record = sample_record(
            r#"{
                "id": "x", "name": "Old Card", "lang": "en", "set": "lea",
                "collector_number": "1", "scryfall_uri": "https://scryfall.com/x",
                "digital": false, "image_status": "lowres",
                "image_uris": {"small": "https://img/s.jpg", "normal": null, "large": null}
            }"#,
        );

        assert!(!record.is_ingestible());
    }

    #[test]
    fn image_uri_preference_falls_back_in_order() {
        let record = sample_record(
            r#"{
                "id": "x", "name": "Card", "lang": "ja", "set": "neo",
                "collector_number": "1", "scryfall_uri": "https://scryfall.com/x",
                "digital": false, "image_status": "highres_scan",
                "image_uris": {"small": "https://img/s.jpg", "normal": "https://img/n.jpg", "large": null}
            }"#,
        );

        assert_eq!(record.best_image_uri(), Some("https://img/n.jpg"));
    }

    #[test]
    fn record_without_images_has_no_uri() {
        let record = sample_record(
            r#"{
                "id": "x", "name": "Meld Back", "lang": "en", "set": "bro",
                "collector_number": "1", "scryfall_uri": "https://scryfall.com/x",
                "digital": false, "image_status": "highres_scan",
                "image_uris": null
            }"#,
        );

        assert!(!record.is_ingestible());
        assert_eq!(record.best_image_uri(), None);
    }
}
