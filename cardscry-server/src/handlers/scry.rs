//! Card identification handler
//!
//! Accepts a multipart-uploaded card photo, computes its fingerprint set and
//! answers with the Scryfall URI of the numerically closest catalog entry.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use cardscry_core::{best_match, detect_bytes};

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;

/// Response for a successful identification
#[derive(Serialize, ToSchema)]
pub struct ScryResponse {
    /// Scryfall URI of the closest matching card
    #[schema(example = "https://scryfall.com/card/mh2/186/urza-s-saga")]
    pub uri: String,
}

/// POST /scry - Identify a card from a photo
///
/// Upload an image in the `file` field of a multipart form. The server
/// fingerprints the photo under five preprocessing variants, ranks the
/// catalog by numeric hash distance and returns the closest card's URI.
#[utoipa::path(
    post,
    path = "/scry",
    tag = "Identification",
    request_body(content_type = "multipart/form-data", description = "Card photo in the `file` field"),
    responses(
        (status = 200, description = "Closest catalog match", body = ScryResponse),
        (status = 400, description = "Missing file or undecodable image"),
        (status = 422, description = "No card fingerprint could be computed"),
        (status = 503, description = "Card catalog unavailable")
    )
)]
pub async fn scry_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScryResponse>, ApiError> {
    let catalog = state
        .catalog
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Card catalog not configured"))?;

    let fields = MultipartFields::parse(&mut multipart, true, state.max_file_size).await?;
    let file = fields.require_file()?;

    let set = detect_bytes(&file.data)?;
    let found = best_match(&set, catalog.as_ref()).await?;

    tracing::info!(
        uri = %found.uri,
        variant = %found.variant,
        distance = %found.distance,
        "card identified"
    );

    Ok(Json(ScryResponse { uri: found.uri }))
}
