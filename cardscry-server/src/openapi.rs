//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification served by Swagger UI at /docs.

use utoipa::OpenApi;

/// Main OpenAPI documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cardscry API",
        version = "0.1.0",
        description = r#"
REST API for trading-card identification by perceptual fingerprints.

## Features

- **Five-variant fingerprint ensemble**: every photo is hashed as-is plus under
  four binarization modes (Otsu, fixed binary, binary-Otsu, adaptive)
- **Numeric nearest match**: catalog entries are ranked by the plain numeric
  distance between 256-bit perceptual hashes
- **Scryfall catalog**: card records and fingerprints ingested from Scryfall
  bulk data into PostgreSQL

## How It Works

1. Ingest a card catalog with the `cardscry ingest` CLI command
2. POST a card photo to `/scry` as multipart form data
3. Receive the Scryfall URI of the closest matching card
"#,
        license(
            name = "MIT OR Apache-2.0",
            url = "https://github.com/cardscry/cardscry/blob/main/LICENSE"
        ),
        contact(name = "Cardscry Team")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Identification", description = "Card identification from photos"),
        (name = "Health", description = "Service health and readiness")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::scry::scry_handler,
    ),
    components(schemas(
        crate::handlers::health::HealthResponse,
        crate::handlers::health::ReadyResponse,
        crate::handlers::scry::ScryResponse,
    ))
)]
pub struct ApiDoc;
