//! Cardscry Server Library
//!
//! REST API components for trading-card identification. Exposes the router,
//! application state and configuration so integration tests and the binary
//! share one wiring.

pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_config};
pub use state::AppState;
