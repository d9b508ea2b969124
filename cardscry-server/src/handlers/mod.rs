//! HTTP request handlers

pub mod health;
pub mod scry;

pub use crate::state::AppState;
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use scry::{scry_handler, ScryResponse};
