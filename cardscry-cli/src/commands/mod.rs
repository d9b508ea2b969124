//! CLI command implementations.

pub mod crop;
pub mod hash;
pub mod identify;
pub mod ingest;
