//! Exit codes following sysexits.h conventions.
//!
//! These codes give scripts and CI systems a way to distinguish failure
//! modes without parsing error text.

#![allow(dead_code)] // Constants may be used in future or for documentation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data error (no card detected, undecodable image).
/// Maps to EX_DATAERR from sysexits.h.
pub const DETECTION_FAILED: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Service unavailable (feed, image download, card catalog).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify error by inspecting the chain
        let code = if message.contains("Failed to read file") {
            INPUT_ERROR
        } else if message.contains("No database URL") {
            USAGE_ERROR
        } else if message.contains("No card detected")
            || message.contains("Failed to decode image")
            || message.contains("geometry error")
        {
            DETECTION_FAILED
        } else if message.contains("catalog")
            || message.contains("database")
            || message.contains("bulk")
            || message.contains("fetch")
        {
            NETWORK_ERROR
        } else if message.contains("Failed to write") || message.contains("Failed to save") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
