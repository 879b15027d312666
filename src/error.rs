//! # Error Handling
//!
//! This module defines the centralized error type for the `dmrfill` library.
//! It uses the `thiserror` library to build a single `Error` enum covering
//! every fatal failure mode of a run, each carrying enough context to produce
//! a useful message on stderr.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum for all fatal errors. Recoverable problems
//!   (a repeater with an unparsable frequency, a bad tone, an invalid
//!   timeslot) are never represented here; they are logged and skipped by the
//!   synthesizer.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The fatal failure scenarios are:
//!
//! - Codeplug decoding and encoding errors.
//! - Filter clause parsing errors.
//! - Invalid run configuration.
//! - Network errors while querying a directory service.
//! - Response decoding errors.
//! - Location lookup failures.
//! - Response cache errors.
//! - I/O, YAML, JSON and URL errors wrapped from their libraries.

use thiserror::Error;

/// Main error type for dmrfill operations
#[derive(Error, Debug)]
pub enum Error {
    /// The input codeplug could not be decoded.
    #[error("Codeplug parsing error: {message}")]
    CodeplugParse { message: String },

    /// A filter clause did not have the `key=value[,value...]` shape.
    #[error("Invalid filter expression '{clause}': {message}")]
    InvalidFilter { clause: String, message: String },

    /// The run configuration is inconsistent or unsupported.
    ///
    /// Optionally carries a hint about how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration
        hint: Option<String>,
    },

    /// A request to a directory service failed.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// A directory service returned a body that could not be decoded.
    #[error("Response decoding error from {service}: {message}")]
    Decode { service: String, message: String },

    /// A location search returned no results.
    #[error("No location found for '{query}'")]
    LocationNotFound { query: String },

    /// An error occurred with a response cache operation.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
