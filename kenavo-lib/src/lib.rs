//! Core library for the Kenavo alumni directory.
//!
//! Holds the alumni [`Profile`](directory::Profile) model and the pipeline that turns a
//! fetched snapshot into the searched, filtered and letter-indexed view the directory
//! renders, plus the paginated [`PageLoader`](gallery::PageLoader) used by the gallery.

use thiserror::Error;

pub mod api;
pub mod config;
pub mod directory;
pub mod fs;
pub mod gallery;

pub use api::ApiClient;
pub use config::{Cfg, CoreConfig};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("Configuration value `{0}` is not set")]
    MissingConfig(&'static str),
    #[error("Could not determine the configuration home directory")]
    NoConfigHome,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request to {url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("Failed to load page: {0}")]
    PageLoad(String),
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to encode output: {0}")]
    Encode(serde_json::Error),
    #[error("Unknown filter category `{0}`")]
    UnknownFacet(String),
    #[error("Unknown search field `{0}`")]
    UnknownSearchField(String),
    #[error("A profile name must not be empty")]
    EmptyName,
}
