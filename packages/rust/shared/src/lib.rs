//! Shared types, error model, and configuration for deepnotes.
//!
//! This crate is the foundation depended on by all other deepnotes crates.
//! It provides:
//! - [`DeepNotesError`]: the unified error type
//! - Domain types ([`RemoteDocument`], [`ContentBlock`], [`StyledRun`], [`NavNode`])
//! - Configuration ([`AppConfig`], config loading, credential resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, NotionConfig, NotionCredentials, SiteConfig, init_config,
    load_config, load_config_from, resolve_credentials, resolve_credentials_with,
};
pub use error::{DeepNotesError, Result};
pub use types::{
    ContentBlock, DocumentProperties, NavNode, PageSummary, RemoteDocument, StyledRun,
};
