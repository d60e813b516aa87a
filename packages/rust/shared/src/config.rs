//! Application configuration for deepnotes.
//!
//! Config lives next to the MkDocs project in `deepnotes.toml`. Every key
//! has a default, so a missing file is equivalent to an empty one.
//! Secrets never go in the file: it only names the environment variables
//! that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DeepNotesError, Result};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "deepnotes.toml";

// ---------------------------------------------------------------------------
// Config structs (matching deepnotes.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Notion API settings.
    #[serde(default)]
    pub notion: NotionConfig,

    /// Local MkDocs site layout.
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[notion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Name of the env var holding the integration token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Name of the env var holding the database ID.
    #[serde(default = "default_database_id_env")]
    pub database_id_env: String,

    /// API root, including the version path segment.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Value sent in the `Notion-Version` header.
    #[serde(default = "default_version")]
    pub version: String,

    /// Select property used to filter finished pages.
    #[serde(default = "default_status_property")]
    pub status_property: String,

    /// Select option marking a page as ready to publish.
    #[serde(default = "default_completed_status")]
    pub completed_status: String,

    /// Page size for paginated endpoints (Notion caps this at 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            database_id_env: default_database_id_env(),
            base_url: default_base_url(),
            version: default_version(),
            status_property: default_status_property(),
            completed_status: default_completed_status(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "NOTION_API_KEY".into()
}
fn default_database_id_env() -> String {
    "NOTION_DATABASE_ID".into()
}
fn default_base_url() -> Url {
    Url::parse("https://api.notion.com/v1").expect("valid default URL")
}
fn default_version() -> String {
    "2022-06-28".into()
}
fn default_status_property() -> String {
    "Status".into()
}
fn default_completed_status() -> String {
    "Completed".into()
}
fn default_page_size() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// MkDocs `docs_dir` that synced notes are written into.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// MkDocs config file whose `nav` key is regenerated.
    #[serde(default = "default_mkdocs_config")]
    pub mkdocs_config: PathBuf,

    /// Label of the single top-level navigation group.
    #[serde(default = "default_nav_root_label")]
    pub nav_root_label: String,

    /// Label of the optional link back to an external home page.
    #[serde(default = "default_home_label")]
    pub home_label: String,

    /// External home page; when set it becomes the first nav entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            mkdocs_config: default_mkdocs_config(),
            nav_root_label: default_nav_root_label(),
            home_label: default_home_label(),
            home_url: None,
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("notes")
}
fn default_mkdocs_config() -> PathBuf {
    PathBuf::from("mkdocs.yml")
}
fn default_nav_root_label() -> String {
    "Deep Notes".into()
}
fn default_home_label() -> String {
    "Home".into()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Notion credentials resolved from the environment.
#[derive(Clone)]
pub struct NotionCredentials {
    /// Integration token sent as a bearer token.
    pub api_key: String,
    /// ID of the database holding the notes.
    pub database_id: String,
}

impl std::fmt::Debug for NotionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionCredentials")
            .field("api_key", &"<redacted>")
            .field("database_id", &self.database_id)
            .finish()
    }
}

/// Read the Notion token and database ID from the process environment.
pub fn resolve_credentials(config: &NotionConfig) -> Result<NotionCredentials> {
    resolve_credentials_with(config, |name| std::env::var(name).ok())
}

/// Resolve credentials through an arbitrary variable lookup.
///
/// Both variables must be set and non-empty; the error names both so the
/// user can fix everything in one go.
pub fn resolve_credentials_with(
    config: &NotionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<NotionCredentials> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    match (get(&config.api_key_env), get(&config.database_id_env)) {
        (Some(api_key), Some(database_id)) => Ok(NotionCredentials {
            api_key,
            database_id,
        }),
        _ => Err(DeepNotesError::config(format!(
            "missing {} or {}; set both environment variables",
            config.api_key_env, config.database_id_env
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load `deepnotes.toml` from the given path, or defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DeepNotesError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DeepNotesError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file at `path`, refusing to clobber an existing one.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(DeepNotesError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DeepNotesError::Serialize(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DeepNotesError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}
