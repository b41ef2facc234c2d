//! Configuration primitives for a mediabase install.
//!
//! Stored in a machine-readable TOML file located at:
//!   %APPDATA%/Mediabase/config/config.toml on Windows
//!   $XDG_DATA_HOME/Mediabase/config/config.toml on Linux
//!   ~/Library/Application Support/Mediabase/config/config.toml on macOS
//!
//! The config carries upload limits, the optional post-mutation push
//! command, and the settings the HTTP wrapper reads at startup. All fields
//! are serde-defaulted so a partial or missing file loads cleanly.

use serde::{Deserialize, Serialize};

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Byte limits and counts enforced before an upload touches disk.
    #[serde(default)]
    pub uploads: UploadSettings,
    /// Post-mutation synchronization hook.
    #[serde(default)]
    pub sync: SyncSettings,
    /// Settings consumed by the HTTP wrapper (port, admin credentials).
    #[serde(default)]
    pub server: ServerSettings,
}

/// Upload size limits. Thumbnails and post files share the smaller image
/// limit; generic assets get the larger one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_max_asset_bytes")]
    pub max_asset_bytes: u64,
    /// Maximum number of images accepted in a single post upload.
    #[serde(default = "default_max_post_images")]
    pub max_post_images: u32,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            max_asset_bytes: default_max_asset_bytes(),
            max_post_images: default_max_post_images(),
        }
    }
}

const fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

const fn default_max_asset_bytes() -> u64 {
    50 * 1024 * 1024
}

const fn default_max_post_images() -> u32 {
    50
}

/// Optional shell command run after every successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncSettings {
    #[serde(default)]
    pub push_command: Option<String>,
}

/// Settings the out-of-process HTTP wrapper reads; the `setup` bin fills
/// the credential fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Hex SHA-256 of the admin password.
    #[serde(default)]
    pub admin_password_hash: Option<String>,
    #[serde(default)]
    pub session_secret: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            admin_password_hash: None,
            session_secret: None,
        }
    }
}

const fn default_port() -> u16 {
    3000
}

/// Standard relative path to the config file (resolved per OS at runtime).
pub const CONFIG_FILE_NAME: &str = "config.toml";

use anyhow::{Context, Result};
use directories::BaseDirs;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Returns the root directory where mediabase stores everything.
///
/// Order of precedence:
/// 1. `MEDIABASE_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn library_root() -> Result<PathBuf> {
    if let Ok(path) = env::var("MEDIABASE_HOME") {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("Mediabase"))
}

/// Returns the config directory under the library root.
pub fn config_dir() -> Result<PathBuf> {
    let root = library_root()?;
    Ok(root.join("config"))
}

/// Path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default() -> Result<AppConfig> {
    let path = config_file_path()?;
    if path.exists() {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(cfg)
    } else {
        Ok(AppConfig::default())
    }
}

/// Persists the configuration to disk.
pub fn save(config: &AppConfig) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = config_file_path()?;
    let data = toml::to_string_pretty(config)?;
    fs::write(&path, data)?;
    Ok(())
}

/// Ensures the on-disk skeleton exists under the default root.
pub fn ensure_library_structure() -> Result<LibraryPaths> {
    ensure_structure_at(library_root()?)
}

/// Ensures the on-disk skeleton exists under an explicit root.
pub fn ensure_structure_at(root: PathBuf) -> Result<LibraryPaths> {
    let paths = LibraryPaths::new(root);
    for dir in [
        &paths.data_dir,
        &paths.thumbnails_dir,
        &paths.assets_dir,
        &paths.posts_dir,
        &paths.public_dir,
    ] {
        fs::create_dir_all(dir)?;
    }
    Ok(paths)
}

/// Convenience struct exposing every storage root of one install.
#[derive(Debug, Clone)]
pub struct LibraryPaths {
    pub root: PathBuf,
    /// JSON documents: per-category files plus `metadata.json`.
    pub data_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl LibraryPaths {
    pub fn new(root: PathBuf) -> Self {
        Self {
            data_dir: root.join("data"),
            thumbnails_dir: root.join("thumbnails"),
            assets_dir: root.join("assets"),
            posts_dir: root.join("uploads").join("posts"),
            public_dir: root.join("public"),
            root,
        }
    }
}
