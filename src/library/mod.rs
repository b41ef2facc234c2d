mod config;
pub mod layout;

pub use config::{
    config_file_path, ensure_library_structure, ensure_structure_at, library_root, load_or_default,
    save, AppConfig, LibraryPaths, ServerSettings, SyncSettings, UploadSettings, CONFIG_FILE_NAME,
};

use std::path::PathBuf;

use anyhow::Result;

use crate::assets::AssetManager;
use crate::events::MutationLog;
use crate::posts::PostManager;
use crate::resolve::resolve_within;
use crate::store::MetadataStore;
use crate::thumbs::CategoryManager;

/// Top-level handle over one on-disk library: configuration plus storage
/// roots, from which the per-area managers are borrowed.
pub struct Library {
    pub config: AppConfig,
    pub paths: LibraryPaths,
}

impl Library {
    /// Opens the install at the default root (`MEDIABASE_HOME` or the OS
    /// data directory), loading config and ensuring the directory skeleton.
    pub fn new() -> Result<Self> {
        let paths = config::ensure_library_structure()?;
        let config = config::load_or_default()?;
        Ok(Self { config, paths })
    }

    /// Opens a library at an explicit root with default configuration.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(root, AppConfig::default())
    }

    /// Opens a library at an explicit root with the given configuration.
    pub fn with_config(root: impl Into<PathBuf>, config: AppConfig) -> Result<Self> {
        let paths = config::ensure_structure_at(root.into())?;
        Ok(Self { config, paths })
    }

    /// Category, subcategory, and thumbnail operations.
    pub fn categories(&self) -> CategoryManager {
        CategoryManager::new(&self.paths, &self.config, self.mutation_log())
    }

    /// Asset and folder operations.
    pub fn assets(&self) -> AssetManager {
        AssetManager::new(&self.paths, &self.config, self.mutation_log())
    }

    /// Post operations.
    pub fn posts(&self) -> PostManager {
        PostManager::new(&self.paths, &self.config, self.mutation_log())
    }

    /// Store handle for the JSON index documents.
    pub fn store(&self) -> MetadataStore {
        MetadataStore::new(&self.paths.data_dir)
    }

    /// Resolves a request path against the public directory for the static
    /// file collaborator; traversal attempts fail before any disk access.
    pub fn resolve_public(&self, relative: &str) -> crate::error::Result<PathBuf> {
        resolve_within(&self.paths.public_dir, relative)
    }

    fn mutation_log(&self) -> MutationLog {
        MutationLog::new(
            &self.paths.data_dir,
            self.config.sync.push_command.clone(),
            self.paths.root.clone(),
        )
    }
}
