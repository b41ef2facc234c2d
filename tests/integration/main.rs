use std::path::Path;

use mediabase::{AppConfig, Library};
use tempfile::TempDir;

mod assets;
mod categories;
mod posts;

pub struct IntegrationHarness {
    workspace: TempDir,
}

impl IntegrationHarness {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("failed to create temp workspace");
        Self { workspace }
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    pub fn library(&self) -> Library {
        Library::open(self.workspace.path()).expect("failed to open library")
    }

    pub fn library_with_config(&self, config: AppConfig) -> Library {
        Library::with_config(self.workspace.path(), config).expect("failed to open library")
    }
}

/// Convenience constructor for upload payloads.
pub fn image_upload(name: &str, bytes: &[u8]) -> mediabase::UploadedFile {
    mediabase::UploadedFile {
        bytes: bytes.to_vec(),
        original_name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
    }
}

pub fn upload(name: &str, mime: &str, bytes: &[u8]) -> mediabase::UploadedFile {
    mediabase::UploadedFile {
        bytes: bytes.to_vec(),
        original_name: name.to_string(),
        mime_type: mime.to_string(),
    }
}
