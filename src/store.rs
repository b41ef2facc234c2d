//! JSON document store backing the library index.
//!
//! Two document shapes live side by side: one combined document holding the
//! `posts` and `assets` arrays, and one document per thumbnail category,
//! both addressed by a file key under the data directory. Every write is a
//! whole-document overwrite, so callers re-read the latest copy immediately
//! before mutating; nothing here serializes concurrent read-modify-write
//! cycles, and two racing writers resolve as last writer wins. Documents are
//! written to a temp file and renamed into place so an interrupted process
//! never leaves a truncated document behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MediaError, Result};

/// File key of the combined posts/assets document. Reserved: never valid as
/// a category id.
pub const METADATA_KEY: &str = "metadata";

/// Per-category document: display name, subcategory list, thumbnail entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
}

/// Thumbnail entry owned by a category document.
///
/// `path` is always derived from (category, subcategory, filename) through
/// the layout rules and rewritten on every move or rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub file_size: u64,
    pub mime_type: String,
    /// Empty string means the category root.
    #[serde(default)]
    pub subcategory: String,
    pub upload_date: DateTime<Utc>,
}

/// The combined document stored under the reserved `metadata` key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CombinedDoc {
    pub posts: Vec<Post>,
    pub assets: Vec<Asset>,
}

/// Flat asset entry; `folder` records the owning directory relative to the
/// assets root, empty for the root itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    #[serde(default)]
    pub folder: String,
    pub path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub upload_date: DateTime<Utc>,
}

/// Post entry; the HTML body lives in a side file under the posts root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub html_path: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub upload_date: DateTime<Utc>,
}

/// Upload payload handed over by the transport collaborator.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub original_name: String,
    pub mime_type: String,
}

/// Mime types accepted for thumbnail and post images.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Loads and saves the JSON documents under one data directory.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    data_dir: PathBuf,
}

impl MetadataStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of a category document, or `None` when `id` is not a valid
    /// category file key. Keys are restricted to lowercase alphanumerics so
    /// no user-supplied id can ever address a file outside the data dir.
    fn category_file(&self, id: &str) -> Option<PathBuf> {
        if id == METADATA_KEY || !is_category_key(id) {
            return None;
        }
        Some(self.data_dir.join(format!("{id}.json")))
    }

    /// Every known category id, sorted. Unreadable directories yield an
    /// empty list; the store is the source of truth for "known".
    pub fn category_ids(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.data_dir) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let id = name.strip_suffix(".json")?;
                (id != METADATA_KEY && is_category_key(id)).then(|| id.to_string())
            })
            .collect();
        ids.sort();
        ids
    }

    pub fn category_exists(&self, id: &str) -> bool {
        self.category_file(id).is_some_and(|path| path.exists())
    }

    /// Reads one category document; missing, unreadable, or unparsable
    /// documents (and invalid ids) all come back as `None`.
    pub fn load_category(&self, id: &str) -> Option<CategoryDoc> {
        let path = self.category_file(id)?;
        let data = fs::read(path).ok()?;
        serde_json::from_slice(&data).ok()
    }

    pub fn save_category(&self, id: &str, doc: &CategoryDoc) -> Result<()> {
        let path = self
            .category_file(id)
            .ok_or_else(|| MediaError::InvalidInput(format!("category id '{id}'")))?;
        write_json(&path, doc)
    }

    /// Deletes a category document file. Callers check existence first.
    pub fn remove_category(&self, id: &str) -> Result<()> {
        let path = self
            .category_file(id)
            .ok_or_else(|| MediaError::InvalidInput(format!("category id '{id}'")))?;
        fs::remove_file(path)?;
        Ok(())
    }

    /// Reads the combined posts/assets document, falling back to the empty
    /// shape on any failure so a fresh or damaged install heals itself on
    /// the next write.
    pub fn load_combined(&self) -> CombinedDoc {
        let path = self.combined_path();
        fs::read(path)
            .ok()
            .and_then(|data| serde_json::from_slice(&data).ok())
            .unwrap_or_default()
    }

    pub fn save_combined(&self, doc: &CombinedDoc) -> Result<()> {
        write_json(&self.combined_path(), doc)
    }

    fn combined_path(&self) -> PathBuf {
        self.data_dir.join(format!("{METADATA_KEY}.json"))
    }
}

fn is_category_key(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Serializes pretty-printed JSON to a temp file and renames it into place.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
