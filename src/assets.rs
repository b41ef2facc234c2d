//! Asset storage under a user-defined folder tree.
//!
//! Folders are real directories under the assets root; asset entries are
//! flat, each recording its owning folder as a slash-separated relative
//! path. Empty folders exist only on disk, which is why folder listings
//! merge a recursive directory walk with the folder values seen in
//! metadata.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use walkdir::WalkDir;

use crate::error::{MediaError, Result};
use crate::events::MutationLog;
use crate::library::layout::asset_public_path;
use crate::library::{AppConfig, LibraryPaths};
use crate::naming::{generate_id, sanitize_filename, unique_filename, with_preserved_extension};
use crate::resolve::resolve_within;
use crate::store::{Asset, MetadataStore, UploadedFile};

pub struct AssetManager {
    store: MetadataStore,
    assets_dir: PathBuf,
    max_asset_bytes: u64,
    log: MutationLog,
}

impl AssetManager {
    pub fn new(paths: &LibraryPaths, config: &AppConfig, log: MutationLog) -> Self {
        Self {
            store: MetadataStore::new(&paths.data_dir),
            assets_dir: paths.assets_dir.clone(),
            max_asset_bytes: config.uploads.max_asset_bytes,
            log,
        }
    }

    /// Assets directly inside `folder` (exact match, not a prefix), newest
    /// first.
    pub fn list_assets(&self, folder: &str) -> Vec<Asset> {
        let folder = normalize_folder(folder);
        let mut assets: Vec<Asset> = self
            .store
            .load_combined()
            .assets
            .into_iter()
            .filter(|a| a.folder == folder)
            .collect();
        assets.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        assets
    }

    /// Direct child folders of `parent`: the union of folder values found
    /// in metadata and a recursive scan of the assets root, deduplicated
    /// and sorted.
    pub fn list_folders(&self, parent: &str) -> Vec<String> {
        let parent = normalize_folder(parent);
        let mut all: BTreeSet<String> = self
            .store
            .load_combined()
            .assets
            .into_iter()
            .filter(|a| !a.folder.is_empty())
            .map(|a| a.folder)
            .collect();
        for entry in WalkDir::new(&self.assets_dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
        {
            if let Ok(relative) = entry.path().strip_prefix(&self.assets_dir) {
                all.insert(folder_name(relative));
            }
        }

        all.into_iter()
            .filter(|folder| match parent {
                "" => !folder.contains('/'),
                parent => {
                    folder.strip_prefix(parent).and_then(|rest| rest.strip_prefix('/'))
                        .is_some_and(|child| !child.contains('/'))
                }
            })
            .collect()
    }

    /// Creates `parent/name` (and any missing intermediates), returning the
    /// new folder's relative path.
    pub fn create_folder(&self, name: &str, parent: &str) -> Result<String> {
        let name = sanitize_filename(name);
        if name.is_empty() {
            return Err(MediaError::InvalidInput("folder name is required".into()));
        }
        let parent = normalize_folder(parent);
        let folder = if parent.is_empty() {
            name
        } else {
            format!("{parent}/{name}")
        };
        let full = resolve_within(&self.assets_dir, &folder)?;
        if full.exists() {
            return Err(MediaError::AlreadyExists(format!("folder '{folder}'")));
        }
        fs::create_dir_all(&full)?;
        self.log.record("folder.create", json!({ "path": folder }));
        Ok(folder)
    }

    /// Renames a folder in place under its parent and rewrites the folder
    /// and path of every asset at or below it.
    pub fn rename_folder(&self, old_path: &str, new_name: &str) -> Result<String> {
        let old_path = normalize_folder(old_path);
        let new_name = sanitize_filename(new_name);
        if new_name.is_empty() {
            return Err(MediaError::InvalidInput("folder name is required".into()));
        }
        let full_old = resolve_within(&self.assets_dir, old_path)?;
        if old_path.is_empty() || !full_old.is_dir() {
            return Err(MediaError::NotFound(format!("folder '{old_path}'")));
        }
        let new_path = match old_path.rsplit_once('/') {
            Some((parent, _)) => format!("{parent}/{new_name}"),
            None => new_name,
        };
        let full_new = resolve_within(&self.assets_dir, &new_path)?;
        if full_new.exists() {
            return Err(MediaError::AlreadyExists(format!("folder '{new_path}'")));
        }
        fs::rename(&full_old, &full_new)?;

        let mut doc = self.store.load_combined();
        let nested_prefix = format!("{old_path}/");
        for asset in doc.assets.iter_mut() {
            if asset.folder == old_path {
                asset.folder = new_path.clone();
            } else if let Some(rest) = asset.folder.strip_prefix(&nested_prefix) {
                asset.folder = format!("{new_path}/{rest}");
            } else {
                continue;
            }
            asset.path = asset_public_path(&asset.folder, &asset.filename);
        }
        self.store.save_combined(&doc)?;
        self.log.record(
            "folder.rename",
            json!({ "from": old_path, "to": new_path }),
        );
        Ok(new_path)
    }

    /// Recursively removes a folder tree and every asset entry at or below
    /// it. No orphaned entries are left behind.
    pub fn delete_folder(&self, path: &str) -> Result<()> {
        let path = normalize_folder(path);
        if path.is_empty() {
            return Err(MediaError::InvalidInput("folder path is required".into()));
        }
        let full = resolve_within(&self.assets_dir, path)?;
        if !full.is_dir() {
            return Err(MediaError::NotFound(format!("folder '{path}'")));
        }
        fs::remove_dir_all(&full)?;

        let mut doc = self.store.load_combined();
        let nested_prefix = format!("{path}/");
        doc.assets
            .retain(|a| a.folder != path && !a.folder.starts_with(&nested_prefix));
        self.store.save_combined(&doc)?;
        self.log.record("folder.delete", json!({ "path": path }));
        Ok(())
    }

    /// Writes an uploaded file into `folder` (the root when empty) with a
    /// collision-free filename and appends the entry.
    pub fn upload_asset(&self, folder: &str, file: UploadedFile) -> Result<Asset> {
        if file.bytes.len() as u64 > self.max_asset_bytes {
            return Err(MediaError::InvalidInput(format!(
                "file size exceeds the {} byte limit",
                self.max_asset_bytes
            )));
        }
        if sanitize_filename(&file.original_name).is_empty() {
            return Err(MediaError::InvalidInput("filename is required".into()));
        }
        let folder = normalize_folder(folder);
        let dest_dir = if folder.is_empty() {
            self.assets_dir.clone()
        } else {
            resolve_within(&self.assets_dir, folder)?
        };
        fs::create_dir_all(&dest_dir)?;
        let filename = unique_filename(&dest_dir, &file.original_name);
        fs::write(dest_dir.join(&filename), &file.bytes)?;

        let entry = Asset {
            id: generate_id(),
            path: asset_public_path(folder, &filename),
            filename,
            original_name: file.original_name,
            folder: folder.to_string(),
            file_size: file.bytes.len() as u64,
            mime_type: file.mime_type,
            upload_date: Utc::now(),
        };
        let mut doc = self.store.load_combined();
        doc.assets.push(entry.clone());
        self.store.save_combined(&doc)?;
        self.log
            .record("asset.upload", json!({ "id": entry.id, "folder": folder }));
        Ok(entry)
    }

    /// Renames an asset in its folder, preserving the extension when the
    /// new name omits one.
    pub fn rename_asset(&self, id: &str, new_name: &str) -> Result<Asset> {
        let sanitized = sanitize_filename(new_name);
        if sanitized.is_empty() {
            return Err(MediaError::InvalidInput("filename is required".into()));
        }
        let mut doc = self.store.load_combined();
        let index = doc
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| MediaError::NotFound(format!("asset '{id}'")))?;
        let asset = &mut doc.assets[index];

        let filename = with_preserved_extension(&sanitized, &asset.filename);
        let old_disk = disk_path(&self.assets_dir, &asset.folder, &asset.filename);
        let new_disk = disk_path(&self.assets_dir, &asset.folder, &filename);
        if new_disk != old_disk {
            if new_disk.exists() {
                return Err(MediaError::AlreadyExists(format!("file '{filename}'")));
            }
            if old_disk.exists() {
                fs::rename(&old_disk, &new_disk)?;
            }
        }

        asset.original_name = filename.clone();
        asset.path = asset_public_path(&asset.folder, &filename);
        asset.filename = filename;
        let updated = asset.clone();
        self.store.save_combined(&doc)?;
        self.log.record("asset.rename", json!({ "id": id }));
        Ok(updated)
    }

    /// Moves an asset into another folder (created if missing), keeping its
    /// filename.
    pub fn move_asset(&self, id: &str, target_folder: &str) -> Result<Asset> {
        let target = normalize_folder(target_folder);
        let mut doc = self.store.load_combined();
        let index = doc
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| MediaError::NotFound(format!("asset '{id}'")))?;
        let asset = &mut doc.assets[index];

        let dest_dir = if target.is_empty() {
            self.assets_dir.clone()
        } else {
            resolve_within(&self.assets_dir, target)?
        };
        fs::create_dir_all(&dest_dir)?;
        let old_disk = disk_path(&self.assets_dir, &asset.folder, &asset.filename);
        let new_disk = dest_dir.join(&asset.filename);
        if new_disk != old_disk {
            if new_disk.exists() {
                return Err(MediaError::AlreadyExists(format!(
                    "file '{}' in '{target}'",
                    asset.filename
                )));
            }
            if old_disk.exists() {
                fs::rename(&old_disk, &new_disk)?;
            }
        }

        asset.folder = target.to_string();
        asset.path = asset_public_path(target, &asset.filename);
        let updated = asset.clone();
        self.store.save_combined(&doc)?;
        self.log
            .record("asset.move", json!({ "id": id, "folder": target }));
        Ok(updated)
    }

    /// Removes the file (a missing file is tolerated) and the entry.
    pub fn delete_asset(&self, id: &str) -> Result<()> {
        let mut doc = self.store.load_combined();
        let index = doc
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| MediaError::NotFound(format!("asset '{id}'")))?;
        let asset = &doc.assets[index];
        let path = disk_path(&self.assets_dir, &asset.folder, &asset.filename);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        doc.assets.remove(index);
        self.store.save_combined(&doc)?;
        self.log.record("asset.delete", json!({ "id": id }));
        Ok(())
    }
}

fn normalize_folder(folder: &str) -> &str {
    folder.trim_start_matches('/')
}

/// Location of a stored asset; `folder` comes from metadata, already
/// confined at write time.
fn disk_path(assets_dir: &Path, folder: &str, filename: &str) -> PathBuf {
    let mut path = assets_dir.to_path_buf();
    if !folder.is_empty() {
        path.push(folder);
    }
    path.push(filename);
    path
}

/// Relative directory path as a slash-separated folder name.
fn folder_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
