//! Category, subcategory, and thumbnail management.
//!
//! Each category is one JSON document; the directory tree under the
//! thumbnails root mirrors the documents as
//! `{thumbnailsRoot}/{category}[/{subcategory}]/{filename}`. Filesystem
//! steps run before the document write, so an interruption between the two
//! leaves a stray file rather than a dangling entry.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::error::{MediaError, Result};
use crate::events::MutationLog;
use crate::library::layout::thumbnail_public_path;
use crate::library::{AppConfig, LibraryPaths};
use crate::naming::{
    generate_id, sanitize_category_id, sanitize_filename, sanitize_subcategory_id, unique_filename,
    with_preserved_extension,
};
use crate::store::{
    CategoryDoc, MetadataStore, Subcategory, Thumbnail, UploadedFile, IMAGE_MIME_TYPES,
    METADATA_KEY,
};

/// Summary row returned by [`CategoryManager::list_categories`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub subcategories: Vec<Subcategory>,
    pub thumbnail_count: usize,
}

/// Thumbnail annotated with its owning category for flattened listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailListing {
    #[serde(flatten)]
    pub thumbnail: Thumbnail,
    pub category: String,
    pub category_name: String,
    pub subcategory_name: String,
}

/// Optional filters for [`CategoryManager::list_thumbnails`].
#[derive(Debug, Clone, Default)]
pub struct ThumbnailFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// Edit request for [`CategoryManager::edit_thumbnail`]. `None` leaves a
/// field untouched; `Some("")` for the subcategory moves the thumbnail to
/// its category root.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailEdit {
    pub new_name: Option<String>,
    pub new_category: Option<String>,
    pub new_subcategory: Option<String>,
}

pub struct CategoryManager {
    store: MetadataStore,
    thumbnails_dir: PathBuf,
    max_image_bytes: u64,
    log: MutationLog,
}

impl CategoryManager {
    pub fn new(paths: &LibraryPaths, config: &AppConfig, log: MutationLog) -> Self {
        Self {
            store: MetadataStore::new(&paths.data_dir),
            thumbnails_dir: paths.thumbnails_dir.clone(),
            max_image_bytes: config.uploads.max_image_bytes,
            log,
        }
    }

    fn category_dir(&self, category: &str, subcategory: &str) -> PathBuf {
        let mut dir = self.thumbnails_dir.join(category);
        if !subcategory.is_empty() {
            dir.push(subcategory);
        }
        dir
    }

    fn ensure_dir(&self, category: &str, subcategory: &str) -> Result<PathBuf> {
        let dir = self.category_dir(category, subcategory);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Summaries for every known category. Never fails; unreadable
    /// documents are treated as absent.
    pub fn list_categories(&self) -> Vec<CategorySummary> {
        self.store
            .category_ids()
            .into_iter()
            .filter_map(|id| {
                let doc = self.store.load_category(&id)?;
                Some(CategorySummary {
                    id,
                    name: doc.name,
                    subcategories: doc.subcategories,
                    thumbnail_count: doc.thumbnails.len(),
                })
            })
            .collect()
    }

    /// Creates an empty category document and its directory, returning the
    /// sanitized id.
    pub fn create_category(&self, id: &str, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MediaError::InvalidInput("category name is required".into()));
        }
        let id = sanitize_category_id(id);
        if id.is_empty() {
            return Err(MediaError::InvalidInput("category id is required".into()));
        }
        if id == METADATA_KEY {
            return Err(MediaError::Reserved(id));
        }
        if self.store.category_exists(&id) {
            return Err(MediaError::AlreadyExists(format!("category '{id}'")));
        }
        let doc = CategoryDoc {
            name: name.to_string(),
            ..CategoryDoc::default()
        };
        self.ensure_dir(&id, "")?;
        self.store.save_category(&id, &doc)?;
        self.log.record("category.create", json!({ "id": id }));
        Ok(id)
    }

    /// Updates the display name only; the id and files stay untouched.
    pub fn rename_category(&self, id: &str, new_name: &str) -> Result<()> {
        let mut doc = self.load_category(id)?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(MediaError::InvalidInput("category name is required".into()));
        }
        doc.name = new_name.to_string();
        self.store.save_category(id, &doc)?;
        self.log.record("category.rename", json!({ "id": id }));
        Ok(())
    }

    /// Removes the category's thumbnail directory and its document.
    /// Destructive and non-recoverable.
    pub fn delete_category(&self, id: &str) -> Result<()> {
        if !self.store.category_exists(id) {
            return Err(MediaError::NotFound(format!("category '{id}'")));
        }
        let dir = self.category_dir(id, "");
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        self.store.remove_category(id)?;
        self.log.record("category.delete", json!({ "id": id }));
        Ok(())
    }

    /// Adds a subcategory and its directory, returning the sanitized id.
    pub fn create_subcategory(&self, category: &str, id: &str, name: &str) -> Result<String> {
        let mut doc = self.load_category(category)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(MediaError::InvalidInput(
                "subcategory name is required".into(),
            ));
        }
        let id = sanitize_subcategory_id(id);
        if id.is_empty() {
            return Err(MediaError::InvalidInput("subcategory id is required".into()));
        }
        if doc.subcategories.iter().any(|s| s.id == id) {
            return Err(MediaError::AlreadyExists(format!("subcategory '{id}'")));
        }
        doc.subcategories.push(Subcategory {
            id: id.clone(),
            name: name.to_string(),
        });
        self.ensure_dir(category, &id)?;
        self.store.save_category(category, &doc)?;
        self.log
            .record("subcategory.create", json!({ "category": category, "id": id }));
        Ok(id)
    }

    pub fn rename_subcategory(&self, category: &str, id: &str, new_name: &str) -> Result<()> {
        let mut doc = self.load_category(category)?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(MediaError::InvalidInput(
                "subcategory name is required".into(),
            ));
        }
        let sub = doc
            .subcategories
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MediaError::NotFound(format!("subcategory '{id}'")))?;
        sub.name = new_name.to_string();
        self.store.save_category(category, &doc)?;
        self.log
            .record("subcategory.rename", json!({ "category": category, "id": id }));
        Ok(())
    }

    /// Removes a subcategory without deleting its thumbnails: orphans move
    /// to the category root, on disk and in their stored fields, so no
    /// dangling reference remains.
    pub fn delete_subcategory(&self, category: &str, id: &str) -> Result<()> {
        let mut doc = self.load_category(category)?;
        let position = doc
            .subcategories
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| MediaError::NotFound(format!("subcategory '{id}'")))?;

        let root_dir = self.ensure_dir(category, "")?;
        let sub_dir = self.category_dir(category, id);
        for thumb in doc.thumbnails.iter_mut().filter(|t| t.subcategory == id) {
            let source = sub_dir.join(&thumb.filename);
            let filename = unique_filename(&root_dir, &thumb.filename);
            if source.exists() {
                fs::rename(&source, root_dir.join(&filename))?;
            }
            thumb.filename = filename.clone();
            thumb.subcategory.clear();
            thumb.path = thumbnail_public_path(category, "", &filename);
        }
        let _ = fs::remove_dir_all(&sub_dir);

        doc.subcategories.remove(position);
        self.store.save_category(category, &doc)?;
        self.log
            .record("subcategory.delete", json!({ "category": category, "id": id }));
        Ok(())
    }

    /// Writes an uploaded image under the target category/subcategory with a
    /// collision-free filename and appends the entry to the document.
    pub fn upload_thumbnail(
        &self,
        category: &str,
        subcategory: &str,
        file: UploadedFile,
    ) -> Result<Thumbnail> {
        self.check_image(&file)?;
        let mut doc = self.load_category(category)?;
        if !subcategory.is_empty() && !doc.subcategories.iter().any(|s| s.id == subcategory) {
            return Err(MediaError::InvalidInput(format!(
                "subcategory '{subcategory}' does not exist"
            )));
        }
        if sanitize_filename(&file.original_name).is_empty() {
            return Err(MediaError::InvalidInput("filename is required".into()));
        }

        let dir = self.ensure_dir(category, subcategory)?;
        let filename = unique_filename(&dir, &file.original_name);
        fs::write(dir.join(&filename), &file.bytes)?;

        let entry = Thumbnail {
            id: generate_id(),
            path: thumbnail_public_path(category, subcategory, &filename),
            filename,
            original_name: file.original_name,
            file_size: file.bytes.len() as u64,
            mime_type: file.mime_type,
            subcategory: subcategory.to_string(),
            upload_date: Utc::now(),
        };
        doc.thumbnails.push(entry.clone());
        self.store.save_category(category, &doc)?;
        self.log.record(
            "thumbnail.upload",
            json!({ "category": category, "id": entry.id }),
        );
        Ok(entry)
    }

    /// Unified move-and-maybe-rename: computes the final (category,
    /// subcategory, filename) triple once, performs at most one filesystem
    /// rename, and recomputes the stored path from scratch.
    pub fn edit_thumbnail(&self, id: &str, edit: ThumbnailEdit) -> Result<Thumbnail> {
        let (source_category, mut source_doc, index) = self
            .find_thumbnail(id)
            .ok_or_else(|| MediaError::NotFound(format!("thumbnail '{id}'")))?;
        let current = source_doc.thumbnails[index].clone();

        let target_category = edit.new_category.unwrap_or_else(|| source_category.clone());
        let target_subcategory = edit
            .new_subcategory
            .unwrap_or_else(|| current.subcategory.clone());

        let mut target_doc = None;
        if target_category != source_category {
            target_doc = Some(self.store.load_category(&target_category).ok_or_else(|| {
                MediaError::NotFound(format!("target category '{target_category}'"))
            })?);
        }
        let target_subs = &target_doc.as_ref().unwrap_or(&source_doc).subcategories;
        if !target_subcategory.is_empty()
            && !target_subs.iter().any(|s| s.id == target_subcategory)
        {
            return Err(MediaError::InvalidInput(format!(
                "subcategory '{target_subcategory}' does not exist"
            )));
        }

        let renamed = edit.new_name.as_deref().is_some_and(|n| !n.is_empty());
        let filename = match edit.new_name.as_deref() {
            Some(name) if !name.is_empty() => {
                let sanitized = sanitize_filename(name);
                if sanitized.is_empty() {
                    return Err(MediaError::InvalidInput("filename is required".into()));
                }
                with_preserved_extension(&sanitized, &current.filename)
            }
            _ => current.filename.clone(),
        };

        let source_path = self
            .category_dir(&source_category, &current.subcategory)
            .join(&current.filename);
        let dest_dir = self.ensure_dir(&target_category, &target_subcategory)?;
        let dest_path = dest_dir.join(&filename);
        if dest_path != source_path {
            if dest_path.exists() {
                return Err(MediaError::AlreadyExists(format!("file '{filename}'")));
            }
            if source_path.exists() {
                fs::rename(&source_path, &dest_path)?;
            }
        }

        let mut updated = current;
        updated.path = thumbnail_public_path(&target_category, &target_subcategory, &filename);
        updated.filename = filename.clone();
        if renamed {
            updated.original_name = filename;
        }
        updated.subcategory = target_subcategory;

        match target_doc {
            Some(mut doc) => {
                source_doc.thumbnails.remove(index);
                self.store.save_category(&source_category, &source_doc)?;
                doc.thumbnails.push(updated.clone());
                self.store.save_category(&target_category, &doc)?;
            }
            None => {
                source_doc.thumbnails[index] = updated.clone();
                self.store.save_category(&source_category, &source_doc)?;
            }
        }
        self.log.record("thumbnail.edit", json!({ "id": id }));
        Ok(updated)
    }

    /// Removes the file (a missing file is tolerated) and the entry.
    pub fn delete_thumbnail(&self, id: &str) -> Result<()> {
        let (category, mut doc, index) = self
            .find_thumbnail(id)
            .ok_or_else(|| MediaError::NotFound(format!("thumbnail '{id}'")))?;
        let thumb = &doc.thumbnails[index];
        let path = self
            .category_dir(&category, &thumb.subcategory)
            .join(&thumb.filename);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        doc.thumbnails.remove(index);
        self.store.save_category(&category, &doc)?;
        self.log.record("thumbnail.delete", json!({ "id": id }));
        Ok(())
    }

    /// Flattens thumbnails across all categories, annotated with display
    /// names, optionally filtered, newest first.
    pub fn list_thumbnails(&self, filter: &ThumbnailFilter) -> Vec<ThumbnailListing> {
        let mut listings = Vec::new();
        for category in self.store.category_ids() {
            if filter.category.as_deref().is_some_and(|c| c != category) {
                continue;
            }
            let Some(doc) = self.store.load_category(&category) else {
                continue;
            };
            for thumb in doc.thumbnails {
                if filter
                    .subcategory
                    .as_deref()
                    .is_some_and(|s| s != thumb.subcategory)
                {
                    continue;
                }
                let subcategory_name = doc
                    .subcategories
                    .iter()
                    .find(|s| s.id == thumb.subcategory)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                listings.push(ThumbnailListing {
                    thumbnail: thumb,
                    category: category.clone(),
                    category_name: doc.name.clone(),
                    subcategory_name,
                });
            }
        }
        listings.sort_by(|a, b| b.thumbnail.upload_date.cmp(&a.thumbnail.upload_date));
        listings
    }

    fn load_category(&self, id: &str) -> Result<CategoryDoc> {
        self.store
            .load_category(id)
            .ok_or_else(|| MediaError::NotFound(format!("category '{id}'")))
    }

    /// Linear scan across all category documents; fine at the expected
    /// scale of tens of categories.
    fn find_thumbnail(&self, id: &str) -> Option<(String, CategoryDoc, usize)> {
        for category in self.store.category_ids() {
            let Some(doc) = self.store.load_category(&category) else {
                continue;
            };
            if let Some(index) = doc.thumbnails.iter().position(|t| t.id == id) {
                return Some((category, doc, index));
            }
        }
        None
    }

    fn check_image(&self, file: &UploadedFile) -> Result<()> {
        if file.bytes.len() as u64 > self.max_image_bytes {
            return Err(MediaError::InvalidInput(format!(
                "file size exceeds the {} byte limit",
                self.max_image_bytes
            )));
        }
        if !IMAGE_MIME_TYPES.contains(&file.mime_type.as_str()) {
            return Err(MediaError::InvalidInput(
                "only JPEG, PNG, and WebP images are allowed".into(),
            ));
        }
        Ok(())
    }
}
