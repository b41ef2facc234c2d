//! HTML post lifecycle: one directory per post holding `content.html` and
//! an `images/` directory, plus an entry in the combined document.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::error::{MediaError, Result};
use crate::events::MutationLog;
use crate::library::layout::{post_html_public_path, post_image_public_path};
use crate::library::{AppConfig, LibraryPaths};
use crate::naming::{generate_id, sanitize_filename, slugify_title, unique_filename};
use crate::store::{MetadataStore, Post, UploadedFile, IMAGE_MIME_TYPES};

/// Listing row: everything but the image paths, plus their count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub upload_date: DateTime<Utc>,
    pub image_count: usize,
}

pub struct PostManager {
    store: MetadataStore,
    posts_dir: PathBuf,
    max_image_bytes: u64,
    max_post_images: u32,
    log: MutationLog,
}

impl PostManager {
    pub fn new(paths: &LibraryPaths, config: &AppConfig, log: MutationLog) -> Self {
        Self {
            store: MetadataStore::new(&paths.data_dir),
            posts_dir: paths.posts_dir.clone(),
            max_image_bytes: config.uploads.max_image_bytes,
            max_post_images: config.uploads.max_post_images,
            log,
        }
    }

    /// All posts, newest first.
    pub fn list_posts(&self) -> Vec<PostSummary> {
        let mut posts: Vec<PostSummary> = self
            .store
            .load_combined()
            .posts
            .into_iter()
            .map(|p| PostSummary {
                id: p.id,
                title: p.title,
                slug: p.slug,
                upload_date: p.upload_date,
                image_count: p.images.len(),
            })
            .collect();
        posts.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        posts
    }

    /// The entry plus its HTML body read from disk.
    pub fn get_post(&self, slug: &str) -> Result<(Post, String)> {
        let post = self
            .store
            .load_combined()
            .posts
            .into_iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| MediaError::NotFound(format!("post '{slug}'")))?;
        let content_path = self.posts_dir.join(&post.slug).join("content.html");
        match fs::read_to_string(&content_path) {
            Ok(html) => Ok((post, html)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(MediaError::NotFound(
                format!("content of post '{slug}'"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Creates a post from an HTML file and its images. The slug is derived
    /// from the title, unique, and immutable afterwards.
    pub fn create_post(
        &self,
        title: &str,
        html: UploadedFile,
        images: Vec<UploadedFile>,
    ) -> Result<Post> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MediaError::InvalidInput("title is required".into()));
        }
        if !is_html_upload(&html) {
            return Err(MediaError::InvalidInput(
                "only HTML files are allowed for content".into(),
            ));
        }
        if images.len() > self.max_post_images as usize {
            return Err(MediaError::InvalidInput(format!(
                "at most {} images per post",
                self.max_post_images
            )));
        }
        for file in std::iter::once(&html).chain(images.iter()) {
            if file.bytes.len() as u64 > self.max_image_bytes {
                return Err(MediaError::InvalidInput(format!(
                    "file size exceeds the {} byte limit",
                    self.max_image_bytes
                )));
            }
        }
        for image in &images {
            if !IMAGE_MIME_TYPES.contains(&image.mime_type.as_str()) {
                return Err(MediaError::InvalidInput(
                    "only JPEG, PNG, and WebP images are allowed".into(),
                ));
            }
            if sanitize_filename(&image.original_name).is_empty() {
                return Err(MediaError::InvalidInput("image filename is required".into()));
            }
        }
        let slug = slugify_title(title);
        if slug.is_empty() {
            return Err(MediaError::InvalidInput(
                "title does not produce a usable slug".into(),
            ));
        }
        let mut doc = self.store.load_combined();
        if doc.posts.iter().any(|p| p.slug == slug) {
            return Err(MediaError::AlreadyExists(format!(
                "a post titled '{title}'"
            )));
        }

        let post_dir = self.posts_dir.join(&slug);
        let images_dir = post_dir.join("images");
        fs::create_dir_all(&images_dir)?;
        fs::write(post_dir.join("content.html"), &html.bytes)?;

        let mut image_paths = Vec::with_capacity(images.len());
        for image in &images {
            let filename = unique_filename(&images_dir, &image.original_name);
            fs::write(images_dir.join(&filename), &image.bytes)?;
            image_paths.push(post_image_public_path(&slug, &filename));
        }

        let entry = Post {
            id: generate_id(),
            title: title.to_string(),
            html_path: post_html_public_path(&slug),
            slug,
            images: image_paths,
            upload_date: Utc::now(),
        };
        doc.posts.push(entry.clone());
        self.store.save_combined(&doc)?;
        self.log
            .record("post.create", json!({ "id": entry.id, "slug": entry.slug }));
        Ok(entry)
    }

    /// Removes the post's directory tree and its entry.
    pub fn delete_post(&self, id: &str) -> Result<()> {
        let mut doc = self.store.load_combined();
        let index = doc
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| MediaError::NotFound(format!("post '{id}'")))?;
        let dir = self.posts_dir.join(&doc.posts[index].slug);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        doc.posts.remove(index);
        self.store.save_combined(&doc)?;
        self.log.record("post.delete", json!({ "id": id }));
        Ok(())
    }
}

fn is_html_upload(file: &UploadedFile) -> bool {
    file.mime_type == "text/html"
        || file.original_name.ends_with(".html")
        || file.original_name.ends_with(".htm")
}
