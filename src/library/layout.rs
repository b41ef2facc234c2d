//! Public path derivation for everything the static file server hands out.
//!
//! Every `path`/`htmlPath` field stored in metadata is produced by these
//! helpers and recomputed on every move or rename. Centralizing the layout
//! rules here keeps the stored strings exactly reconstructible from the
//! entity's own fields.

/// URL prefix under which the thumbnails root is served.
pub const THUMBNAILS_PREFIX: &str = "/thumbnails";
/// URL prefix under which the assets root is served.
pub const ASSETS_PREFIX: &str = "/assets";
/// URL prefix under which the posts root is served.
pub const POSTS_PREFIX: &str = "/uploads/posts";

/// `/thumbnails/{category}[/{subcategory}]/{filename}`.
pub fn thumbnail_public_path(category: &str, subcategory: &str, filename: &str) -> String {
    if subcategory.is_empty() {
        format!("{THUMBNAILS_PREFIX}/{category}/{filename}")
    } else {
        format!("{THUMBNAILS_PREFIX}/{category}/{subcategory}/{filename}")
    }
}

/// Inverse of [`thumbnail_public_path`]: `(category, subcategory, filename)`.
pub fn parse_thumbnail_path(path: &str) -> Option<(String, String, String)> {
    let rest = path.strip_prefix(THUMBNAILS_PREFIX)?.strip_prefix('/')?;
    let parts: Vec<&str> = rest.split('/').collect();
    match parts.as_slice() {
        [category, filename] => Some(((*category).into(), String::new(), (*filename).into())),
        [category, subcategory, filename] => {
            Some(((*category).into(), (*subcategory).into(), (*filename).into()))
        }
        _ => None,
    }
}

/// `/assets/{folder}/{filename}`, or `/assets/{filename}` at the root.
pub fn asset_public_path(folder: &str, filename: &str) -> String {
    if folder.is_empty() {
        format!("{ASSETS_PREFIX}/{filename}")
    } else {
        format!("{ASSETS_PREFIX}/{folder}/{filename}")
    }
}

/// Inverse of [`asset_public_path`]: `(folder, filename)`.
pub fn parse_asset_path(path: &str) -> Option<(String, String)> {
    let rest = path.strip_prefix(ASSETS_PREFIX)?.strip_prefix('/')?;
    match rest.rsplit_once('/') {
        Some((folder, filename)) => Some((folder.into(), filename.into())),
        None => Some((String::new(), rest.into())),
    }
}

/// `/uploads/posts/{slug}/content.html`.
pub fn post_html_public_path(slug: &str) -> String {
    format!("{POSTS_PREFIX}/{slug}/content.html")
}

/// `/uploads/posts/{slug}/images/{filename}`.
pub fn post_image_public_path(slug: &str, filename: &str) -> String {
    format!("{POSTS_PREFIX}/{slug}/images/{filename}")
}
