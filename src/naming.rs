//! Pure naming utilities shared by every manager: id generation, filename
//! and identifier sanitization, slug derivation, and the collision-free
//! numbering scheme used when writing uploads to disk.

use std::path::Path;

use rand::Rng;

/// Generates a short lowercase hex entity id (3 random bytes, 6 chars).
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..3).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

/// Maps an arbitrary filename onto `[A-Za-z0-9._-]`. Every disallowed
/// character becomes an underscore and runs of underscores collapse to one.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') {
            c
        } else {
            '_'
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }
    out
}

/// Category ids are lowercase alphanumeric only; everything else is dropped.
pub fn sanitize_category_id(id: &str) -> String {
    id.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Subcategory ids additionally allow hyphens.
pub fn sanitize_subcategory_id(id: &str) -> String {
    id.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Derives a URL-safe slug from a post title: lowercase, whitespace to
/// hyphens, everything outside `[a-z0-9-]` dropped, hyphen runs collapsed.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Extension of `name` without the leading dot, if it has one.
pub fn file_extension(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|ext| ext.to_str())
}

/// Carries the previous filename's extension over when a rename target
/// omits one, so `car-red` applied to `car.jpg` yields `car-red.jpg`.
pub fn with_preserved_extension(name: &str, previous: &str) -> String {
    if file_extension(name).is_some() {
        return name.to_string();
    }
    match file_extension(previous) {
        Some(ext) => format!("{name}.{ext}"),
        None => name.to_string(),
    }
}

/// Picks a sanitized filename that does not collide with an existing file in
/// `dir` by appending `-1`, `-2`, ... before the extension until unique.
pub fn unique_filename(dir: &Path, original_name: &str) -> String {
    let mut filename = sanitize_filename(original_name);
    let original = Path::new(original_name);
    let stem = original
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(original_name);
    let ext = original.extension().and_then(|ext| ext.to_str());
    let mut counter = 1u32;
    while dir.join(&filename).exists() {
        let candidate = match ext {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };
        filename = sanitize_filename(&candidate);
        counter += 1;
    }
    filename
}
