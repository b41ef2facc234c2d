pub mod assets;
pub mod error;
pub mod events;
pub mod library;
pub mod naming;
pub mod posts;
pub mod resolve;
pub mod store;
pub mod thumbs;

// Re-export commonly used types for convenience.
pub use error::{MediaError, Result};
pub use library::{AppConfig, Library, LibraryPaths};
pub use store::{Asset, CategoryDoc, Post, Subcategory, Thumbnail, UploadedFile};
