//! # Photo Library
//!
//! A local photo library: SQLite-backed albums, photos and tags, WebP
//! thumbnail generation, EXIF extraction and batch import.
//!
//! The crate owns storage and domain logic only. It never talks to a UI
//! toolkit; callers pass a [`rusqlite::Connection`] into the service and
//! wire the results into whatever frontend they have.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_library::{PhotoLibraryConfig, PhotoLibraryService};
//!
//! let service = PhotoLibraryService::new(PhotoLibraryConfig {
//!     storage_path: "/path/to/photos".to_string(),
//!     ..PhotoLibraryConfig::default()
//! });
//! let albums = service.query_albums(&conn)?;
//! ```

pub mod exif;
pub mod import;
pub mod models;
pub mod schema;
pub mod service;
pub mod thumbnail;

pub use exif::{extract_details, extract_quick_metadata};
pub use import::{
    content_hash, import_files, CancelToken, FileImportStatus, ImportFile, ImportOptions,
    ImportOutcome, ImportStatus,
};
pub use models::{
    Album, ExifDetails, ExifSummary, Photo, PhotoLibraryConfig, PhotoQuery, PhotoSize,
};
pub use schema::init_library_schema;
pub use service::{LibraryError, PhotoLibraryService};
pub use thumbnail::{create_thumbnails, ingest_photo_file, IngestedPhoto, ThumbnailError};
