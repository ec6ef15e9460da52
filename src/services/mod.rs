pub mod album_service;
pub mod error_log;
pub mod import_service;
pub mod photo_service;
pub mod thumbnail_loader;
