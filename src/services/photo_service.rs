use crate::database;
use crate::error::AppError;
use photo_library::{Photo, PhotoLibraryConfig, PhotoLibraryService, PhotoQuery, PhotoSize};
use rusqlite::Connection;
use std::sync::OnceLock;
use uuid::Uuid;

// Global photo library service
static LIBRARY: OnceLock<PhotoLibraryService> = OnceLock::new();

/// Initialize the photo library service
pub fn init_photo_service() -> &'static PhotoLibraryService {
    LIBRARY.get_or_init(|| {
        let config = PhotoLibraryConfig {
            storage_path: database::get_storage_path(),
            enable_thumbnails: true,
            thumbnail_small_size: 128,
            thumbnail_medium_size: 512,
        };
        PhotoLibraryService::new(config)
    })
}

pub fn search_photos(conn: &Connection, query: &PhotoQuery) -> Result<Vec<Photo>, AppError> {
    log::debug!("search_photos: {:?}", query);
    Ok(init_photo_service().search_photos(conn, query)?)
}

pub fn get_photos_in_album(conn: &Connection, album: &Uuid) -> Result<Vec<Photo>, AppError> {
    Ok(init_photo_service().photos_in_album(conn, album)?)
}

pub fn get_photo(conn: &Connection, photo: &Uuid) -> Result<Photo, AppError> {
    Ok(init_photo_service().get_photo(conn, photo)?)
}

pub fn update_caption(conn: &Connection, photo: &Uuid, caption: &str) -> Result<(), AppError> {
    Ok(init_photo_service().update_caption(conn, photo, caption)?)
}

pub fn set_favorite(conn: &Connection, photo: &Uuid, favorite: bool) -> Result<(), AppError> {
    Ok(init_photo_service().set_favorite(conn, photo, favorite)?)
}

pub fn set_tags(conn: &Connection, photo: &Uuid, tags: &[String]) -> Result<(), AppError> {
    Ok(init_photo_service().set_tags(conn, photo, tags)?)
}

pub fn delete_photo(conn: &Connection, photo: &Uuid) -> Result<(), AppError> {
    Ok(init_photo_service().delete_photo(conn, photo)?)
}

pub fn move_photos_to_album(
    conn: &Connection,
    photos: &[Uuid],
    album: Option<&Uuid>,
) -> Result<usize, AppError> {
    Ok(init_photo_service().move_photos_to_album(conn, photos, album)?)
}

pub fn reorder_album_photos(conn: &Connection, album: &Uuid, ordered: &[Uuid]) -> Result<(), AppError> {
    Ok(init_photo_service().reorder_album_photos(conn, album, ordered)?)
}

pub fn get_all_tags(conn: &Connection) -> Result<Vec<String>, AppError> {
    Ok(init_photo_service().all_tags(conn)?)
}

/// File path of a photo at the requested size (for display)
pub fn photo_file_path(photo: &Photo, size: PhotoSize) -> String {
    init_photo_service().photo_file_path(photo, size)
}

/// Full EXIF details for the detail modal. Reads the original file.
pub fn photo_exif_details(photo: &Photo) -> Result<photo_library::ExifDetails, AppError> {
    let bytes = init_photo_service().read_photo_bytes(photo, PhotoSize::Original)?;
    Ok(photo_library::extract_details(&bytes))
}
