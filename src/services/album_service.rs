use crate::error::AppError;
use crate::services::photo_service::init_photo_service;
use photo_library::{Album, Photo};
use rusqlite::Connection;
use uuid::Uuid;

pub fn query_albums(conn: &Connection) -> Result<Vec<Album>, AppError> {
    Ok(init_photo_service().query_albums(conn)?)
}

pub fn create_album(conn: &Connection, name: &str) -> Result<Album, AppError> {
    Ok(init_photo_service().create_album(conn, name)?)
}

pub fn rename_album(conn: &Connection, album: &Uuid, name: &str) -> Result<(), AppError> {
    Ok(init_photo_service().rename_album(conn, album, name)?)
}

pub fn delete_album(conn: &Connection, album: &Uuid) -> Result<(), AppError> {
    Ok(init_photo_service().delete_album(conn, album)?)
}

pub fn get_album_cover(conn: &Connection, album: &Album) -> Result<Option<Photo>, AppError> {
    Ok(init_photo_service().get_album_cover(conn, album)?)
}

pub fn set_album_cover(conn: &Connection, album: &Uuid, photo: &Uuid) -> Result<(), AppError> {
    Ok(init_photo_service().set_album_cover(conn, album, photo)?)
}
