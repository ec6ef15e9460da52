use crate::error::AppError;
use rusqlite::Connection;
use std::path::PathBuf;

/// Directory holding the photo storage (originals + thumbnails).
pub fn get_storage_path() -> String {
    data_dir().join("photos").to_string_lossy().to_string()
}

/// Path of the SQLite database file.
pub fn get_database_path() -> PathBuf {
    data_dir().join("fotowand.db")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("fotowand"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Opens the database and runs the schema migrations. Called once per
/// service entry point; connections are cheap to open against SQLite.
pub fn init_database() -> Result<Connection, AppError> {
    let db_path = get_database_path();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&db_path)?;
    photo_library::init_library_schema(&conn)?;

    Ok(conn)
}

/// Deletes the database and photo storage. Used by the unrecoverable-error
/// screen's full reset action.
pub fn reset_all_data() -> Result<(), AppError> {
    let db_path = get_database_path();
    if db_path.exists() {
        std::fs::remove_file(&db_path)?;
    }
    let storage = PathBuf::from(get_storage_path());
    if storage.exists() {
        std::fs::remove_dir_all(&storage)?;
    }
    log::warn!("all local data was reset");
    Ok(())
}
