use rusqlite::Connection;

/// Initializes the library schema. Idempotent; every statement is
/// `IF NOT EXISTS` so it can run on every startup.
pub fn init_library_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS albums (
            uuid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            cover_photo_uuid TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS photos (
            uuid TEXT PRIMARY KEY,
            album_id TEXT REFERENCES albums(uuid) ON DELETE SET NULL,
            relative_path TEXT NOT NULL,
            thumbnail_small_path TEXT,
            thumbnail_medium_path TEXT,
            width INTEGER,
            height INTEGER,
            file_size INTEGER,
            content_hash TEXT,
            taken_at TEXT,
            camera_make TEXT,
            camera_model TEXT,
            caption TEXT,
            favorite INTEGER NOT NULL DEFAULT 0,
            sort_position INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS photo_tags (
            photo_uuid TEXT NOT NULL REFERENCES photos(uuid) ON DELETE CASCADE,
            tag TEXT NOT NULL,
            PRIMARY KEY (photo_uuid, tag)
        );

        CREATE INDEX IF NOT EXISTS idx_photos_album ON photos(album_id, deleted);
        CREATE INDEX IF NOT EXISTS idx_photos_hash ON photos(content_hash);
        CREATE INDEX IF NOT EXISTS idx_photos_taken ON photos(taken_at);
        CREATE INDEX IF NOT EXISTS idx_photo_tags_tag ON photo_tags(tag);",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_library_schema(&conn).unwrap();
        init_library_schema(&conn).unwrap();

        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('albums', 'photos', 'photo_tags')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
