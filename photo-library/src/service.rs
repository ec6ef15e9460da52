use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::{Album, Photo, PhotoLibraryConfig, PhotoQuery, PhotoSize};
use crate::thumbnail::ThumbnailError;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PHOTO_COLUMNS: &str = "p.uuid, p.album_id, p.relative_path, p.thumbnail_small_path, \
     p.thumbnail_medium_path, p.width, p.height, p.file_size, p.content_hash, p.taken_at, \
     p.camera_make, p.camera_model, p.caption, p.favorite, p.sort_position, p.created_at";

/// Error type for library operations.
#[derive(Debug)]
pub enum LibraryError {
    DatabaseError(rusqlite::Error),
    ThumbnailError(ThumbnailError),
    NotFound(String),
    IoError(std::io::Error),
    Other(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::DatabaseError(e) => write!(f, "Database error: {}", e),
            LibraryError::ThumbnailError(e) => write!(f, "Thumbnail error: {}", e),
            LibraryError::NotFound(msg) => write!(f, "Not found: {}", msg),
            LibraryError::IoError(e) => write!(f, "IO error: {}", e),
            LibraryError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<rusqlite::Error> for LibraryError {
    fn from(err: rusqlite::Error) -> Self {
        LibraryError::DatabaseError(err)
    }
}

impl From<ThumbnailError> for LibraryError {
    fn from(err: ThumbnailError) -> Self {
        LibraryError::ThumbnailError(err)
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::IoError(err)
    }
}

/// Photo library service: albums, photos, tags and search over a SQLite
/// connection supplied by the caller.
pub struct PhotoLibraryService {
    config: PhotoLibraryConfig,
}

impl PhotoLibraryService {
    pub fn new(config: PhotoLibraryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhotoLibraryConfig {
        &self.config
    }

    /// Absolute path of a stored file (for display or deletion).
    pub fn absolute_path(&self, relative_path: &str) -> String {
        if self.config.storage_path.is_empty() {
            relative_path.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.storage_path.trim_end_matches('/'),
                relative_path
            )
        }
    }

    /// File path for a photo at the requested size, falling back to the
    /// original when a thumbnail is missing.
    pub fn photo_file_path(&self, photo: &Photo, size: PhotoSize) -> String {
        let relative = match size {
            PhotoSize::Small => photo
                .thumbnail_small_path
                .as_deref()
                .unwrap_or(&photo.relative_path),
            PhotoSize::Medium => photo
                .thumbnail_medium_path
                .as_deref()
                .unwrap_or(&photo.relative_path),
            PhotoSize::Original => &photo.relative_path,
        };
        self.absolute_path(relative)
    }

    pub fn read_photo_bytes(&self, photo: &Photo, size: PhotoSize) -> Result<Vec<u8>, LibraryError> {
        let path = self.photo_file_path(photo, size);
        Ok(std::fs::read(path)?)
    }

    // ----- Albums -----

    pub fn query_albums(&self, conn: &Connection) -> Result<Vec<Album>, LibraryError> {
        let mut stmt = conn.prepare(
            "SELECT a.uuid, a.name, a.cover_photo_uuid, a.sort_order, a.created_at,
                    (SELECT COUNT(*) FROM photos p WHERE p.album_id = a.uuid AND p.deleted = 0)
             FROM albums a
             ORDER BY a.sort_order, a.name",
        )?;

        let albums = stmt
            .query_map([], |row| {
                Ok(Album {
                    uuid: parse_uuid(row, 0)?,
                    name: row.get(1)?,
                    cover_photo_uuid: parse_optional_uuid(row, 2)?,
                    sort_order: row.get(3)?,
                    created_at: row.get(4)?,
                    photo_count: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(albums)
    }

    pub fn create_album(&self, conn: &Connection, name: &str) -> Result<Album, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::Other("Album name must not be empty".to_string()));
        }

        let uuid = Uuid::new_v4();
        let sort_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM albums",
            [],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO albums (uuid, name, sort_order) VALUES (?1, ?2, ?3)",
            params![uuid.to_string(), name, sort_order],
        )?;
        log::info!("created album '{}' ({})", name, uuid);

        Ok(Album {
            uuid,
            name: name.to_string(),
            cover_photo_uuid: None,
            sort_order,
            photo_count: 0,
            created_at: None,
        })
    }

    pub fn rename_album(&self, conn: &Connection, album: &Uuid, name: &str) -> Result<(), LibraryError> {
        let rows = conn.execute(
            "UPDATE albums SET name = ?1 WHERE uuid = ?2",
            params![name.trim(), album.to_string()],
        )?;
        if rows == 0 {
            return Err(LibraryError::NotFound("Album".to_string()));
        }
        Ok(())
    }

    /// Deletes an album. Its photos stay in the library as unfiled.
    pub fn delete_album(&self, conn: &Connection, album: &Uuid) -> Result<(), LibraryError> {
        conn.execute(
            "UPDATE photos SET album_id = NULL WHERE album_id = ?1",
            params![album.to_string()],
        )?;
        let rows = conn.execute("DELETE FROM albums WHERE uuid = ?1", params![album.to_string()])?;
        if rows == 0 {
            return Err(LibraryError::NotFound("Album".to_string()));
        }
        log::info!("deleted album {}", album);
        Ok(())
    }

    /// Cover photo of an album: the explicit cover when set and present,
    /// otherwise the newest photo in the album.
    pub fn get_album_cover(&self, conn: &Connection, album: &Album) -> Result<Option<Photo>, LibraryError> {
        if let Some(cover) = &album.cover_photo_uuid {
            if let Some(photo) = self.try_get_photo(conn, cover)? {
                return Ok(Some(photo));
            }
        }

        let newest: Option<String> = conn
            .query_row(
                "SELECT uuid FROM photos
                 WHERE album_id = ?1 AND deleted = 0
                 ORDER BY created_at DESC LIMIT 1",
                params![album.uuid.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match newest {
            Some(uuid) => {
                let uuid = Uuid::parse_str(&uuid)
                    .map_err(|_| LibraryError::Other("Invalid UUID in photos table".to_string()))?;
                self.try_get_photo(conn, &uuid)
            }
            None => Ok(None),
        }
    }

    pub fn set_album_cover(&self, conn: &Connection, album: &Uuid, photo: &Uuid) -> Result<(), LibraryError> {
        let belongs: Option<Option<String>> = conn
            .query_row(
                "SELECT album_id FROM photos WHERE uuid = ?1 AND deleted = 0",
                params![photo.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match belongs {
            Some(Some(owner)) if owner == album.to_string() => {
                conn.execute(
                    "UPDATE albums SET cover_photo_uuid = ?1 WHERE uuid = ?2",
                    params![photo.to_string(), album.to_string()],
                )?;
                Ok(())
            }
            Some(_) => Err(LibraryError::Other(
                "Photo does not belong to this album".to_string(),
            )),
            None => Err(LibraryError::NotFound("Photo".to_string())),
        }
    }

    // ----- Photos -----

    pub fn photos_in_album(&self, conn: &Connection, album: &Uuid) -> Result<Vec<Photo>, LibraryError> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM photos p
             WHERE p.album_id = ?1 AND p.deleted = 0
             ORDER BY p.sort_position, p.created_at",
            PHOTO_COLUMNS
        ))?;
        let mut photos = stmt
            .query_map(params![album.to_string()], row_to_photo)?
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_tags(conn, &mut photos)?;
        Ok(photos)
    }

    /// Combined search. All present criteria are ANDed; tag filters require
    /// every listed tag. Results are newest-first by taken-at, photos
    /// without a date last.
    pub fn search_photos(&self, conn: &Connection, query: &PhotoQuery) -> Result<Vec<Photo>, LibraryError> {
        if query.is_empty() {
            log::debug!("unconstrained search, listing the whole library");
        }

        let mut sql = format!("SELECT {} FROM photos p WHERE p.deleted = 0", PHOTO_COLUMNS);
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            sql.push_str(
                " AND (LOWER(COALESCE(p.caption, '')) LIKE ?
                   OR LOWER(p.relative_path) LIKE ?
                   OR LOWER(COALESCE(p.camera_make, '')) LIKE ?
                   OR LOWER(COALESCE(p.camera_model, '')) LIKE ?)",
            );
            let needle = format!("%{}%", text.to_lowercase());
            for _ in 0..4 {
                values.push(Box::new(needle.clone()));
            }
        }

        if let Some(tags) = query.tags.as_deref().filter(|t| !t.is_empty()) {
            let placeholders = vec!["?"; tags.len()].join(", ");
            sql.push_str(&format!(
                " AND (SELECT COUNT(DISTINCT t.tag) FROM photo_tags t
                       WHERE t.photo_uuid = p.uuid AND t.tag IN ({})) = ?",
                placeholders
            ));
            for tag in tags {
                values.push(Box::new(tag.clone()));
            }
            values.push(Box::new(tags.len() as i64));
        }

        if let Some(albums) = query.album_ids.as_deref().filter(|a| !a.is_empty()) {
            let placeholders = vec!["?"; albums.len()].join(", ");
            sql.push_str(&format!(" AND p.album_id IN ({})", placeholders));
            for album in albums {
                values.push(Box::new(album.to_string()));
            }
        }

        if let Some((from, to)) = &query.date_range {
            sql.push_str(" AND p.taken_at >= ? AND p.taken_at <= ?");
            values.push(Box::new(from.format(DATE_FORMAT).to_string()));
            values.push(Box::new(to.format(DATE_FORMAT).to_string()));
        }

        if query.favorites_only {
            sql.push_str(" AND p.favorite = 1");
        }

        sql.push_str(" ORDER BY p.taken_at IS NULL, p.taken_at DESC, p.created_at DESC");

        let mut stmt = conn.prepare(&sql)?;
        let mut photos = stmt
            .query_map(params_from_iter(values.iter().map(|v| v.as_ref())), row_to_photo)?
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_tags(conn, &mut photos)?;

        log::debug!("search returned {} photos", photos.len());
        Ok(photos)
    }

    pub fn get_photo(&self, conn: &Connection, photo: &Uuid) -> Result<Photo, LibraryError> {
        self.try_get_photo(conn, photo)?
            .ok_or_else(|| LibraryError::NotFound("Photo".to_string()))
    }

    fn try_get_photo(&self, conn: &Connection, photo: &Uuid) -> Result<Option<Photo>, LibraryError> {
        let found = conn
            .query_row(
                &format!(
                    "SELECT {} FROM photos p WHERE p.uuid = ?1 AND p.deleted = 0",
                    PHOTO_COLUMNS
                ),
                params![photo.to_string()],
                row_to_photo,
            )
            .optional()?;

        match found {
            Some(photo) => {
                let mut photos = vec![photo];
                self.attach_tags(conn, &mut photos)?;
                Ok(photos.pop())
            }
            None => Ok(None),
        }
    }

    /// Inserts a photo row. The file and thumbnails must already exist in
    /// storage (see [`crate::thumbnail::ingest_photo_file`]).
    #[allow(clippy::too_many_arguments)]
    pub fn add_photo(&self, conn: &Connection, photo: &Photo) -> Result<(), LibraryError> {
        conn.execute(
            "INSERT INTO photos (uuid, album_id, relative_path, thumbnail_small_path,
                 thumbnail_medium_path, width, height, file_size, content_hash, taken_at,
                 camera_make, camera_model, caption, favorite, sort_position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                photo.uuid.to_string(),
                photo.album_id.map(|a| a.to_string()),
                photo.relative_path,
                photo.thumbnail_small_path,
                photo.thumbnail_medium_path,
                photo.width,
                photo.height,
                photo.file_size.map(|s| s as i64),
                photo.content_hash,
                photo.taken_at.map(|d| d.format(DATE_FORMAT).to_string()),
                photo.camera_make,
                photo.camera_model,
                photo.caption,
                photo.favorite,
                photo.sort_position,
            ],
        )?;

        for tag in &photo.tags {
            conn.execute(
                "INSERT OR IGNORE INTO photo_tags (photo_uuid, tag) VALUES (?1, ?2)",
                params![photo.uuid.to_string(), tag],
            )?;
        }

        Ok(())
    }

    pub fn update_caption(&self, conn: &Connection, photo: &Uuid, caption: &str) -> Result<(), LibraryError> {
        let caption = caption.trim();
        let stored = if caption.is_empty() { None } else { Some(caption) };
        let rows = conn.execute(
            "UPDATE photos SET caption = ?1 WHERE uuid = ?2 AND deleted = 0",
            params![stored, photo.to_string()],
        )?;
        if rows == 0 {
            return Err(LibraryError::NotFound("Photo".to_string()));
        }
        Ok(())
    }

    pub fn set_favorite(&self, conn: &Connection, photo: &Uuid, favorite: bool) -> Result<(), LibraryError> {
        let rows = conn.execute(
            "UPDATE photos SET favorite = ?1 WHERE uuid = ?2 AND deleted = 0",
            params![favorite, photo.to_string()],
        )?;
        if rows == 0 {
            return Err(LibraryError::NotFound("Photo".to_string()));
        }
        Ok(())
    }

    /// Replaces a photo's tags with the given set.
    pub fn set_tags(&self, conn: &Connection, photo: &Uuid, tags: &[String]) -> Result<(), LibraryError> {
        conn.execute(
            "DELETE FROM photo_tags WHERE photo_uuid = ?1",
            params![photo.to_string()],
        )?;
        for tag in tags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            conn.execute(
                "INSERT OR IGNORE INTO photo_tags (photo_uuid, tag) VALUES (?1, ?2)",
                params![photo.to_string(), tag],
            )?;
        }
        Ok(())
    }

    pub fn move_photos_to_album(
        &self,
        conn: &Connection,
        photos: &[Uuid],
        album: Option<&Uuid>,
    ) -> Result<usize, LibraryError> {
        let mut moved = 0;
        for photo in photos {
            moved += conn.execute(
                "UPDATE photos SET album_id = ?1 WHERE uuid = ?2 AND deleted = 0",
                params![album.map(|a| a.to_string()), photo.to_string()],
            )?;
        }
        log::info!("moved {} photos to album {:?}", moved, album);
        Ok(moved)
    }

    /// Persists a manual ordering of an album's photos.
    pub fn reorder_album_photos(
        &self,
        conn: &Connection,
        album: &Uuid,
        ordered: &[Uuid],
    ) -> Result<(), LibraryError> {
        for (position, photo) in ordered.iter().enumerate() {
            conn.execute(
                "UPDATE photos SET sort_position = ?1 WHERE uuid = ?2 AND album_id = ?3",
                params![position as i64, photo.to_string(), album.to_string()],
            )?;
        }
        Ok(())
    }

    /// Deletes a photo: storage files first, then the row. Missing files are
    /// not an error.
    pub fn delete_photo(&self, conn: &Connection, photo: &Uuid) -> Result<(), LibraryError> {
        let existing = self.get_photo(conn, photo)?;

        let _ = std::fs::remove_file(self.absolute_path(&existing.relative_path));
        if let Some(small) = &existing.thumbnail_small_path {
            let _ = std::fs::remove_file(self.absolute_path(small));
        }
        if let Some(medium) = &existing.thumbnail_medium_path {
            let _ = std::fs::remove_file(self.absolute_path(medium));
        }

        conn.execute(
            "DELETE FROM photo_tags WHERE photo_uuid = ?1",
            params![photo.to_string()],
        )?;
        conn.execute("DELETE FROM photos WHERE uuid = ?1", params![photo.to_string()])?;
        log::info!("deleted photo {}", photo);
        Ok(())
    }

    pub fn all_tags(&self, conn: &Connection) -> Result<Vec<String>, LibraryError> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT tag FROM photo_tags
             JOIN photos ON photos.uuid = photo_tags.photo_uuid AND photos.deleted = 0
             ORDER BY tag",
        )?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    pub fn find_by_content_hash(&self, conn: &Connection, hash: &str) -> Result<Option<Uuid>, LibraryError> {
        let found: Option<String> = conn
            .query_row(
                "SELECT uuid FROM photos WHERE content_hash = ?1 AND deleted = 0 LIMIT 1",
                params![hash],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(raw) => Ok(Some(Uuid::parse_str(&raw).map_err(|_| {
                LibraryError::Other("Invalid UUID in photos table".to_string())
            })?)),
            None => Ok(None),
        }
    }

    pub fn count_photos(&self, conn: &Connection) -> Result<i64, LibraryError> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE deleted = 0",
            [],
            |row| row.get(0),
        )?)
    }

    fn attach_tags(&self, conn: &Connection, photos: &mut [Photo]) -> Result<(), LibraryError> {
        if photos.is_empty() {
            return Ok(());
        }
        let mut stmt = conn.prepare("SELECT tag FROM photo_tags WHERE photo_uuid = ?1 ORDER BY tag")?;
        for photo in photos.iter_mut() {
            photo.tags = stmt
                .query_map(params![photo.uuid.to_string()], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
        }
        Ok(())
    }
}

fn parse_uuid(row: &Row<'_>, index: usize) -> Result<Uuid, rusqlite::Error> {
    let raw: String = row.get(index)?;
    Uuid::parse_str(&raw).map_err(|_| rusqlite::Error::InvalidQuery)
}

fn parse_optional_uuid(row: &Row<'_>, index: usize) -> Result<Option<Uuid>, rusqlite::Error> {
    let raw: Option<String> = row.get(index)?;
    match raw {
        Some(raw) => Ok(Some(Uuid::parse_str(&raw).map_err(|_| rusqlite::Error::InvalidQuery)?)),
        None => Ok(None),
    }
}

fn row_to_photo(row: &Row<'_>) -> Result<Photo, rusqlite::Error> {
    let taken_at: Option<String> = row.get(9)?;
    Ok(Photo {
        uuid: parse_uuid(row, 0)?,
        album_id: parse_optional_uuid(row, 1)?,
        relative_path: row.get(2)?,
        thumbnail_small_path: row.get(3)?,
        thumbnail_medium_path: row.get(4)?,
        width: row.get(5)?,
        height: row.get(6)?,
        file_size: row.get::<_, Option<i64>>(7)?.map(|s| s as u64),
        content_hash: row.get(8)?,
        taken_at: taken_at.and_then(|raw| NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).ok()),
        camera_make: row.get(10)?,
        camera_model: row.get(11)?,
        caption: row.get(12)?,
        favorite: row.get(13)?,
        sort_position: row.get(14)?,
        created_at: row.get(15)?,
        tags: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_library_schema;
    use chrono::NaiveDate;

    fn setup() -> (Connection, PhotoLibraryService) {
        let conn = Connection::open_in_memory().unwrap();
        init_library_schema(&conn).unwrap();
        let service = PhotoLibraryService::new(PhotoLibraryConfig::default());
        (conn, service)
    }

    fn sample_photo(name: &str) -> Photo {
        Photo {
            uuid: Uuid::new_v4(),
            album_id: None,
            relative_path: format!("{}.jpg", name),
            thumbnail_small_path: None,
            thumbnail_medium_path: None,
            width: Some(640),
            height: Some(480),
            file_size: Some(2048),
            content_hash: None,
            taken_at: None,
            camera_make: None,
            camera_model: None,
            caption: None,
            favorite: false,
            tags: Vec::new(),
            sort_position: 0,
            created_at: None,
        }
    }

    #[test]
    fn create_and_list_albums() {
        let (conn, service) = setup();
        service.create_album(&conn, "Holidays").unwrap();
        service.create_album(&conn, "Family").unwrap();

        let albums = service.query_albums(&conn).unwrap();
        assert_eq!(albums.len(), 2);
        // Creation order is preserved through sort_order.
        assert_eq!(albums[0].name, "Holidays");
        assert_eq!(albums[1].name, "Family");
    }

    #[test]
    fn empty_album_name_is_rejected() {
        let (conn, service) = setup();
        assert!(service.create_album(&conn, "   ").is_err());
    }

    #[test]
    fn deleting_an_album_unfiles_its_photos() {
        let (conn, service) = setup();
        let album = service.create_album(&conn, "Trip").unwrap();

        let mut photo = sample_photo("beach");
        photo.album_id = Some(album.uuid);
        service.add_photo(&conn, &photo).unwrap();

        service.delete_album(&conn, &album.uuid).unwrap();
        let survivor = service.get_photo(&conn, &photo.uuid).unwrap();
        assert!(survivor.album_id.is_none());
    }

    #[test]
    fn album_cover_falls_back_to_newest_photo() {
        let (conn, service) = setup();
        let album = service.create_album(&conn, "Trip").unwrap();

        let mut first = sample_photo("one");
        first.album_id = Some(album.uuid);
        service.add_photo(&conn, &first).unwrap();

        let cover = service.get_album_cover(&conn, &album).unwrap().unwrap();
        assert_eq!(cover.uuid, first.uuid);

        // An explicit cover wins once set.
        let mut second = sample_photo("two");
        second.album_id = Some(album.uuid);
        service.add_photo(&conn, &second).unwrap();
        service.set_album_cover(&conn, &album.uuid, &second.uuid).unwrap();

        let albums = service.query_albums(&conn).unwrap();
        let cover = service.get_album_cover(&conn, &albums[0]).unwrap().unwrap();
        assert_eq!(cover.uuid, second.uuid);
    }

    #[test]
    fn cover_of_foreign_photo_is_rejected() {
        let (conn, service) = setup();
        let album = service.create_album(&conn, "A").unwrap();
        let photo = sample_photo("unfiled");
        service.add_photo(&conn, &photo).unwrap();

        assert!(service.set_album_cover(&conn, &album.uuid, &photo.uuid).is_err());
    }

    #[test]
    fn search_by_text_matches_caption_and_filename() {
        let (conn, service) = setup();

        let mut tagged = sample_photo("forest");
        tagged.caption = Some("A walk in nature".to_string());
        service.add_photo(&conn, &tagged).unwrap();

        service.add_photo(&conn, &sample_photo("nature-hike")).unwrap();
        service.add_photo(&conn, &sample_photo("city")).unwrap();

        let query = PhotoQuery {
            text: Some("nature".to_string()),
            ..PhotoQuery::default()
        };
        let found = service.search_photos(&conn, &query).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn search_requires_every_tag() {
        let (conn, service) = setup();

        let mut both = sample_photo("both");
        both.tags = vec!["beach".to_string(), "sunset".to_string()];
        service.add_photo(&conn, &both).unwrap();

        let mut one = sample_photo("one");
        one.tags = vec!["beach".to_string()];
        service.add_photo(&conn, &one).unwrap();

        let query = PhotoQuery {
            tags: Some(vec!["beach".to_string(), "sunset".to_string()]),
            ..PhotoQuery::default()
        };
        let found = service.search_photos(&conn, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uuid, both.uuid);
    }

    #[test]
    fn search_filters_by_date_range_and_album() {
        let (conn, service) = setup();
        let album = service.create_album(&conn, "Trip").unwrap();

        let date = |d: u32| NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(12, 0, 0).unwrap();

        let mut inside = sample_photo("inside");
        inside.album_id = Some(album.uuid);
        inside.taken_at = Some(date(10));
        service.add_photo(&conn, &inside).unwrap();

        let mut outside = sample_photo("outside");
        outside.album_id = Some(album.uuid);
        outside.taken_at = Some(date(25));
        service.add_photo(&conn, &outside).unwrap();

        let query = PhotoQuery {
            album_ids: Some(vec![album.uuid]),
            date_range: Some((date(1), date(15))),
            ..PhotoQuery::default()
        };
        let found = service.search_photos(&conn, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uuid, inside.uuid);
    }

    #[test]
    fn favorites_filter_and_toggle() {
        let (conn, service) = setup();
        let photo = sample_photo("fav");
        service.add_photo(&conn, &photo).unwrap();

        service.set_favorite(&conn, &photo.uuid, true).unwrap();
        let query = PhotoQuery {
            favorites_only: true,
            ..PhotoQuery::default()
        };
        assert_eq!(service.search_photos(&conn, &query).unwrap().len(), 1);

        service.set_favorite(&conn, &photo.uuid, false).unwrap();
        assert!(service.search_photos(&conn, &query).unwrap().is_empty());
    }

    #[test]
    fn tags_roundtrip_and_all_tags() {
        let (conn, service) = setup();
        let photo = sample_photo("tagged");
        service.add_photo(&conn, &photo).unwrap();

        service
            .set_tags(&conn, &photo.uuid, &["sunset".to_string(), "beach".to_string(), " ".to_string()])
            .unwrap();

        let loaded = service.get_photo(&conn, &photo.uuid).unwrap();
        assert_eq!(loaded.tags, vec!["beach".to_string(), "sunset".to_string()]);
        assert_eq!(service.all_tags(&conn).unwrap(), vec!["beach", "sunset"]);
    }

    #[test]
    fn reorder_persists_sort_positions() {
        let (conn, service) = setup();
        let album = service.create_album(&conn, "Ordered").unwrap();

        let mut photos = Vec::new();
        for name in ["a", "b", "c"] {
            let mut photo = sample_photo(name);
            photo.album_id = Some(album.uuid);
            service.add_photo(&conn, &photo).unwrap();
            photos.push(photo);
        }

        let reversed: Vec<Uuid> = photos.iter().rev().map(|p| p.uuid).collect();
        service.reorder_album_photos(&conn, &album.uuid, &reversed).unwrap();

        let listed = service.photos_in_album(&conn, &album.uuid).unwrap();
        let order: Vec<Uuid> = listed.iter().map(|p| p.uuid).collect();
        assert_eq!(order, reversed);
    }

    #[test]
    fn delete_photo_removes_row_and_tags() {
        let (conn, service) = setup();
        let mut photo = sample_photo("gone");
        photo.tags = vec!["old".to_string()];
        service.add_photo(&conn, &photo).unwrap();

        service.delete_photo(&conn, &photo.uuid).unwrap();
        assert!(service.get_photo(&conn, &photo.uuid).is_err());
        assert!(service.all_tags(&conn).unwrap().is_empty());
    }

    #[test]
    fn content_hash_lookup_finds_duplicates() {
        let (conn, service) = setup();
        let mut photo = sample_photo("hashed");
        photo.content_hash = Some("abc123".to_string());
        service.add_photo(&conn, &photo).unwrap();

        assert_eq!(
            service.find_by_content_hash(&conn, "abc123").unwrap(),
            Some(photo.uuid)
        );
        assert_eq!(service.find_by_content_hash(&conn, "missing").unwrap(), None);
    }

    #[test]
    fn caption_update_trims_and_clears() {
        let (conn, service) = setup();
        let photo = sample_photo("captioned");
        service.add_photo(&conn, &photo).unwrap();

        service.update_caption(&conn, &photo.uuid, "  Sunset at the pier  ").unwrap();
        assert_eq!(
            service.get_photo(&conn, &photo.uuid).unwrap().caption.as_deref(),
            Some("Sunset at the pier")
        );

        service.update_caption(&conn, &photo.uuid, "").unwrap();
        assert!(service.get_photo(&conn, &photo.uuid).unwrap().caption.is_none());
    }
}
