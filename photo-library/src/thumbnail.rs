use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Error type for thumbnail and ingest operations.
#[derive(Debug)]
pub enum ThumbnailError {
    ImageLoadError(String),
    ImageSaveError(String),
    IoError(std::io::Error),
    PathError(String),
}

impl std::fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThumbnailError::ImageLoadError(msg) => write!(f, "Image load error: {}", msg),
            ThumbnailError::ImageSaveError(msg) => write!(f, "Image save error: {}", msg),
            ThumbnailError::IoError(e) => write!(f, "IO error: {}", e),
            ThumbnailError::PathError(msg) => write!(f, "Path error: {}", msg),
        }
    }
}

impl std::error::Error for ThumbnailError {}

impl From<std::io::Error> for ThumbnailError {
    fn from(err: std::io::Error) -> Self {
        ThumbnailError::IoError(err)
    }
}

/// Result of [`ingest_photo_file`]: the stored file plus its thumbnails and
/// pixel dimensions.
#[derive(Debug, Clone)]
pub struct IngestedPhoto {
    pub file_name: String,
    pub thumbnail_small: String,
    pub thumbnail_medium: String,
    pub width: u32,
    pub height: u32,
}

/// Creates multi-size WebP thumbnails next to the original image.
/// Returns (small_filename, medium_filename, width, height).
pub fn create_thumbnails(
    original_path: &str,
    uuid: &str,
    small_size: u32,
    medium_size: u32,
) -> Result<(String, String, u32, u32), ThumbnailError> {
    log::debug!("creating thumbnails for {}", uuid);

    let img = image::open(original_path)
        .map_err(|e| ThumbnailError::ImageLoadError(format!("Failed to load image: {}", e)))?;
    let (width, height) = (img.width(), img.height());

    let parent_dir = Path::new(original_path)
        .parent()
        .ok_or_else(|| ThumbnailError::PathError("No parent directory found".to_string()))?;

    let small_filename = format!("{}_small.webp", uuid);
    let small_img = img.resize(small_size, small_size, FilterType::Lanczos3);
    let mut small_buffer = Cursor::new(Vec::new());
    small_img
        .write_to(&mut small_buffer, ImageFormat::WebP)
        .map_err(|e| ThumbnailError::ImageSaveError(format!("Failed to write small thumbnail: {}", e)))?;
    std::fs::write(parent_dir.join(&small_filename), small_buffer.into_inner())?;

    let medium_filename = format!("{}_medium.webp", uuid);
    let medium_img = img.resize(medium_size, medium_size, FilterType::Lanczos3);
    let mut medium_buffer = Cursor::new(Vec::new());
    medium_img
        .write_to(&mut medium_buffer, ImageFormat::WebP)
        .map_err(|e| ThumbnailError::ImageSaveError(format!("Failed to write medium thumbnail: {}", e)))?;
    std::fs::write(parent_dir.join(&medium_filename), medium_buffer.into_inner())?;

    log::debug!("thumbnails for {} created ({}x{})", uuid, width, height);
    Ok((small_filename, medium_filename, width, height))
}

/// Moves an incoming file into the storage directory under a fresh
/// `<uuid>.<ext>` name and builds its thumbnails. Runs on a blocking thread;
/// image decode and resize are CPU-bound.
pub async fn ingest_photo_file(
    storage_path: &str,
    original_name: &str,
    bytes: Vec<u8>,
    uuid: uuid::Uuid,
    small_size: u32,
    medium_size: u32,
) -> Result<IngestedPhoto, ThumbnailError> {
    let storage_path = storage_path.to_string();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg")
        .to_ascii_lowercase();

    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&storage_path)?;

        let file_name = format!("{}.{}", uuid, extension);
        let target = Path::new(&storage_path).join(&file_name);
        std::fs::write(&target, &bytes)?;

        let target_str = target
            .to_str()
            .ok_or_else(|| ThumbnailError::PathError("Non-UTF8 storage path".to_string()))?;
        let (thumbnail_small, thumbnail_medium, width, height) =
            create_thumbnails(target_str, &uuid.to_string(), small_size, medium_size)?;

        Ok(IngestedPhoto {
            file_name,
            thumbnail_small,
            thumbnail_medium,
            width,
            height,
        })
    })
    .await
    .map_err(|e| ThumbnailError::PathError(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn ingest_stores_file_and_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().to_str().unwrap();
        let uuid = uuid::Uuid::new_v4();

        let ingested = ingest_photo_file(storage, "holiday.JPG", sample_jpeg(320, 240), uuid, 128, 512)
            .await
            .unwrap();

        assert_eq!(ingested.file_name, format!("{}.jpg", uuid));
        assert_eq!((ingested.width, ingested.height), (320, 240));
        assert!(dir.path().join(&ingested.file_name).exists());
        assert!(dir.path().join(&ingested.thumbnail_small).exists());
        assert!(dir.path().join(&ingested.thumbnail_medium).exists());
    }

    #[tokio::test]
    async fn ingest_rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().to_str().unwrap();

        let result = ingest_photo_file(
            storage,
            "garbage.jpg",
            b"not an image".to_vec(),
            uuid::Uuid::new_v4(),
            128,
            512,
        )
        .await;
        assert!(matches!(result, Err(ThumbnailError::ImageLoadError(_))));
    }
}
