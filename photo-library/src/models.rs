use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A photo in the library with its stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub uuid: Uuid,
    /// Album membership; unfiled photos carry `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<Uuid>,
    /// File name relative to the storage root.
    pub relative_path: String,
    pub thumbnail_small_path: Option<String>,
    pub thumbnail_medium_path: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: Option<u64>,
    /// SHA-256 of the original bytes, used for duplicate detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub taken_at: Option<NaiveDateTime>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub caption: Option<String>,
    pub favorite: bool,
    pub tags: Vec<String>,
    /// Manual position within the owning album.
    pub sort_position: i64,
    pub created_at: Option<String>,
}

impl Photo {
    /// Width / height, when both dimensions are known.
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0 => Some(w as f64 / h as f64),
            _ => None,
        }
    }
}

/// An album grouping photos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    pub uuid: Uuid,
    pub name: String,
    pub cover_photo_uuid: Option<Uuid>,
    pub sort_order: i64,
    pub photo_count: i64,
    pub created_at: Option<String>,
}

/// Search/filter criteria. All fields combine with AND; `None` means the
/// dimension is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoQuery {
    /// Matched case-insensitively against caption, file name and camera.
    pub text: Option<String>,
    /// Photos must carry every listed tag.
    pub tags: Option<Vec<String>>,
    pub album_ids: Option<Vec<Uuid>>,
    /// Inclusive taken-at range.
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
    /// Restrict to favorites.
    pub favorites_only: bool,
}

impl PhotoQuery {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.tags.as_deref().map_or(true, |t| t.is_empty())
            && self.album_ids.is_none()
            && self.date_range.is_none()
            && !self.favorites_only
    }
}

/// Size variants for photo retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSize {
    Small,    // 128px WebP for grids
    Medium,   // 512px WebP for detail views
    Original, // Full size file
}

/// Lightweight metadata extracted at import time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifSummary {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub taken_at: Option<NaiveDateTime>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub orientation: Option<u32>,
}

/// Full metadata for the detail view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifDetails {
    pub summary: ExifSummary,
    pub exposure_time: Option<String>,
    pub aperture: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
    pub flash: Option<String>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

/// Configuration for library initialization.
#[derive(Debug, Clone)]
pub struct PhotoLibraryConfig {
    /// Base directory for photo storage.
    pub storage_path: String,
    pub enable_thumbnails: bool,
    pub thumbnail_small_size: u32,
    pub thumbnail_medium_size: u32,
}

impl Default for PhotoLibraryConfig {
    fn default() -> Self {
        Self {
            storage_path: String::new(),
            enable_thumbnails: true,
            thumbnail_small_size: 128,
            thumbnail_medium_size: 512,
        }
    }
}
