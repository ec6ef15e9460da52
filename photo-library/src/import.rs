//! Batch photo import with per-file status tracking.
//!
//! Each file runs through its own state machine (pending → processing →
//! completed/error/skipped); one file failing never aborts the batch.
//! Cancellation is cooperative: the token is checked between files, and the
//! file in flight when the token flips finishes normally.

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::exif::extract_quick_metadata;
use crate::models::{ExifSummary, Photo};
use crate::service::{LibraryError, PhotoLibraryService};
use crate::thumbnail::ingest_photo_file;

/// A file handed to the importer: name plus raw bytes, origin-agnostic
/// (drag-and-drop or file picker).
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Album receiving the imported photos; `None` leaves them unfiled.
    pub album_id: Option<Uuid>,
    /// Skip files whose content hash is already in the library.
    pub skip_duplicates: bool,
}

/// Per-file state machine value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Skipped,
}

/// Status record for one file in the import queue. Created when the file
/// enters the queue, mutated as the import progresses.
#[derive(Debug, Clone, PartialEq)]
pub struct FileImportStatus {
    pub file_name: String,
    pub size: u64,
    pub status: ImportStatus,
    /// 0–100.
    pub progress: u8,
    pub photo: Option<Photo>,
    pub error: Option<String>,
    pub metadata: Option<ExifSummary>,
}

impl FileImportStatus {
    pub fn pending(file_name: &str, size: u64) -> Self {
        Self {
            file_name: file_name.to_string(),
            size,
            status: ImportStatus::Pending,
            progress: 0,
            photo: None,
            error: None,
            metadata: None,
        }
    }
}

/// Cooperative cancellation flag shared between the dialog and the import
/// loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Aggregate outcome of a batch import.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub statuses: Vec<FileImportStatus>,
}

pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Imports a batch of files. `on_progress` receives the file index and its
/// updated status record on every change, so a dialog can mirror the queue.
pub async fn import_files(
    service: &PhotoLibraryService,
    conn: &Connection,
    files: Vec<ImportFile>,
    options: &ImportOptions,
    token: &CancelToken,
    mut on_progress: impl FnMut(usize, &FileImportStatus),
) -> Result<ImportOutcome, LibraryError> {
    let mut outcome = ImportOutcome {
        statuses: files
            .iter()
            .map(|file| FileImportStatus::pending(&file.file_name, file.bytes.len() as u64))
            .collect(),
        ..ImportOutcome::default()
    };

    log::info!("importing {} files", files.len());

    for (index, file) in files.into_iter().enumerate() {
        if token.is_cancelled() {
            outcome.cancelled = true;
            // Remaining files stay in the queue as skipped.
            for skipped_index in index..outcome.statuses.len() {
                let status = &mut outcome.statuses[skipped_index];
                status.status = ImportStatus::Skipped;
                on_progress(skipped_index, status);
                outcome.skipped += 1;
            }
            break;
        }

        let status = &mut outcome.statuses[index];
        status.status = ImportStatus::Processing;
        status.progress = 5;
        on_progress(index, status);

        match import_one(service, conn, file, options, index, &mut outcome.statuses, &mut on_progress).await {
            Ok(true) => outcome.completed += 1,
            Ok(false) => outcome.skipped += 1,
            Err(e) => {
                let status = &mut outcome.statuses[index];
                status.status = ImportStatus::Error;
                status.error = Some(e.to_string());
                on_progress(index, status);
                log::warn!("import of '{}' failed: {}", status.file_name, e);
                outcome.failed += 1;
            }
        }
    }

    log::info!(
        "import finished: {} completed, {} skipped, {} failed{}",
        outcome.completed,
        outcome.skipped,
        outcome.failed,
        if outcome.cancelled { " (cancelled)" } else { "" }
    );
    Ok(outcome)
}

/// Imports a single file; `Ok(true)` on completion, `Ok(false)` for a
/// duplicate skip.
async fn import_one(
    service: &PhotoLibraryService,
    conn: &Connection,
    file: ImportFile,
    options: &ImportOptions,
    index: usize,
    statuses: &mut [FileImportStatus],
    on_progress: &mut impl FnMut(usize, &FileImportStatus),
) -> Result<bool, LibraryError> {
    let hash = content_hash(&file.bytes);

    if options.skip_duplicates {
        if let Some(existing) = service.find_by_content_hash(conn, &hash)? {
            log::debug!("'{}' matches existing photo {}, skipping", file.file_name, existing);
            let status = &mut statuses[index];
            status.status = ImportStatus::Skipped;
            status.progress = 100;
            on_progress(index, status);
            return Ok(false);
        }
    }

    let metadata = extract_quick_metadata(&file.bytes);
    {
        let status = &mut statuses[index];
        status.metadata = Some(metadata.clone());
        status.progress = 25;
        on_progress(index, status);
    }

    let uuid = Uuid::new_v4();
    let size = file.bytes.len() as u64;
    let config = service.config();
    let ingested = ingest_photo_file(
        &config.storage_path,
        &file.file_name,
        file.bytes,
        uuid,
        config.thumbnail_small_size,
        config.thumbnail_medium_size,
    )
    .await?;

    {
        let status = &mut statuses[index];
        status.progress = 75;
        on_progress(index, status);
    }

    let photo = Photo {
        uuid,
        album_id: options.album_id,
        relative_path: ingested.file_name,
        thumbnail_small_path: Some(ingested.thumbnail_small),
        thumbnail_medium_path: Some(ingested.thumbnail_medium),
        width: metadata.width.or(Some(ingested.width)),
        height: metadata.height.or(Some(ingested.height)),
        file_size: Some(size),
        content_hash: Some(hash),
        taken_at: metadata.taken_at,
        camera_make: metadata.camera_make.clone(),
        camera_model: metadata.camera_model.clone(),
        caption: None,
        favorite: false,
        tags: Vec::new(),
        sort_position: 0,
        created_at: None,
    };
    service.add_photo(conn, &photo)?;

    let status = &mut statuses[index];
    status.status = ImportStatus::Completed;
    status.progress = 100;
    status.photo = Some(photo);
    on_progress(index, status);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoLibraryConfig;
    use crate::schema::init_library_schema;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn sample_jpeg(seed: u8) -> Vec<u8> {
        let img = RgbImage::from_fn(64, 48, |x, y| {
            image::Rgb([seed, (x % 256) as u8, (y % 256) as u8])
        });
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        buffer.into_inner()
    }

    fn setup(storage: &str) -> (Connection, PhotoLibraryService) {
        let conn = Connection::open_in_memory().unwrap();
        init_library_schema(&conn).unwrap();
        let service = PhotoLibraryService::new(PhotoLibraryConfig {
            storage_path: storage.to_string(),
            ..PhotoLibraryConfig::default()
        });
        (conn, service)
    }

    #[tokio::test]
    async fn batch_import_completes_and_records_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let (conn, service) = setup(dir.path().to_str().unwrap());

        let files = vec![
            ImportFile {
                file_name: "a.jpg".to_string(),
                bytes: sample_jpeg(1),
            },
            ImportFile {
                file_name: "b.jpg".to_string(),
                bytes: sample_jpeg(2),
            },
        ];

        let mut events = Vec::new();
        let outcome = import_files(
            &service,
            &conn,
            files,
            &ImportOptions::default(),
            &CancelToken::new(),
            |index, status| events.push((index, status.status, status.progress)),
        )
        .await
        .unwrap();

        assert_eq!(outcome.completed, 2);
        assert_eq!(outcome.failed, 0);
        assert!(!outcome.cancelled);
        assert!(outcome.statuses.iter().all(|s| s.status == ImportStatus::Completed));
        assert!(outcome.statuses[0].metadata.as_ref().unwrap().width == Some(64));
        assert_eq!(service.count_photos(&conn).unwrap(), 2);

        // Progress is monotonic per file.
        let first: Vec<u8> = events.iter().filter(|(i, _, _)| *i == 0).map(|(_, _, p)| *p).collect();
        assert!(first.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn a_bad_file_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (conn, service) = setup(dir.path().to_str().unwrap());

        let files = vec![
            ImportFile {
                file_name: "broken.jpg".to_string(),
                bytes: b"not an image at all".to_vec(),
            },
            ImportFile {
                file_name: "fine.jpg".to_string(),
                bytes: sample_jpeg(3),
            },
        ];

        let outcome = import_files(
            &service,
            &conn,
            files,
            &ImportOptions::default(),
            &CancelToken::new(),
            |_, _| {},
        )
        .await
        .unwrap();

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.statuses[0].status, ImportStatus::Error);
        assert!(outcome.statuses[0].error.is_some());
        assert_eq!(outcome.statuses[1].status, ImportStatus::Completed);
    }

    #[tokio::test]
    async fn duplicate_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (conn, service) = setup(dir.path().to_str().unwrap());

        let bytes = sample_jpeg(4);
        let options = ImportOptions {
            skip_duplicates: true,
            ..ImportOptions::default()
        };

        let first = import_files(
            &service,
            &conn,
            vec![ImportFile {
                file_name: "orig.jpg".to_string(),
                bytes: bytes.clone(),
            }],
            &options,
            &CancelToken::new(),
            |_, _| {},
        )
        .await
        .unwrap();
        assert_eq!(first.completed, 1);

        let second = import_files(
            &service,
            &conn,
            vec![ImportFile {
                file_name: "copy.jpg".to_string(),
                bytes,
            }],
            &options,
            &CancelToken::new(),
            |_, _| {},
        )
        .await
        .unwrap();
        assert_eq!(second.skipped, 1);
        assert_eq!(second.completed, 0);
        assert_eq!(service.count_photos(&conn).unwrap(), 1);
    }

    #[tokio::test]
    async fn cancellation_skips_the_remaining_files() {
        let dir = tempfile::tempdir().unwrap();
        let (conn, service) = setup(dir.path().to_str().unwrap());

        let files: Vec<ImportFile> = (0..3)
            .map(|i| ImportFile {
                file_name: format!("f{}.jpg", i),
                bytes: sample_jpeg(i as u8 + 10),
            })
            .collect();

        let token = CancelToken::new();
        let cancel_after_first = token.clone();
        let outcome = import_files(
            &service,
            &conn,
            files,
            &ImportOptions::default(),
            &token,
            move |index, status| {
                if index == 0 && status.status == ImportStatus::Completed {
                    cancel_after_first.cancel();
                }
            },
        )
        .await
        .unwrap();

        // The in-flight file finished; the rest were skipped.
        assert!(outcome.cancelled);
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(service.count_photos(&conn).unwrap(), 1);
    }

    #[test]
    fn content_hash_is_stable_and_distinct() {
        let a = content_hash(b"same");
        assert_eq!(a, content_hash(b"same"));
        assert_ne!(a, content_hash(b"different"));
        assert_eq!(a.len(), 64);
    }
}
