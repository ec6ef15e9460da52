use crate::database;
use crate::error::AppError;
use crate::services::photo_service::init_photo_service;
use dioxus_grid::PickedFile;
use photo_library::{CancelToken, FileImportStatus, ImportFile, ImportOptions, ImportOutcome};
use uuid::Uuid;

/// Runs a batch import. Opens its own connection so it can run from a
/// spawned task while the UI stays interactive; `on_progress` fires on every
/// per-file status change.
pub async fn import_picked_files(
    files: Vec<PickedFile>,
    album_id: Option<Uuid>,
    token: CancelToken,
    on_progress: impl FnMut(usize, &FileImportStatus),
) -> Result<ImportOutcome, AppError> {
    let conn = database::init_database()?;
    let service = init_photo_service();

    let files: Vec<ImportFile> = files
        .into_iter()
        .map(|file| ImportFile {
            file_name: file.name,
            bytes: file.bytes,
        })
        .collect();

    let options = ImportOptions {
        album_id,
        skip_duplicates: true,
    };

    let outcome =
        photo_library::import_files(service, &conn, files, &options, &token, on_progress).await?;
    Ok(outcome)
}
