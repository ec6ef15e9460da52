use crate::image_processing;
use crate::services::{error_log, import_service};
use dioxus::prelude::*;
use dioxus_grid::{FileDropZone, PickedFile};
use photo_library::{extract_quick_metadata, CancelToken, ExifSummary, FileImportStatus, ImportStatus};
use uuid::Uuid;

/// Dialog steps. Transitions are driven by user action or import
/// completion; errors return the user to the previous interactive step.
#[derive(Clone, Copy, PartialEq)]
enum ImportStep {
    Select,
    Preview,
    Importing,
    Complete,
}

/// Per-file preview data computed when a file enters the queue.
#[derive(Clone, PartialEq)]
struct FilePreview {
    thumbnail: String,
    metadata: ExifSummary,
}

/// Multi-step import dialog: select (drop zone + native picker) → preview
/// with per-file removal → importing with live per-file status → summary.
#[component]
pub fn PhotoImportDialog(album_id: Option<Uuid>, on_close: EventHandler<bool>) -> Element {
    let mut step = use_signal(|| ImportStep::Select);
    let mut files = use_signal(Vec::<PickedFile>::new);
    let mut previews = use_signal(Vec::<FilePreview>::new);
    let mut statuses = use_signal(Vec::<FileImportStatus>::new);
    let mut token = use_signal(CancelToken::new);
    let mut error = use_signal(|| None::<String>);
    let mut summary = use_signal(|| (0usize, 0usize, 0usize, false));

    let mut add_files = move |mut picked: Vec<PickedFile>| {
        if picked.is_empty() {
            return;
        }
        for file in &picked {
            previews.write().push(FilePreview {
                thumbnail: image_processing::bytes_to_data_url(&file.name, &file.bytes),
                metadata: extract_quick_metadata(&file.bytes),
            });
        }
        files.write().append(&mut picked);
        step.set(ImportStep::Preview);
    };

    let browse = move |_| {
        spawn(async move {
            let handles = rfd::AsyncFileDialog::new()
                .add_filter("Images", &["jpg", "jpeg", "png", "webp", "gif", "bmp"])
                .set_title("Select photos to import")
                .pick_files()
                .await;
            // A cancelled dialog is not an error.
            let Some(handles) = handles else { return };

            let mut picked = Vec::new();
            for handle in handles {
                let name = handle.file_name();
                let bytes = handle.read().await;
                picked.push(PickedFile {
                    mime: dioxus_grid::mime_from_name(&name),
                    size: bytes.len() as u64,
                    name,
                    bytes,
                });
            }
            add_files(picked);
        });
    };

    let mut remove_file = move |index: usize| {
        files.write().remove(index);
        previews.write().remove(index);
        if files.read().is_empty() {
            step.set(ImportStep::Select);
        }
    };

    let start_import = move |_| {
        let picked = files();
        statuses.set(
            picked
                .iter()
                .map(|file| FileImportStatus::pending(&file.name, file.size))
                .collect(),
        );
        let run_token = CancelToken::new();
        token.set(run_token.clone());
        error.set(None);
        step.set(ImportStep::Importing);

        spawn(async move {
            let result = import_service::import_picked_files(
                picked,
                album_id,
                run_token,
                move |index, status| {
                    statuses.write()[index] = status.clone();
                },
            )
            .await;

            match result {
                Ok(outcome) => {
                    summary.set((
                        outcome.completed,
                        outcome.skipped,
                        outcome.failed,
                        outcome.cancelled,
                    ));
                    step.set(ImportStep::Complete);
                }
                Err(e) => {
                    error_log::record("import batch", &e.to_string());
                    error.set(Some(e.user_message()));
                    step.set(ImportStep::Preview);
                }
            }
        });
    };

    let file_count = files.read().len();
    let title = match step() {
        ImportStep::Select => "Import photos",
        ImportStep::Preview => "Review import",
        ImportStep::Importing => "Importing…",
        ImportStep::Complete => "Import finished",
    };

    rsx! {
        div { class: "modal-backdrop",
            div { class: "import-dialog",

                div { class: "modal-header",
                    h2 { "{title}" }
                    if step() != ImportStep::Importing {
                        button {
                            class: "modal-close",
                            onclick: move |_| on_close.call(false),
                            "×"
                        }
                    }
                }

                if let Some(message) = error() {
                    div { class: "error-banner", span { "{message}" } }
                }

                match step() {
                    ImportStep::Select => rsx! {
                        FileDropZone {
                            id: "import-dialog",
                            accept: vec!["image/*".to_string()],
                            class: "import-drop".to_string(),
                            on_files: move |picked| add_files(picked),

                            div { class: "import-drop-inner",
                                p { "Drag photos here" }
                                p { class: "muted", "or" }
                                button { class: "btn-primary", onclick: browse, "Browse files…" }
                            }
                        }
                    },
                    ImportStep::Preview => rsx! {
                        div { class: "import-list",
                            for (index, file) in files().into_iter().enumerate() {
                                div { class: "import-row", key: "{file.name}-{index}",
                                    if let Some(preview) = previews().get(index) {
                                        img { class: "import-thumb", src: "{preview.thumbnail}" }
                                    }
                                    div { class: "import-file-info",
                                        div { class: "import-file-name", "{file.name}" }
                                        div { class: "muted",
                                            {preview_line(file.size, previews().get(index))}
                                        }
                                    }
                                    button {
                                        class: "icon-button",
                                        onclick: move |_| remove_file(index),
                                        "×"
                                    }
                                }
                            }
                        }
                        div { class: "import-actions",
                            button {
                                class: "btn-secondary",
                                onclick: move |_| step.set(ImportStep::Select),
                                "Add more"
                            }
                            button {
                                class: "btn-success",
                                onclick: start_import,
                                "Import {file_count} photos"
                            }
                        }
                    },
                    ImportStep::Importing => rsx! {
                        div { class: "import-list",
                            for (index, status) in statuses().into_iter().enumerate() {
                                ImportStatusRow { key: "{index}", status }
                            }
                        }
                        div { class: "import-actions",
                            button {
                                class: "btn-danger",
                                onclick: move |_| token.read().cancel(),
                                "Cancel"
                            }
                        }
                    },
                    ImportStep::Complete => rsx! {
                        div { class: "import-summary",
                            {
                                let (completed, skipped, failed, cancelled) = summary();
                                rsx! {
                                    p { "✅ {completed} imported" }
                                    if skipped > 0 {
                                        p { "⏭ {skipped} skipped" }
                                    }
                                    if failed > 0 {
                                        p { "⚠️ {failed} failed" }
                                    }
                                    if cancelled {
                                        p { class: "muted", "Import was cancelled." }
                                    }
                                }
                            }
                        }
                        div { class: "import-actions",
                            button {
                                class: "btn-primary",
                                onclick: move |_| {
                                    let (completed, _, _, _) = summary();
                                    on_close.call(completed > 0);
                                },
                                "Done"
                            }
                        }
                    },
                }
            }
        }
    }
}

/// Summary line under a preview row: size, dimensions, capture date.
fn preview_line(size: u64, preview: Option<&FilePreview>) -> String {
    let mut line = format!("{} KB", size / 1024);
    if let Some(preview) = preview {
        if let (Some(w), Some(h)) = (preview.metadata.width, preview.metadata.height) {
            line.push_str(&format!(" · {} × {}", w, h));
        }
        if let Some(taken) = preview.metadata.taken_at {
            line.push_str(&format!(" · {}", taken.format("%Y-%m-%d")));
        }
    }
    line
}

/// One row of the importing step: name, progress bar and status icon.
#[component]
fn ImportStatusRow(status: FileImportStatus) -> Element {
    let icon = match status.status {
        ImportStatus::Pending => "•",
        ImportStatus::Processing => "⏳",
        ImportStatus::Completed => "✅",
        ImportStatus::Error => "⚠️",
        ImportStatus::Skipped => "⏭",
    };

    rsx! {
        div { class: "import-row",
            span { class: "import-status-icon", "{icon}" }
            div { class: "import-file-info",
                div { class: "import-file-name", "{status.file_name}" }
                div { class: "progress-track",
                    div {
                        class: "progress-fill",
                        style: "width: {status.progress}%;",
                    }
                }
                if let Some(message) = &status.error {
                    div { class: "import-error", "{message}" }
                }
            }
        }
    }
}
