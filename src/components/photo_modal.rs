use crate::database;
use crate::image_processing;
use crate::services::{error_log, photo_service};
use dioxus::prelude::*;
use photo_library::{ExifDetails, Photo, PhotoSize};

/// Fullscreen photo detail: medium-size image, EXIF panel, caption/tag
/// editing, favorite toggle, delete and prev/next navigation.
#[component]
pub fn PhotoModal(
    photos: Vec<Photo>,
    #[props(default = 0)] initial_index: usize,
    on_close: EventHandler<()>,
    on_changed: EventHandler<()>,
) -> Element {
    let mut current_index = use_signal(|| initial_index);
    let mut caption_draft = use_signal(String::new);
    let mut tags_draft = use_signal(String::new);
    let mut editing = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    // Both resources read `current_index` inside the future, so prev/next
    // navigation re-runs them for the newly shown photo.
    let photos_for_image = photos.clone();
    let image_url = use_resource(move || {
        let photos = photos_for_image.clone();
        async move {
            let index = current_index().min(photos.len().saturating_sub(1));
            let photo = photos.get(index)?.clone();
            let path = photo_service::photo_file_path(&photo, PhotoSize::Medium);
            tokio::task::spawn_blocking(move || image_processing::image_path_to_data_url(&path))
                .await
                .ok()?
                .ok()
        }
    });

    let photos_for_exif = photos.clone();
    let exif = use_resource(move || {
        let photos = photos_for_exif.clone();
        async move {
            let index = current_index().min(photos.len().saturating_sub(1));
            let photo = photos.get(index)?.clone();
            tokio::task::spawn_blocking(move || photo_service::photo_exif_details(&photo))
                .await
                .ok()?
                .ok()
        }
    });

    let photo_count = photos.len();
    let index = current_index().min(photo_count.saturating_sub(1));
    let Some(photo) = photos.get(index).cloned() else {
        return rsx! {};
    };

    let has_prev = index > 0;
    let has_next = index + 1 < photo_count;

    let photo_uuid = photo.uuid;
    let toggle_favorite = {
        let favorite = photo.favorite;
        move |_| {
            match database::init_database()
                .and_then(|conn| photo_service::set_favorite(&conn, &photo_uuid, !favorite))
            {
                Ok(()) => on_changed.call(()),
                Err(e) => {
                    error_log::record("toggle favorite", &e.to_string());
                    error.set(Some(e.user_message()));
                }
            }
        }
    };

    let save_edit = move |_| {
        let caption = caption_draft();
        let tags: Vec<String> = tags_draft()
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let result = database::init_database().and_then(|conn| {
            photo_service::update_caption(&conn, &photo_uuid, &caption)?;
            photo_service::set_tags(&conn, &photo_uuid, &tags)?;
            Ok(())
        });
        match result {
            Ok(()) => {
                editing.set(false);
                on_changed.call(());
            }
            Err(e) => {
                error_log::record("save photo edits", &e.to_string());
                error.set(Some(e.user_message()));
            }
        }
    };

    let delete = move |_| {
        match database::init_database().and_then(|conn| photo_service::delete_photo(&conn, &photo_uuid)) {
            Ok(()) => {
                on_changed.call(());
                on_close.call(());
            }
            Err(e) => {
                error_log::record("delete photo", &e.to_string());
                error.set(Some(e.user_message()));
            }
        }
    };

    let start_editing = {
        let caption = photo.caption.clone().unwrap_or_default();
        let tags = photo.tags.join(", ");
        move |_| {
            caption_draft.set(caption.clone());
            tags_draft.set(tags.clone());
            editing.set(true);
        }
    };

    rsx! {
        div { class: "modal-backdrop",

            div { class: "modal-header",
                div { class: "modal-counter", "{index + 1} / {photo_count}" }
                button {
                    class: "modal-close",
                    onclick: move |_| on_close.call(()),
                    "×"
                }
            }

            if let Some(message) = error() {
                div { class: "error-banner", span { "{message}" } }
            }

            div { class: "modal-body",
                if has_prev {
                    button {
                        class: "modal-nav prev",
                        onclick: move |_| {
                            let idx = current_index();
                            if idx > 0 {
                                current_index.set(idx - 1);
                            }
                        },
                        "‹"
                    }
                }

                div { class: "modal-image",
                    if let Some(Some(url)) = image_url() {
                        img { src: "{url}" }
                    } else {
                        div { class: "modal-image-loading", "⏳" }
                    }
                }

                if has_next {
                    button {
                        class: "modal-nav next",
                        onclick: move |_| {
                            let idx = current_index();
                            if idx + 1 < photo_count {
                                current_index.set(idx + 1);
                            }
                        },
                        "›"
                    }
                }

                div { class: "modal-sidebar",

                    div { class: "modal-actions",
                        button {
                            class: if photo.favorite { "icon-button active" } else { "icon-button" },
                            onclick: toggle_favorite,
                            "♥"
                        }
                        button { class: "icon-button", onclick: start_editing, "✏️" }
                        button { class: "icon-button", onclick: delete, "🗑" }
                    }

                    if editing() {
                        div { class: "modal-edit",
                            label { "Caption" }
                            input {
                                r#type: "text",
                                value: "{caption_draft}",
                                oninput: move |e| caption_draft.set(e.value()),
                            }
                            label { "Tags (comma separated)" }
                            input {
                                r#type: "text",
                                value: "{tags_draft}",
                                oninput: move |e| tags_draft.set(e.value()),
                            }
                            button { class: "btn-success", onclick: save_edit, "Save" }
                            button {
                                class: "btn-secondary",
                                onclick: move |_| editing.set(false),
                                "Cancel"
                            }
                        }
                    } else {
                        div { class: "modal-info",
                            if let Some(caption) = &photo.caption {
                                p { class: "modal-caption", "{caption}" }
                            }
                            if !photo.tags.is_empty() {
                                div { class: "modal-tags",
                                    for tag in &photo.tags {
                                        span { class: "tag-chip", "#{tag}" }
                                    }
                                }
                            }
                        }
                    }

                    if let Some(Some(details)) = exif() {
                        ExifPanel { details }
                    }
                }
            }
        }
    }
}

/// EXIF key/value panel for the sidebar.
#[component]
fn ExifPanel(details: ExifDetails) -> Element {
    let summary = &details.summary;

    let dimensions = match (summary.width, summary.height) {
        (Some(w), Some(h)) => Some(format!("{} × {}", w, h)),
        _ => None,
    };
    let camera = match (&summary.camera_make, &summary.camera_model) {
        (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
        (Some(make), None) => Some(make.clone()),
        (None, Some(model)) => Some(model.clone()),
        (None, None) => None,
    };
    let gps = match (details.gps_latitude, details.gps_longitude) {
        (Some(lat), Some(lon)) => Some(format!("{:.5}, {:.5}", lat, lon)),
        _ => None,
    };

    rsx! {
        div { class: "exif-panel",
            h3 { "Details" }
            if let Some(taken) = summary.taken_at {
                ExifRow { label: "Taken".to_string(), value: taken.format("%Y-%m-%d %H:%M").to_string() }
            }
            if let Some(camera) = camera {
                ExifRow { label: "Camera".to_string(), value: camera }
            }
            if let Some(dimensions) = dimensions {
                ExifRow { label: "Dimensions".to_string(), value: dimensions }
            }
            if let Some(exposure) = details.exposure_time.clone() {
                ExifRow { label: "Exposure".to_string(), value: exposure }
            }
            if let Some(aperture) = details.aperture.clone() {
                ExifRow { label: "Aperture".to_string(), value: aperture }
            }
            if let Some(iso) = details.iso.clone() {
                ExifRow { label: "ISO".to_string(), value: iso }
            }
            if let Some(focal) = details.focal_length.clone() {
                ExifRow { label: "Focal length".to_string(), value: focal }
            }
            if let Some(flash) = details.flash.clone() {
                ExifRow { label: "Flash".to_string(), value: flash }
            }
            if let Some(gps) = gps {
                ExifRow { label: "Location".to_string(), value: gps }
            }
        }
    }
}

#[component]
fn ExifRow(label: String, value: String) -> Element {
    rsx! {
        div { class: "exif-row",
            span { class: "exif-label", "{label}" }
            span { class: "exif-value", "{value}" }
        }
    }
}
