use crate::database;
use crate::services::{error_log, photo_service, thumbnail_loader};
use crate::Screen;
use dioxus::prelude::*;
use dioxus_grid::{
    GridConfig, GridItem, GridLayout, LoadPriority, SelectionMode, SortableList,
    VirtualScrollConfig,
};
use photo_library::{Album, Photo, PhotoSize};
use uuid::Uuid;

use super::photo_modal::PhotoModal;
use crate::services::thumbnail_loader::ThumbState;

/// Photos of one album: virtualized grid, multi-select with a bulk-action
/// toolbar, manual arrange mode, and the detail modal.
#[component]
pub fn AlbumPhotosScreen(
    album_id: Uuid,
    album_name: String,
    on_navigate: EventHandler<Screen>,
    on_import: EventHandler<Option<Uuid>>,
) -> Element {
    let mut photos = use_signal(Vec::<Photo>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut selected = use_signal(Vec::<String>::new);
    let mut open_index = use_signal(|| None::<usize>);
    let mut arranging = use_signal(|| false);

    let mut load_photos = move || match database::init_database()
        .and_then(|conn| photo_service::get_photos_in_album(&conn, &album_id))
    {
        Ok(list) => {
            photos.set(list);
            error.set(None);
            loading.set(false);
        }
        Err(e) => {
            error_log::record("load album photos", &e.to_string());
            error.set(Some(e.user_message()));
            loading.set(false);
        }
    };

    use_effect(move || {
        load_photos();
    });

    let selected_uuids = move || -> Vec<Uuid> {
        selected()
            .iter()
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect()
    };

    let favorite_selected = move |_| {
        match database::init_database() {
            Ok(conn) => {
                for uuid in selected_uuids() {
                    if let Err(e) = photo_service::set_favorite(&conn, &uuid, true) {
                        error_log::record("favorite photo", &e.to_string());
                    }
                }
                selected.set(Vec::new());
                load_photos();
            }
            Err(e) => error.set(Some(e.user_message())),
        }
    };

    let unfile_selected = move |_| {
        match database::init_database()
            .and_then(|conn| photo_service::move_photos_to_album(&conn, &selected_uuids(), None))
        {
            Ok(_) => {
                selected.set(Vec::new());
                load_photos();
            }
            Err(e) => {
                error_log::record("move photos", &e.to_string());
                error.set(Some(e.user_message()));
            }
        }
    };

    let delete_selected = move |_| {
        match database::init_database() {
            Ok(conn) => {
                for uuid in selected_uuids() {
                    if let Err(e) = photo_service::delete_photo(&conn, &uuid) {
                        error_log::record("delete photo", &e.to_string());
                    }
                }
                selected.set(Vec::new());
                load_photos();
            }
            Err(e) => error.set(Some(e.user_message())),
        }
    };

    let reorder = move |order: Vec<String>| {
        let ordered: Vec<Uuid> = order.iter().filter_map(|id| Uuid::parse_str(id).ok()).collect();
        match database::init_database()
            .and_then(|conn| photo_service::reorder_album_photos(&conn, &album_id, &ordered))
        {
            Ok(()) => load_photos(),
            Err(e) => {
                error_log::record("reorder photos", &e.to_string());
                error.set(Some(e.user_message()));
            }
        }
    };

    let photo_list = photos();
    let selection_count = selected().len();

    rsx! {
        div { class: "screen",

            div { class: "screen-header",
                button {
                    class: "btn-secondary",
                    onclick: move |_| on_navigate.call(Screen::Albums),
                    "← Albums"
                }
                h1 { "{album_name}" }
                div { class: "header-actions",
                    button {
                        class: if arranging() { "btn-primary" } else { "btn-secondary" },
                        onclick: move |_| arranging.set(!arranging()),
                        if arranging() { "Done" } else { "Arrange" }
                    }
                    button {
                        class: "btn-success",
                        onclick: move |_| on_import.call(Some(album_id)),
                        "⬆ Import"
                    }
                }
            }

            if let Some(message) = error() {
                div { class: "error-banner",
                    span { "{message}" }
                    button {
                        class: "btn-secondary",
                        onclick: move |_| {
                            loading.set(true);
                            load_photos();
                        },
                        "Reload"
                    }
                }
            }

            if selection_count > 0 && !arranging() {
                div { class: "selection-toolbar",
                    span { "{selection_count} selected" }
                    button { class: "btn-secondary", onclick: favorite_selected, "♥ Favorite" }
                    button { class: "btn-secondary", onclick: unfile_selected, "Remove from album" }
                    button { class: "btn-danger", onclick: delete_selected, "🗑 Delete" }
                    button {
                        class: "btn-secondary",
                        onclick: move |_| selected.set(Vec::new()),
                        "Clear"
                    }
                }
            }

            div { class: "screen-body",
                if arranging() {
                    SortableList {
                        id: "album-order-{album_id}",
                        items: photo_list.iter().map(|p| p.uuid.to_string()).collect::<Vec<_>>(),
                        on_reorder: reorder,
                        render_item: Callback::new({
                            let photo_list = photo_list.clone();
                            move |id: String| {
                                let photo = photo_list.iter().find(|p| p.uuid.to_string() == id).cloned();
                                rsx! {
                                    if let Some(photo) = photo {
                                        PhotoCard { photo }
                                    }
                                }
                            }
                        }),
                    }
                } else {
                    PhotoGrid {
                        photos: photo_list.clone(),
                        loading: loading(),
                        empty_message: "This album is empty. Import photos or drop them here.".to_string(),
                        selected: selected(),
                        on_selection_change: move |ids| selected.set(ids),
                        on_open: move |index| open_index.set(Some(index)),
                    }
                }
            }

            if let Some(index) = open_index() {
                PhotoModal {
                    photos: photo_list.clone(),
                    initial_index: index,
                    on_close: move |_| open_index.set(None),
                    on_changed: move |_| load_photos(),
                }
            }
        }
    }
}

/// Shared photo grid: maps photos into grid items and wires the virtualized
/// layout, selection and open-on-click.
#[component]
pub fn PhotoGrid(
    photos: Vec<Photo>,
    #[props(default = false)] loading: bool,
    #[props(default = "No photos".to_string())] empty_message: String,
    #[props(default = vec![])] selected: Vec<String>,
    on_selection_change: EventHandler<Vec<String>>,
    on_open: EventHandler<usize>,
) -> Element {
    let items: Vec<GridItem<Photo>> = photos
        .iter()
        .map(|photo| {
            let mut item = GridItem::new(photo.uuid.to_string(), photo.clone());
            item.aspect_ratio = photo.aspect_ratio();
            item
        })
        .collect();

    let order: Vec<String> = items.iter().map(|item| item.id.clone()).collect();

    let config = GridConfig {
        min_column_width: 160.0,
        max_column_width: 260.0,
        gap: 12.0,
        aspect_ratio: 1.0,
        ..GridConfig::default()
    };

    rsx! {
        GridLayout::<Photo> {
            items,
            config,
            virtual_scroll: Some(VirtualScrollConfig::default()),
            selection_mode: SelectionMode::Multiple,
            selected,
            loading,
            empty_message,
            on_selection_change: Some(on_selection_change),
            on_item_click: Some(EventHandler::new(move |id: String| {
                if let Some(index) = order.iter().position(|existing| *existing == id) {
                    on_open.call(index);
                }
            })),
            render_item: Callback::new(move |item: GridItem<Photo>| {
                rsx! {
                    PhotoCard { photo: item.data.clone() }
                }
            }),
        }
    }
}

/// One grid cell. Requests its thumbnail on mount at normal priority; the
/// viewport promotes it to high via the one-shot visibility observer.
#[component]
pub fn PhotoCard(photo: Photo) -> Element {
    let loader = thumbnail_loader::use_thumbnail_loader();
    let mut key = use_signal(String::new);

    let photo_for_mount = photo.clone();
    let state = if key().is_empty() {
        ThumbState::Loading
    } else {
        loader.lookup(&key())
    };

    rsx! {
        div {
            class: "photo-card",
            onmounted: move |_| {
                key.set(loader.request(&photo_for_mount, PhotoSize::Small, LoadPriority::Normal));
            },
            onvisible: move |evt| {
                if let Ok(true) = evt.data().is_intersecting() {
                    let current = key();
                    if !current.is_empty() {
                        loader.promote_visible(&current);
                    }
                }
            },

            match state {
                ThumbState::Loading => rsx! {
                    div { class: "photo-placeholder", "⏳" }
                },
                ThumbState::Ready(url) => rsx! {
                    img {
                        src: "{url}",
                        alt: photo.caption.clone().unwrap_or_default(),
                        loading: "lazy",
                    }
                },
                ThumbState::Failed => rsx! {
                    div { class: "photo-placeholder", "📷" }
                },
            }

            if photo.favorite {
                span { class: "favorite-badge", "♥" }
            }
        }
    }
}

/// Bulk move target used by the search screen's toolbar.
#[component]
pub fn MoveToAlbumPicker(albums: Vec<Album>, on_pick: EventHandler<Uuid>) -> Element {
    rsx! {
        select {
            class: "album-picker",
            onchange: move |e| {
                if let Ok(uuid) = Uuid::parse_str(&e.value()) {
                    on_pick.call(uuid);
                }
            },
            option { value: "", selected: true, disabled: true, "Move to album…" }
            for album in albums {
                option { value: "{album.uuid}", "{album.name}" }
            }
        }
    }
}
