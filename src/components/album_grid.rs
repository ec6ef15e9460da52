use crate::database;
use crate::image_processing;
use crate::services::{album_service, error_log, import_service};
use crate::Screen;
use dioxus::prelude::*;
use dioxus_grid::{
    FileDropZone, GridConfig, GridItem, GridLayout, PickedFile, SelectionMode,
};
use photo_library::{Album, CancelToken, PhotoSize};
use uuid::Uuid;

/// Album overview: responsive card grid, create/rename/delete, and a drop
/// target per card that imports files straight into that album.
#[component]
pub fn AlbumGridScreen(on_navigate: EventHandler<Screen>, on_import: EventHandler<Option<Uuid>>) -> Element {
    let mut albums = use_signal(Vec::<Album>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut show_create = use_signal(|| false);
    let mut new_name = use_signal(String::new);

    let mut load_albums = move || match database::init_database() {
        Ok(conn) => match album_service::query_albums(&conn) {
            Ok(list) => {
                albums.set(list);
                error.set(None);
                loading.set(false);
            }
            Err(e) => {
                error_log::record("load albums", &e.to_string());
                error.set(Some(e.user_message()));
                loading.set(false);
            }
        },
        Err(e) => {
            error_log::record("open database", &e.to_string());
            error.set(Some(e.user_message()));
            loading.set(false);
        }
    };

    // Load on mount
    use_effect(move || {
        load_albums();
    });

    let create_album = move |_| {
        let name = new_name();
        match database::init_database().and_then(|conn| album_service::create_album(&conn, &name)) {
            Ok(_) => {
                new_name.set(String::new());
                show_create.set(false);
                load_albums();
            }
            Err(e) => {
                error_log::record("create album", &e.to_string());
                error.set(Some(e.user_message()));
            }
        }
    };

    let items: Vec<GridItem<Album>> = albums()
        .into_iter()
        .map(|album| GridItem::new(album.uuid.to_string(), album))
        .collect();

    let config = GridConfig {
        min_column_width: 200.0,
        max_column_width: 280.0,
        gap: 16.0,
        aspect_ratio: 0.85,
        ..GridConfig::default()
    };

    rsx! {
        div { class: "screen",

            div { class: "screen-header",
                h1 { "🖼 Albums" }
                div { class: "header-actions",
                    button {
                        class: "btn-secondary",
                        onclick: move |_| on_import.call(None),
                        "⬆ Import"
                    }
                    button {
                        class: "btn-success",
                        onclick: move |_| show_create.set(true),
                        "+ New Album"
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
                            load_albums();
                        },
                        "Reload"
                    }
                }
            }

            if show_create() {
                div { class: "inline-dialog",
                    input {
                        r#type: "text",
                        placeholder: "Album name",
                        value: "{new_name}",
                        oninput: move |e| new_name.set(e.value()),
                    }
                    button { class: "btn-success", onclick: create_album, "Create" }
                    button {
                        class: "btn-secondary",
                        onclick: move |_| show_create.set(false),
                        "Cancel"
                    }
                }
            }

            div { class: "screen-body",
                GridLayout::<Album> {
                    items,
                    config,
                    selection_mode: SelectionMode::Single,
                    loading: loading(),
                    empty_message: "No albums yet. Create one to organize your photos.".to_string(),
                    empty_action_label: Some("Create Album".to_string()),
                    on_empty_action: Some(EventHandler::new(move |_| show_create.set(true))),
                    on_item_click: Some(EventHandler::new(move |id: String| {
                        if let Ok(uuid) = Uuid::parse_str(&id) {
                            let name = albums()
                                .iter()
                                .find(|a| a.uuid == uuid)
                                .map(|a| a.name.clone())
                                .unwrap_or_default();
                            on_navigate.call(Screen::AlbumPhotos { album_id: uuid, album_name: name });
                        }
                    })),
                    render_item: Callback::new(move |item: GridItem<Album>| {
                        rsx! {
                            AlbumCard {
                                album: item.data.clone(),
                                on_changed: move |_| load_albums(),
                            }
                        }
                    }),
                }
            }
        }
    }
}

/// One album card: cover image, name, photo count, rename/delete actions and
/// a file drop target importing straight into the album.
#[component]
fn AlbumCard(album: Album, on_changed: EventHandler<()>) -> Element {
    let mut renaming = use_signal(|| false);
    let mut rename_value = use_signal(String::new);
    let mut importing = use_signal(|| false);

    let album_for_cover = album.clone();
    let cover_url = use_resource(move || {
        let album = album_for_cover.clone();
        async move {
            let conn = database::init_database().ok()?;
            let cover = album_service::get_album_cover(&conn, &album).ok()??;
            let path = crate::services::photo_service::photo_file_path(&cover, PhotoSize::Small);
            image_processing::image_path_to_data_url(&path).ok()
        }
    });

    let album_id = album.uuid;
    let drop_import = move |files: Vec<PickedFile>| {
        importing.set(true);
        spawn(async move {
            let result = import_service::import_picked_files(
                files,
                Some(album_id),
                CancelToken::new(),
                |_, _| {},
            )
            .await;
            importing.set(false);
            match result {
                Ok(outcome) => {
                    log::info!("drop import into {}: {} completed", album_id, outcome.completed);
                    on_changed.call(());
                }
                Err(e) => error_log::record("drop import", &e.to_string()),
            }
        });
    };

    let rename = move |_| {
        let name = rename_value();
        match database::init_database()
            .and_then(|conn| album_service::rename_album(&conn, &album_id, &name))
        {
            Ok(()) => {
                renaming.set(false);
                on_changed.call(());
            }
            Err(e) => error_log::record("rename album", &e.to_string()),
        }
    };

    let delete = move |_| match database::init_database()
        .and_then(|conn| album_service::delete_album(&conn, &album_id))
    {
        Ok(()) => on_changed.call(()),
        Err(e) => error_log::record("delete album", &e.to_string()),
    };

    rsx! {
        FileDropZone {
            id: "album-{album.uuid}",
            accept: vec!["image/*".to_string()],
            on_files: drop_import,

            div { class: "album-card",
                div { class: "album-cover",
                    if let Some(Some(url)) = cover_url() {
                        img { src: "{url}", alt: "{album.name}" }
                    } else {
                        div { class: "album-cover-placeholder", "📷" }
                    }
                    if importing() {
                        div { class: "album-importing-badge", "Importing…" }
                    }
                }

                if renaming() {
                    div {
                        class: "album-rename",
                        onclick: move |evt| evt.stop_propagation(),
                        input {
                            r#type: "text",
                            value: "{rename_value}",
                            oninput: move |e| rename_value.set(e.value()),
                        }
                        button { class: "btn-success", onclick: rename, "✓" }
                        button {
                            class: "btn-secondary",
                            onclick: move |_| renaming.set(false),
                            "×"
                        }
                    }
                } else {
                    div { class: "album-info",
                        div { class: "album-name", "{album.name}" }
                        div { class: "album-count", "{album.photo_count} photos" }
                        div {
                            class: "album-actions",
                            onclick: move |evt| evt.stop_propagation(),
                            button {
                                class: "icon-button",
                                onclick: {
                                    let name = album.name.clone();
                                    move |_| {
                                        rename_value.set(name.clone());
                                        renaming.set(true);
                                    }
                                },
                                "✏️"
                            }
                            button { class: "icon-button", onclick: delete, "🗑" }
                        }
                    }
                }
            }
        }
    }
}
