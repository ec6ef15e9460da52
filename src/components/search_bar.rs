use crate::database;
use crate::services::{error_log, photo_service};
use chrono::{Local, NaiveDate};
use dioxus::prelude::*;
use dioxus_grid::Debouncer;
use photo_library::{Album, Photo, PhotoQuery};
use std::time::Duration;
use uuid::Uuid;

use super::photo_grid::{MoveToAlbumPicker, PhotoGrid};
use super::photo_modal::PhotoModal;

const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Query/filter composition: debounced free text, tag picking with
/// suggestions, a date range and preset filters. Emits the combined query;
/// running it is the parent's job.
#[component]
pub fn SearchBar(
    #[props(default = vec![])] available_tags: Vec<String>,
    on_search: EventHandler<PhotoQuery>,
) -> Element {
    let debouncer = use_hook(|| Debouncer::new(SEARCH_DEBOUNCE));
    let mut text = use_signal(String::new);
    let mut tags = use_signal(Vec::<String>::new);
    let mut tag_input = use_signal(String::new);
    let mut date_from = use_signal(String::new);
    let mut date_to = use_signal(String::new);
    let mut favorites_only = use_signal(|| false);

    let build_query = move || PhotoQuery {
        text: Some(text()).filter(|t| !t.trim().is_empty()),
        tags: Some(tags()).filter(|t| !t.is_empty()),
        album_ids: None,
        date_range: parse_range(&date_from(), &date_to()),
        favorites_only: favorites_only(),
    };

    // Filter changes apply immediately and supersede any pending debounced
    // text timer.
    let debouncer_for_emit = debouncer.clone();
    let emit_now = move || {
        debouncer_for_emit.cancel_pending();
        on_search.call(build_query());
    };

    let debouncer_for_text = debouncer.clone();
    let on_text_input = move |e: FormEvent| {
        text.set(e.value());
        let ticket = debouncer_for_text.trigger();
        spawn(async move {
            // Only the last keystroke in the quiet period runs a search.
            if ticket.settle().await {
                on_search.call(build_query());
            }
        });
    };

    let mut add_tag = {
        let mut emit_now = emit_now.clone();
        move |tag: String| {
            if !tags().contains(&tag) {
                tags.write().push(tag);
            }
            tag_input.set(String::new);
            emit_now();
        }
    };

    let suggestions: Vec<String> = {
        let needle = tag_input().trim().to_lowercase();
        if needle.is_empty() {
            Vec::new()
        } else {
            available_tags
                .iter()
                .filter(|tag| tag.to_lowercase().contains(&needle) && !tags().contains(tag))
                .take(6)
                .cloned()
                .collect()
        }
    };

    rsx! {
        div { class: "search-bar",

            input {
                class: "search-input",
                r#type: "text",
                placeholder: "🔍 Search caption, file name or camera",
                value: "{text}",
                oninput: on_text_input,
            }

            div { class: "search-filters",

                div { class: "tag-picker",
                    for tag in tags() {
                        span { class: "tag-chip",
                            "#{tag} "
                            button {
                                class: "tag-remove",
                                onclick: {
                                    let tag = tag.clone();
                                    let mut emit_now = emit_now.clone();
                                    move |_| {
                                        tags.write().retain(|existing| *existing != tag);
                                        emit_now();
                                    }
                                },
                                "×"
                            }
                        }
                    }
                    input {
                        class: "tag-input",
                        r#type: "text",
                        placeholder: "Add tag…",
                        value: "{tag_input}",
                        oninput: move |e| tag_input.set(e.value()),
                    }
                    if !suggestions.is_empty() {
                        div { class: "tag-suggestions",
                            for suggestion in suggestions {
                                button {
                                    class: "tag-suggestion",
                                    onclick: {
                                        let suggestion = suggestion.clone();
                                        move |_| add_tag(suggestion.clone())
                                    },
                                    "#{suggestion}"
                                }
                            }
                        }
                    }
                }

                div { class: "date-range",
                    input {
                        r#type: "date",
                        value: "{date_from}",
                        oninput: {
                            let mut emit_now = emit_now.clone();
                            move |e: FormEvent| {
                                date_from.set(e.value());
                                emit_now();
                            }
                        },
                    }
                    span { "–" }
                    input {
                        r#type: "date",
                        value: "{date_to}",
                        oninput: {
                            let mut emit_now = emit_now.clone();
                            move |e: FormEvent| {
                                date_to.set(e.value());
                                emit_now();
                            }
                        },
                    }
                }

                div { class: "search-presets",
                    button {
                        class: if favorites_only() { "preset active" } else { "preset" },
                        onclick: {
                            let mut emit_now = emit_now.clone();
                            move |_| {
                                favorites_only.set(!favorites_only());
                                emit_now();
                            }
                        },
                        "♥ Favorites"
                    }
                    button {
                        class: "preset",
                        onclick: {
                            let mut emit_now = emit_now.clone();
                            move |_| {
                                let today = Local::now().date_naive();
                                let start = today - chrono::Duration::days(30);
                                date_from.set(start.format("%Y-%m-%d").to_string());
                                date_to.set(today.format("%Y-%m-%d").to_string());
                                emit_now();
                            }
                        },
                        "Last 30 days"
                    }
                    button {
                        class: "preset",
                        onclick: {
                            let mut emit_now = emit_now.clone();
                            move |_| {
                                text.set(String::new());
                                tags.set(Vec::new());
                                date_from.set(String::new());
                                date_to.set(String::new());
                                favorites_only.set(false);
                                emit_now();
                            }
                        },
                        "Clear"
                    }
                }
            }
        }
    }
}

fn parse_range(from: &str, to: &str) -> Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)> {
    let from = NaiveDate::parse_from_str(from, "%Y-%m-%d").ok()?;
    let to = NaiveDate::parse_from_str(to, "%Y-%m-%d").ok()?;
    Some((from.and_hms_opt(0, 0, 0)?, to.and_hms_opt(23, 59, 59)?))
}

/// Search screen: the bar, the result grid, bulk actions and the detail
/// modal. Every search carries a generation; a slower earlier search can
/// never overwrite the results of a newer one.
#[component]
pub fn SearchScreen() -> Element {
    let mut results = use_signal(Vec::<Photo>::new);
    let mut searched = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut generation = use_signal(|| 0u64);
    let mut last_query = use_signal(PhotoQuery::default);
    let mut available_tags = use_signal(Vec::<String>::new);
    let mut albums = use_signal(Vec::<Album>::new);
    let mut selected = use_signal(Vec::<String>::new);
    let mut open_index = use_signal(|| None::<usize>);

    use_effect(move || {
        match database::init_database() {
            Ok(conn) => {
                match photo_service::get_all_tags(&conn) {
                    Ok(tags) => available_tags.set(tags),
                    Err(e) => error_log::record("load tags", &e.to_string()),
                }
                match crate::services::album_service::query_albums(&conn) {
                    Ok(list) => albums.set(list),
                    Err(e) => error_log::record("load albums", &e.to_string()),
                }
            }
            Err(e) => error_log::record("open database", &e.to_string()),
        }
    });

    let mut run_search = move |query: PhotoQuery| {
        let my_generation = generation() + 1;
        generation.set(my_generation);
        last_query.set(query.clone());
        spawn(async move {
            let outcome = database::init_database()
                .and_then(|conn| photo_service::search_photos(&conn, &query));
            // Apply only while this is still the newest search.
            if *generation.peek() != my_generation {
                log::debug!("discarding stale search result (generation {})", my_generation);
                return;
            }
            match outcome {
                Ok(list) => {
                    results.set(list);
                    searched.set(true);
                    error.set(None);
                }
                Err(e) => {
                    error_log::record("search photos", &e.to_string());
                    error.set(Some(e.user_message()));
                }
            }
        });
    };

    let rerun = move || {
        let query = last_query();
        run_search(query);
    };

    let selected_uuids = move || -> Vec<Uuid> {
        selected()
            .iter()
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect()
    };

    let favorite_selected = {
        let mut rerun = rerun.clone();
        move |_| {
            if let Ok(conn) = database::init_database() {
                for uuid in selected_uuids() {
                    if let Err(e) = photo_service::set_favorite(&conn, &uuid, true) {
                        error_log::record("favorite photo", &e.to_string());
                    }
                }
            }
            selected.set(Vec::new());
            rerun();
        }
    };

    let move_selected = {
        let mut rerun = rerun.clone();
        move |album: Uuid| {
            match database::init_database()
                .and_then(|conn| photo_service::move_photos_to_album(&conn, &selected_uuids(), Some(&album)))
            {
                Ok(_) => {
                    selected.set(Vec::new());
                    rerun();
                }
                Err(e) => {
                    error_log::record("move photos", &e.to_string());
                    error.set(Some(e.user_message()));
                }
            }
        }
    };

    let delete_selected = {
        let mut rerun = rerun.clone();
        move |_| {
            if let Ok(conn) = database::init_database() {
                for uuid in selected_uuids() {
                    if let Err(e) = photo_service::delete_photo(&conn, &uuid) {
                        error_log::record("delete photo", &e.to_string());
                    }
                }
            }
            selected.set(Vec::new());
            rerun();
        }
    };

    let result_list = results();
    let selection_count = selected().len();

    rsx! {
        div { class: "screen",

            div { class: "screen-header",
                h1 { "🔍 Search" }
            }

            SearchBar {
                available_tags: available_tags(),
                on_search: move |query| run_search(query),
            }

            if let Some(message) = error() {
                div { class: "error-banner", span { "{message}" } }
            }

            if selection_count > 0 {
                div { class: "selection-toolbar",
                    span { "{selection_count} selected" }
                    button { class: "btn-secondary", onclick: favorite_selected, "♥ Favorite" }
                    MoveToAlbumPicker { albums: albums(), on_pick: move_selected }
                    button { class: "btn-danger", onclick: delete_selected, "🗑 Delete" }
                    button {
                        class: "btn-secondary",
                        onclick: move |_| selected.set(Vec::new()),
                        "Clear"
                    }
                }
            }

            div { class: "screen-body",
                if searched() {
                    PhotoGrid {
                        photos: result_list.clone(),
                        empty_message: "No photos match these filters.".to_string(),
                        selected: selected(),
                        on_selection_change: move |ids| selected.set(ids),
                        on_open: move |index| open_index.set(Some(index)),
                    }
                } else {
                    div { class: "grid-state grid-empty",
                        p { "Search your whole library by text, tags or date." }
                    }
                }
            }

            if let Some(index) = open_index() {
                PhotoModal {
                    photos: result_list.clone(),
                    initial_index: index,
                    on_close: move |_| open_index.set(None),
                    on_changed: move |_| rerun(),
                }
            }
        }
    }
}
