use crate::database;
use crate::services::{error_log, photo_service, thumbnail_loader};
use dioxus::prelude::*;

/// Settings and diagnostics: storage locations, library counters, thumbnail
/// cache state and the recent-error log.
#[component]
pub fn SettingsScreen() -> Element {
    let loader = thumbnail_loader::use_thumbnail_loader();
    let mut errors = use_signal(error_log::recent);
    let mut photo_count = use_signal(|| None::<i64>);

    use_effect(move || {
        match database::init_database() {
            Ok(conn) => match photo_service::init_photo_service().count_photos(&conn) {
                Ok(count) => photo_count.set(Some(count)),
                Err(e) => error_log::record("count photos", &e.to_string()),
            },
            Err(e) => error_log::record("open database", &e.to_string()),
        }
    });

    let (cache_entries, cache_bytes) = loader.cache_stats();
    let storage_path = database::get_storage_path();
    let database_path = database::get_database_path().to_string_lossy().to_string();

    rsx! {
        div { class: "screen",
            div { class: "screen-header",
                h1 { "⚙️ Settings" }
            }

            div { class: "settings-section",
                h2 { "Storage" }
                div { class: "settings-row",
                    span { "Photos" }
                    span { class: "muted", "{storage_path}" }
                }
                div { class: "settings-row",
                    span { "Database" }
                    span { class: "muted", "{database_path}" }
                }
                if let Some(count) = photo_count() {
                    div { class: "settings-row",
                        span { "Photos in library" }
                        span { "{count}" }
                    }
                }
            }

            div { class: "settings-section",
                h2 { "Thumbnail cache" }
                div { class: "settings-row",
                    span { "Entries" }
                    span { "{cache_entries}" }
                }
                div { class: "settings-row",
                    span { "Memory" }
                    span { "{cache_bytes / 1024} KB" }
                }
                button {
                    class: "btn-secondary",
                    onclick: move |_| loader.run_cleanup(),
                    "Free memory now"
                }
            }

            div { class: "settings-section",
                h2 { "Recent errors" }
                if errors().is_empty() {
                    p { class: "muted", "No errors recorded." }
                } else {
                    div { class: "error-log",
                        for entry in errors() {
                            div { class: "error-log-entry",
                                span { class: "muted", "{entry.timestamp}" }
                                span { class: "error-log-context", "{entry.context}" }
                                span { "{entry.message}" }
                            }
                        }
                    }
                    button {
                        class: "btn-secondary",
                        onclick: move |_| {
                            error_log::clear();
                            errors.set(Vec::new());
                        },
                        "Clear log"
                    }
                }
            }
        }
    }
}
