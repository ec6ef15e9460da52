use dioxus::prelude::*;
use uuid::Uuid;

mod components;
mod database;
mod error;
mod image_processing;
mod services;

use components::{
    AlbumGridScreen, AlbumPhotosScreen, BootstrapErrorScreen, NavigationBar, PhotoImportDialog,
    SearchScreen, SettingsScreen,
};
use dioxus_grid::DragDropProvider;
use services::thumbnail_loader;

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    env_logger::init();
    dioxus::launch(App);
}

/// Screen navigation for the app
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Albums,
    AlbumPhotos { album_id: Uuid, album_name: String },
    Search,
    Settings,
}

#[component]
fn App() -> Element {
    let mut current_screen = use_signal(|| Screen::Albums);
    // Target album of an open import dialog; None means no dialog.
    let mut import_target = use_signal(|| None::<Option<Uuid>>);
    // Bumped whenever an import completes so the active screen reloads.
    let mut reload_epoch = use_signal(|| 0u64);

    // Bootstrap once; a failure here replaces the whole UI with the error
    // screen until retry or reset succeeds.
    let mut bootstrap_error =
        use_signal(|| database::init_database().err().map(|e| e.user_message()));

    thumbnail_loader::provide_thumbnail_loader();

    if let Some(message) = bootstrap_error() {
        return rsx! {
            document::Link { rel: "stylesheet", href: MAIN_CSS }
            BootstrapErrorScreen {
                message,
                on_retry: move |_| {
                    bootstrap_error.set(database::init_database().err().map(|e| e.user_message()));
                },
            }
        };
    }

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        DragDropProvider {
            div { style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif;",

                // Main Content
                div { style: "flex: 1; overflow-y: auto;",
                    match current_screen() {
                        Screen::Albums => rsx! {
                            AlbumGridScreen {
                                key: "albums-{reload_epoch}",
                                on_navigate: move |s| current_screen.set(s),
                                on_import: move |album| import_target.set(Some(album)),
                            }
                        },
                        Screen::AlbumPhotos { album_id, album_name } => rsx! {
                            AlbumPhotosScreen {
                                key: "album-{album_id}-{reload_epoch}",
                                album_id,
                                album_name,
                                on_navigate: move |s| current_screen.set(s),
                                on_import: move |album| import_target.set(Some(album)),
                            }
                        },
                        Screen::Search => rsx! {
                            SearchScreen {}
                        },
                        Screen::Settings => rsx! {
                            SettingsScreen {}
                        },
                    }
                }

                // Bottom Navigation Bar
                NavigationBar {
                    current_screen: current_screen(),
                    on_navigate: move |screen| current_screen.set(screen),
                }
            }

            if let Some(album) = import_target() {
                PhotoImportDialog {
                    album_id: album,
                    on_close: move |imported: bool| {
                        import_target.set(None);
                        if imported {
                            reload_epoch.set(reload_epoch() + 1);
                        }
                    },
                }
            }
        }
    }
}
