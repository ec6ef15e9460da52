use crate::database;
use crate::services::error_log;
use dioxus::prelude::*;

/// Full-page screen for unrecoverable bootstrap failures. Offers a retry
/// and a full data reset; everything else in the app is unreachable until
/// one of them succeeds.
#[component]
pub fn BootstrapErrorScreen(message: String, on_retry: EventHandler<()>) -> Element {
    let mut reset_error = use_signal(|| None::<String>);

    let reset = move |_| match database::reset_all_data() {
        Ok(()) => on_retry.call(()),
        Err(e) => {
            error_log::record("reset data", &e.to_string());
            reset_error.set(Some(e.user_message()));
        }
    };

    rsx! {
        div { class: "bootstrap-error",
            div { class: "bootstrap-error-card",
                h1 { "😵 Something went wrong" }
                p { "Fotowand could not start its photo library." }
                p { class: "bootstrap-error-detail", "{message}" }

                if let Some(extra) = reset_error() {
                    p { class: "bootstrap-error-detail", "{extra}" }
                }

                div { class: "bootstrap-error-actions",
                    button {
                        class: "btn-primary",
                        onclick: move |_| on_retry.call(()),
                        "Try again"
                    }
                    button { class: "btn-danger", onclick: reset, "Reset all data" }
                }
            }
        }
    }
}
