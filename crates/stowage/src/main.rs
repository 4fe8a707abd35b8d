use dioxus::prelude::*;
use stowage_core::{ResourceType, Session};
use stowage_io::UploadWidget;

fn main() {
    dioxus::launch(app);
}

/// Backend origin and session, as read from the hosting page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageConfig {
    api_base: String,
    session: Session,
}

impl PageConfig {
    /// The page origin serves `/api/*`; the query carries the session.
    ///
    /// Outside a browser both fall back to empty, which yields
    /// root-relative URLs and an anonymous session.
    fn from_location() -> Self {
        let location = web_sys::window().map(|w| w.location());
        let api_base = location
            .as_ref()
            .and_then(|l| l.origin().ok())
            .unwrap_or_default();
        let query = location
            .as_ref()
            .and_then(|l| l.search().ok())
            .unwrap_or_default();
        Self {
            api_base,
            session: Session::from_query(&query),
        }
    }
}

/// Root application component.
///
/// Reads the page configuration once and shows one tab per built-in
/// resource type above the upload widget.
fn app() -> Element {
    let config = use_hook(|| {
        let config = PageConfig::from_location();
        tracing::info!(
            api_base = %config.api_base,
            user = ?config.session.user,
            admin = config.session.is_admin,
            dev = config.session.is_dev,
            "starting stowage"
        );
        config
    });
    let mut resource = use_signal(ResourceType::default);

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/stowage.css") }

        div { class: "stowage-page",
            header { class: "stowage-header",
                h1 { "stowage" }
                if let Some(ref user) = config.session.user {
                    span { class: "stowage-muted", "Signed in as {user}" }
                }
            }

            nav { class: "stowage-tabs", role: "tablist",
                for kind in ResourceType::BUILTIN {
                    button {
                        key: "{kind}",
                        class: if resource() == kind { "stowage-tab stowage-tab-active" } else { "stowage-tab" },
                        role: "tab",
                        "aria-selected": "{resource() == kind}",
                        onclick: {
                            let kind = kind.clone();
                            move |_| resource.set(kind.clone())
                        },
                        "{kind}"
                    }
                }
            }

            UploadWidget {
                resource: resource(),
                session: config.session.clone(),
                api_base: config.api_base.clone(),
            }
        }
    }
}
