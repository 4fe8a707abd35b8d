//! The complete upload widget.
//!
//! Wires a [`Widget`] over [`HttpTransport`] into Dioxus: state
//! snapshots land in a signal that drives rendering, notices become
//! toasts, and every network flow runs as a spawned task.

use std::future::Future;
use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdLoader;
use stowage_core::{
    Endpoints, LocalFile, Notice, Observer, ResourceType, Session, UuidKeys, Widget, WidgetError,
    WidgetState,
};

use super::{DropZone, FileList, MediaList, Toast, Toasts};
use crate::clipboard;
use crate::http::HttpTransport;

const LOGIN_WARNING: &str =
    "Uploading service is not available for non-login user, please login.";

type BrowserWidget = Widget<HttpTransport, UuidKeys, SignalObserver>;

/// Forwards widget state and notices into Dioxus signals.
#[derive(Clone, Copy)]
struct SignalObserver {
    state: Signal<WidgetState>,
    toasts: Signal<Vec<Toast>>,
    next_toast: Signal<u64>,
}

impl SignalObserver {
    fn push(&self, notice: Notice) {
        let mut toasts = self.toasts;
        let mut next_toast = self.next_toast;
        let id = *next_toast.peek();
        next_toast.set(id + 1);
        toasts.write().push(Toast { id, notice });
    }
}

impl Observer for SignalObserver {
    fn state_changed(&self, state: &WidgetState) {
        let mut signal = self.state;
        signal.set(state.clone());
    }

    fn notify(&self, notice: Notice) {
        self.push(notice);
    }
}

/// Run a widget flow in the background.
fn detach(task: impl Future<Output = Result<(), WidgetError>> + 'static) {
    spawn(async move {
        if let Err(err) = task.await {
            tracing::debug!(error = %err, "widget flow failed");
        }
    });
}

/// Upload widget for one resource type.
///
/// Changing `resource` clears the list and refetches both the list and
/// the upload credential. `session` and `api_base` are read once, when
/// the widget is first rendered.
#[component]
#[allow(clippy::too_many_lines)]
pub fn UploadWidget(resource: ResourceType, session: Session, api_base: String) -> Element {
    let state = use_signal(|| WidgetState::new(resource.clone()));
    let toasts = use_signal(Vec::<Toast>::new);
    let next_toast = use_signal(|| 0_u64);
    let observer = SignalObserver {
        state,
        toasts,
        next_toast,
    };

    let widget: Rc<BrowserWidget> = use_hook(|| {
        tracing::debug!(%api_base, user = ?session.user, "creating upload widget");
        Rc::new(
            Widget::new(
                HttpTransport::new(),
                Endpoints::new(api_base.clone()),
                session.clone(),
                resource.clone(),
            )
            .with_observer(observer),
        )
    });

    // --- Resource type changes ---
    use_effect(use_reactive((&resource,), {
        let widget = Rc::clone(&widget);
        move |(resource,)| {
            widget.select_type(resource);
            let w = Rc::clone(&widget);
            detach(async move { w.load_credential().await });
            let w = Rc::clone(&widget);
            detach(async move { w.load_list().await });
        }
    }));

    // --- Handlers ---
    let on_files = EventHandler::new({
        let widget = Rc::clone(&widget);
        move |files: Vec<LocalFile>| {
            for file in files {
                let w = Rc::clone(&widget);
                detach(async move { w.upload_file(file).await });
            }
        }
    });

    let on_dismiss = EventHandler::new({
        let widget = Rc::clone(&widget);
        move |key: String| widget.dismiss_pending(&key)
    });

    let on_remove = EventHandler::new({
        let widget = Rc::clone(&widget);
        move |object_id: String| {
            let w = Rc::clone(&widget);
            detach(async move { w.remove(&object_id).await });
        }
    });

    let on_paste = {
        let widget = Rc::clone(&widget);
        move |evt: Event<ClipboardData>| {
            if widget.state().is_pasting() {
                return;
            }
            let data = evt.data();
            let raw = data.downcast::<web_sys::Event>().cloned().or_else(|| {
                data.downcast::<web_sys::ClipboardEvent>()
                    .map(|e| web_sys::Event::from(e.clone()))
            });
            let Some(event) = raw else {
                tracing::warn!("paste event is not a browser event");
                return;
            };
            // The clipboard items are only readable during dispatch.
            let entries = clipboard::snapshot(&event);
            let w = Rc::clone(&widget);
            spawn(async move {
                match clipboard::read_items(entries).await {
                    Ok(items) => {
                        if let Err(err) = w.paste(items).await {
                            tracing::debug!(error = %err, "paste failed");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read pasted data");
                        observer.push(Notice::error("Failed to read the pasted image."));
                    }
                }
            });
        }
    };

    // --- Layout ---
    let current = state();
    let loading = current.is_loading();
    let can_remove = session.can_remove();
    let items = current.items().to_vec();

    rsx! {
        div { class: "stowage-widget", onpaste: on_paste,
            // Holds focus so paste events reach the widget without a click.
            input {
                class: "stowage-paste-target",
                r#type: "text",
                autofocus: true,
                readonly: true,
                tabindex: "-1",
                aria_hidden: "true",
            }

            if !session.is_logged_in() {
                div { class: "stowage-alert stowage-alert-warning", role: "alert", "{LOGIN_WARNING}" }
            }

            DropZone {
                resource: resource.clone(),
                paste_hint: resource == ResourceType::Image,
                pending: current.pending().to_vec(),
                on_files,
                on_dismiss,
            }

            if resource == ResourceType::File {
                FileList { items, loading, can_remove, on_remove }
            } else {
                MediaList {
                    resource: resource.clone(),
                    items,
                    loading,
                    can_remove,
                    on_remove,
                }
            }

            if current.is_pasting() {
                div { class: "stowage-overlay",
                    span { class: "stowage-spin",
                        Icon { icon: LdLoader, width: 32, height: 32 }
                    }
                }
            }

            Toasts { toasts }
        }
    }
}
