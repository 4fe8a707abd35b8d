//! Transient notices stacked in a corner of the widget.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;
use stowage_core::{Notice, NoticeLevel};

/// How long a notice stays on screen.
const DISMISS_AFTER_MS: u32 = 4_000;

/// A notice with an id so it can be dismissed individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Unique within one widget.
    pub id: u64,
    /// What to show.
    pub notice: Notice,
}

/// Props for the [`Toasts`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ToastsProps {
    /// Live list; entries remove themselves on timeout or click.
    toasts: Signal<Vec<Toast>>,
}

/// Renders every queued notice; each dismisses itself after a few
/// seconds.
#[component]
pub fn Toasts(props: ToastsProps) -> Element {
    let toasts = props.toasts;

    rsx! {
        div { class: "stowage-toasts", role: "status", aria_live: "polite",
            for toast in toasts() {
                ToastItem { key: "{toast.id}", toast, toasts }
            }
        }
    }
}

#[component]
fn ToastItem(toast: Toast, toasts: Signal<Vec<Toast>>) -> Element {
    let mut toasts = toasts;
    let id = toast.id;

    use_future(move || async move {
        gloo_timers::future::TimeoutFuture::new(DISMISS_AFTER_MS).await;
        toasts.write().retain(|t| t.id != id);
    });

    let level = match toast.notice.level {
        NoticeLevel::Success => "stowage-toast-success",
        NoticeLevel::Warning => "stowage-toast-warning",
        NoticeLevel::Error => "stowage-toast-error",
    };

    rsx! {
        div { class: "stowage-toast {level}",
            span { "{toast.notice.message}" }
            button {
                class: "stowage-icon-button",
                aria_label: "Dismiss",
                onclick: move |_| toasts.write().retain(|t| t.id != id),
                Icon { icon: LdX, width: 12, height: 12 }
            }
        }
    }
}
