//! Drop zone with drag-and-drop and a multi-file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdUpload, LdX};
use stowage_core::{LocalFile, PendingStatus, PendingUpload, ResourceType};

/// Props for the [`DropZone`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DropZoneProps {
    /// Resource type whose accept filter the picker and drops apply.
    resource: ResourceType,
    /// Mention that images can also be pasted.
    paste_hint: bool,
    /// Files still uploading, or failed and awaiting dismissal.
    pending: Vec<PendingUpload>,
    /// Called with every batch of dropped or picked files.
    on_files: EventHandler<Vec<LocalFile>>,
    /// Called with the storage key of a failed entry the user dismissed.
    on_dismiss: EventHandler<String>,
}

/// A drag-and-drop zone wrapping a hidden multi-file picker.
///
/// Every dropped or picked file is read into memory and the whole batch
/// is forwarded through `on_files`. Browsers apply `accept` to the
/// picker only, so dropped files whose reported type falls outside the
/// resource type are refused here with a message. Files the browser
/// reports no type for are passed on.
#[component]
pub fn DropZone(props: DropZoneProps) -> Element {
    let mut dragging = use_signal(|| false);
    let error = use_signal(|| Option::<String>::None);

    let handle_files = {
        let resource = props.resource.clone();
        move |evt: FormEvent| {
            let resource = resource.clone();
            async move {
                process_files(evt.files(), &resource, error, props.on_files).await;
            }
        }
    };

    let handle_drop = {
        let resource = props.resource.clone();
        move |evt: DragEvent| {
            let resource = resource.clone();
            async move {
                evt.prevent_default();
                dragging.set(false);
                process_files(evt.files(), &resource, error, props.on_files).await;
            }
        }
    };

    let zone_class = if dragging() {
        "stowage-dropzone stowage-dropzone-active"
    } else {
        "stowage-dropzone"
    };
    let accept = match props.resource {
        ResourceType::File => String::new(),
        ref other => other.accept_filter(),
    };
    let hint = if props.paste_hint {
        "Drop files(or paste image) here or click to upload."
    } else {
        "Drop files here or click to upload."
    };

    rsx! {
        label {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            input {
                r#type: "file",
                multiple: true,
                accept: "{accept}",
                class: "stowage-hidden",
                onchange: handle_files,
            }

            p { class: "stowage-dropzone-icon",
                Icon { icon: LdUpload, width: 40, height: 40 }
            }
            p { class: "stowage-dropzone-text", "{hint}" }

            if let Some(ref err) = error() {
                p { class: "stowage-text-error", "{err}" }
            }
        }

        if !props.pending.is_empty() {
            ul { class: "stowage-pending",
                for entry in props.pending.iter().cloned() {
                    PendingRow {
                        key: "{entry.key}",
                        entry,
                        on_dismiss: props.on_dismiss,
                    }
                }
            }
        }
    }
}

/// Shared by the picker (`handle_files`) and drag-and-drop
/// (`handle_drop`) paths.
#[allow(clippy::future_not_send)]
async fn process_files(
    files: Vec<FileData>,
    resource: &ResourceType,
    mut error: Signal<Option<String>>,
    on_files: EventHandler<Vec<LocalFile>>,
) {
    let mut batch = Vec::with_capacity(files.len());
    let mut refused = Vec::new();
    for file in files {
        let name = file.name();
        let mime = file.content_type().unwrap_or_default();
        if !mime.is_empty() && !resource.accepts(&mime) {
            refused.push(name);
            continue;
        }
        match file.read_bytes().await {
            Ok(bytes) => batch.push(LocalFile::with_mime(name, mime, bytes.to_vec())),
            Err(e) => {
                error.set(Some(format!("Failed to read {name}: {e}")));
            }
        }
    }
    if refused.is_empty() {
        if !batch.is_empty() {
            error.set(None);
        }
    } else {
        error.set(Some(format!("Not {resource} files: {}", refused.join(", "))));
    }
    if !batch.is_empty() {
        on_files.call(batch);
    }
}

#[component]
fn PendingRow(entry: PendingUpload, on_dismiss: EventHandler<String>) -> Element {
    let key = entry.key.clone();
    match entry.status {
        PendingStatus::Uploading => rsx! {
            li { class: "stowage-pending-row",
                span { class: "stowage-pending-name", "{entry.name}" }
                span { class: "stowage-muted", "uploading" }
            }
        },
        PendingStatus::Failed => rsx! {
            li { class: "stowage-pending-row stowage-pending-failed",
                span { class: "stowage-pending-name", "{entry.name}" }
                span { class: "stowage-text-error", "failed" }
                button {
                    class: "stowage-icon-button",
                    aria_label: "Dismiss",
                    onclick: move |_| on_dismiss.call(key.clone()),
                    Icon { icon: LdX, width: 14, height: 14 }
                }
            }
        },
    }
}
