//! Grid of stored media for non-`file` resource types.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdLoader, LdTrash2};
use stowage_core::{ObjectDescriptor, ResourceType};

/// Props for the [`MediaList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct MediaListProps {
    /// Resource type being shown; picks the preview element.
    resource: ResourceType,
    /// Objects to show.
    items: Vec<ObjectDescriptor>,
    /// Show a spinner instead of the empty-state text.
    loading: bool,
    /// Show a remove button on each tile.
    can_remove: bool,
    /// Called with the `objectId` of the object to delete.
    on_remove: EventHandler<String>,
}

/// Preview tiles: `img`, `video` or `audio` depending on the resource
/// type, with a plain caption for anything else.
#[component]
pub fn MediaList(props: MediaListProps) -> Element {
    if props.loading {
        return rsx! {
            div { class: "stowage-grid-status stowage-muted",
                span { class: "stowage-spin",
                    Icon { icon: LdLoader, width: 20, height: 20 }
                }
            }
        };
    }
    if props.items.is_empty() {
        return rsx! {
            div { class: "stowage-grid-status stowage-muted", "Nothing uploaded yet." }
        };
    }

    rsx! {
        div { class: "stowage-grid",
            for item in props.items.iter().cloned() {
                MediaTile {
                    key: "{item.object_id}",
                    resource: props.resource.clone(),
                    item,
                    can_remove: props.can_remove,
                    on_remove: props.on_remove,
                }
            }
        }
    }
}

#[component]
fn MediaTile(
    resource: ResourceType,
    item: ObjectDescriptor,
    can_remove: bool,
    on_remove: EventHandler<String>,
) -> Element {
    let object_id = item.object_id.clone();

    rsx! {
        figure { class: "stowage-tile",
            {preview(&resource, &item)}
            figcaption { title: "{item.name}", "{item.name}" }
            if can_remove {
                button {
                    class: "stowage-icon-button stowage-tile-remove",
                    title: "Remove",
                    aria_label: "Remove {item.name}",
                    onclick: move |_| on_remove.call(object_id.clone()),
                    Icon { icon: LdTrash2, width: 14, height: 14 }
                }
            }
        }
    }
}

fn preview(resource: &ResourceType, item: &ObjectDescriptor) -> Element {
    let Some(src) = item.url.as_deref() else {
        return rsx! {
            div { class: "stowage-tile-placeholder stowage-muted", "{item.key}" }
        };
    };
    match resource {
        ResourceType::Image => rsx! {
            img { src: "{src}", alt: "{item.name}", loading: "lazy" }
        },
        ResourceType::Video => rsx! {
            video { src: "{src}", controls: true, preload: "metadata" }
        },
        ResourceType::Audio => rsx! {
            audio { src: "{src}", controls: true, preload: "none" }
        },
        ResourceType::File | ResourceType::Other(_) => rsx! {
            a { href: "{src}", target: "_blank", rel: "noopener", "Open" }
        },
    }
}
