//! Table of stored objects for the `file` resource type.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdFile, LdLoader, LdTrash2};
use stowage_core::ObjectDescriptor;

/// Props for the [`FileList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileListProps {
    /// Objects to show.
    items: Vec<ObjectDescriptor>,
    /// Show a spinner row instead of the empty-state text.
    loading: bool,
    /// Show the remove column.
    can_remove: bool,
    /// Called with the `objectId` of the object to delete.
    on_remove: EventHandler<String>,
}

/// Name, size, link and (for admins) a remove button per object.
#[component]
pub fn FileList(props: FileListProps) -> Element {
    let columns = if props.can_remove { 4 } else { 3 };

    rsx! {
        table { class: "stowage-table",
            thead {
                tr {
                    th { "Name" }
                    th { "Size" }
                    th { "Link" }
                    if props.can_remove {
                        th { class: "stowage-narrow" }
                    }
                }
            }
            tbody {
                if props.loading {
                    tr {
                        td { colspan: "{columns}", class: "stowage-muted",
                            span { class: "stowage-spin",
                                Icon { icon: LdLoader, width: 14, height: 14 }
                            }
                            " Loading..."
                        }
                    }
                } else if props.items.is_empty() {
                    tr {
                        td { colspan: "{columns}", class: "stowage-muted", "No files yet." }
                    }
                }
                for item in props.items.iter().cloned() {
                    FileRow {
                        key: "{item.object_id}",
                        item,
                        can_remove: props.can_remove,
                        on_remove: props.on_remove,
                    }
                }
            }
        }
    }
}

#[component]
fn FileRow(item: ObjectDescriptor, can_remove: bool, on_remove: EventHandler<String>) -> Element {
    let object_id = item.object_id.clone();
    let size = format_size(item.size);
    let link = item.url.clone();

    rsx! {
        tr {
            td {
                span { class: "stowage-file-icon",
                    Icon { icon: LdFile, width: 14, height: 14 }
                }
                " {item.name}"
            }
            td { class: "stowage-muted", "{size}" }
            td {
                if let Some(href) = link {
                    a { href: "{href}", target: "_blank", rel: "noopener", "Open" }
                } else {
                    span { class: "stowage-muted", "{item.key}" }
                }
            }
            if can_remove {
                td { class: "stowage-narrow",
                    button {
                        class: "stowage-icon-button",
                        title: "Remove",
                        aria_label: "Remove {item.name}",
                        onclick: move |_| on_remove.call(object_id.clone()),
                        Icon { icon: LdTrash2, width: 14, height: 14 }
                    }
                }
            }
        }
    }
}

/// Human-readable byte count using binary units, one decimal above bytes.
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_stay_whole() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn larger_sizes_scale() {
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn tops_out_at_terabytes() {
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024 * 1024), "2048.0 TB");
    }
}
