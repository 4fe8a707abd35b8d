//! Dioxus UI components for stowage.
//!
//! Provides the drop zone with its pending list, the file table and
//! media grid, toast notices, and the [`UploadWidget`] tying them to a
//! [`stowage_core::Widget`].

mod drop_zone;
mod file_list;
mod media_list;
mod toast;
mod upload_widget;

pub use drop_zone::DropZone;
pub use file_list::{FileList, format_size};
pub use media_list::MediaList;
pub use toast::{Toast, Toasts};
pub use upload_widget::UploadWidget;
