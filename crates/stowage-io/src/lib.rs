//! stowage-io: network, browser I/O and Dioxus components.
//!
//! Supplies the `reqwest`-backed [`HttpTransport`], clipboard paste
//! capture, and the components that make up the upload widget.

pub mod clipboard;
pub mod components;
pub mod http;

pub use components::{DropZone, FileList, MediaList, Toast, Toasts, UploadWidget};
pub use http::HttpTransport;
