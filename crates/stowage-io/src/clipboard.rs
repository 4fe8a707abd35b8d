//! Clipboard paste capture via the browser `ClipboardEvent` API.
//!
//! A paste event's `DataTransfer` is only readable while the event is
//! being dispatched, so capture happens in two steps:
//! [`snapshot`] synchronously copies each item's type and `File` handle
//! out of the event, then [`read_items`] asynchronously reads the bytes
//! of the one item the widget can use.
//!
//! All functions require a browser environment
//! (`wasm32-unknown-unknown` target).

use stowage_core::form::is_paste_accepted;
use stowage_core::{ClipboardItem, LocalFile};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Errors that can occur when reading pasted data.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// A browser API call returned an error or a required object was missing.
    #[error("clipboard API error: {0}")]
    JsError(String),
}

impl From<JsValue> for ClipboardError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// One clipboard item copied out of a paste event.
#[derive(Debug, Clone)]
pub struct PastedEntry {
    mime: String,
    file: Option<web_sys::File>,
}

impl PastedEntry {
    /// Declared MIME type.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }
}

/// Copy the clipboard items out of a paste event.
///
/// Returns an empty list if `event` is not a `ClipboardEvent` or carries
/// no clipboard data.
#[must_use]
pub fn snapshot(event: &web_sys::Event) -> Vec<PastedEntry> {
    let Some(data) = event
        .dyn_ref::<web_sys::ClipboardEvent>()
        .and_then(web_sys::ClipboardEvent::clipboard_data)
    else {
        return Vec::new();
    };
    let items = data.items();
    (0..items.length())
        .filter_map(|i| items.get(i))
        .map(|item| {
            let file = if item.kind() == "file" {
                item.get_as_file().ok().flatten()
            } else {
                None
            };
            PastedEntry {
                mime: item.type_(),
                file,
            }
        })
        .collect()
}

/// Read the snapshot into [`ClipboardItem`]s.
///
/// Only the first item is ever uploaded, so only its bytes are read,
/// and only when its type is accepted. The rest keep their MIME type so
/// validation can still report on them.
///
/// # Errors
///
/// Returns [`ClipboardError::JsError`] if reading the file fails.
#[allow(clippy::future_not_send)] // WASM is single-threaded; File is !Send
pub async fn read_items(entries: Vec<PastedEntry>) -> Result<Vec<ClipboardItem>, ClipboardError> {
    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let file = match entry.file {
            Some(ref file) if index == 0 && is_paste_accepted(&entry.mime) => {
                Some(read_file(file, &entry.mime).await?)
            }
            _ => None,
        };
        items.push(ClipboardItem {
            mime: entry.mime,
            file,
        });
    }
    Ok(items)
}

/// Read a `File` fully into memory.
///
/// # Errors
///
/// Returns [`ClipboardError::JsError`] if `arrayBuffer()` rejects.
#[allow(clippy::future_not_send)]
pub async fn read_file(file: &web_sys::File, mime: &str) -> Result<LocalFile, ClipboardError> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let mime = if file.type_().is_empty() {
        mime.to_owned()
    } else {
        file.type_()
    };
    Ok(LocalFile {
        name: file.name(),
        mime,
        bytes,
    })
}
