//! stowage-core: Upload widget logic (sans-IO).
//!
//! Drives the upload flow of a storage widget:
//! fetch signed credential -> list objects -> transfer file directly to
//! storage -> register metadata -> reload list.
//!
//! This crate has **no I/O dependencies** -- every network call goes
//! through the injected [`Transport`] and every random identifier comes
//! from the injected [`KeyGenerator`]. Browser and HTTP plumbing lives in
//! `stowage-io`.

pub mod endpoint;
pub mod form;
pub mod key;
pub mod state;
pub mod transport;
pub mod types;
pub mod widget;

pub use endpoint::Endpoints;
pub use form::{ClipboardItem, LocalFile, PASTE_ACCEPTS, UploadTask};
pub use key::{KeyGenerator, UuidKeys};
pub use state::{CredentialSlot, PasteSlot, PendingStatus, PendingUpload, Phase, Ticket, WidgetState};
pub use transport::{HttpResponse, Transport, TransportError};
pub use types::{
    Notice, NoticeLevel, ObjectDescriptor, Registration, ResourceType, Session, SignedCredential,
    WidgetError,
};
pub use widget::{Observer, Widget};
