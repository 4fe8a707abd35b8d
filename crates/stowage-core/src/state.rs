//! Explicit widget state machine.
//!
//! [`WidgetState`] is plain data with guarded transitions. It performs
//! no I/O; the [`Widget`](crate::Widget) orchestrator issues requests
//! and feeds their outcomes back in.
//!
//! # Tickets
//!
//! Every credential or list fetch is issued under a [`Ticket`]. Only
//! the most recently issued ticket of each kind is honored when its
//! response arrives, so a slow response for a previous resource type
//! (or a superseded reload) can never overwrite fresher data.

use crate::types::{ObjectDescriptor, ResourceType, SignedCredential, WidgetError};

/// Identity of one outstanding fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    resource: ResourceType,
    seq: u64,
}

impl Ticket {
    /// Resource type the fetch was issued for.
    #[must_use]
    pub const fn resource(&self) -> &ResourceType {
        &self.resource
    }
}

/// Where the signed credential stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CredentialSlot {
    /// Not requested (anonymous session, or freshly reset).
    #[default]
    Absent,
    /// A signature request is in flight.
    Loading(Ticket),
    /// A credential was issued. It may still lack a host.
    Ready(SignedCredential),
    /// The backend refused or the request failed.
    Failed,
}

/// Single-flight guard for clipboard uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasteSlot {
    /// No paste upload in flight.
    #[default]
    Idle,
    /// A pasted image is being transferred.
    Uploading,
}

/// Progress of one dropped or picked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStatus {
    /// Transfer in flight.
    Uploading,
    /// Transfer failed; kept visible until dismissed.
    Failed,
}

/// A dropped or picked file that has not finished uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Generated storage key; unique per transfer.
    pub key: String,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Current status.
    pub status: PendingStatus,
}

/// Summary of what the widget is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight.
    Idle,
    /// Waiting for a signed credential.
    LoadingCredential,
    /// Waiting for the object list or a save/remove call.
    LoadingList,
    /// A pasted image is being transferred.
    Uploading,
}

/// All state held by one upload widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    resource: ResourceType,
    next_seq: u64,
    credential: CredentialSlot,
    items: Vec<ObjectDescriptor>,
    list_ticket: Option<Ticket>,
    mutations: u32,
    paste: PasteSlot,
    pending: Vec<PendingUpload>,
}

impl WidgetState {
    /// Fresh state for `resource` with nothing loaded.
    #[must_use]
    pub fn new(resource: ResourceType) -> Self {
        Self {
            resource,
            ..Self::default()
        }
    }

    // ───────────────────────── Queries ──────────────────────────

    /// Resource type currently shown.
    #[must_use]
    pub const fn resource(&self) -> &ResourceType {
        &self.resource
    }

    /// Credential slot.
    #[must_use]
    pub const fn credential_slot(&self) -> &CredentialSlot {
        &self.credential
    }

    /// The issued credential, if any.
    #[must_use]
    pub const fn credential(&self) -> Option<&SignedCredential> {
        match &self.credential {
            CredentialSlot::Ready(credential) => Some(credential),
            _ => None,
        }
    }

    /// Objects of the current resource type.
    #[must_use]
    pub fn items(&self) -> &[ObjectDescriptor] {
        &self.items
    }

    /// Dropped or picked files still uploading or failed.
    #[must_use]
    pub fn pending(&self) -> &[PendingUpload] {
        &self.pending
    }

    /// Whether the list is being (re)loaded or a save/remove is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.list_ticket.is_some() || self.mutations > 0
    }

    /// Whether a pasted image is uploading.
    #[must_use]
    pub fn is_pasting(&self) -> bool {
        self.paste == PasteSlot::Uploading
    }

    /// Summary of what is in flight, most user-visible first.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if matches!(self.paste, PasteSlot::Uploading) {
            Phase::Uploading
        } else if matches!(self.credential, CredentialSlot::Loading(_)) {
            Phase::LoadingCredential
        } else if self.is_loading() {
            Phase::LoadingList
        } else {
            Phase::Idle
        }
    }

    // ──────────────────────── Transitions ────────────────────────

    /// Switch to `resource`.
    ///
    /// The list and credential are dropped immediately, and every
    /// outstanding fetch becomes stale. Paste and pending uploads keep
    /// running; they were authorized under the old credential.
    pub fn select_type(&mut self, resource: ResourceType) {
        self.resource = resource;
        self.items.clear();
        self.list_ticket = None;
        self.credential = CredentialSlot::Absent;
    }

    fn issue(&mut self) -> Ticket {
        self.next_seq += 1;
        Ticket {
            resource: self.resource.clone(),
            seq: self.next_seq,
        }
    }

    /// Start a signature request for the current type.
    pub fn begin_credential(&mut self) -> Ticket {
        let ticket = self.issue();
        self.credential = CredentialSlot::Loading(ticket.clone());
        ticket
    }

    /// Record the outcome of a signature request.
    ///
    /// Returns `false` and changes nothing if `ticket` is stale.
    pub fn finish_credential(
        &mut self,
        ticket: &Ticket,
        outcome: Result<SignedCredential, ()>,
    ) -> bool {
        if !matches!(&self.credential, CredentialSlot::Loading(current) if current == ticket) {
            return false;
        }
        self.credential = match outcome {
            Ok(credential) => CredentialSlot::Ready(credential),
            Err(()) => CredentialSlot::Failed,
        };
        true
    }

    /// Start a list request for the current type, superseding any
    /// outstanding one.
    pub fn begin_list(&mut self) -> Ticket {
        let ticket = self.issue();
        self.list_ticket = Some(ticket.clone());
        ticket
    }

    /// Record the outcome of a list request.
    ///
    /// `None` means the request failed; the list is left empty. Returns
    /// `false` and changes nothing if `ticket` is stale.
    pub fn finish_list(&mut self, ticket: &Ticket, items: Option<Vec<ObjectDescriptor>>) -> bool {
        if self.list_ticket.as_ref() != Some(ticket) {
            return false;
        }
        self.list_ticket = None;
        self.items = items.unwrap_or_default();
        true
    }

    /// A save or remove call started.
    pub const fn begin_mutation(&mut self) {
        self.mutations += 1;
    }

    /// A save or remove call settled.
    pub const fn finish_mutation(&mut self) {
        self.mutations = self.mutations.saturating_sub(1);
    }

    /// Enter the paste upload.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::PasteInFlight`] if a paste upload is
    /// already running.
    pub fn begin_paste(&mut self) -> Result<(), WidgetError> {
        if self.is_pasting() {
            return Err(WidgetError::PasteInFlight);
        }
        self.paste = PasteSlot::Uploading;
        Ok(())
    }

    /// Leave the paste upload, whatever its outcome.
    pub const fn finish_paste(&mut self) {
        self.paste = PasteSlot::Idle;
    }

    /// Track a dropped or picked file.
    pub fn add_pending(&mut self, key: String, name: String, size: u64) {
        self.pending.push(PendingUpload {
            key,
            name,
            size,
            status: PendingStatus::Uploading,
        });
    }

    /// Drop a pending entry (transfer succeeded, or user dismissed it).
    pub fn remove_pending(&mut self, key: &str) {
        self.pending.retain(|p| p.key != key);
    }

    /// Mark a pending entry as failed.
    pub fn fail_pending(&mut self, key: &str) {
        if let Some(entry) = self.pending.iter_mut().find(|p| p.key == key) {
            entry.status = PendingStatus::Failed;
        }
    }
}
