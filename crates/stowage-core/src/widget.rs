//! Upload widget orchestrator.
//!
//! [`Widget`] owns a [`WidgetState`] and drives it through the four
//! flows of the widget:
//!
//! 1. [`load_credential`](Widget::load_credential) -- `GET /api/signature/<type>`
//! 2. [`load_list`](Widget::load_list) -- `GET /api/list?type=<type>`
//! 3. [`upload_file`](Widget::upload_file) / [`paste`](Widget::paste) -- `POST <host>`
//! 4. [`save`](Widget::save) / [`remove`](Widget::remove) -- register or
//!    delete, then reload the list
//!
//! Every method takes `&self`, so a single `Rc<Widget>` can be shared by
//! concurrently spawned tasks. The state is never borrowed across an
//! `.await`. After each transition the [`Observer`] receives a snapshot,
//! and every user-facing message goes through [`Observer::notify`].

use std::cell::{Ref, RefCell};

use crate::endpoint::Endpoints;
use crate::form::{ClipboardItem, LocalFile, UploadTask, pasted_file};
use crate::key::{KeyGenerator, UuidKeys};
use crate::state::WidgetState;
use crate::transport::Transport;
use crate::types::{
    Notice, ObjectDescriptor, Registration, ResourceType, Session, SignedCredential, WidgetError,
};

/// Receives state snapshots and user-facing notices.
///
/// Both methods default to doing nothing.
pub trait Observer {
    /// Called after every state transition.
    fn state_changed(&self, _state: &WidgetState) {}

    /// Show a transient message to the user.
    fn notify(&self, _notice: Notice) {}
}

impl Observer for () {}

/// The upload widget: state plus injected transport, key source and
/// observer.
pub struct Widget<T, K = UuidKeys, O = ()> {
    transport: T,
    keys: K,
    observer: O,
    endpoints: Endpoints,
    session: Session,
    state: RefCell<WidgetState>,
}

impl<T: Transport> Widget<T> {
    /// A widget for `resource`, generating keys with [`UuidKeys`] and
    /// observing nothing.
    #[must_use]
    pub fn new(transport: T, endpoints: Endpoints, session: Session, resource: ResourceType) -> Self {
        Self {
            transport,
            keys: UuidKeys,
            observer: (),
            endpoints,
            session,
            state: RefCell::new(WidgetState::new(resource)),
        }
    }
}

impl<T: Transport, K: KeyGenerator, O: Observer> Widget<T, K, O> {
    /// Replace the storage key source.
    #[must_use]
    pub fn with_keys<K2: KeyGenerator>(self, keys: K2) -> Widget<T, K2, O> {
        Widget {
            transport: self.transport,
            keys,
            observer: self.observer,
            endpoints: self.endpoints,
            session: self.session,
            state: self.state,
        }
    }

    /// Replace the observer.
    #[must_use]
    pub fn with_observer<O2: Observer>(self, observer: O2) -> Widget<T, K, O2> {
        Widget {
            transport: self.transport,
            keys: self.keys,
            observer,
            endpoints: self.endpoints,
            session: self.session,
            state: self.state,
        }
    }

    /// The session this widget was created with.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The endpoints this widget talks to.
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The injected transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the current state.
    ///
    /// Do not hold the borrow across an `.await`.
    pub fn state(&self) -> Ref<'_, WidgetState> {
        self.state.borrow()
    }

    /// Apply `f` to the state, then publish a snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut WidgetState) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.observer.state_changed(&self.state.borrow());
        result
    }

    fn report(&self, err: &WidgetError) {
        self.observer.notify(Notice::from(err));
    }

    /// Switch to `resource`, clearing the list at once.
    ///
    /// Callers follow up with [`load_credential`](Self::load_credential)
    /// and [`load_list`](Self::load_list); the two may run concurrently
    /// and complete in either order.
    pub fn select_type(&self, resource: ResourceType) {
        tracing::debug!(%resource, "resource type selected");
        self.update(|state| state.select_type(resource));
    }

    /// Fetch a signed credential for the current resource type.
    ///
    /// Skipped when the session can neither sign in nor is in dev mode.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::CredentialRejected`] on a non-200 response
    /// and the transport or decode error otherwise. Every error is also
    /// reported through the observer. A response that arrives after the
    /// resource type changed is dropped and yields `Ok(())`.
    #[allow(clippy::future_not_send)] // single-threaded; state lives in a RefCell
    pub async fn load_credential(&self) -> Result<(), WidgetError> {
        if !self.session.can_sign() {
            tracing::debug!("anonymous session, not requesting a credential");
            return Ok(());
        }

        let ticket = self.update(WidgetState::begin_credential);
        let url = self.endpoints.signature(ticket.resource());
        tracing::debug!(%url, "requesting upload credential");

        let outcome = match self.transport.get(&url).await {
            Ok(response) if response.is_ok() => response.json::<SignedCredential>(),
            Ok(response) => Err(WidgetError::CredentialRejected {
                status: response.status,
                status_text: response.status_text,
            }),
            Err(e) => Err(e.into()),
        };

        let applied = self.update(|state| {
            state.finish_credential(&ticket, outcome.clone().map_err(|_| ()))
        });
        if !applied {
            tracing::warn!(resource = %ticket.resource(), "discarding stale credential response");
            return Ok(());
        }

        match outcome {
            Ok(credential) => {
                if !credential.is_valid() {
                    tracing::warn!("credential issued without a host");
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "credential request failed");
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Fetch the object list for the current resource type.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::BackendStatus`] on a non-success response
    /// and the transport or decode error otherwise; the list is left
    /// empty and the error is reported. A response that arrives after the
    /// resource type changed (or after a newer reload was issued) is
    /// dropped and yields `Ok(())`.
    #[allow(clippy::future_not_send)]
    pub async fn load_list(&self) -> Result<(), WidgetError> {
        let ticket = self.update(WidgetState::begin_list);
        let url = self.endpoints.list(ticket.resource());
        tracing::debug!(%url, "loading object list");

        let outcome = match self.transport.get(&url).await {
            Ok(response) if response.is_success() => response.json::<Vec<ObjectDescriptor>>(),
            Ok(response) => Err(WidgetError::BackendStatus {
                endpoint: "list",
                status: response.status,
            }),
            Err(e) => Err(e.into()),
        };

        let applied = self.update(|state| state.finish_list(&ticket, outcome.as_ref().ok().cloned()));
        if !applied {
            tracing::debug!(resource = %ticket.resource(), "discarding stale list response");
            return Ok(());
        }

        match outcome {
            Ok(items) => {
                tracing::debug!(count = items.len(), "object list loaded");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "object list request failed");
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Prepare a task for `file`, refusing if no usable credential exists.
    fn prepare(&self, file: LocalFile) -> Result<UploadTask, WidgetError> {
        let state = self.state.borrow();
        let credential = state.credential().ok_or(WidgetError::InvalidCredential)?;
        UploadTask::prepare(credential, state.resource().clone(), file, &self.keys)
    }

    /// Upload a dropped or picked file.
    ///
    /// No single-flight guard: several files may upload concurrently,
    /// each tracked as a pending entry under its own storage key. The
    /// accept filter is the picker's job; every file handed in is sent.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::InvalidCredential`] without any request if
    /// the credential has no host, and the upload or registration error
    /// otherwise. Every error is also reported through the observer.
    #[allow(clippy::future_not_send)]
    pub async fn upload_file(&self, file: LocalFile) -> Result<(), WidgetError> {
        let task = match self.prepare(file) {
            Ok(task) => task,
            Err(err) => {
                tracing::warn!(error = %err, "refusing upload");
                self.report(&err);
                return Err(err);
            }
        };

        self.update(|state| {
            state.add_pending(task.key.clone(), task.file.name.clone(), task.file.size());
        });
        tracing::debug!(host = %task.host, key = %task.key, "uploading file");

        let outcome = match self.transport.post_form(&task).await {
            Ok(response) if response.is_ok() => Ok(()),
            Ok(response) => Err(WidgetError::UploadRejected {
                status: response.status,
                status_text: response.status_text,
            }),
            Err(e) => Err(WidgetError::from(e)),
        };

        match outcome {
            Ok(()) => {
                self.update(|state| state.remove_pending(&task.key));
                tracing::info!(name = %task.file.name, key = %task.key, "file uploaded");
                self.observer
                    .notify(Notice::success(format!("{} uploaded successfully.", task.file.name)));
                self.save(task.registration()).await
            }
            Err(err) => {
                self.update(|state| state.fail_pending(&task.key));
                tracing::warn!(name = %task.file.name, error = %err, "file upload failed");
                self.observer
                    .notify(Notice::error(format!("{} upload failed.", task.file.name)));
                Err(err)
            }
        }
    }

    /// Forget a failed pending upload.
    pub fn dismiss_pending(&self, key: &str) {
        self.update(|state| state.remove_pending(key));
    }

    /// Upload the image carried by a paste event.
    ///
    /// While a paste upload is in flight further pastes are ignored:
    /// they return [`WidgetError::PasteInFlight`] without any request or
    /// notice. The uploading flag is cleared when the transfer settles,
    /// before registration starts.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::EmptyClipboard`],
    /// [`WidgetError::UnsupportedFormat`] or
    /// [`WidgetError::InvalidCredential`] without any request, and the
    /// upload or registration error otherwise. All but
    /// [`WidgetError::PasteInFlight`] are reported through the observer.
    #[allow(clippy::future_not_send)]
    pub async fn paste(&self, items: Vec<ClipboardItem>) -> Result<(), WidgetError> {
        if self.state.borrow().is_pasting() {
            tracing::debug!("paste ignored, upload in flight");
            return Err(WidgetError::PasteInFlight);
        }

        let task = match pasted_file(items).and_then(|file| self.prepare(file)) {
            Ok(task) => task,
            Err(err) => {
                tracing::warn!(error = %err, "refusing paste");
                self.report(&err);
                return Err(err);
            }
        };

        self.update(WidgetState::begin_paste)?;
        tracing::debug!(host = %task.host, key = %task.key, "uploading pasted image");

        let outcome = match self.transport.post_form(&task).await {
            Ok(response) if response.is_ok() => Ok(()),
            Ok(response) => Err(WidgetError::UploadRejected {
                status: response.status,
                status_text: response.status_text,
            }),
            Err(e) => Err(WidgetError::from(e)),
        };
        self.update(WidgetState::finish_paste);

        match outcome {
            Ok(()) => {
                tracing::info!(key = %task.key, "pasted image uploaded");
                self.save(task.registration()).await
            }
            Err(err) => {
                tracing::warn!(error = %err, "pasted image upload failed");
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Register an uploaded object with the backend, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns the registration error (also reported); the list is
    /// reloaded either way.
    #[allow(clippy::future_not_send)]
    pub async fn save(&self, registration: Registration) -> Result<(), WidgetError> {
        let url = self.endpoints.save(&registration);
        self.mutate("save", &url).await?;
        tracing::info!(key = %registration.key, resource = %registration.resource, "object registered");
        Ok(())
    }

    /// Remove an object by identifier, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns the removal error (also reported); the list is reloaded
    /// either way.
    #[allow(clippy::future_not_send)]
    pub async fn remove(&self, object_id: &str) -> Result<(), WidgetError> {
        let url = self.endpoints.remove(object_id);
        self.mutate("remove", &url).await?;
        tracing::info!(object_id, "object removed");
        Ok(())
    }

    #[allow(clippy::future_not_send)]
    async fn mutate(&self, endpoint: &'static str, url: &str) -> Result<(), WidgetError> {
        self.update(WidgetState::begin_mutation);
        tracing::debug!(%url, "calling {endpoint}");

        let outcome = match self.transport.get(url).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(WidgetError::BackendStatus {
                endpoint,
                status: response.status,
            }),
            Err(e) => Err(WidgetError::from(e)),
        };
        self.update(WidgetState::finish_mutation);

        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "{endpoint} failed");
            self.report(err);
        }
        if let Err(err) = self.load_list().await {
            tracing::debug!(error = %err, "reload after {endpoint} failed");
        }
        outcome
    }
}
