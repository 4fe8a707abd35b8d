//! In-memory backend and storage host for widget flow tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use stowage_core::{
    HttpResponse, Notice, ObjectDescriptor, Observer, Transport, TransportError, UploadTask,
};
use tokio::sync::oneshot;

pub const BASE: &str = "https://backend.test";

/// A request seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Post {
        host: String,
        fields: Vec<(String, String)>,
        file_name: String,
        file_len: usize,
    },
}

/// Fake backend: serves `/api/*` from memory and accepts posts to the
/// storage host.
pub struct FakeBackend {
    pub calls: RefCell<Vec<Call>>,
    pub signature: RefCell<HttpResponse>,
    pub upload_status: Cell<u16>,
    /// Fail every post to the storage host with this error.
    pub upload_error: RefCell<Option<TransportError>>,
    /// Answer `/api/list` with this instead of the stored objects.
    pub list_override: RefCell<Option<HttpResponse>>,
    pub save_status: Cell<u16>,
    objects: RefCell<HashMap<String, Vec<ObjectDescriptor>>>,
    next_id: Cell<u32>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
}

impl FakeBackend {
    pub fn new(signature_json: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            signature: RefCell::new(HttpResponse::new(200, "OK").with_body(signature_json)),
            upload_status: Cell::new(200),
            upload_error: RefCell::new(None),
            list_override: RefCell::new(None),
            save_status: Cell::new(200),
            objects: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            gates: RefCell::new(HashMap::new()),
        }
    }

    /// Pre-populate the list for `resource`.
    pub fn seed(&self, resource: &str, names: &[&str]) {
        for name in names {
            self.insert(resource, name, 1, &format!("seed-{name}"));
        }
    }

    /// Hold back the response to `url` until the returned sender fires.
    pub fn gate(&self, url: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_owned(), rx);
        tx
    }

    pub fn gets(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Get(url) => Some(url.clone()),
                Call::Post { .. } => None,
            })
            .collect()
    }

    pub fn posts(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Post { .. }))
            .cloned()
            .collect()
    }

    pub fn stored(&self, resource: &str) -> Vec<ObjectDescriptor> {
        self.objects
            .borrow()
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    fn insert(&self, resource: &str, name: &str, size: u64, key: &str) {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.objects
            .borrow_mut()
            .entry(resource.to_owned())
            .or_default()
            .push(ObjectDescriptor {
                object_id: format!("obj{id}"),
                name: name.to_owned(),
                size,
                key: key.to_owned(),
                url: None,
                kind: Some(resource.to_owned()),
                created_at: None,
            });
    }

    fn route(&self, url: &str) -> HttpResponse {
        let rest = url.strip_prefix(BASE).unwrap_or(url);
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let params: HashMap<String, String> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (
                    percent_decode_str(k).decode_utf8_lossy().into_owned(),
                    percent_decode_str(v).decode_utf8_lossy().into_owned(),
                )
            })
            .collect();

        if path.starts_with("/api/signature/") {
            return self.signature.borrow().clone();
        }
        match path {
            "/api/list" => {
                if let Some(response) = self.list_override.borrow().clone() {
                    return response;
                }
                let items = self.stored(&params["type"]);
                HttpResponse::new(200, "OK").with_body(serde_json::to_vec(&items).unwrap())
            }
            "/api/save" => {
                let status = self.save_status.get();
                if status != 200 {
                    return HttpResponse::new(status, "Internal Server Error");
                }
                self.insert(
                    &params["type"],
                    &params["name"],
                    params["size"].parse().unwrap(),
                    &params["key"],
                );
                HttpResponse::new(200, "OK").with_body("{}")
            }
            "/api/remove" => {
                let id = &params["objectId"];
                for list in self.objects.borrow_mut().values_mut() {
                    list.retain(|o| &o.object_id != id);
                }
                HttpResponse::new(200, "OK").with_body("{}")
            }
            _ => HttpResponse::new(404, "Not Found"),
        }
    }
}

impl Transport for FakeBackend {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.borrow_mut().push(Call::Get(url.to_owned()));
        let gate = self.gates.borrow_mut().remove(url);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self.route(url))
    }

    async fn post_form(&self, task: &UploadTask) -> Result<HttpResponse, TransportError> {
        self.calls.borrow_mut().push(Call::Post {
            host: task.host.clone(),
            fields: task.fields.clone(),
            file_name: task.file.name.clone(),
            file_len: task.file.bytes.len(),
        });
        let gate = self.gates.borrow_mut().remove(&task.host);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.upload_error.borrow().clone() {
            return Err(err);
        }
        let status = self.upload_status.get();
        let text = if status == 200 { "OK" } else { "" };
        Ok(HttpResponse::new(status, text))
    }
}

/// Collects notices for assertions.
#[derive(Default)]
pub struct Notices(pub RefCell<Vec<Notice>>);

impl Notices {
    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().iter().map(|n| n.message.clone()).collect()
    }
}

impl Observer for &Notices {
    fn notify(&self, notice: Notice) {
        self.0.borrow_mut().push(notice);
    }
}

/// Deterministic storage key ids: `id1`, `id2`, ...
pub fn counting_keys() -> impl Fn() -> String {
    let n = Cell::new(0);
    move || {
        n.set(n.get() + 1);
        format!("id{}", n.get())
    }
}
