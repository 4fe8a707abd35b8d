//! Shared types for the stowage upload widget.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::transport::TransportError;

/// Namespace of objects a widget instance manages.
///
/// Known kinds get their own variant; anything else the backend
/// understands is carried verbatim in [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    /// Generic files of any MIME type.
    #[default]
    File,
    /// Images (`image/*`).
    Image,
    /// Video (`video/*`).
    Video,
    /// Audio (`audio/*`).
    Audio,
    /// Any other media kind, stored lowercase.
    Other(String),
}

impl ResourceType {
    /// Kinds offered by the resource switcher.
    pub const BUILTIN: [Self; 4] = [Self::File, Self::Image, Self::Video, Self::Audio];

    /// Lowercase wire tag (`file`, `image`, ...).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other(tag) => tag,
        }
    }

    /// Value for the file picker's `accept` attribute.
    ///
    /// `*` for generic files, `<type>/*` for media kinds.
    #[must_use]
    pub fn accept_filter(&self) -> String {
        match self {
            Self::File => "*".to_owned(),
            other => format!("{}/*", other.as_str()),
        }
    }

    /// Whether a file of MIME type `mime` passes [`accept_filter`](Self::accept_filter).
    #[must_use]
    pub fn accepts(&self, mime: &str) -> bool {
        match self {
            Self::File => true,
            other => mime
                .split_once('/')
                .is_some_and(|(major, _)| major.eq_ignore_ascii_case(other.as_str())),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "file" => Self::File,
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => Self::Other(tag),
        })
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(resource) => resource,
            Err(never) => match never {},
        }
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        value.as_str().to_owned()
    }
}

/// Signed upload policy issued by the backend for one resource type.
///
/// An ordered bag of form fields. Every field is sent along with the
/// file when posting to [`host`](Self::host). Field order follows the
/// backend's JSON object; non-string scalars are stringified and `null`
/// values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedCredential {
    fields: Vec<(String, String)>,
}

impl SignedCredential {
    /// Build a credential from `(name, value)` pairs, keeping their order.
    #[must_use]
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// All fields in issue order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Upload destination, if present and non-empty.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get("host").filter(|h| !h.trim().is_empty())
    }

    /// A credential is usable only when it names a destination host.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.host().is_some()
    }
}

impl<'de> Deserialize<'de> for SignedCredential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = SignedCredential;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a credential object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut fields: Vec<(String, String)> = Vec::new();
                while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let value = match value {
                        serde_json::Value::Null => continue,
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    // Later duplicates overwrite in place, like a JS object.
                    if let Some(slot) = fields.iter_mut().find(|(k, _)| *k == name) {
                        slot.1 = value;
                    } else {
                        fields.push((name, value));
                    }
                }
                Ok(SignedCredential { fields })
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// One stored object, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
    /// Backend identifier, used for removal.
    pub object_id: String,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: u64,
    /// Storage key the object was uploaded under.
    #[serde(default)]
    pub key: String,
    /// Public URL, when the backend resolves one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Resource type tag the object was saved with.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Creation timestamp as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Sizes are registered through a query string, so some backends echo
/// them back as strings.
fn lenient_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Float(f64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Number(n) => Ok(n),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Size::Float(f) if f >= 0.0 => Ok(f as u64),
        Size::Float(f) => Err(de::Error::custom(format!("negative size {f}"))),
        Size::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

/// Identity of the person using the widget.
///
/// Supplied by the embedding page; the widget never changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Logged-in user name, if any.
    pub user: Option<String>,
    /// Whether admin affordances (removal) are shown.
    pub is_admin: bool,
    /// Development mode lets anonymous sessions request credentials.
    pub is_dev: bool,
}

impl Session {
    /// Whether a credential can be requested at all.
    #[must_use]
    pub const fn can_sign(&self) -> bool {
        self.user.is_some() || self.is_dev
    }

    /// Whether the user is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Whether removal controls are offered.
    #[must_use]
    pub const fn can_remove(&self) -> bool {
        self.is_admin
    }

    /// Read a session from a page query string such as
    /// `?user=alice&admin`.
    ///
    /// `user` must be non-empty to count as logged in. `admin` and `dev`
    /// are flags: present means on, unless set to `0` or `false`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut session = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_query_value(value);
            match name {
                "user" if !value.is_empty() => session.user = Some(value),
                "admin" => session.is_admin = flag(&value),
                "dev" => session.is_dev = flag(&value),
                _ => {}
            }
        }
        session
    }
}

fn decode_query_value(raw: &str) -> String {
    percent_encoding::percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn flag(value: &str) -> bool {
    !matches!(value, "0" | "false")
}

/// Metadata sent to the backend after a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Generated storage key.
    pub key: String,
    /// Namespace the object was uploaded into.
    pub resource: ResourceType,
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// An action completed.
    Success,
    /// Something the user should know but that did not fail.
    Warning,
    /// An action failed.
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// A warning notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl From<&WidgetError> for Notice {
    fn from(err: &WidgetError) -> Self {
        Self::error(err.to_string())
    }
}

/// Errors surfaced by the upload widget.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// The backend refused to issue a credential.
    #[error("{}", or_default(.status_text, "Forbidden"))]
    CredentialRejected {
        /// HTTP status code.
        status: u16,
        /// HTTP status text, possibly empty.
        status_text: String,
    },

    /// No credential with a destination host is available.
    #[error("Sign is invalid")]
    InvalidCredential,

    /// The clipboard held nothing usable.
    #[error("There's no image pasted.")]
    EmptyClipboard,

    /// The clipboard held a MIME type outside the paste allow-list.
    #[error("The format's not supported.")]
    UnsupportedFormat(String),

    /// The storage host answered the upload with a non-200 status.
    #[error("{}", or_default(.status_text, "Upload failed."))]
    UploadRejected {
        /// HTTP status code.
        status: u16,
        /// HTTP status text, possibly empty.
        status_text: String,
    },

    /// A backend endpoint answered with a non-success status.
    #[error("{endpoint} request failed with status {status}")]
    BackendStatus {
        /// Endpoint name (`list`, `save`, `remove`).
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// A response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The request never got a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A pasted image is still uploading.
    #[error("a pasted image is still uploading")]
    PasteInFlight,
}

fn or_default<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() { fallback } else { text }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_round_trips_builtin_tags() {
        for resource in ResourceType::BUILTIN {
            let parsed: ResourceType = resource.as_str().parse().unwrap();
            assert_eq!(parsed, resource);
        }
    }

    #[test]
    fn unknown_resource_type_kept_lowercase() {
        let parsed: ResourceType = "Model".parse().unwrap();
        assert_eq!(parsed, ResourceType::Other("model".into()));
        assert_eq!(parsed.to_string(), "model");
    }

    #[test]
    fn accept_filter_is_wildcard_for_files() {
        assert_eq!(ResourceType::File.accept_filter(), "*");
        assert_eq!(ResourceType::Image.accept_filter(), "image/*");
        assert_eq!(ResourceType::Other("font".into()).accept_filter(), "font/*");
    }

    #[test]
    fn accepts_matches_major_type() {
        assert!(ResourceType::File.accepts("application/pdf"));
        assert!(ResourceType::Image.accepts("image/png"));
        assert!(!ResourceType::Image.accepts("video/mp4"));
        assert!(!ResourceType::Audio.accepts("audio"));
    }

    #[test]
    fn credential_keeps_backend_field_order() {
        let json = r#"{"signature":"s","host":"https://up.example.com","policy":"p"}"#;
        let credential: SignedCredential = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = credential.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["signature", "host", "policy"]);
        assert_eq!(credential.host(), Some("https://up.example.com"));
    }

    #[test]
    fn credential_stringifies_scalars_and_drops_null() {
        let json = r#"{"host":"h","expire":1700000000,"secure":true,"dir":null}"#;
        let credential: SignedCredential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.get("expire"), Some("1700000000"));
        assert_eq!(credential.get("secure"), Some("true"));
        assert_eq!(credential.get("dir"), None);
    }

    #[test]
    fn blank_host_is_invalid() {
        assert!(!SignedCredential::default().is_valid());
        assert!(!SignedCredential::from_fields([("host", "")]).is_valid());
        assert!(!SignedCredential::from_fields([("host", "  ")]).is_valid());
        assert!(SignedCredential::from_fields([("host", "https://h")]).is_valid());
    }

    #[test]
    fn descriptor_accepts_string_sizes() {
        let json = r#"[
            {"objectId":"a","name":"a.png","size":1024,"key":"k1.png","url":"https://cdn/k1.png"},
            {"objectId":"b","name":"b.txt","size":"77","key":"k2.txt","type":"file","extra":1}
        ]"#;
        let list: Vec<ObjectDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(list[0].size, 1024);
        assert_eq!(list[1].size, 77);
        assert_eq!(list[1].kind.as_deref(), Some("file"));
        assert_eq!(list[0].url.as_deref(), Some("https://cdn/k1.png"));
    }

    #[test]
    fn session_from_query() {
        let session = Session::from_query("?user=ada%20l&admin&dev=0");
        assert_eq!(session.user.as_deref(), Some("ada l"));
        assert!(session.is_admin);
        assert!(!session.is_dev);

        let anonymous = Session::from_query("user=&dev=1&x=y");
        assert!(!anonymous.is_logged_in());
        assert!(anonymous.can_sign());
        assert_eq!(Session::from_query(""), Session::default());
    }

    #[test]
    fn session_gates() {
        let anonymous = Session::default();
        assert!(!anonymous.can_sign());

        let dev = Session {
            is_dev: true,
            ..Session::default()
        };
        assert!(dev.can_sign());
        assert!(!dev.is_logged_in());

        let admin = Session {
            user: Some("ada".into()),
            is_admin: true,
            is_dev: false,
        };
        assert!(admin.can_sign());
        assert!(admin.can_remove());
    }

    #[test]
    fn error_messages_fall_back_when_status_text_is_empty() {
        let rejected = WidgetError::CredentialRejected {
            status: 403,
            status_text: String::new(),
        };
        assert_eq!(rejected.to_string(), "Forbidden");

        let rejected = WidgetError::CredentialRejected {
            status: 401,
            status_text: "Unauthorized".into(),
        };
        assert_eq!(rejected.to_string(), "Unauthorized");

        let upload = WidgetError::UploadRejected {
            status: 500,
            status_text: String::new(),
        };
        assert_eq!(upload.to_string(), "Upload failed.");
    }
}
