//! Backend endpoint URLs.
//!
//! All four backend calls are `GET`s with their arguments in the query
//! string. The paths and parameter names are fixed by the existing
//! backend and must not change.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::types::{Registration, ResourceType};

/// Everything except RFC 3986 unreserved characters is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// URL builder for the backend API rooted at a base origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Endpoints under `base` (e.g. `https://example.com`). A trailing
    /// slash is ignored; an empty base yields root-relative URLs.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    /// The base origin without trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET /api/list?type=<type>`
    #[must_use]
    pub fn list(&self, resource: &ResourceType) -> String {
        self.url("/api/list", &[("type", resource.as_str())])
    }

    /// `GET /api/signature/<type>`
    #[must_use]
    pub fn signature(&self, resource: &ResourceType) -> String {
        format!(
            "{}/api/signature/{}",
            self.base,
            utf8_percent_encode(resource.as_str(), COMPONENT)
        )
    }

    /// `GET /api/save?name=&size=&key=&type=`
    #[must_use]
    pub fn save(&self, registration: &Registration) -> String {
        let size = registration.size.to_string();
        self.url(
            "/api/save",
            &[
                ("name", registration.name.as_str()),
                ("size", size.as_str()),
                ("key", registration.key.as_str()),
                ("type", registration.resource.as_str()),
            ],
        )
    }

    /// `GET /api/remove?objectId=`
    #[must_use]
    pub fn remove(&self, object_id: &str) -> String {
        self.url("/api/remove", &[("objectId", object_id)])
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let query = query
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, COMPONENT),
                    utf8_percent_encode(v, COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}{path}?{query}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://example.com/")
    }

    #[test]
    fn list_url() {
        assert_eq!(
            endpoints().list(&ResourceType::Image),
            "https://example.com/api/list?type=image"
        );
    }

    #[test]
    fn signature_url() {
        assert_eq!(
            endpoints().signature(&ResourceType::File),
            "https://example.com/api/signature/file"
        );
    }

    #[test]
    fn save_url_keeps_parameter_order() {
        let registration = Registration {
            name: "clipboard.png".into(),
            size: 1024,
            key: "k.png".into(),
            resource: ResourceType::Image,
        };
        assert_eq!(
            endpoints().save(&registration),
            "https://example.com/api/save?name=clipboard.png&size=1024&key=k.png&type=image"
        );
    }

    #[test]
    fn query_values_are_escaped() {
        let registration = Registration {
            name: "my report & notes (1).pdf".into(),
            size: 5,
            key: "k.pdf".into(),
            resource: ResourceType::File,
        };
        assert_eq!(
            endpoints().save(&registration),
            "https://example.com/api/save?name=my%20report%20%26%20notes%20%281%29.pdf&size=5&key=k.pdf&type=file"
        );
        assert_eq!(
            endpoints().remove("a/b?c"),
            "https://example.com/api/remove?objectId=a%2Fb%3Fc"
        );
    }

    #[test]
    fn empty_base_is_root_relative() {
        assert_eq!(
            Endpoints::new("").list(&ResourceType::Video),
            "/api/list?type=video"
        );
    }
}
