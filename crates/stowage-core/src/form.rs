//! Upload payloads: local files, clipboard items, and the multipart
//! form sent to the storage host.

use crate::key::{KeyGenerator, extension, storage_key};
use crate::types::{Registration, ResourceType, SignedCredential, WidgetError};

/// MIME types accepted from the clipboard.
pub const PASTE_ACCEPTS: [&str; 4] = ["image/gif", "image/png", "image/jpeg", "image/bmp"];

/// Whether a clipboard item of type `mime` may be uploaded.
#[must_use]
pub fn is_paste_accepted(mime: &str) -> bool {
    PASTE_ACCEPTS.iter().any(|a| a.eq_ignore_ascii_case(mime))
}

/// A file read into memory, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// File name as chosen by the user (or synthesized for pastes).
    pub name: String,
    /// MIME type.
    pub mime: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl LocalFile {
    /// A file whose MIME type is guessed from its name.
    #[must_use]
    pub fn from_name(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_from_name(&name).to_owned();
        Self { name, mime, bytes }
    }

    /// A file with the type reported by the browser or OS, guessing from
    /// the name only when `mime` is empty.
    #[must_use]
    pub fn with_mime(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = mime.into();
        if mime.trim().is_empty() {
            return Self::from_name(name, bytes);
        }
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One entry of a paste event's clipboard data.
///
/// `file` is `None` for string items, or when the caller did not bother
/// reading an item that can never be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    /// Declared MIME type of the item.
    pub mime: String,
    /// File content, if the item is a file.
    pub file: Option<LocalFile>,
}

/// Pick the file to upload out of a paste event.
///
/// Only the first clipboard item is considered. Pasted images often
/// carry no name; those are named `clipboard.<subtype>`.
///
/// # Errors
///
/// Returns [`WidgetError::EmptyClipboard`] if there is no item or the
/// first item is not a file, and [`WidgetError::UnsupportedFormat`] if
/// its MIME type is not in [`PASTE_ACCEPTS`].
pub fn pasted_file(items: Vec<ClipboardItem>) -> Result<LocalFile, WidgetError> {
    let first = items
        .into_iter()
        .next()
        .ok_or(WidgetError::EmptyClipboard)?;
    if !is_paste_accepted(&first.mime) {
        return Err(WidgetError::UnsupportedFormat(first.mime));
    }
    let mut file = first.file.ok_or(WidgetError::EmptyClipboard)?;
    if file.name.trim().is_empty() {
        file.name = clipboard_name(&first.mime);
    }
    if file.mime.is_empty() {
        file.mime = first.mime;
    }
    Ok(file)
}

/// Name for an anonymous pasted image (`image/png` -> `clipboard.png`).
#[must_use]
pub fn clipboard_name(mime: &str) -> String {
    let subtype = mime.split_once('/').map_or("bin", |(_, sub)| sub);
    format!("clipboard.{}", subtype.to_ascii_lowercase())
}

/// Guess a MIME type from a file name's extension.
#[must_use]
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = extension(name).trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        _ => "application/octet-stream",
    }
}

/// One file transfer to the storage host.
///
/// Exists only for the duration of a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    /// Destination URL (the credential's `host`).
    pub host: String,
    /// Form fields in send order: the credential's fields with `key`
    /// set to [`key`](Self::key).
    pub fields: Vec<(String, String)>,
    /// Generated storage key.
    pub key: String,
    /// Namespace the file is uploaded into.
    pub resource: ResourceType,
    /// The file itself, sent last under the field name `file`.
    pub file: LocalFile,
}

impl UploadTask {
    /// Prepare an upload of `file` authorized by `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::InvalidCredential`] if the credential has
    /// no destination host.
    pub fn prepare<K: KeyGenerator + ?Sized>(
        credential: &SignedCredential,
        resource: ResourceType,
        file: LocalFile,
        keys: &K,
    ) -> Result<Self, WidgetError> {
        let host = credential
            .host()
            .ok_or(WidgetError::InvalidCredential)?
            .to_owned();
        let key = storage_key(keys, &file.name);

        let mut fields = credential.fields().to_vec();
        if let Some(slot) = fields.iter_mut().find(|(k, _)| k == "key") {
            slot.1.clone_from(&key);
        } else {
            fields.push(("key".to_owned(), key.clone()));
        }

        Ok(Self {
            host,
            fields,
            key,
            resource,
            file,
        })
    }

    /// Metadata to register once the transfer succeeded.
    #[must_use]
    pub fn registration(&self) -> Registration {
        Registration {
            name: self.file.name.clone(),
            size: self.file.size(),
            key: self.key.clone(),
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png(name: &str) -> ClipboardItem {
        ClipboardItem {
            mime: "image/png".into(),
            file: Some(LocalFile {
                name: name.into(),
                mime: "image/png".into(),
                bytes: vec![0; 8],
            }),
        }
    }

    #[test]
    fn reported_type_wins_over_name() {
        let avif = LocalFile::with_mime("photo.avif", "image/avif", vec![1]);
        assert_eq!(avif.mime, "image/avif");
        let renamed = LocalFile::with_mime("scan.png", "image/tiff", vec![1]);
        assert_eq!(renamed.mime, "image/tiff");
    }

    #[test]
    fn blank_reported_type_falls_back_to_name() {
        let file = LocalFile::with_mime("cat.png", "", vec![1]);
        assert_eq!(file.mime, "image/png");
    }

    #[test]
    fn empty_clipboard_is_rejected() {
        assert_eq!(pasted_file(Vec::new()), Err(WidgetError::EmptyClipboard));
    }

    #[test]
    fn only_allow_listed_types_are_accepted() {
        for mime in PASTE_ACCEPTS {
            assert!(is_paste_accepted(mime));
        }
        let text = ClipboardItem {
            mime: "text/plain".into(),
            file: None,
        };
        assert_eq!(
            pasted_file(vec![text]),
            Err(WidgetError::UnsupportedFormat("text/plain".into()))
        );
        let webp = ClipboardItem {
            mime: "image/webp".into(),
            file: None,
        };
        assert!(matches!(
            pasted_file(vec![webp]),
            Err(WidgetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn only_first_item_counts() {
        let text = ClipboardItem {
            mime: "text/html".into(),
            file: None,
        };
        assert!(pasted_file(vec![text, png("a.png")]).is_err());
    }

    #[test]
    fn nameless_paste_gets_clipboard_name() {
        let file = pasted_file(vec![png("")]).unwrap();
        assert_eq!(file.name, "clipboard.png");
        assert_eq!(clipboard_name("image/jpeg"), "clipboard.jpeg");
    }

    #[test]
    fn mime_guess() {
        assert_eq!(mime_from_name("a.JPG"), "image/jpeg");
        assert_eq!(mime_from_name("song.mp3"), "audio/mpeg");
        assert_eq!(mime_from_name("blob"), "application/octet-stream");
    }

    #[test]
    fn prepare_appends_key_after_credential_fields() {
        let credential = SignedCredential::from_fields([
            ("host", "https://up.example.com"),
            ("policy", "p"),
            ("signature", "s"),
        ]);
        let keys = || "id".to_owned();
        let file = LocalFile::from_name("clipboard.png", vec![1, 2, 3]);
        let task = UploadTask::prepare(&credential, ResourceType::Image, file, &keys).unwrap();

        assert_eq!(task.host, "https://up.example.com");
        assert_eq!(task.key, "id.png");
        let names: Vec<&str> = task.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["host", "policy", "signature", "key"]);

        let registration = task.registration();
        assert_eq!(registration.size, 3);
        assert_eq!(registration.key, "id.png");
        assert_eq!(registration.resource, ResourceType::Image);
    }

    #[test]
    fn prepare_overrides_issued_key_in_place() {
        let credential = SignedCredential::from_fields([("host", "h"), ("key", "old"), ("x", "1")]);
        let keys = || "new".to_owned();
        let task = UploadTask::prepare(
            &credential,
            ResourceType::File,
            LocalFile::from_name("a.txt", Vec::new()),
            &keys,
        )
        .unwrap();
        assert_eq!(
            task.fields,
            vec![
                ("host".to_owned(), "h".to_owned()),
                ("key".to_owned(), "new.txt".to_owned()),
                ("x".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn prepare_refuses_missing_host() {
        let keys = || "id".to_owned();
        let result = UploadTask::prepare(
            &SignedCredential::from_fields([("host", "")]),
            ResourceType::File,
            LocalFile::from_name("a.txt", Vec::new()),
            &keys,
        );
        assert_eq!(result, Err(WidgetError::InvalidCredential));
    }
}
