//! Storage key generation.
//!
//! A storage key is a random unique identifier followed by the original
//! file's extension (`3f2c…e1.png`). The identifier source is injected
//! through [`KeyGenerator`] so tests can supply deterministic keys.

/// Source of unique identifiers for storage keys.
///
/// Any `Fn() -> String` closure is a generator:
///
/// ```rust
/// # use stowage_core::key::{storage_key, KeyGenerator};
/// let fixed = || "fixed".to_owned();
/// assert_eq!(storage_key(&fixed, "photo.JPG"), "fixed.JPG");
/// ```
pub trait KeyGenerator {
    /// Produce an identifier that has not been handed out before.
    fn unique_id(&self) -> String;
}

impl<F: Fn() -> String> KeyGenerator for F {
    fn unique_id(&self) -> String {
        self()
    }
}

/// Random version 4 UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn unique_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Extension of `name` including the leading dot, or `""`.
///
/// Only the last component counts (`a.tar.gz` -> `.gz`). Names without
/// a dot, ending in a dot, or consisting only of a dotted prefix
/// (`.bashrc`) have no extension.
#[must_use]
pub fn extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) if idx + 1 == name.len() => "",
        Some(idx) => &name[idx..],
    }
}

/// Build a fresh storage key for a file called `file_name`.
#[must_use]
pub fn storage_key<K: KeyGenerator + ?Sized>(keys: &K, file_name: &str) -> String {
    format!("{}{}", keys.unique_id(), extension(file_name))
}
