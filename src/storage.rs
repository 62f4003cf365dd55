//! File-backed key-value storage.
//!
//! A single JSON file holds a map of string keys to JSON values, standing in
//! for the browser-local store the quiz state outlives the process in.
//! Reads fall back to a caller-supplied default on absence or parse failure;
//! writes that cannot be persisted are logged and dropped. Neither path ever
//! returns an error to the caller.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Key for the persisted username.
pub const USERNAME_KEY: &str = "aptify_username";
/// Key for the write-only cache of the last fetched question set.
pub const QUESTIONS_KEY: &str = "aptify_questions";
/// Key for the last quiz result record.
pub const LAST_RESULTS_KEY: &str = "aptify_last_results";
/// Key for the leaderboard entry list.
pub const LEADERBOARD_KEY: &str = "aptify_leaderboard";

/// Persistent key-value store over one JSON file.
///
/// Single-writer: one running app owns the file. Values are plain copies;
/// nothing hands out references into the store.
pub struct Store {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

impl Store {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing or unreadable file yields an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Store {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %path.display(), %err, "could not create storage directory");
            }
        }

        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(err) => {
                    warn!(path = %path.display(), %err, "storage file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Store { path, values }
    }

    /// Read the value under `key`, or `default` when the key is absent or
    /// its stored value fails to deserialize.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.values.get(key) else {
            return default;
        };

        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(key, %err, "stored value failed to parse, using default");
                default
            }
        }
    }

    /// Serialize `value` under `key` and persist the store.
    ///
    /// Serialization or write failures are logged; the in-memory map keeps
    /// whatever could be recorded.
    pub fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        let serialized = match serde_json::to_value(value) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(key, %err, "value could not be serialized, not stored");
                return;
            }
        };

        self.values.insert(key.to_string(), serialized);
        self.persist();
    }

    fn persist(&self) {
        let content = match serde_json::to_string_pretty(&self.values) {
            Ok(content) => content,
            Err(err) => {
                warn!(%err, "storage map could not be serialized");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, content) {
            warn!(path = %self.path.display(), %err, "storage write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("store.json"));

        assert_eq!(store.read("absent", 42), 42);
        assert_eq!(store.read(USERNAME_KEY, String::new()), "");
    }

    #[test]
    fn written_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = Store::open(&path);
        store.write(USERNAME_KEY, &"quiz_fan".to_string());
        store.write("numbers", &vec![1, 2, 3]);

        let reopened = Store::open(&path);
        assert_eq!(reopened.read(USERNAME_KEY, String::new()), "quiz_fan");
        assert_eq!(reopened.read("numbers", Vec::<i32>::new()), vec![1, 2, 3]);
    }

    #[test]
    fn corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let store = Store::open(&path);
        assert_eq!(store.read("anything", 7), 7);
    }

    #[test]
    fn mistyped_value_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = Store::open(&path);
        store.write("key", &"text");

        // Reading the string back as a number must not raise.
        assert_eq!(store.read("key", 5u32), 5);
    }
}
