//! On-disk cache for reading progress and per-document settings.
//!
//! Each document gets a directory under the cache root named by the SHA-256
//! of its document key, holding `progress.toml` and `config.toml`. Write
//! failures are logged and otherwise ignored so reading never stops.

use crate::config::{AppConfig, parse_config, serialize_config};
use sha2::{Digest, Sha256};
use speedread_core::progress::{KeyValueStore, ProgressEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROGRESS_FILE: &str = "progress.toml";
const CONFIG_FILE: &str = "config.toml";

pub fn hash_dir(cache_root: &Path, key: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_root.join(hash)
}

pub fn document_config_path(cache_root: &Path, key: &str) -> PathBuf {
    hash_dir(cache_root, key).join(CONFIG_FILE)
}

pub fn load_document_config(cache_root: &Path, key: &str) -> Option<AppConfig> {
    let path = document_config_path(cache_root, key);
    let data = fs::read_to_string(&path).ok()?;
    match parse_config(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), "Ignoring unreadable document config: {err:#}");
            None
        }
    }
}

pub fn save_config_file(path: &Path, config: &AppConfig) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match serialize_config(config) {
        Ok(contents) => {
            if let Err(err) = fs::write(path, contents) {
                warn!(path = %path.display(), "Failed to save document config: {err}");
            }
        }
        Err(err) => warn!("{err:#}"),
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ProgressFile {
    key: String,
    paragraph_start_index: usize,
    last_word_index: usize,
    saved_at_ms: u64,
}

impl ProgressFile {
    fn new(key: &str, entry: ProgressEntry) -> Self {
        Self {
            key: key.to_string(),
            paragraph_start_index: entry.paragraph_start_index,
            last_word_index: entry.last_word_index,
            saved_at_ms: entry.saved_at_ms,
        }
    }

    fn entry(&self) -> ProgressEntry {
        ProgressEntry {
            paragraph_start_index: self.paragraph_start_index,
            last_word_index: self.last_word_index,
            saved_at_ms: self.saved_at_ms,
        }
    }
}

/// Progress entries stored as one TOML file per document.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    root: PathBuf,
}

impl FileProgressStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn progress_path(&self, key: &str) -> PathBuf {
        hash_dir(&self.root, key).join(PROGRESS_FILE)
    }

    fn read_file(path: &Path) -> Option<ProgressFile> {
        let data = fs::read_to_string(path).ok()?;
        match toml::from_str(&data) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(path = %path.display(), "Ignoring unreadable progress file: {err}");
                None
            }
        }
    }
}

impl KeyValueStore for FileProgressStore {
    fn get(&self, key: &str) -> Option<ProgressEntry> {
        let file = Self::read_file(&self.progress_path(key))?;
        // Guards against a hash collision handing back another document's entry.
        (file.key == key).then(|| file.entry())
    }

    fn put(&mut self, key: &str, entry: ProgressEntry) {
        let path = self.progress_path(key);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let file = ProgressFile::new(key, entry);
        match toml::to_string(&file) {
            Ok(contents) => {
                if let Err(err) = fs::write(&path, contents) {
                    warn!(path = %path.display(), "Failed to save progress: {err}");
                }
            }
            Err(err) => warn!("Failed to encode progress: {err}"),
        }
    }

    fn remove(&mut self, key: &str) {
        let path = self.progress_path(key);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed progress file"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), "Failed to remove progress: {err}"),
        }
    }

    fn keys(&self) -> Vec<String> {
        let Ok(dirs) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = dirs
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path().join(PROGRESS_FILE))
            .filter(|path| path.is_file())
            .filter_map(|path| Self::read_file(&path))
            .map(|file| file.key)
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedread_core::ProgressBook;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("speedread_test_{name}_{nanos}"))
    }

    fn day(n: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + n * 86_400)
    }

    #[test]
    fn progress_survives_a_new_store_instance() {
        let root = unique_temp_dir("progress_reopen");
        let mut store = FileProgressStore::new(&root);
        store.put("notes.txt", ProgressEntry::new(25, 31, day(0)));

        let reopened = FileProgressStore::new(&root);
        let entry = reopened.get("notes.txt").expect("entry persisted");
        assert_eq!(entry.paragraph_start_index, 25);
        assert_eq!(entry.last_word_index, 31);
        assert_eq!(reopened.keys(), vec!["notes.txt".to_string()]);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn progress_book_cleans_up_files_on_disk() {
        let root = unique_temp_dir("progress_cleanup");
        let mut book = ProgressBook::with_retention_days(FileProgressStore::new(&root), 30);
        book.save("https://example.com/a?ref=x", 0, 5, day(0));
        book.save("b.txt", 10, 12, day(40));

        assert_eq!(book.cleanup_expired(day(41)), 1);
        assert!(book.load("https://example.com/a", day(41)).is_none());
        assert!(book.load("b.txt", day(41)).is_some());

        book.clear("b.txt");
        assert!(book.entries().is_empty());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_root_yields_no_keys() {
        let store = FileProgressStore::new(unique_temp_dir("missing"));
        assert!(store.keys().is_empty());
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn document_config_round_trips() {
        let root = unique_temp_dir("doc_config");
        let config = AppConfig {
            wpm: 555,
            paragraph_pause_enabled: true,
            ..AppConfig::default()
        };
        save_config_file(&document_config_path(&root, "book.txt"), &config);

        assert_eq!(load_document_config(&root, "book.txt"), Some(config));
        assert!(load_document_config(&root, "other.txt").is_none());

        let _ = fs::remove_dir_all(root);
    }
}
