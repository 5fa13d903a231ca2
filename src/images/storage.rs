//! Filesystem-level storage for uploaded image files.
//!
//! Files live under `{base_dir}/images/` using a sanitized form of the
//! uploaded filename. Names are reserved with an exclusive create, so two
//! concurrent uploads of `photo.png` can never end up sharing a file: the
//! loser of the race retries with a random suffix (`photo_Ab3xY9q.png`).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use imagehost_common::{Error, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;

/// Directory under the media root that holds uploads.
const UPLOAD_DIR: &str = "images";

/// How many candidate names to try before giving up.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Length of the random suffix appended on collision.
const SUFFIX_LEN: usize = 7;

/// Name used when nothing usable survives sanitizing.
const FALLBACK_NAME: &str = "upload";

/// Filesystem manager for uploaded images.
pub struct MediaStorage {
    base_dir: PathBuf,
}

impl MediaStorage {
    /// Create a new `MediaStorage` rooted at `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Write `data` under a unique name derived from `filename`.
    ///
    /// # Returns
    ///
    /// The stored path relative to the media root, e.g. `images/photo.png`.
    pub fn store(&self, filename: &str, data: &[u8]) -> Result<String> {
        let upload_dir = self.base_dir.join(UPLOAD_DIR);
        std::fs::create_dir_all(&upload_dir)?;

        let name = valid_filename(filename);
        let (stem, extension) = split_extension(&name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                name.clone()
            } else {
                format!("{}_{}{}", stem, random_suffix(), extension)
            };
            let file_path = upload_dir.join(&candidate);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&file_path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!("Name {} already taken, retrying", candidate);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
                drop(file);
                let _ = std::fs::remove_file(&file_path);
                return Err(e.into());
            }

            return Ok(format!("{}/{}", UPLOAD_DIR, candidate));
        }

        Err(Error::internal(format!(
            "No available name for {} after {} attempts",
            name, MAX_NAME_ATTEMPTS
        )))
    }

    /// Get the filesystem path of a stored file.
    pub fn get_path(&self, relative_path: &str) -> PathBuf {
        self.base_dir.join(relative_path)
    }

    /// Delete a stored file. Missing files are ignored.
    pub fn delete(&self, relative_path: &str) -> Result<()> {
        let path = self.get_path(relative_path);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce an uploaded filename to a safe basename.
///
/// Directory components are dropped, surrounding whitespace is trimmed,
/// spaces become underscores, and anything other than word characters, `-`
/// and `.` is removed.
pub fn valid_filename(filename: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^-\w.]").expect("valid regex"));

    let basename = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let spaced = basename.trim().replace(' ', "_");
    let cleaned = unsafe_chars.replace_all(&spaced, "");

    match cleaned.as_ref() {
        "" | "." | ".." => FALLBACK_NAME.to_string(),
        name => name.to_string(),
    }
}

/// Split `name` into stem and extension (with its dot).
///
/// A leading dot does not start an extension: `.hidden` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_valid_filename() {
        assert_eq!(valid_filename("example.png"), "example.png");
        assert_eq!(valid_filename("  my photo.jpg "), "my_photo.jpg");
        assert_eq!(valid_filename("../../etc/passwd"), "passwd");
        assert_eq!(valid_filename("C:\\Users\\me\\pic.gif"), "pic.gif");
        assert_eq!(valid_filename("hello?.jpg"), "hello.jpg");
        assert_eq!(valid_filename("zdjęcie.png"), "zdjęcie.png");
        assert_eq!(valid_filename(".."), "upload");
        assert_eq!(valid_filename("???"), "upload");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("photo.png"), ("photo", ".png"));
        assert_eq!(split_extension("a.b.c"), ("a.b", ".c"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_random_suffix() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_store_writes_under_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path().to_path_buf());

        let stored = storage.store("example.png", b"data").unwrap();
        assert_eq!(stored, "images/example.png");
        assert_eq!(std::fs::read(storage.get_path(&stored)).unwrap(), b"data");
    }

    #[test]
    fn test_store_same_name_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path().to_path_buf());

        let first = storage.store("example.png", b"one").unwrap();
        let second = storage.store("example.png", b"two").unwrap();
        let third = storage.store("example.png", b"three").unwrap();

        assert_eq!(first, "images/example.png");
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert!(second.starts_with("images/example_"));
        assert!(second.ends_with(".png"));
        assert_eq!(second.len(), first.len() + 1 + SUFFIX_LEN);

        // Earlier files are untouched
        assert_eq!(std::fs::read(storage.get_path(&first)).unwrap(), b"one");
        assert_eq!(std::fs::read(storage.get_path(&second)).unwrap(), b"two");
    }

    #[test]
    fn test_concurrent_stores_never_share_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(MediaStorage::new(dir.path().to_path_buf()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    storage
                        .store("same.gif", format!("payload {i}").as_bytes())
                        .unwrap()
                })
            })
            .collect();

        let names: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path().to_path_buf());

        let stored = storage.store("gone.png", b"x").unwrap();
        storage.delete(&stored).unwrap();
        assert!(!storage.get_path(&stored).exists());

        // Deleting twice is fine
        storage.delete(&stored).unwrap();
    }
}
