//! Persistent browser profile store
//!
//! One directory per logical profile name, holding cookies and local storage
//! so that logins survive across sessions. Every operation here is
//! best-effort: profile housekeeping must never block a session start.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Chromium drops lock markers in the profile dir; a crashed session leaves
/// them behind and the next launch refuses to start until they are gone.
const LOCK_MARKERS: &[&str] = &["SingletonLock", "SingletonCookie", "SingletonSocket", "LOCK"];

/// Maps a logical profile name to an isolated state directory on disk.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for a profile, created lazily. Creation failure is logged
    /// and the path still returned; the browser launch will surface the real
    /// error if the directory is genuinely unusable.
    pub fn path_for(&self, profile_name: &str) -> PathBuf {
        let path = self.root.join(profile_name);
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("could not create profile dir {}: {}", path.display(), e);
        }
        path
    }

    /// Best-effort recursive delete of a profile's contents. Individual
    /// failures are logged and skipped; the clear proceeds regardless.
    pub fn clear(&self, profile_name: &str) {
        let path = self.path_for(profile_name);
        info!("clearing profile '{}'", profile_name);

        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not read profile dir {}: {}", path.display(), e);
                return;
            }
        };

        for entry in entries.flatten() {
            let item = entry.path();
            let result = if item.is_dir() {
                fs::remove_dir_all(&item)
            } else {
                fs::remove_file(&item)
            };
            if let Err(e) = result {
                warn!("could not remove {}: {}", item.display(), e);
            }
        }
    }

    /// Remove stale lock markers left by a crashed session. Absence is not
    /// an error.
    pub fn remove_lock(&self, profile_name: &str) {
        let path = self.path_for(profile_name);
        for marker in LOCK_MARKERS {
            let lock_path = path.join(marker);
            if !exists_or_dangling(&lock_path) {
                continue;
            }
            match fs::remove_file(&lock_path) {
                Ok(()) => debug!("removed stale lock marker {}", lock_path.display()),
                Err(e) => warn!("could not remove lock marker {}: {}", lock_path.display(), e),
            }
        }
    }
}

// SingletonLock is usually a dangling symlink, which Path::exists reports
// as absent; check the link itself.
fn exists_or_dangling(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn path_for_creates_directory_idempotently() {
        let root = tempdir().unwrap();
        let store = ProfileStore::new(root.path());

        let first = store.path_for("rutube");
        assert!(first.is_dir());
        let second = store.path_for("rutube");
        assert_eq!(first, second);
    }

    #[test]
    fn remove_lock_deletes_markers_and_tolerates_absence() {
        let root = tempdir().unwrap();
        let store = ProfileStore::new(root.path());

        let dir = store.path_for("vk");
        // absent markers are fine
        store.remove_lock("vk");

        let lock = dir.join("SingletonLock");
        fs::write(&lock, b"").unwrap();
        store.remove_lock("vk");
        assert!(!lock.exists());
    }

    #[test]
    fn clear_empties_profile_but_keeps_directory() {
        let root = tempdir().unwrap();
        let store = ProfileStore::new(root.path());

        let dir = store.path_for("telegram");
        fs::write(dir.join("Cookies"), b"data").unwrap();
        fs::create_dir(dir.join("Cache")).unwrap();
        fs::write(dir.join("Cache").join("entry"), b"x").unwrap();

        store.clear("telegram");
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
