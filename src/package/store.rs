//! Directory-backed package storage
//!
//! Two sibling directories hold the package collections: one for packages
//! that have been created but not installed, one for installed packages.
//! A package is a directory named after the package. This module is the
//! only place that mutates those directories.
//!
//! The store assumes a single active session. Concurrent shells would need
//! `create`, `move_to_installed` and `remove_installed` serialized per
//! package name to keep a name out of both collections at once.

use super::{validate_name, PackageState};
use crate::config::ShellConfig;
use crate::error::{PackageError, Result};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PackageStore {
    available_dir: PathBuf,
    installed_dir: PathBuf,
    entry_artifact: String,
}

impl PackageStore {
    pub fn new(
        available_dir: impl Into<PathBuf>,
        installed_dir: impl Into<PathBuf>,
        entry_artifact: impl Into<String>,
    ) -> Self {
        Self {
            available_dir: available_dir.into(),
            installed_dir: installed_dir.into(),
            entry_artifact: entry_artifact.into(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            &config.packages_dir,
            &config.installed_dir,
            &config.entry_artifact,
        )
    }

    /// Create both collection directories if they don't exist yet.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.available_dir).map_err(PackageError::Storage)?;
        fs::create_dir_all(&self.installed_dir).map_err(PackageError::Storage)?;
        debug!(
            "Package store ready: {} / {}",
            self.available_dir.display(),
            self.installed_dir.display()
        );
        Ok(())
    }

    pub fn available_dir(&self) -> &Path {
        &self.available_dir
    }

    pub fn installed_dir(&self) -> &Path {
        &self.installed_dir
    }

    pub fn list_available(&self) -> Result<BTreeSet<String>> {
        list_dir(&self.available_dir)
    }

    pub fn list_installed(&self) -> Result<BTreeSet<String>> {
        list_dir(&self.installed_dir)
    }

    pub fn exists(&self, name: &str, state: PackageState) -> bool {
        self.path_for(name, state)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Add a new, empty package to the available collection. Names are
    /// validated by the manager; one that doesn't resolve to a path here is
    /// refused without touching the filesystem.
    pub fn create(&self, name: &str) -> Result<()> {
        let path = self
            .path_for(name, PackageState::Available)
            .ok_or_else(|| PackageError::InvalidName(name.to_string()))?;

        if path.exists() || self.exists(name, PackageState::Installed) {
            return Err(PackageError::AlreadyExists(name.to_string()));
        }

        fs::create_dir(&path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => PackageError::AlreadyExists(name.to_string()),
            io::ErrorKind::NotFound => PackageError::Storage(e),
            _ => PackageError::io(name, e),
        })?;

        info!("🟢 [PKG] Created {}", path.display());
        Ok(())
    }

    /// Move a package from available to installed with a single rename.
    pub fn move_to_installed(&self, name: &str) -> Result<()> {
        let (from, to) = match (
            self.path_for(name, PackageState::Available),
            self.path_for(name, PackageState::Installed),
        ) {
            (Some(from), Some(to)) if from.exists() => (from, to),
            _ => return Err(PackageError::NotAvailable(name.to_string())),
        };

        // A rename onto an existing empty directory would silently replace it
        if to.exists() {
            return Err(PackageError::AlreadyExists(name.to_string()));
        }

        fs::rename(&from, &to).map_err(|e| PackageError::io(name, e))?;

        info!("🟢 [PKG] Installed {} -> {}", from.display(), to.display());
        Ok(())
    }

    /// Remove an installed package. Only empty package directories are
    /// removed; anything with content is reported as `NotEmpty`.
    pub fn remove_installed(&self, name: &str) -> Result<()> {
        let path = match self.path_for(name, PackageState::Installed) {
            Some(path) if path.exists() => path,
            _ => return Err(PackageError::NotInstalled(name.to_string())),
        };

        if path.is_dir() {
            let mut entries = fs::read_dir(&path).map_err(|e| PackageError::io(name, e))?;
            if entries.next().is_some() {
                return Err(PackageError::NotEmpty(name.to_string()));
            }
        }

        fs::remove_dir(&path).map_err(|e| PackageError::io(name, e))?;

        info!("🟢 [PKG] Removed {}", path.display());
        Ok(())
    }

    /// Path of the entry artifact inside an installed package.
    pub fn entry_path(&self, name: &str) -> Option<PathBuf> {
        self.path_for(name, PackageState::Installed)
            .map(|dir| dir.join(&self.entry_artifact))
    }

    /// Whether the installed package has its entry artifact in place.
    pub fn has_entry(&self, name: &str) -> bool {
        self.entry_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn path_for(&self, name: &str, state: PackageState) -> Option<PathBuf> {
        validate_name(name).ok()?;
        let root = match state {
            PackageState::Available => &self.available_dir,
            PackageState::Installed => &self.installed_dir,
        };
        Some(root.join(name))
    }
}

fn list_dir(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();

    for entry in fs::read_dir(dir).map_err(PackageError::Storage)? {
        let entry = entry.map_err(PackageError::Storage)?;
        match entry.file_name().into_string() {
            Ok(name) => {
                names.insert(name);
            }
            Err(raw) => log::warn!("⚠️  [PKG] Skipping non UTF-8 entry {:?}", raw),
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn store() -> (TempDir, PackageStore) {
        let dir = tempdir().unwrap();
        let store = PackageStore::new(
            dir.path().join("Packages"),
            dir.path().join("InstalledPackages"),
            "main.py",
        );
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn test_init_is_idempotent() {
        let (_dir, store) = store();
        store.init().unwrap();
        assert!(store.available_dir().is_dir());
        assert!(store.installed_dir().is_dir());
    }

    #[test]
    fn test_create_lands_in_available() {
        let (_dir, store) = store();
        store.create("calc").unwrap();

        assert!(store.exists("calc", PackageState::Available));
        assert!(!store.exists("calc", PackageState::Installed));
        assert_eq!(store.list_available().unwrap(), BTreeSet::from(["calc".to_string()]));
    }

    #[test]
    fn test_create_duplicate() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        assert!(matches!(store.create("calc"), Err(PackageError::AlreadyExists(_))));

        store.move_to_installed("calc").unwrap();
        assert!(matches!(store.create("calc"), Err(PackageError::AlreadyExists(_))));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        if store.exists("CALC", PackageState::Available) {
            // case-insensitive filesystem, nothing to check
            return;
        }
        store.create("CALC").unwrap();
        assert_eq!(store.list_available().unwrap().len(), 2);
    }

    #[test]
    fn test_move_is_exclusive() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        store.move_to_installed("calc").unwrap();

        assert!(!store.exists("calc", PackageState::Available));
        assert!(store.exists("calc", PackageState::Installed));
    }

    #[test]
    fn test_move_missing_leaves_store_untouched() {
        let (_dir, store) = store();
        store.create("other").unwrap();

        let err = store.move_to_installed("calc").unwrap_err();
        assert!(matches!(err, PackageError::NotAvailable(_)));
        assert_eq!(store.list_available().unwrap().len(), 1);
        assert!(store.list_installed().unwrap().is_empty());
    }

    #[test]
    fn test_move_refuses_to_clobber_installed() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        fs::create_dir(store.installed_dir().join("calc")).unwrap();

        let err = store.move_to_installed("calc").unwrap_err();
        assert!(matches!(err, PackageError::AlreadyExists(_)));
        assert!(store.exists("calc", PackageState::Available));
    }

    #[test]
    fn test_remove_installed() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        store.move_to_installed("calc").unwrap();
        store.remove_installed("calc").unwrap();

        assert!(!store.exists("calc", PackageState::Installed));
        assert!(!store.exists("calc", PackageState::Available));
    }

    #[test]
    fn test_remove_not_installed() {
        let (_dir, store) = store();
        store.create("calc").unwrap();

        let err = store.remove_installed("calc").unwrap_err();
        assert!(matches!(err, PackageError::NotInstalled(_)));
        assert!(store.exists("calc", PackageState::Available));
    }

    #[test]
    fn test_remove_non_empty_is_reported() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        store.move_to_installed("calc").unwrap();
        fs::write(store.entry_path("calc").unwrap(), "print('hi')").unwrap();

        let err = store.remove_installed("calc").unwrap_err();
        assert!(matches!(err, PackageError::NotEmpty(_)));
        assert!(store.exists("calc", PackageState::Installed));
    }

    #[test]
    fn test_traversal_names_never_resolve() {
        let (_dir, store) = store();
        assert!(!store.exists("..", PackageState::Available));
        assert!(store.entry_path("../x").is_none());
        assert!(matches!(
            store.move_to_installed("../Packages"),
            Err(PackageError::NotAvailable(_))
        ));
        assert!(matches!(store.create("a/b"), Err(PackageError::InvalidName(_))));
        assert!(matches!(store.create(".."), Err(PackageError::InvalidName(_))));
        assert!(store.list_available().unwrap().is_empty());
    }

    #[test]
    fn test_has_entry() {
        let (_dir, store) = store();
        store.create("calc").unwrap();
        store.move_to_installed("calc").unwrap();
        assert!(!store.has_entry("calc"));

        fs::write(store.entry_path("calc").unwrap(), "").unwrap();
        assert!(store.has_entry("calc"));
    }

    #[test]
    fn test_listing_missing_dir_is_storage_fault() {
        let dir = tempdir().unwrap();
        let store = PackageStore::new(dir.path().join("a"), dir.path().join("b"), "main.py");

        let err = store.list_installed().unwrap_err();
        assert!(err.is_fatal());
    }
}
