//! Package lifecycle: create, install, uninstall, execute, list
//!
//! ```text
//!  (absent) --create--> Available --install--> Installed --uninstall--> (absent)
//! ```
//!
//! There is no way back from Installed to Available, and nothing reaches
//! Installed without passing through Available first.

use super::store::PackageStore;
use super::validate_name;
use crate::error::{PackageError, Result};
use crate::exec::{PackageRunner, RunReport};
use crate::permission::{authorize, Operation};
use crate::session::User;
use log::{info, warn};

pub struct PackageManager<R: PackageRunner> {
    store: PackageStore,
    runner: R,
}

impl<R: PackageRunner> PackageManager<R> {
    pub fn new(store: PackageStore, runner: R) -> Self {
        Self { store, runner }
    }

    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn create(&self, user: &User, name: &str) -> Result<()> {
        self.check(user, Operation::Create)?;
        validate_name(name)?;
        self.store.create(name)
    }

    pub fn install(&self, user: &User, name: &str) -> Result<()> {
        self.check(user, Operation::Install)?;
        self.store.move_to_installed(name)
    }

    pub fn uninstall(&self, user: &User, name: &str) -> Result<()> {
        self.check(user, Operation::Uninstall)?;
        self.store.remove_installed(name)
    }

    /// Run an installed package's entry artifact. The package counts as
    /// missing unless the entry artifact itself is present.
    pub fn execute(&self, user: &User, name: &str) -> Result<RunReport> {
        self.check(user, Operation::Execute)?;

        let entry = match self.store.entry_path(name) {
            Some(entry) if self.store.has_entry(name) => entry,
            _ => return Err(PackageError::NotInstalled(name.to_string())),
        };

        info!("🟢 [PKG] Executing '{}' as {}", name, user.role);
        let report = self.runner.run(&entry, user.role)?;
        if !report.is_success() {
            warn!("⚠️  [PKG] '{}' exited with {:?}", name, report.exit_code);
        }
        Ok(report)
    }

    /// Snapshot of installed package names, sorted.
    pub fn list_installed(&self, user: &User) -> Result<Vec<String>> {
        self.check(user, Operation::List)?;
        Ok(self.store.list_installed()?.into_iter().collect())
    }

    fn check(&self, user: &User, op: Operation) -> Result<()> {
        if authorize(user.role, op).is_allowed() {
            return Ok(());
        }
        warn!("⚠️  [PKG] {} ({}) denied {:?}", user.username, user.role, op);
        Err(PackageError::PermissionDenied)
    }
}
