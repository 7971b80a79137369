//! Running installed packages through the host's process facility

use crate::error::{PackageError, Result};
use crate::session::Role;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable carrying the caller's role into the package process
pub const ROLE_ENV: &str = "COALEN_ROLE";

/// Outcome of running a package entry artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl RunReport {
    pub fn success() -> Self {
        Self { exit_code: Some(0) }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a package's entry artifact on behalf of a user.
pub trait PackageRunner {
    fn run(&self, entry: &Path, role: Role) -> Result<RunReport>;
}

/// Spawns the configured interpreter with the entry artifact as its
/// argument and waits for it. Stdio is inherited from the shell.
#[derive(Debug, Clone)]
pub struct InterpreterRunner {
    interpreter: PathBuf,
}

impl InterpreterRunner {
    pub fn new(interpreter: &str) -> Self {
        let interpreter = which::which(interpreter).unwrap_or_else(|_| {
            warn!("⚠️  [EXEC] '{}' not found on PATH, using it as given", interpreter);
            PathBuf::from(interpreter)
        });
        Self { interpreter }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }
}

impl PackageRunner for InterpreterRunner {
    fn run(&self, entry: &Path, role: Role) -> Result<RunReport> {
        let name = entry
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            "🟢 [EXEC] {} {} (role: {})",
            self.interpreter.display(),
            entry.display(),
            role
        );

        let status = Command::new(&self.interpreter)
            .arg(entry)
            .env(ROLE_ENV, role.as_str())
            .status()
            .map_err(|e| PackageError::Execution {
                name,
                reason: e.to_string(),
            })?;

        Ok(RunReport {
            exit_code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_runs_entry_with_role() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("calc");
        fs::create_dir(&pkg).unwrap();
        let entry = pkg.join("main.sh");
        let out = dir.path().join("role.txt");
        fs::write(&entry, format!("printf %s \"${}\" > {}\n", ROLE_ENV, out.display())).unwrap();

        let runner = InterpreterRunner::new("sh");
        let report = runner.run(&entry, Role::Admin).unwrap();

        assert!(report.is_success());
        assert_eq!(fs::read_to_string(out).unwrap(), "admin");
    }

    #[test]
    fn test_exit_code_passed_through() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.sh");
        fs::write(&entry, "exit 3\n").unwrap();

        let report = InterpreterRunner::new("sh").run(&entry, Role::User).unwrap();
        assert_eq!(report.exit_code, Some(3));
        assert!(!report.is_success());
    }

    #[test]
    fn test_missing_interpreter() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.py");
        fs::write(&entry, "").unwrap();

        let runner = InterpreterRunner::new("definitely-not-an-interpreter-xyz");
        let err = runner.run(&entry, Role::User).unwrap_err();
        assert!(matches!(err, PackageError::Execution { .. }));
        assert!(!err.is_fatal());
    }
}
