use crate::error::{PackageError, Result};
use std::fmt;

pub mod manager;
pub mod store;

pub use manager::PackageManager;
pub use store::PackageStore;

/// Which collection a package name currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageState {
    Available,
    Installed,
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageState::Available => write!(f, "available"),
            PackageState::Installed => write!(f, "installed"),
        }
    }
}

/// Check that `name` can be used as a package directory name.
///
/// Names are case-sensitive and must not be empty, contain a path
/// separator or NUL, or be one of the `.`/`..` directory aliases.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(PackageError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["calc", "Calc", "my-pkg_2", "a.b", "..hidden"] {
            assert!(validate_name(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".", "..", "a/b", "../etc", "a\\b", "nul\0"] {
            assert!(
                matches!(validate_name(name), Err(PackageError::InvalidName(_))),
                "{:?}",
                name
            );
        }
    }
}
