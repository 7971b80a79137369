//! Role-based permission gate for package operations

use crate::session::Role;

/// Operations the shell can ask the lifecycle manager to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Install,
    Uninstall,
    Execute,
    List,
}

impl Operation {
    /// Whether only administrators may perform this operation
    pub fn requires_admin(&self) -> bool {
        matches!(self, Operation::Install | Operation::Uninstall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied,
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed)
    }
}

/// Decide whether `role` may perform `op`. Pure and stateless.
pub fn authorize(role: Role, op: Operation) -> Authorization {
    match (role, op.requires_admin()) {
        (Role::Admin, _) => Authorization::Allowed,
        (Role::User, false) => Authorization::Allowed,
        (Role::User, true) => Authorization::Denied,
    }
}
