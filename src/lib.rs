pub mod auth;
pub mod config;
pub mod error;
pub mod exec;
pub mod package;
pub mod permission;
pub mod session;
pub mod shell;

pub use crate::error::PackageError;
pub use crate::session::{Role, User};
pub use crate::shell::Shell;

pub const SHELL_VERSION: &str = "1.0.0";
pub const SHELL_NAME: &str = "CoalenPY";
pub const BANNER: &str = r#"
╔═══════════════════════════════════════════╗
║        CoalenPY v1.0 – Package Shell      ║
╚═══════════════════════════════════════════╝
"#;
