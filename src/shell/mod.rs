//! Interactive command shell
//!
//! Reads one line at a time, parses it against the fixed grammar in
//! [`command`], dispatches to the [`PackageManager`] and writes a textual
//! result. Every package error except a storage fault is rendered as one
//! line and the loop keeps going.

pub mod command;

pub use command::Command;

use crate::error::PackageError;
use crate::exec::PackageRunner;
use crate::package::PackageManager;
use crate::session::{Role, User};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Fatal(#[from] PackageError),
}

pub struct Shell<'a, R: PackageRunner> {
    user: &'a User,
    manager: &'a PackageManager<R>,
    prompt_name: String,
    show_prompt: bool,
}

impl<'a, R: PackageRunner> Shell<'a, R> {
    pub fn new(user: &'a User, manager: &'a PackageManager<R>) -> Self {
        Self {
            user,
            manager,
            prompt_name: crate::SHELL_NAME.to_string(),
            show_prompt: true,
        }
    }

    pub fn with_prompt_name(mut self, name: impl Into<String>) -> Self {
        self.prompt_name = name.into();
        self
    }

    /// Disable the prompt, e.g. when input is piped in.
    pub fn with_prompt(mut self, show: bool) -> Self {
        self.show_prompt = show;
        self
    }

    pub fn prompt(&self) -> String {
        match self.user.role {
            Role::Admin => format!("{}> ", self.prompt_name),
            Role::User => format!("{}/Users/{}> ", self.prompt_name, self.user.username),
        }
    }

    /// Run the read-eval loop until `exit` or end of input.
    pub fn run<I: BufRead, O: Write>(&self, mut input: I, out: &mut O) -> Result<(), ShellError> {
        log::info!("🟢 [SHELL] Session started for {} ({})", self.user.username, self.user.role);
        writeln!(out, "Type 'exit' to quit.")?;

        loop {
            if self.show_prompt {
                write!(out, "{}", self.prompt())?;
                out.flush()?;
            }

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF
                if self.show_prompt {
                    writeln!(out)?;
                }
                break;
            }

            if self.execute_line(&line, out)? {
                break;
            }
        }

        writeln!(out, "Exiting {}...", self.prompt_name)?;
        log::info!("🟢 [SHELL] Session ended for {}", self.user.username);
        Ok(())
    }

    /// Handle one input line. Returns `Ok(true)` when the session should end.
    pub fn execute_line<O: Write>(&self, line: &str, out: &mut O) -> Result<bool, ShellError> {
        let command = Command::parse(line);
        log::debug!("Parsed command: {:?}", command);

        let result = match command {
            Command::Exit => return Ok(true),
            Command::Unknown(text) => {
                writeln!(out, "unknown command: {}", text)?;
                return Ok(false);
            }
            Command::Create(name) => self.manager.create(self.user, &name).map(|_| {
                vec![format!(
                    "Package '{}' created successfully in '{}'.",
                    name,
                    self.manager.store().available_dir().display()
                )]
            }),
            Command::Install(name) => self
                .manager
                .install(self.user, &name)
                .map(|_| vec![format!("Package '{}' installed successfully.", name)]),
            Command::Uninstall(name) => self
                .manager
                .uninstall(self.user, &name)
                .map(|_| vec![format!("Package '{}' has been successfully uninstalled.", name)]),
            Command::Execute(name) => self.manager.execute(self.user, &name).map(|report| {
                match report.exit_code {
                    Some(0) => vec![format!("Package '{}' ran as {}.", name, self.user.role)],
                    Some(code) => vec![format!("Package '{}' exited with status {}.", name, code)],
                    None => vec![format!("Package '{}' was terminated by a signal.", name)],
                }
            }),
            Command::ListInstalled => self.manager.list_installed(self.user).map(render_installed),
        };

        match result {
            Ok(lines) => {
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => writeln!(out, "{}", e)?,
        }

        Ok(false)
    }
}

fn render_installed(names: Vec<String>) -> Vec<String> {
    if names.is_empty() {
        return vec!["No packages installed.".to_string()];
    }
    std::iter::once("Installed Packages:".to_string())
        .chain(names)
        .collect()
}
