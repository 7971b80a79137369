use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;

use coalen_shell::auth::UserRegistry;
use coalen_shell::config::ShellConfig;
use coalen_shell::exec::InterpreterRunner;
use coalen_shell::package::{PackageManager, PackageStore};
use coalen_shell::{Role, Shell, BANNER, SHELL_VERSION};

#[derive(Parser)]
#[command(name = "coalen")]
#[command(about = "Role-gated package manager shell", version = SHELL_VERSION)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for created, not yet installed packages
    #[arg(long)]
    packages_dir: Option<PathBuf>,

    /// Directory for installed packages
    #[arg(long)]
    installed_dir: Option<PathBuf>,

    /// User registry file
    #[arg(long)]
    users_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ShellConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.packages_dir {
        config.packages_dir = dir;
    }
    if let Some(dir) = cli.installed_dir {
        config.installed_dir = dir;
    }
    if let Some(file) = cli.users_file {
        config.users_file = file;
    }

    let store = PackageStore::from_config(&config);
    let manager = PackageManager::new(store, InterpreterRunner::new(&config.interpreter));

    main_menu(&config, &manager)
}

fn main_menu(config: &ShellConfig, manager: &PackageManager<InterpreterRunner>) -> Result<()> {
    println!("{}", BANNER);

    loop {
        manager
            .store()
            .init()
            .context("Failed to prepare package directories")?;

        println!("\nWelcome to {}", config.prompt_name.bold());
        println!("1. Login");
        println!("2. Register");
        println!("3. Exit");

        let Some(choice) = ask("Choose an option: ")? else {
            break;
        };

        match choice.trim() {
            "1" => login(config, manager)?,
            "2" => register(config)?,
            "3" => break,
            _ => println!("Invalid choice. Please select 1, 2, or 3."),
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn login(config: &ShellConfig, manager: &PackageManager<InterpreterRunner>) -> Result<()> {
    println!("\n=== {} Login ===", config.prompt_name);
    let mut registry = match UserRegistry::load(&config.users_file) {
        Ok(registry) => registry,
        Err(e) => {
            println!("{}", e.to_string().red());
            return Ok(());
        }
    };

    let username = ask("Username: ")?.unwrap_or_default();
    let password = ask("Password: ")?.unwrap_or_default();

    let session = match registry.login(&username, &password) {
        Ok(session) => session,
        Err(e) => {
            println!("\n{}\n", e.to_string().red());
            return Ok(());
        }
    };

    println!("\nWelcome, {}!", session.user.username.green());
    println!("Role: {}", session.user.role);
    println!("Last login updated to: {}\n", session.last_login.to_rfc3339());

    let interactive = atty::is(atty::Stream::Stdin);
    let shell = Shell::new(&session.user, manager)
        .with_prompt_name(config.prompt_name.clone())
        .with_prompt(interactive);

    let stdin = io::stdin();
    shell.run(stdin.lock(), &mut io::stdout())?;
    Ok(())
}

fn register(config: &ShellConfig) -> Result<()> {
    println!("\n=== User Registration ===");
    let mut registry = match UserRegistry::load(&config.users_file) {
        Ok(registry) => registry,
        Err(e) => {
            println!("{}", e.to_string().red());
            return Ok(());
        }
    };

    let username = ask("Choose a username: ")?.unwrap_or_default();
    if registry.contains(username.trim()) {
        println!("{}", "Username already exists.".red());
        return Ok(());
    }

    let password = ask("Choose a password: ")?.unwrap_or_default();
    let confirm = ask("Confirm password: ")?.unwrap_or_default();
    let role = Role::parse(&ask("Assign role (admin/user): ")?.unwrap_or_default());

    match registry.register(&username, &password, &confirm, role) {
        Ok(()) => println!("{}", "Registration successful!".green()),
        Err(e) => println!("{}", e.to_string().red()),
    }
    Ok(())
}

/// Prompt and read one line from stdin. `None` on end of input.
fn ask(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}
