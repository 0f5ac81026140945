//! Command framework for the `waymark` CLI.
//!
//! This module provides the [`ManagementCommand`] trait for defining CLI
//! commands and [`CommandRegistry`] for registering and dispatching them.
//!
//! ## Defining a Custom Command
//!
//! ```rust
//! use std::io::Write;
//!
//! use waymark_cli::command::{CommandRegistry, ManagementCommand};
//! use waymark_core::{Settings, WaymarkResult};
//!
//! struct GreetCommand;
//!
//! impl ManagementCommand for GreetCommand {
//!     fn name(&self) -> &'static str { "greet" }
//!     fn help(&self) -> &'static str { "Say hello" }
//!
//!     fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!         out: &mut dyn Write,
//!     ) -> WaymarkResult<()> {
//!         writeln!(out, "Hello from waymark!")?;
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(Box::new(GreetCommand));
//!
//! let matches = registry.build_cli().try_get_matches_from(["waymark", "greet"]).unwrap();
//! let mut out = Vec::new();
//! registry.execute(&matches, &Settings::default(), &mut out).unwrap();
//! assert_eq!(out, b"Hello from waymark!\n");
//! ```

use std::collections::HashMap;
use std::io::Write;

use waymark_core::{Settings, WaymarkError, WaymarkResult};

/// A command that can be registered and invoked through the CLI.
///
/// Implementations define a name, help text, optional arguments, and a
/// handler that writes its report to `out`.
pub trait ManagementCommand: Send + Sync {
    /// Returns the name of this command (used to invoke it from the CLI).
    fn name(&self) -> &'static str;

    /// Returns a short help description for this command.
    fn help(&self) -> &'static str;

    /// Adds custom arguments to the clap command.
    ///
    /// The default implementation returns the command unchanged.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Executes the command with the given argument matches and settings.
    fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> WaymarkResult<()>;
}

/// A registry of commands, keyed by name.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command.
    ///
    /// If a command with the same name already exists, it is replaced.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Returns a reference to the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns a sorted list of all registered command names.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap `Command` with every registered subcommand
    /// and the global `--verbose` flag.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("waymark")
            .about("Parse, match, and generate URLs with route templates")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                clap::Arg::new("verbose")
                    .long("verbose")
                    .global(true)
                    .action(clap::ArgAction::SetTrue)
                    .help("Log at debug level"),
            );

        for name in self.list_commands() {
            if let Some(cmd) = self.get(name) {
                let subcmd = clap::Command::new(cmd.name()).about(cmd.help());
                app = app.subcommand(cmd.add_arguments(subcmd));
            }
        }

        app
    }

    /// Dispatches to the subcommand named in `matches`.
    pub fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> WaymarkResult<()> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            WaymarkError::ConfigurationError("No subcommand specified".to_string())
        })?;

        let cmd = self.get(name).ok_or_else(|| {
            WaymarkError::ConfigurationError(format!("Unknown command: {name}"))
        })?;

        tracing::debug!(command = name, "Running command");
        cmd.handle(sub_matches, settings, out)
    }
}
