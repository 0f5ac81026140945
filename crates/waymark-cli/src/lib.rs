//! # waymark-cli
//!
//! The `waymark` command-line tool.
//!
//! This crate provides:
//!
//! - **Command framework** - [`ManagementCommand`] and [`CommandRegistry`] for
//!   defining and dispatching subcommands
//! - **Built-in commands** - `parse`, `match`, `bind` and `check`
//!
//! ## Quick Start
//!
//! ```rust
//! use waymark_cli::command::CommandRegistry;
//! use waymark_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"match"));
//! assert!(names.contains(&"bind"));
//! assert!(names.contains(&"check"));
//! ```

// These clippy lints are intentionally allowed:
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: some functions may gain runtime logic later
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
