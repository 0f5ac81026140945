//! The `check` command.
//!
//! Loads a settings file, compiles every declared route, and reports
//! problems with the route declarations.

use std::io::Write;
use std::path::PathBuf;

use waymark_core::settings_loader;
use waymark_core::{Settings, WaymarkError, WaymarkResult};
use waymark_routing::route::TemplateRoute;
use waymark_routing::table::RouteTable;
use waymark_routing::value::eq_ignore_case;

use crate::command::ManagementCommand;

/// Validates the routes declared in a settings file.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level of this check result.
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "routes.E001").
    pub id: &'static str,
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Runs the route checks against the given settings.
///
/// Every route is compiled on its own so that one bad declaration does not
/// hide the others.
pub fn run_checks(settings: &Settings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    if settings.routes.is_empty() {
        messages.push(CheckMessage {
            level: CheckLevel::Warning,
            msg: "No routes configured".to_string(),
            hint: Some("Declare routes in [[routes]] tables".to_string()),
            id: "routes.W001",
        });
    }

    let mut compiled: Vec<TemplateRoute> = Vec::new();
    for (index, declaration) in settings.routes.iter().enumerate() {
        let label = declaration
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1));

        let route = match TemplateRoute::from_settings(declaration) {
            Ok(route) => route,
            Err(e) => {
                messages.push(CheckMessage {
                    level: CheckLevel::Error,
                    msg: format!("Route {label}: {e}"),
                    hint: None,
                    id: "routes.E001",
                });
                continue;
            }
        };

        if let Some(name) = route.name() {
            if compiled
                .iter()
                .any(|r| r.name().is_some_and(|n| eq_ignore_case(n, name)))
            {
                messages.push(CheckMessage {
                    level: CheckLevel::Error,
                    msg: format!("Route {label}: duplicate route name"),
                    hint: Some("Route names are compared ignoring case".to_string()),
                    id: "routes.E002",
                });
            }
        }

        for parameter in declaration.constraints.keys() {
            if route.template().parameter(parameter).is_none() {
                messages.push(CheckMessage {
                    level: CheckLevel::Warning,
                    msg: format!(
                        "Route {label}: constraint on '{parameter}', which is not a template parameter"
                    ),
                    hint: Some(
                        "The constraint only sees ambient values or defaults for this key"
                            .to_string(),
                    ),
                    id: "routes.W002",
                });
            }
        }

        if let Some(earlier) = compiled.iter().find(|r| {
            r.constraints().is_empty()
                && eq_ignore_case(r.template().text(), route.template().text())
        }) {
            messages.push(CheckMessage {
                level: CheckLevel::Warning,
                msg: format!(
                    "Route {label}: template '{}' is already matched by an earlier route",
                    earlier.template().text()
                ),
                hint: Some("Only the first matching route handles a request".to_string()),
                id: "routes.W003",
            });
        }

        compiled.push(route);
    }

    messages
}

impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the routes declared in a settings file"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("file")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Settings file (.toml or .json)"),
        )
    }

    fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
        out: &mut dyn Write,
    ) -> WaymarkResult<()> {
        let path = matches.get_one::<PathBuf>("file").ok_or_else(|| {
            WaymarkError::ConfigurationError("No settings file given".to_string())
        })?;
        let settings = settings_loader::from_file_with_env(path)?;
        tracing::debug!(path = %path.display(), routes = settings.routes.len(), "Checking routes");

        let messages = run_checks(&settings);
        for msg in &messages {
            writeln!(out, "{} ({}): {}", msg.level, msg.id, msg.msg)?;
            if let Some(hint) = &msg.hint {
                writeln!(out, "\tHINT: {hint}")?;
            }
        }

        let errors = messages
            .iter()
            .filter(|m| m.level == CheckLevel::Error)
            .count();
        if errors > 0 {
            return Err(WaymarkError::ImproperlyConfigured(format!(
                "Route check found {errors} error(s)"
            )));
        }

        let table = RouteTable::from_settings(&settings)?;
        for route in table.routes() {
            writeln!(
                out,
                "{:<16} /{}",
                route.name().unwrap_or("-"),
                route.template().text()
            )?;
        }
        writeln!(
            out,
            "Route check identified {} issue(s) in {} route(s)",
            messages.len(),
            table.len()
        )?;
        Ok(())
    }
}
