//! The `bind` command.
//!
//! Generates a URL from a template, new values, and optionally the ambient
//! values of the current request.

use std::io::Write;

use waymark_core::{Settings, WaymarkError, WaymarkResult};

use super::{key_value_arg, key_values, route_arguments, route_from_args};
use crate::command::ManagementCommand;

/// Generates a URL from an ad-hoc route.
pub struct BindCommand;

impl ManagementCommand for BindCommand {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn help(&self) -> &'static str {
        "Generate a URL from a route template and values"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        route_arguments(cmd)
            .arg(key_value_arg("values", 'v', "Value to put in the URL"))
            .arg(key_value_arg(
                "ambient",
                'a',
                "Value of the current request, reused where possible",
            ))
    }

    fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
        out: &mut dyn Write,
    ) -> WaymarkResult<()> {
        let route = route_from_args(matches)?;
        let values = key_values(matches, "values");
        let ambient = key_values(matches, "ambient");
        let ambient = (!ambient.is_empty()).then_some(&ambient);

        let data = route.virtual_path(ambient, &values).ok_or_else(|| {
            WaymarkError::NotFound(format!(
                "Cannot generate a URL for '{}' from the given values",
                route.template().text()
            ))
        })?;

        writeln!(out, "{}", data.path)?;
        Ok(())
    }
}
