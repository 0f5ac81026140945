//! The `match` command.
//!
//! Matches a request path against a template and prints the resulting route
//! values as JSON.

use std::io::Write;

use waymark_core::{Settings, WaymarkError, WaymarkResult};

use super::{route_arguments, route_from_args};
use crate::command::ManagementCommand;

/// Matches a path against an ad-hoc route.
pub struct MatchCommand;

impl ManagementCommand for MatchCommand {
    fn name(&self) -> &'static str {
        "match"
    }

    fn help(&self) -> &'static str {
        "Match a request path against a route template"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        route_arguments(cmd).arg(
            clap::Arg::new("path")
                .required(true)
                .help("The request path, e.g. /Products/Details/5"),
        )
    }

    fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
        out: &mut dyn Write,
    ) -> WaymarkResult<()> {
        let route = route_from_args(matches)?;
        let path = matches.get_one::<String>("path").map_or("", String::as_str);

        let matched = route.match_request(path).ok_or_else(|| {
            WaymarkError::NotFound(format!(
                "'{path}' does not match '{}'",
                route.template().text()
            ))
        })?;

        serde_json::to_writer_pretty(&mut *out, &matched.values).map_err(std::io::Error::from)?;
        writeln!(out)?;
        Ok(())
    }
}
