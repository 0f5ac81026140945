//! Built-in commands.
//!
//! Each command implements the
//! [`ManagementCommand`](crate::command::ManagementCommand) trait.

pub mod bind;
pub mod check;
pub mod match_path;
pub mod parse;

pub use bind::BindCommand;
pub use check::CheckCommand;
pub use match_path::MatchCommand;
pub use parse::ParseCommand;

use waymark_core::WaymarkResult;
use waymark_routing::constraint::resolve_constraint;
use waymark_routing::route::TemplateRoute;
use waymark_routing::value::RouteValueMap;

use crate::command::CommandRegistry;

/// Registers all built-in commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(ParseCommand));
    registry.register(Box::new(MatchCommand));
    registry.register(Box::new(BindCommand));
    registry.register(Box::new(CheckCommand));
}

/// Parses a `key=value` command-line argument.
///
/// Only the first `=` splits; the value may itself contain `=` and may be
/// empty.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{arg}'")),
    }
}

/// A repeatable `-<short> KEY=VALUE` argument.
pub(crate) fn key_value_arg(id: &'static str, short: char, help: &'static str) -> clap::Arg {
    clap::Arg::new(id)
        .short(short)
        .long(id)
        .value_name("KEY=VALUE")
        .action(clap::ArgAction::Append)
        .value_parser(parse_key_value)
        .help(help)
}

/// Collects the values of a [`key_value_arg`] into a map.
pub(crate) fn key_values(matches: &clap::ArgMatches, id: &str) -> RouteValueMap {
    matches
        .get_many::<(String, String)>(id)
        .into_iter()
        .flatten()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

/// The `<template>`, `--defaults` and `--constraints` arguments shared by
/// commands that work on a single ad-hoc route.
pub(crate) fn route_arguments(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        clap::Arg::new("template")
            .required(true)
            .help("The route template, e.g. \"{controller}/{action}/{id?}\""),
    )
    .arg(key_value_arg("defaults", 'd', "Default value for a parameter or filter"))
    .arg(key_value_arg(
        "constraints",
        'c',
        "Constraint on a parameter, e.g. id=int or year=range(1900,2100)",
    ))
}

/// Builds an unnamed route from [`route_arguments`].
pub(crate) fn route_from_args(matches: &clap::ArgMatches) -> WaymarkResult<TemplateRoute> {
    let template = matches
        .get_one::<String>("template")
        .map_or("", String::as_str);
    let constraints = matches
        .get_many::<(String, String)>("constraints")
        .into_iter()
        .flatten()
        .map(|(key, definition)| resolve_constraint(definition).map(|c| (key.clone(), c)))
        .collect::<WaymarkResult<Vec<_>>>()?;
    TemplateRoute::new(None, template, key_values(matches, "defaults"), constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_routing::value::RouteValue;

    #[test]
    fn test_register_builtin_commands() {
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry);
        assert_eq!(registry.list_commands(), vec!["bind", "check", "match", "parse"]);
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("id=5").unwrap(),
            ("id".to_string(), "5".to_string())
        );
        assert_eq!(
            parse_key_value("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_key_values_collects_repeated_flags() {
        let cmd = clap::Command::new("t").arg(key_value_arg("values", 'v', "values"));
        let matches = cmd
            .try_get_matches_from(["t", "-v", "a=1", "--values", "B=2"])
            .unwrap();
        let map = key_values(&matches, "values");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Some(&RouteValue::from("2")));
    }

    #[test]
    fn test_route_from_args() {
        let cmd = route_arguments(clap::Command::new("t"));
        let matches = cmd
            .try_get_matches_from(["t", "{controller}/{id?}", "-d", "controller=Home", "-c", "id=int"])
            .unwrap();
        let route = route_from_args(&matches).unwrap();
        assert_eq!(route.template().text(), "{controller}/{id?}");
        assert_eq!(route.defaults().get("controller"), Some(&RouteValue::from("Home")));
        assert_eq!(route.constraints().len(), 1);
        assert!(route.name().is_none());
    }

    #[test]
    fn test_route_from_args_rejects_unknown_constraint() {
        let cmd = route_arguments(clap::Command::new("t"));
        let matches = cmd
            .try_get_matches_from(["t", "{id}", "-c", "id=prime"])
            .unwrap();
        let err = route_from_args(&matches).unwrap_err();
        assert!(err.to_string().contains("Unknown route constraint"));
    }

    #[test]
    fn test_key_values_absent_is_empty() {
        let cmd = clap::Command::new("t").arg(key_value_arg("values", 'v', "values"));
        let matches = cmd.try_get_matches_from(["t"]).unwrap();
        assert!(key_values(&matches, "values").is_empty());
    }
}
