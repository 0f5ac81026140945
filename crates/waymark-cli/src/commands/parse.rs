//! The `parse` command.
//!
//! Compiles a template and prints its segments and parameters, or fails
//! with the syntax error.

use std::io::Write;

use waymark_core::{Settings, WaymarkResult};
use waymark_routing::template::{ParsedTemplate, TemplatePart};

use crate::command::ManagementCommand;

/// Shows how a template is broken into segments and parts.
pub struct ParseCommand;

impl ManagementCommand for ParseCommand {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn help(&self) -> &'static str {
        "Parse a route template and show its structure"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("template")
                .required(true)
                .help("The route template, e.g. \"{controller}/{action}/{id?}\""),
        )
    }

    fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
        out: &mut dyn Write,
    ) -> WaymarkResult<()> {
        let text = matches
            .get_one::<String>("template")
            .map_or("", String::as_str);
        let template = ParsedTemplate::parse(text)?;
        tracing::debug!(template = text, "Template parsed");
        write_template(&template, out)
    }
}

fn write_template(template: &ParsedTemplate, out: &mut dyn Write) -> WaymarkResult<()> {
    writeln!(out, "Template: {template}")?;
    for (index, segment) in template.segments().iter().enumerate() {
        writeln!(out, "Segment {index}: {segment}")?;
        for part in segment.parts() {
            writeln!(out, "  {}", describe_part(part))?;
        }
    }

    let parameters: Vec<String> = template
        .parameters()
        .iter()
        .map(|p| p.name.clone())
        .collect();
    if parameters.is_empty() {
        writeln!(out, "Parameters: (none)")?;
    } else {
        writeln!(out, "Parameters: {}", parameters.join(", "))?;
    }
    Ok(())
}

fn describe_part(part: &TemplatePart) -> String {
    match part {
        TemplatePart::Literal {
            text,
            is_optional_separator: true,
        } => format!("literal \"{text}\" (optional separator)"),
        TemplatePart::Literal { text, .. } => format!("literal \"{text}\""),
        TemplatePart::Parameter(p) if p.is_catch_all => format!("parameter {} (catch-all)", p.name),
        TemplatePart::Parameter(p) if p.is_optional => format!("parameter {} (optional)", p.name),
        TemplatePart::Parameter(p) => format!("parameter {}", p.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(template: &str) -> WaymarkResult<String> {
        let cmd = ParseCommand.add_arguments(clap::Command::new("parse"));
        let matches = cmd.try_get_matches_from(["parse", template]).unwrap();
        let mut out = Vec::new();
        ParseCommand.handle(&matches, &Settings::default(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_prints_structure() {
        let output = run("Sales/{year}-{month}").unwrap();
        assert_eq!(
            output,
            "Template: Sales/{year}-{month}\n\
             Segment 0: Sales\n  literal \"Sales\"\n\
             Segment 1: {year}-{month}\n  parameter year\n  literal \"-\"\n  parameter month\n\
             Parameters: year, month\n"
        );
    }

    #[test]
    fn test_parse_marks_optional_and_catch_all() {
        let output = run("{action}.{format?}").unwrap();
        assert!(output.contains("literal \".\" (optional separator)"));
        assert!(output.contains("parameter format (optional)"));

        let output = run("files/{*path}").unwrap();
        assert!(output.contains("parameter path (catch-all)"));
    }

    #[test]
    fn test_parse_without_parameters() {
        let output = run("about/team").unwrap();
        assert!(output.ends_with("Parameters: (none)\n"));
    }

    #[test]
    fn test_parse_error_is_returned() {
        let err = run("{p1}{p2}").unwrap_err();
        assert!(err.to_string().contains("consecutive parameters"));
    }
}
