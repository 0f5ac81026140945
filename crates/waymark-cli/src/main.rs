use std::io::Write;
use std::process::ExitCode;

use waymark_cli::command::CommandRegistry;
use waymark_cli::commands::register_builtin_commands;
use waymark_core::logging::setup_logging;
use waymark_core::{settings_loader, SETTINGS};

fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let mut settings = settings_loader::from_env();
    if matches.get_flag("verbose") {
        settings.debug = true;
        settings.log_level = "debug".to_string();
    }
    setup_logging(&settings);
    SETTINGS.configure(settings);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = registry.execute(&matches, SETTINGS.get(), &mut out);
    let _ = out.flush();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
