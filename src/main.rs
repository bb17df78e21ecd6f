use clap::Parser;
use std::process::ExitCode;

use housepaint::cli::{self, CliArgs};
use housepaint::logger;
use housepaint::settings::AppSettings;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let settings = AppSettings::load();

    // Overwrites the previous run's log
    logger::init(&settings);
    housepaint::log_info!("Command: {:?}", args.command);

    cli::run(args, &settings)
}
