pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod exec;
pub mod managers;
pub mod prefs;
pub mod services;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;

/// Run pkgsweep CLI entrypoint.
pub fn run_cli() {
    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.quiet);
    ui::set_verbose(args.global.verbose);

    if let Err(e) = cli::dispatcher::dispatch(&args) {
        ui::error(&format!("{}", e));
        exit(1);
    }
}
