pub mod admin;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod routes;
pub mod shared;
pub mod traces;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{run_cli, Cli};
use crate::shared::paths::get_log_dir;

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Logging first; the guards must outlive the runtime
    let log_dir = get_log_dir();
    let _logging_guards = match crate::core::logging::init_logging(&log_dir) {
        Ok(guards) => Some(guards),
        Err(e) => {
            eprintln!("[catalog-admin] logging disabled: {}", e);
            None
        }
    };
    // dropped after the runtime; flushes pending trace entries
    let _traces_guard = traces::init_tracing(&log_dir);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(target: "system", "{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
