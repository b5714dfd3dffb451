// src/main.rs

use glx_surface::{
    app,
    backends::x11::XDriver,
    config::CONFIG,
    diagnostics::StdoutDiagnostics,
};
use log::info;
use std::process::ExitCode;

/// Main entry point for `glx-surface`.
fn main() -> ExitCode {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting glx-surface...");
    info!("Configuration: {:?}", *CONFIG);

    let mut diagnostics = StdoutDiagnostics;
    let status = app::run(XDriver::new(), &CONFIG, &mut diagnostics);

    info!("glx-surface exiting with status {}", status);
    ExitCode::from(status)
}
