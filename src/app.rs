// src/app.rs

//! Top-level flow: bootstrap, loop, teardown, report.

use crate::backends::Driver;
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::session::Session;
use log::{error, info};

/// Exit status for a clean, user-initiated close.
pub const EXIT_SUCCESS: u8 = 0;

/// Runs the surface to completion and returns the process exit status.
///
/// Exactly one diagnostic line is emitted: the failure on a bootstrap error,
/// or the success message after a clean close.
pub fn run<B: Driver>(driver: B, config: &Config, diagnostics: &mut dyn Diagnostics) -> u8 {
    let mut session = match Session::bootstrap(driver, config) {
        Ok(session) => session,
        Err(failure) => {
            error!("Exiting after bootstrap failure: {}", failure.error);
            diagnostics.emit(&format!("glx-surface: {}", failure.error));
            return failure.error.exit_code();
        }
    };

    let frames = session.run(&config.render);
    let released = session.teardown();
    info!("Released {} resource(s) after {} frame(s)", released, frames);

    diagnostics.emit("glx-surface: window closed, exiting cleanly");
    EXIT_SUCCESS
}
