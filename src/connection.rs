// src/connection.rs

//! Opening and closing the display connection.

use crate::backends::Driver;
use crate::error::BootstrapError;
use crate::teardown::{Resource, ResourceLedger};
use log::info;

/// Opens the display and records it as the first acquired resource.
pub fn open<B: Driver>(
    driver: &mut B,
    ledger: &mut ResourceLedger<B>,
) -> Result<(), BootstrapError> {
    driver.open_display()?;
    ledger.record(Resource::Connection);
    info!("X11 server connection established.");
    Ok(())
}

/// Closes the display. Called by the ledger as its last release.
pub fn close<B: Driver>(driver: &mut B) {
    driver.close_display();
    info!("X11 server connection closed.");
}
