// src/diagnostics.rs

//! User-facing status lines.
//!
//! Bootstrap code only needs to emit a single human-readable line per outcome;
//! where that line ends up is the job of a `Diagnostics` implementation.

use log::warn;
use std::io::{self, Write};

/// Sink for one-line status and error messages.
pub trait Diagnostics {
    fn emit(&mut self, line: &str);
}

/// Writes diagnostic lines to standard output.
#[derive(Debug, Default)]
pub struct StdoutDiagnostics;

impl Diagnostics for StdoutDiagnostics {
    fn emit(&mut self, line: &str) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = writeln!(handle, "{}", line).and_then(|_| handle.flush()) {
            warn!("Failed to write diagnostic line: {}", e);
        }
    }
}

/// Keeps every emitted line in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    pub lines: Vec<String>,
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
