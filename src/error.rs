// src/error.rs

//! Error taxonomy for the surface bootstrap.
//!
//! Every variant is fatal: none are retried, each is reported once through the
//! diagnostic channel, and the process exits with code 1 after the session has
//! released whatever it had acquired.

use thiserror::Error;

/// A fatal condition raised while bringing up the display, configuration,
/// context or window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("failed to open X display (check DISPLAY or X server status)")]
    ConnectionError,

    #[error("no GLX visual matches the requested attributes")]
    NoMatchingVisual,

    #[error("no GLX framebuffer configuration matches the requested attributes")]
    NoMatchingConfig,

    #[error("GLX {found_major}.{found_minor} is too old, {required_major}.{required_minor} or newer is required")]
    UnsupportedServiceVersion {
        found_major: i32,
        found_minor: i32,
        required_major: i32,
        required_minor: i32,
    },

    #[error("could not derive an X visual from the chosen framebuffer configuration")]
    VisualDerivationFailed,

    #[error("extension entry point {0} is unavailable")]
    ExtensionUnavailable(&'static str),

    #[error("GL context creation failed{}", .0.map(|e| format!(" (X error {})", e.error_code)).unwrap_or_default())]
    ContextCreationFailed(Option<ProtocolError>),

    #[error("GL context is not direct (no hardware rendering)")]
    IndirectContext,

    #[error("X server refused to create the window{}", .0.map(|e| format!(" (X error {})", e.error_code)).unwrap_or_default())]
    WindowCreationFailed(Option<ProtocolError>),

    #[error("failed to make the GL context current")]
    MakeCurrentFailed,

    #[error("GL {found_major}.{found_minor} is below the required {required_major}.{required_minor}")]
    UnsupportedApiVersion {
        found_major: i32,
        found_minor: i32,
        required_major: i32,
        required_minor: i32,
    },
}

/// An asynchronous X protocol error observed at a synchronisation barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolError {
    pub error_code: u8,
    pub request_code: u8,
    pub minor_code: u8,
}

impl BootstrapError {
    /// Process exit status for this failure. All bootstrap failures share one.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
