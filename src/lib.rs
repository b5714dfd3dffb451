//! GLX surface bootstrap.
//!
//! Opens an X display, negotiates a GLX framebuffer configuration, creates a
//! direct GL context, attaches it to a window and runs an event-driven redraw
//! loop until the window is closed. Every exit path releases exactly the
//! resources acquired, in reverse order.

pub mod app;
pub mod backends;
pub mod config;
pub mod connection;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod negotiator;
pub mod render_loop;
pub mod session;
pub mod strategy;
pub mod surface;
pub mod teardown;
