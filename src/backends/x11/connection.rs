// src/backends/x11/connection.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

//! Owns the Xlib `Display` pointer and the process-wide X error handler.

use crate::error::{BootstrapError, ProtocolError};
use libc::c_int;
use log::{debug, info, warn};
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use x11::xlib;

// Xlib reports protocol errors through a process-global callback, so the first
// error seen since the last `take_protocol_error` is parked here.
static X_ERROR_PENDING: AtomicBool = AtomicBool::new(false);
static X_ERROR_CODES: AtomicU32 = AtomicU32::new(0);

/// Records the error instead of letting Xlib's default handler exit the process.
unsafe extern "C" fn x_error_handler(
    _display: *mut xlib::Display,
    event: *mut xlib::XErrorEvent,
) -> c_int {
    if !event.is_null() {
        let (error_code, request_code, minor_code) =
            unsafe { ((*event).error_code, (*event).request_code, (*event).minor_code) };
        // Keep the first error; later ones are usually fallout from it.
        if !X_ERROR_PENDING.swap(true, Ordering::AcqRel) {
            let packed = (error_code as u32) << 16 | (request_code as u32) << 8 | minor_code as u32;
            X_ERROR_CODES.store(packed, Ordering::Release);
        }
        warn!(
            "X protocol error: code={}, request={}, minor={}",
            error_code, request_code, minor_code
        );
    }
    0
}

/// Returns and clears the pending protocol error, if any.
pub fn take_protocol_error() -> Option<ProtocolError> {
    if X_ERROR_PENDING.swap(false, Ordering::AcqRel) {
        let packed = X_ERROR_CODES.load(Ordering::Acquire);
        Some(ProtocolError {
            error_code: (packed >> 16) as u8,
            request_code: (packed >> 8) as u8,
            minor_code: packed as u8,
        })
    } else {
        None
    }
}

/// An Xlib display connection.
///
/// `close` releases it and nulls the pointer so a second call, or the `Drop`
/// fallback, does nothing.
#[derive(Debug)]
pub struct Display {
    ptr: *mut xlib::Display,
}

impl Display {
    /// A handle that has not been opened yet.
    pub fn unopened() -> Self {
        Self {
            ptr: ptr::null_mut(),
        }
    }

    /// Opens the display named by `DISPLAY` and installs the error handler.
    pub fn open() -> Result<Self, BootstrapError> {
        // Passing NULL makes Xlib use the DISPLAY environment variable.
        let display_ptr = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display_ptr.is_null() {
            return Err(BootstrapError::ConnectionError);
        }
        debug!("X display opened successfully: {:p}", display_ptr);
        unsafe {
            xlib::XSetErrorHandler(Some(x_error_handler));
        }
        Ok(Self { ptr: display_ptr })
    }

    #[inline]
    pub fn raw(&self) -> *mut xlib::Display {
        self.ptr
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        !self.ptr.is_null()
    }

    /// Default screen number. Only valid while open.
    pub fn screen(&self) -> c_int {
        unsafe { xlib::XDefaultScreen(self.ptr) }
    }

    /// `XSync` without discarding events, then report any error it surfaced.
    pub fn sync(&self) -> Option<ProtocolError> {
        if self.ptr.is_null() {
            warn!("sync called on a closed X display.");
            return None;
        }
        unsafe {
            xlib::XSync(self.ptr, xlib::False);
        }
        take_protocol_error()
    }

    /// Closes the connection. Idempotent.
    pub fn close(&mut self) {
        if self.ptr.is_null() {
            info!("X11 display connection already closed or was never opened. Close skipped.");
            return;
        }
        info!("Closing X11 display connection: {:p}", self.ptr);
        unsafe {
            xlib::XCloseDisplay(self.ptr);
        }
        self.ptr = ptr::null_mut();
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            warn!("Display dropped while still open; closing it now.");
            self.close();
        }
    }
}
