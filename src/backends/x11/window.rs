// src/backends/x11/window.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

//! Colormap and window creation, WM protocol registration and queries.

use super::event::xlib_event_mask;
use crate::backends::{Atom, ColormapId, EventMask, WindowGeometry, WindowId};
use libc::{c_char, c_uint};
use log::{debug, info, warn};
use std::ffi::CString;
use std::mem;
use x11::xlib;

pub fn create_colormap(
    display: *mut xlib::Display,
    root: WindowId,
    visual: *mut xlib::XVisualInfo,
) -> ColormapId {
    // SAFETY: `visual` was returned by GLX for this display and is still live.
    let id = unsafe { xlib::XCreateColormap(display, root.0, (*visual).visual, xlib::AllocNone) };
    debug!("Colormap created (ID: {})", id);
    ColormapId(id)
}

/// Creates an InputOutput child of `parent` using the visual's depth.
///
/// Returns `None` if Xlib hands back window id 0. Asynchronous refusal is
/// detected by the caller's sync barrier.
pub fn create_window(
    display: *mut xlib::Display,
    parent: WindowId,
    geometry: WindowGeometry,
    visual: *mut xlib::XVisualInfo,
    colormap: ColormapId,
    mask: EventMask,
) -> Option<WindowId> {
    info!(
        "Creating X11 window: {}x{}px at ({}, {})",
        geometry.width, geometry.height, geometry.x, geometry.y
    );
    // SAFETY: display and visual are live; attributes is fully initialised
    // for the fields named in the value mask.
    let window_id = unsafe {
        let mut attributes: xlib::XSetWindowAttributes = mem::zeroed();
        attributes.colormap = colormap.0;
        attributes.event_mask = xlib_event_mask(mask);

        xlib::XCreateWindow(
            display,
            parent.0,
            geometry.x,
            geometry.y,
            geometry.width as c_uint,
            geometry.height as c_uint,
            geometry.border_width as c_uint,
            (*visual).depth,
            xlib::InputOutput as c_uint,
            (*visual).visual,
            xlib::CWColormap | xlib::CWEventMask,
            &mut attributes,
        )
    };

    if window_id == 0 {
        return None;
    }
    debug!("X window created (ID: {})", window_id);
    Some(WindowId(window_id))
}

pub fn set_title(display: *mut xlib::Display, window: WindowId, title: &str) {
    match CString::new(title) {
        Ok(title_cstr) => unsafe {
            xlib::XStoreName(display, window.0, title_cstr.as_ptr() as *mut c_char);
        },
        Err(e) => warn!("Window title {:?} not set: {}", title, e),
    }
}

/// Interns `WM_DELETE_WINDOW` and lists it in the window's `WM_PROTOCOLS`.
pub fn register_close_protocol(display: *mut xlib::Display, window: WindowId) -> Option<Atom> {
    // SAFETY: display and window are live.
    unsafe {
        let mut wm_delete_window = xlib::XInternAtom(
            display,
            b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char,
            xlib::False,
        );
        if wm_delete_window == 0 {
            warn!("Failed to intern WM_DELETE_WINDOW. Window close events will not be received.");
            return None;
        }
        let status = xlib::XSetWMProtocols(display, window.0, &mut wm_delete_window, 1);
        if status == 0 {
            warn!("XSetWMProtocols failed for window {}.", window.0);
            return None;
        }
        debug!("WM_PROTOCOLS (WM_DELETE_WINDOW = {}) registered.", wm_delete_window);
        Some(Atom(wm_delete_window))
    }
}

pub fn size(display: *mut xlib::Display, window: WindowId) -> Option<(u32, u32)> {
    // SAFETY: display and window are live; attrs is written by Xlib on success.
    unsafe {
        let mut attrs: xlib::XWindowAttributes = mem::zeroed();
        if xlib::XGetWindowAttributes(display, window.0, &mut attrs) == 0 {
            warn!("XGetWindowAttributes failed for window {}.", window.0);
            return None;
        }
        Some((attrs.width.max(0) as u32, attrs.height.max(0) as u32))
    }
}
