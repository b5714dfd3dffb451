// src/backends/x11/event.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

use crate::backends::{Event, EventMask};
use libc::c_long;
use log::trace;
use std::mem;
use x11::xlib;

/// Blocks in `XNextEvent` and translates the result.
pub fn next_event(display: *mut xlib::Display) -> Event {
    let mut xevent: xlib::XEvent = unsafe { mem::zeroed() };
    // SAFETY: `display` is an open connection and `xevent` is a valid,
    // zero-initialised buffer for XNextEvent to fill.
    unsafe { xlib::XNextEvent(display, &mut xevent) };
    translate(&xevent)
}

/// Maps an Xlib event onto the loop's `Event`.
pub fn translate(xevent: &xlib::XEvent) -> Event {
    // SAFETY: `type_` is the discriminant shared by every XEvent variant, and
    // each arm only reads the union member that matches it.
    let event_type = unsafe { xevent.type_ };
    match event_type {
        xlib::Expose => {
            let expose = unsafe { xevent.expose };
            trace!(
                "XEvent: Expose (x:{}, y:{}, w:{}, h:{}, count:{})",
                expose.x,
                expose.y,
                expose.width,
                expose.height,
                expose.count
            );
            Event::Expose {
                count: expose.count,
            }
        }
        xlib::ClientMessage => {
            let message = unsafe { xevent.client_message };
            let data0 = message.data.get_long(0) as u64;
            trace!("XEvent: ClientMessage (data[0]: {})", data0);
            Event::ClientMessage { data0 }
        }
        xlib::KeyPress => {
            let key = unsafe { xevent.key };
            trace!("XEvent: KeyPress (keycode: {})", key.keycode);
            Event::KeyPress {
                keycode: key.keycode,
            }
        }
        xlib::ConfigureNotify => {
            let configure = unsafe { xevent.configure };
            trace!(
                "XEvent: ConfigureNotify ({}x{})",
                configure.width,
                configure.height
            );
            Event::ConfigureNotify {
                width: configure.width.max(0) as u32,
                height: configure.height.max(0) as u32,
            }
        }
        other => {
            trace!("XEvent: unhandled type {}", other);
            Event::Other(other)
        }
    }
}

/// Xlib event mask bits for an `EventMask`.
pub fn xlib_event_mask(mask: EventMask) -> c_long {
    let mut bits = xlib::NoEventMask;
    if mask.contains(EventMask::EXPOSURE) {
        bits |= xlib::ExposureMask;
    }
    if mask.contains(EventMask::KEY_PRESS) {
        bits |= xlib::KeyPressMask;
    }
    if mask.contains(EventMask::STRUCTURE_NOTIFY) {
        bits |= xlib::StructureNotifyMask;
    }
    bits
}
