// src/backends/mod.rs

//! Defines the `Driver` trait that separates the bootstrap and render loop
//! from the windowing system, plus the small value types that cross it
//! (`Event`, `EventMask`, window/colormap/atom ids, `VisualDescriptor`).
//!
//! The production implementation is `x11::XDriver` (Xlib + GLX). Tests use
//! `mock::MockDriver`, which records every call so ordering can be asserted.

use crate::error::{BootstrapError, ProtocolError};
use bitflags::bitflags;
use std::fmt::Debug;

pub mod x11;

#[cfg(test)]
pub mod mock;

/// X window id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// X colormap id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColormapId(pub u64);

/// Interned X atom. Used as the opaque close-protocol token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u64);

bitflags! {
    /// Events the window asks the server to deliver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u32 {
        const EXPOSURE = 1 << 0;
        const KEY_PRESS = 1 << 1;
        const STRUCTURE_NOTIFY = 1 << 2;
    }
}

/// Events the render loop knows about. Everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Part of the window needs redrawing. `count` is the number of expose
    /// events still queued behind this one.
    Expose { count: i32 },
    /// A client message; `data0` is the first 32-bit slot, which carries the
    /// protocol atom for `WM_PROTOCOLS` messages.
    ClientMessage { data0: u64 },
    KeyPress { keycode: u32 },
    /// Window geometry changed.
    ConfigureNotify { width: u32, height: u32 },
    /// Any other X event type.
    Other(i32),
}

/// What the surface manager needs to know about a chosen visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualDescriptor {
    pub visual_id: u64,
    pub depth: i32,
    pub class: i32,
}

/// Placement and decoration of the single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
}

/// The windowing system plus GL entry points, as used by the bootstrap and the
/// render loop.
///
/// Handles for framebuffer configurations, visuals and contexts are associated
/// types so each driver can keep its native representation. Window-level
/// resources are plain ids.
///
/// Acquire-style methods report failure through `Option`/`bool`; the caller
/// decides which `BootstrapError` that failure means. Release-style methods
/// are infallible and must only be called for resources previously acquired.
pub trait Driver {
    type FbConfig: Copy + Debug;
    type Visual: Copy + Debug;
    type Context: Copy + Debug;

    // --- Connection ---

    /// Opens the display given by the environment.
    fn open_display(&mut self) -> Result<(), BootstrapError>;
    fn close_display(&mut self);
    /// Round-trips to the server and returns the first protocol error recorded
    /// since the previous call, if any.
    fn sync(&mut self) -> Option<ProtocolError>;

    // --- GLX capability queries ---

    fn glx_version(&mut self) -> Option<(i32, i32)>;
    fn glx_extensions(&mut self) -> String;

    // --- Configuration ---

    /// `glXChooseVisual` with a `None`-terminated attribute list.
    fn choose_visual(&mut self, attribs: &[i32]) -> Option<Self::Visual>;
    /// `glXChooseFBConfig` with a `None`-terminated attribute list. The
    /// returned list is in server preference order.
    fn choose_fb_configs(&mut self, attribs: &[i32]) -> Vec<Self::FbConfig>;
    fn fb_config_attrib(&mut self, config: Self::FbConfig, attrib: i32) -> Option<i32>;
    fn visual_from_fb_config(&mut self, config: Self::FbConfig) -> Option<Self::Visual>;
    fn describe_visual(&self, visual: Self::Visual) -> VisualDescriptor;
    fn free_visual(&mut self, visual: Self::Visual);

    // --- Context ---

    fn create_context(&mut self, visual: Self::Visual, direct: bool) -> Option<Self::Context>;
    /// Resolves `name` through `glXGetProcAddress` and keeps it for
    /// `create_context_attribs`. Returns false if it cannot be resolved.
    fn load_create_context_attribs(&mut self, name: &str) -> bool;
    fn create_context_attribs(
        &mut self,
        config: Self::FbConfig,
        direct: bool,
        attribs: &[i32],
    ) -> Option<Self::Context>;
    fn is_direct(&mut self, context: Self::Context) -> bool;
    fn make_current(&mut self, window: WindowId, context: Self::Context) -> bool;
    fn release_current(&mut self);
    fn destroy_context(&mut self, context: Self::Context);

    // --- Surface ---

    fn root_window(&mut self) -> WindowId;
    fn create_colormap(&mut self, root: WindowId, visual: Self::Visual) -> ColormapId;
    fn free_colormap(&mut self, colormap: ColormapId);
    fn create_window(
        &mut self,
        parent: WindowId,
        geometry: WindowGeometry,
        visual: Self::Visual,
        colormap: ColormapId,
        mask: EventMask,
    ) -> Option<WindowId>;
    fn destroy_window(&mut self, window: WindowId);
    fn set_title(&mut self, window: WindowId, title: &str);
    /// Advertises `WM_DELETE_WINDOW` on `window` and returns its atom.
    fn register_close_protocol(&mut self, window: WindowId) -> Option<Atom>;
    fn map_window(&mut self, window: WindowId);
    fn window_size(&mut self, window: WindowId) -> Option<(u32, u32)>;

    // --- Events ---

    /// Blocks until the server delivers the next event.
    fn next_event(&mut self) -> Event;

    // --- Rendering (valid only while a context is current) ---

    fn gl_version(&mut self) -> (i32, i32);
    fn viewport(&mut self, width: u32, height: u32);
    fn clear(&mut self, color: [f32; 4]);
    fn draw_triangle(&mut self, color: [f32; 3]);
    fn swap_buffers(&mut self, window: WindowId);
}
