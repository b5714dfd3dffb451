// src/backends/x11.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

//! Xlib + GLX implementation of `Driver`.
//!
//! `XDriver` is a thin orchestrator over its submodules:
//! - `connection`: the display pointer and the X error handler.
//! - `window`: colormap/window creation and WM protocol registration.
//! - `event`: translation of `XEvent`s into `Event`s.
//! - `gl_functions`: GL entry points loaded through `glXGetProcAddress`.
//!
//! It owns no resource beyond the display itself; everything it creates is
//! handed back to the caller, who is responsible for releasing it.

use crate::backends::{
    Atom, ColormapId, Driver, Event, EventMask, VisualDescriptor, WindowGeometry, WindowId,
};
use crate::error::{BootstrapError, ProtocolError};
use libc::{c_char, c_int, c_void};
use log::{debug, info, warn};
use std::ffi::CStr;
use std::mem;
use std::ptr;
use x11::{glx, xlib};

pub mod connection;
pub mod event;
pub mod gl_functions;
pub mod window;

use self::connection::Display;
use self::gl_functions::GlFunctions;

/// `glXCreateContextAttribsARB`.
type CreateContextAttribsFn = unsafe extern "C" fn(
    *mut xlib::Display,
    glx::GLXFBConfig,
    glx::GLXContext,
    xlib::Bool,
    *const c_int,
) -> glx::GLXContext;

/// The production driver.
#[derive(Debug)]
pub struct XDriver {
    display: Display,
    screen: c_int,
    create_context_attribs: Option<CreateContextAttribsFn>,
    gl: Option<GlFunctions>,
}

impl XDriver {
    /// A driver with no connection yet; call `Driver::open_display` next.
    pub fn new() -> Self {
        Self {
            display: Display::unopened(),
            screen: 0,
            create_context_attribs: None,
            gl: None,
        }
    }

    #[inline]
    fn dpy(&self) -> *mut xlib::Display {
        self.display.raw()
    }

    fn gl(&self) -> Option<&GlFunctions> {
        if self.gl.is_none() {
            warn!("GL call issued with no current context.");
        }
        self.gl.as_ref()
    }
}

impl Default for XDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for XDriver {
    type FbConfig = glx::GLXFBConfig;
    type Visual = *mut xlib::XVisualInfo;
    type Context = glx::GLXContext;

    fn open_display(&mut self) -> Result<(), BootstrapError> {
        info!("Establishing X11 server connection.");
        self.display = Display::open()?;
        self.screen = self.display.screen();
        debug!("Default screen number: {}", self.screen);
        Ok(())
    }

    fn close_display(&mut self) {
        self.gl = None;
        self.create_context_attribs = None;
        self.display.close();
    }

    fn sync(&mut self) -> Option<ProtocolError> {
        self.display.sync()
    }

    fn glx_version(&mut self) -> Option<(i32, i32)> {
        let (mut major, mut minor) = (0, 0);
        let ok = unsafe { glx::glXQueryVersion(self.dpy(), &mut major, &mut minor) };
        if ok == 0 {
            warn!("glXQueryVersion failed.");
            return None;
        }
        Some((major, minor))
    }

    fn glx_extensions(&mut self) -> String {
        c_str_lossy(unsafe { glx::glXQueryExtensionsString(self.dpy(), self.screen) })
    }

    fn choose_visual(&mut self, attribs: &[i32]) -> Option<Self::Visual> {
        let mut attribs = attribs.to_vec();
        let visual =
            unsafe { glx::glXChooseVisual(self.dpy(), self.screen, attribs.as_mut_ptr()) };
        (!visual.is_null()).then_some(visual)
    }

    fn choose_fb_configs(&mut self, attribs: &[i32]) -> Vec<Self::FbConfig> {
        let mut count: c_int = 0;
        let configs = unsafe {
            glx::glXChooseFBConfig(self.dpy(), self.screen, attribs.as_ptr(), &mut count)
        };
        if configs.is_null() {
            return Vec::new();
        }
        // SAFETY: GLX returned `count` entries at `configs`. The configs
        // themselves belong to the display; only the array is freed here.
        let list = unsafe { std::slice::from_raw_parts(configs, count.max(0) as usize) }.to_vec();
        unsafe {
            xlib::XFree(configs as *mut c_void);
        }
        list
    }

    fn fb_config_attrib(&mut self, config: Self::FbConfig, attrib: i32) -> Option<i32> {
        let mut value = 0;
        let status = unsafe { glx::glXGetFBConfigAttrib(self.dpy(), config, attrib, &mut value) };
        (status == 0).then_some(value)
    }

    fn visual_from_fb_config(&mut self, config: Self::FbConfig) -> Option<Self::Visual> {
        let visual = unsafe { glx::glXGetVisualFromFBConfig(self.dpy(), config) };
        (!visual.is_null()).then_some(visual)
    }

    fn describe_visual(&self, visual: Self::Visual) -> VisualDescriptor {
        // SAFETY: visual came from GLX and has not been freed yet.
        unsafe {
            VisualDescriptor {
                visual_id: (*visual).visualid,
                depth: (*visual).depth,
                class: (*visual).class,
            }
        }
    }

    fn free_visual(&mut self, visual: Self::Visual) {
        unsafe {
            xlib::XFree(visual as *mut c_void);
        }
    }

    fn create_context(&mut self, visual: Self::Visual, direct: bool) -> Option<Self::Context> {
        let context = unsafe {
            glx::glXCreateContext(
                self.dpy(),
                visual,
                ptr::null_mut(),
                direct as xlib::Bool,
            )
        };
        (!context.is_null()).then_some(context)
    }

    fn load_create_context_attribs(&mut self, name: &str) -> bool {
        let Some(f) = gl_functions::proc_address(name) else {
            return false;
        };
        // SAFETY: `name` is glXCreateContextAttribsARB, whose ABI is
        // CreateContextAttribsFn.
        self.create_context_attribs =
            Some(unsafe { mem::transmute::<unsafe extern "C" fn(), CreateContextAttribsFn>(f) });
        true
    }

    fn create_context_attribs(
        &mut self,
        config: Self::FbConfig,
        direct: bool,
        attribs: &[i32],
    ) -> Option<Self::Context> {
        let Some(create) = self.create_context_attribs else {
            warn!("create_context_attribs called before the entry point was loaded.");
            return None;
        };
        let context = unsafe {
            create(
                self.dpy(),
                config,
                ptr::null_mut(),
                direct as xlib::Bool,
                attribs.as_ptr(),
            )
        };
        (!context.is_null()).then_some(context)
    }

    fn is_direct(&mut self, context: Self::Context) -> bool {
        unsafe { glx::glXIsDirect(self.dpy(), context) != 0 }
    }

    fn make_current(&mut self, window: WindowId, context: Self::Context) -> bool {
        let ok = unsafe { glx::glXMakeCurrent(self.dpy(), window.0, context) } != 0;
        if ok && self.gl.is_none() {
            self.gl = Some(GlFunctions::load());
        }
        ok
    }

    fn release_current(&mut self) {
        unsafe {
            glx::glXMakeCurrent(self.dpy(), 0, ptr::null_mut());
        }
        self.gl = None;
    }

    fn destroy_context(&mut self, context: Self::Context) {
        unsafe { glx::glXDestroyContext(self.dpy(), context) };
    }

    fn root_window(&mut self) -> WindowId {
        WindowId(unsafe { xlib::XRootWindow(self.dpy(), self.screen) })
    }

    fn create_colormap(&mut self, root: WindowId, visual: Self::Visual) -> ColormapId {
        window::create_colormap(self.dpy(), root, visual)
    }

    fn free_colormap(&mut self, colormap: ColormapId) {
        unsafe {
            xlib::XFreeColormap(self.dpy(), colormap.0);
        }
    }

    fn create_window(
        &mut self,
        parent: WindowId,
        geometry: WindowGeometry,
        visual: Self::Visual,
        colormap: ColormapId,
        mask: EventMask,
    ) -> Option<WindowId> {
        window::create_window(self.dpy(), parent, geometry, visual, colormap, mask)
    }

    fn destroy_window(&mut self, window: WindowId) {
        unsafe {
            xlib::XDestroyWindow(self.dpy(), window.0);
        }
    }

    fn set_title(&mut self, window: WindowId, title: &str) {
        window::set_title(self.dpy(), window, title);
    }

    fn register_close_protocol(&mut self, window: WindowId) -> Option<Atom> {
        window::register_close_protocol(self.dpy(), window)
    }

    fn map_window(&mut self, window: WindowId) {
        unsafe {
            xlib::XMapWindow(self.dpy(), window.0);
        }
    }

    fn window_size(&mut self, window: WindowId) -> Option<(u32, u32)> {
        window::size(self.dpy(), window)
    }

    fn next_event(&mut self) -> Event {
        event::next_event(self.dpy())
    }

    fn gl_version(&mut self) -> (i32, i32) {
        self.gl().map(GlFunctions::version).unwrap_or((0, 0))
    }

    fn viewport(&mut self, width: u32, height: u32) {
        if let Some(gl) = self.gl() {
            gl.viewport(width, height);
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        if let Some(gl) = self.gl() {
            gl.clear(color);
        }
    }

    fn draw_triangle(&mut self, color: [f32; 3]) {
        if let Some(gl) = self.gl() {
            gl.draw_triangle(color);
        }
    }

    fn swap_buffers(&mut self, window: WindowId) {
        unsafe { glx::glXSwapBuffers(self.dpy(), window.0) };
    }
}

/// Copies a GLX-owned C string, tolerating NULL and invalid UTF-8.
fn c_str_lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}
