// src/backends/x11/gl_functions.rs

//! GL entry points, resolved through `glXGetProcAddress` once a context is
//! current.
//!
//! The core-profile functions come from the `gl` crate. The handful of
//! fixed-function calls used to draw the legacy triangle are not part of the
//! core profile, so they are resolved separately and are simply absent on a
//! forward-compatible context.

use libc::c_void;
use log::{debug, warn};
use std::ffi::{CStr, CString};
use std::mem;
use std::ptr;
use x11::glx;

const GL_TRIANGLES: u32 = 0x0004;

type BeginFn = unsafe extern "C" fn(u32);
type EndFn = unsafe extern "C" fn();
type Color3fFn = unsafe extern "C" fn(f32, f32, f32);
type Vertex2fFn = unsafe extern "C" fn(f32, f32);

/// Looks up a GL or GLX function by name.
pub fn proc_address(name: &str) -> Option<unsafe extern "C" fn()> {
    let symbol = CString::new(name).ok()?;
    unsafe { glx::glXGetProcAddress(symbol.as_ptr() as *const u8) }
}

#[derive(Debug, Clone, Copy)]
struct FixedFunction {
    begin: BeginFn,
    end: EndFn,
    color3f: Color3fFn,
    vertex2f: Vertex2fFn,
}

impl FixedFunction {
    fn load() -> Option<Self> {
        // SAFETY: each pointer is reinterpreted as the signature the GL ABI
        // defines for that entry point.
        unsafe {
            Some(Self {
                begin: mem::transmute::<unsafe extern "C" fn(), BeginFn>(proc_address("glBegin")?),
                end: mem::transmute::<unsafe extern "C" fn(), EndFn>(proc_address("glEnd")?),
                color3f: mem::transmute::<unsafe extern "C" fn(), Color3fFn>(proc_address(
                    "glColor3f",
                )?),
                vertex2f: mem::transmute::<unsafe extern "C" fn(), Vertex2fFn>(proc_address(
                    "glVertex2f",
                )?),
            })
        }
    }
}

/// Loaded GL function table for the current context.
#[derive(Debug)]
pub struct GlFunctions {
    fixed_function: Option<FixedFunction>,
}

impl GlFunctions {
    /// Loads every entry point. Must be called with a context current.
    pub fn load() -> Self {
        gl::load_with(|symbol| match proc_address(symbol) {
            Some(f) => f as *const c_void,
            None => ptr::null(),
        });
        let fixed_function = FixedFunction::load();
        if fixed_function.is_none() {
            debug!("Fixed-function entry points unavailable; triangle drawing disabled.");
        }
        Self { fixed_function }
    }

    /// Version of the current context.
    ///
    /// `GL_MAJOR_VERSION`/`GL_MINOR_VERSION` only exist from GL 3.0, so older
    /// contexts fall back to parsing `GL_VERSION`.
    pub fn version(&self) -> (i32, i32) {
        let (mut major, mut minor) = (0, 0);
        unsafe {
            gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
            gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);
        }
        if major > 0 {
            return (major, minor);
        }
        let version = unsafe { gl::GetString(gl::VERSION) };
        if version.is_null() {
            warn!("glGetString(GL_VERSION) returned NULL.");
            return (0, 0);
        }
        let text = unsafe { CStr::from_ptr(version as *const libc::c_char) }.to_string_lossy();
        parse_version(&text).unwrap_or((0, 0))
    }

    pub fn viewport(&self, width: u32, height: u32) {
        unsafe { gl::Viewport(0, 0, width as i32, height as i32) };
    }

    pub fn clear(&self, color: [f32; 4]) {
        unsafe {
            gl::ClearColor(color[0], color[1], color[2], color[3]);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    /// Draws the fixed full-viewport triangle.
    pub fn draw_triangle(&self, color: [f32; 3]) {
        let Some(ff) = self.fixed_function else {
            warn!("draw_triangle requested but fixed-function GL is unavailable.");
            return;
        };
        unsafe {
            (ff.color3f)(color[0], color[1], color[2]);
            (ff.begin)(GL_TRIANGLES);
            (ff.vertex2f)(0.0, -1.0);
            (ff.vertex2f)(-1.0, 1.0);
            (ff.vertex2f)(1.0, 1.0);
            (ff.end)();
        }
    }
}

/// Parses the leading `major.minor` of a `GL_VERSION` string such as
/// `"2.1 Mesa 23.0.4"` or `"OpenGL ES 3.2"`.
pub fn parse_version(text: &str) -> Option<(i32, i32)> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut parts = text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty());
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
