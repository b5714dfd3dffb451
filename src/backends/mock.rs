// src/backends/mock.rs

//! Scriptable in-memory `Driver` for tests.
//!
//! Every call is appended to `calls`, so tests can assert acquisition and
//! release order. Failure points are plain public fields flipped before the
//! driver is handed to the code under test.

use crate::backends::{
    Atom, ColormapId, Driver, Event, EventMask, VisualDescriptor, WindowGeometry, WindowId,
};
use crate::error::{BootstrapError, ProtocolError};
use std::collections::{HashMap, VecDeque};
use x11::glx;

/// Atom handed out for `WM_DELETE_WINDOW`.
pub const MOCK_DELETE_ATOM: Atom = Atom(301);
pub const MOCK_ROOT: WindowId = WindowId(1);
pub const MOCK_WINDOW: WindowId = WindowId(0x40_0001);
pub const MOCK_COLORMAP: ColormapId = ColormapId(0x40_0002);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFbConfig(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockVisual(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockContext(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    OpenDisplay,
    CloseDisplay,
    Sync,
    GlxVersion,
    GlxExtensions,
    ChooseVisual(Vec<i32>),
    ChooseFbConfigs(Vec<i32>),
    FbConfigAttrib(MockFbConfig, i32),
    VisualFromFbConfig(MockFbConfig),
    FreeVisual(MockVisual),
    CreateContext { direct: bool },
    LoadCreateContextAttribs(String),
    CreateContextAttribs(MockFbConfig, Vec<i32>),
    IsDirect(MockContext),
    MakeCurrent(WindowId, MockContext),
    ReleaseCurrent,
    DestroyContext(MockContext),
    RootWindow,
    CreateColormap(WindowId, MockVisual),
    FreeColormap(ColormapId),
    CreateWindow(WindowGeometry, EventMask),
    DestroyWindow(WindowId),
    SetTitle(String),
    RegisterCloseProtocol(WindowId),
    MapWindow(WindowId),
    WindowSize(WindowId),
    NextEvent,
    GlVersion,
    Viewport(u32, u32),
    Clear,
    DrawTriangle,
    SwapBuffers(WindowId),
}

#[derive(Debug)]
pub struct MockDriver {
    pub calls: Vec<Call>,
    pub open_fails: bool,
    pub glx_version: (i32, i32),
    pub extensions: String,
    pub legacy_visual_available: bool,
    /// Attributes of each candidate `glXChooseFBConfig` returns, in order.
    pub fb_configs: Vec<HashMap<i32, i32>>,
    pub visual_derivation_fails: bool,
    pub create_context_attribs_available: bool,
    pub context_creation_fails: bool,
    pub context_protocol_error: Option<ProtocolError>,
    pub direct: bool,
    pub window_creation_fails: bool,
    pub window_protocol_error: Option<ProtocolError>,
    pub make_current_fails: bool,
    pub gl_version: (i32, i32),
    pub window_size: (u32, u32),
    pub events: VecDeque<Event>,
    pending_error: Option<ProtocolError>,
    next_visual: u64,
}

/// Attributes of a candidate that satisfies the default framebuffer request.
pub fn matching_fb_config() -> HashMap<i32, i32> {
    HashMap::from([
        (glx::GLX_X_RENDERABLE, 1),
        (glx::GLX_DRAWABLE_TYPE, glx::GLX_WINDOW_BIT),
        (glx::GLX_RENDER_TYPE, glx::GLX_RGBA_BIT),
        (glx::GLX_X_VISUAL_TYPE, glx::GLX_TRUE_COLOR),
        (glx::GLX_RED_SIZE, 8),
        (glx::GLX_GREEN_SIZE, 8),
        (glx::GLX_BLUE_SIZE, 8),
        (glx::GLX_ALPHA_SIZE, 8),
        (glx::GLX_DEPTH_SIZE, 24),
        (glx::GLX_STENCIL_SIZE, 8),
        (glx::GLX_DOUBLEBUFFER, 1),
    ])
}

impl MockDriver {
    /// A healthy GLX 1.4 server with `GLX_ARB_create_context` and a GL 4.6
    /// direct context.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            open_fails: false,
            glx_version: (1, 4),
            extensions: "GLX_ARB_create_context GLX_ARB_create_context_profile GLX_EXT_swap_control"
                .to_string(),
            legacy_visual_available: true,
            fb_configs: vec![matching_fb_config()],
            visual_derivation_fails: false,
            create_context_attribs_available: true,
            context_creation_fails: false,
            context_protocol_error: None,
            direct: true,
            window_creation_fails: false,
            window_protocol_error: None,
            make_current_fails: false,
            gl_version: (4, 6),
            window_size: (600, 600),
            events: VecDeque::new(),
            pending_error: None,
            next_visual: 0x21,
        }
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Calls that acquire or release one of the tracked resources, in order.
    pub fn lifecycle(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::OpenDisplay
                        | Call::CloseDisplay
                        | Call::FreeVisual(_)
                        | Call::CreateContext { .. }
                        | Call::CreateContextAttribs(..)
                        | Call::DestroyContext(_)
                        | Call::CreateColormap(..)
                        | Call::FreeColormap(_)
                        | Call::CreateWindow(..)
                        | Call::DestroyWindow(_)
                        | Call::MakeCurrent(..)
                        | Call::ReleaseCurrent
                )
            })
            .cloned()
            .collect()
    }

    fn new_visual(&mut self) -> MockVisual {
        let visual = MockVisual(self.next_visual);
        self.next_visual += 1;
        visual
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for MockDriver {
    type FbConfig = MockFbConfig;
    type Visual = MockVisual;
    type Context = MockContext;

    fn open_display(&mut self) -> Result<(), BootstrapError> {
        if self.open_fails {
            return Err(BootstrapError::ConnectionError);
        }
        self.calls.push(Call::OpenDisplay);
        Ok(())
    }

    fn close_display(&mut self) {
        self.calls.push(Call::CloseDisplay);
    }

    fn sync(&mut self) -> Option<ProtocolError> {
        self.calls.push(Call::Sync);
        self.pending_error.take()
    }

    fn glx_version(&mut self) -> Option<(i32, i32)> {
        self.calls.push(Call::GlxVersion);
        Some(self.glx_version)
    }

    fn glx_extensions(&mut self) -> String {
        self.calls.push(Call::GlxExtensions);
        self.extensions.clone()
    }

    fn choose_visual(&mut self, attribs: &[i32]) -> Option<Self::Visual> {
        self.calls.push(Call::ChooseVisual(attribs.to_vec()));
        self.legacy_visual_available.then(|| self.new_visual())
    }

    fn choose_fb_configs(&mut self, attribs: &[i32]) -> Vec<Self::FbConfig> {
        self.calls.push(Call::ChooseFbConfigs(attribs.to_vec()));
        (0..self.fb_configs.len()).map(MockFbConfig).collect()
    }

    fn fb_config_attrib(&mut self, config: Self::FbConfig, attrib: i32) -> Option<i32> {
        self.calls.push(Call::FbConfigAttrib(config, attrib));
        self.fb_configs.get(config.0)?.get(&attrib).copied()
    }

    fn visual_from_fb_config(&mut self, config: Self::FbConfig) -> Option<Self::Visual> {
        self.calls.push(Call::VisualFromFbConfig(config));
        (!self.visual_derivation_fails).then(|| self.new_visual())
    }

    fn describe_visual(&self, visual: Self::Visual) -> VisualDescriptor {
        VisualDescriptor {
            visual_id: visual.0,
            depth: 24,
            class: 4, // TrueColor
        }
    }

    fn free_visual(&mut self, visual: Self::Visual) {
        self.calls.push(Call::FreeVisual(visual));
    }

    fn create_context(&mut self, _visual: Self::Visual, direct: bool) -> Option<Self::Context> {
        self.calls.push(Call::CreateContext { direct });
        (!self.context_creation_fails).then_some(MockContext(1))
    }

    fn load_create_context_attribs(&mut self, name: &str) -> bool {
        self.calls.push(Call::LoadCreateContextAttribs(name.to_string()));
        self.create_context_attribs_available
    }

    fn create_context_attribs(
        &mut self,
        config: Self::FbConfig,
        _direct: bool,
        attribs: &[i32],
    ) -> Option<Self::Context> {
        self.calls
            .push(Call::CreateContextAttribs(config, attribs.to_vec()));
        self.pending_error = self.context_protocol_error;
        (!self.context_creation_fails).then_some(MockContext(2))
    }

    fn is_direct(&mut self, context: Self::Context) -> bool {
        self.calls.push(Call::IsDirect(context));
        self.direct
    }

    fn make_current(&mut self, window: WindowId, context: Self::Context) -> bool {
        self.calls.push(Call::MakeCurrent(window, context));
        !self.make_current_fails
    }

    fn release_current(&mut self) {
        self.calls.push(Call::ReleaseCurrent);
    }

    fn destroy_context(&mut self, context: Self::Context) {
        self.calls.push(Call::DestroyContext(context));
    }

    fn root_window(&mut self) -> WindowId {
        self.calls.push(Call::RootWindow);
        MOCK_ROOT
    }

    fn create_colormap(&mut self, root: WindowId, visual: Self::Visual) -> ColormapId {
        self.calls.push(Call::CreateColormap(root, visual));
        MOCK_COLORMAP
    }

    fn free_colormap(&mut self, colormap: ColormapId) {
        self.calls.push(Call::FreeColormap(colormap));
    }

    fn create_window(
        &mut self,
        _parent: WindowId,
        geometry: WindowGeometry,
        _visual: Self::Visual,
        _colormap: ColormapId,
        mask: EventMask,
    ) -> Option<WindowId> {
        self.calls.push(Call::CreateWindow(geometry, mask));
        self.pending_error = self.window_protocol_error;
        (!self.window_creation_fails).then_some(MOCK_WINDOW)
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.calls.push(Call::DestroyWindow(window));
    }

    fn set_title(&mut self, _window: WindowId, title: &str) {
        self.calls.push(Call::SetTitle(title.to_string()));
    }

    fn register_close_protocol(&mut self, window: WindowId) -> Option<Atom> {
        self.calls.push(Call::RegisterCloseProtocol(window));
        Some(MOCK_DELETE_ATOM)
    }

    fn map_window(&mut self, window: WindowId) {
        self.calls.push(Call::MapWindow(window));
    }

    fn window_size(&mut self, window: WindowId) -> Option<(u32, u32)> {
        self.calls.push(Call::WindowSize(window));
        Some(self.window_size)
    }

    fn next_event(&mut self) -> Event {
        self.calls.push(Call::NextEvent);
        self.events
            .pop_front()
            .expect("render loop asked for more events than the test scripted")
    }

    fn gl_version(&mut self) -> (i32, i32) {
        self.calls.push(Call::GlVersion);
        self.gl_version
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn clear(&mut self, _color: [f32; 4]) {
        self.calls.push(Call::Clear);
    }

    fn draw_triangle(&mut self, _color: [f32; 3]) {
        self.calls.push(Call::DrawTriangle);
    }

    fn swap_buffers(&mut self, window: WindowId) {
        self.calls.push(Call::SwapBuffers(window));
    }
}
