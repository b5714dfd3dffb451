// src/surface.rs

//! Colormap and window for the negotiated visual.

use crate::backends::{Atom, ColormapId, Driver, EventMask, WindowGeometry, WindowId};
use crate::config::WindowConfig;
use crate::error::BootstrapError;
use crate::teardown::{Resource, ResourceLedger};
use log::{info, warn};

/// The window the context renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub window: WindowId,
    pub colormap: ColormapId,
    /// `WM_DELETE_WINDOW`, compared against incoming client messages. `None`
    /// if the window manager protocol could not be registered.
    pub close_token: Option<Atom>,
}

pub fn geometry(config: &WindowConfig) -> WindowGeometry {
    WindowGeometry {
        x: config.x,
        y: config.y,
        width: config.width,
        height: config.height,
        border_width: 0,
    }
}

/// Creates the colormap and the (unmapped) window, sets the title and
/// registers the close protocol. Both resources are recorded in `ledger` as
/// soon as they exist.
pub fn create<B: Driver>(
    driver: &mut B,
    ledger: &mut ResourceLedger<B>,
    visual: B::Visual,
    config: &WindowConfig,
    mask: EventMask,
) -> Result<Surface, BootstrapError> {
    let root = driver.root_window();
    let colormap = driver.create_colormap(root, visual);
    ledger.record(Resource::Colormap(colormap));

    let window = driver
        .create_window(root, geometry(config), visual, colormap, mask)
        .ok_or(BootstrapError::WindowCreationFailed(None))?;
    // A refused XCreateWindow still hands back an id; the error only shows up
    // after a round-trip. Such an id names no server resource.
    if let Some(protocol_error) = driver.sync() {
        return Err(BootstrapError::WindowCreationFailed(Some(protocol_error)));
    }
    ledger.record(Resource::Window(window));

    driver.set_title(window, &config.title);

    let close_token = driver.register_close_protocol(window);
    if close_token.is_none() {
        warn!("Close protocol not registered; the window manager cannot ask this window to close.");
    }

    info!(
        "Surface ready: window {} ({}x{}), colormap {}",
        window.0, config.width, config.height, colormap.0
    );
    Ok(Surface {
        window,
        colormap,
        close_token,
    })
}

/// Maps the window. Called only once the context is known to be usable.
pub fn show<B: Driver>(driver: &mut B, surface: &Surface) {
    driver.map_window(surface.window);
    info!("Window {} mapped", surface.window.0);
}
