// src/teardown.rs

//! Records what the bootstrap acquired and releases it in reverse.

use crate::backends::{ColormapId, Driver, WindowId};
use crate::connection;
use log::{debug, info};
use std::fmt;

/// A resource the ledger knows how to release.
pub enum Resource<B: Driver> {
    Connection,
    Visual(B::Visual),
    Context(B::Context),
    Colormap(ColormapId),
    Window(WindowId),
    /// The context is current on the calling thread.
    Current,
}

// Written by hand so the driver type itself need not be `Debug`.
impl<B: Driver> fmt::Debug for Resource<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Connection => f.write_str("Connection"),
            Resource::Visual(visual) => write!(f, "Visual({:?})", visual),
            Resource::Context(context) => write!(f, "Context({:?})", context),
            Resource::Colormap(colormap) => write!(f, "Colormap({})", colormap.0),
            Resource::Window(window) => write!(f, "Window({})", window.0),
            Resource::Current => f.write_str("Current"),
        }
    }
}

/// Stack of acquired resources.
///
/// Resources are pushed as they are acquired and popped by `release_all`, so
/// release order is always the reverse of acquisition and nothing that was
/// never acquired is ever released. After `release_all` the ledger is empty
/// and a second call does nothing.
pub struct ResourceLedger<B: Driver> {
    acquired: Vec<Resource<B>>,
}

impl<B: Driver> ResourceLedger<B> {
    pub fn new() -> Self {
        Self {
            acquired: Vec::new(),
        }
    }

    pub fn record(&mut self, resource: Resource<B>) {
        debug!("Acquired {:?}", resource);
        self.acquired.push(resource);
    }

    pub fn len(&self) -> usize {
        self.acquired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquired.is_empty()
    }

    pub fn holds_connection(&self) -> bool {
        self.acquired
            .iter()
            .any(|r| matches!(r, Resource::Connection))
    }

    /// Releases everything, newest first. Returns how many resources were released.
    pub fn release_all(&mut self, driver: &mut B) -> usize {
        if self.acquired.is_empty() {
            return 0;
        }
        info!("Releasing {} resource(s)", self.acquired.len());
        let mut released = 0;
        while let Some(resource) = self.acquired.pop() {
            release(driver, resource);
            released += 1;
        }
        released
    }
}

impl<B: Driver> Default for ResourceLedger<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn release<B: Driver>(driver: &mut B, resource: Resource<B>) {
    debug!("Releasing {:?}", resource);
    match resource {
        Resource::Current => driver.release_current(),
        Resource::Window(window) => driver.destroy_window(window),
        Resource::Colormap(colormap) => driver.free_colormap(colormap),
        Resource::Context(context) => driver.destroy_context(context),
        Resource::Visual(visual) => driver.free_visual(visual),
        Resource::Connection => connection::close(driver),
    }
}
