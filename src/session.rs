// src/session.rs

//! The bootstrap sequence and the state it produces.
//!
//! `Session` holds the driver, the ledger of acquired resources and the
//! surface; it is passed to the render loop and then torn down. Acquisition
//! order is:
//!
//! connection → visual/config → context (created, checked direct) →
//! colormap → window → context current (version checked) → window mapped
//!
//! and teardown is the ledger popping that list in reverse.

use crate::backends::Driver;
use crate::config::{Config, RenderConfig};
use crate::connection;
use crate::context;
use crate::error::BootstrapError;
use crate::render_loop::Dispatcher;
use crate::strategy::{self, Variant};
use crate::surface::{self, Surface};
use crate::teardown::{Resource, ResourceLedger};
use log::{error, info, warn};

pub struct Session<B: Driver> {
    driver: B,
    ledger: ResourceLedger<B>,
    variant: Option<Variant>,
    surface: Option<Surface>,
}

impl<B: Driver> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("variant", &self.variant)
            .field("surface", &self.surface)
            .field("held", &self.ledger.len())
            .finish()
    }
}

/// A bootstrap that stopped at `error`. The session has already released
/// everything it had acquired.
pub struct BootstrapFailure<B: Driver> {
    pub error: BootstrapError,
    pub session: Session<B>,
}

impl<B: Driver> std::fmt::Debug for BootstrapFailure<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapFailure")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<B: Driver> Session<B> {
    /// Runs the whole bootstrap. On failure every resource acquired so far is
    /// released, newest first, before this returns.
    pub fn bootstrap(driver: B, config: &Config) -> Result<Self, BootstrapFailure<B>> {
        let mut session = Session {
            driver,
            ledger: ResourceLedger::new(),
            variant: None,
            surface: None,
        };
        match session.acquire(config) {
            Ok(()) => Ok(session),
            Err(error) => {
                error!("Bootstrap failed: {}", error);
                session.teardown();
                Err(BootstrapFailure { error, session })
            }
        }
    }

    fn acquire(&mut self, config: &Config) -> Result<(), BootstrapError> {
        let driver = &mut self.driver;
        let ledger = &mut self.ledger;

        connection::open(driver, ledger)?;

        let strategy = strategy::select(driver, config);
        let configuration = strategy.negotiate(driver)?;
        ledger.record(Resource::Visual(configuration.visual));

        let gl_context = strategy.create_context(driver, &configuration)?;
        ledger.record(Resource::Context(gl_context));
        context::ensure_direct(driver, gl_context)?;

        let surface = surface::create(
            driver,
            ledger,
            configuration.visual,
            &config.window,
            strategy.event_mask(),
        )?;

        if !driver.make_current(surface.window, gl_context) {
            return Err(BootstrapError::MakeCurrentFailed);
        }
        ledger.record(Resource::Current);
        strategy.verify_api_version(driver)?;

        surface::show(driver, &surface);

        self.variant = Some(strategy.variant());
        self.surface = Some(surface);
        info!("Bootstrap complete ({} resources held)", self.ledger.len());
        Ok(())
    }

    /// Runs the render loop until the window is closed. Returns the number of
    /// frames presented.
    pub fn run(&mut self, render: &RenderConfig) -> u64 {
        let (Some(variant), Some(surface)) = (self.variant, self.surface) else {
            warn!("run called on a session that did not finish bootstrapping");
            return 0;
        };
        let mut dispatcher = Dispatcher::new(variant, surface.window, surface.close_token, *render);
        dispatcher.run(&mut self.driver)
    }

    /// Releases every held resource in reverse acquisition order. Safe to
    /// call repeatedly; returns how many resources this call released.
    pub fn teardown(&mut self) -> usize {
        self.surface = None;
        self.ledger.release_all(&mut self.driver)
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn driver(&self) -> &B {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut B {
        &mut self.driver
    }
}

impl<B: Driver> Drop for Session<B> {
    fn drop(&mut self) {
        if !self.ledger.is_empty() {
            warn!("Session dropped with resources still held; tearing down.");
            self.teardown();
        }
    }
}
