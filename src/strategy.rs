// src/strategy.rs

//! The two bootstrap paths behind one interface, and the probe that picks
//! between them.

use crate::backends::{Driver, EventMask};
use crate::config::{Config, ContextConfig, FramebufferConfig, StrategyPreference};
use crate::context;
use crate::error::BootstrapError;
use crate::negotiator::{self, Configuration};
use log::{debug, info};

/// Extension whose presence selects the modern path under `auto`.
pub const CREATE_CONTEXT_EXTENSION: &str = "GLX_ARB_create_context";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `glXChooseVisual` + `glXCreateContext`; draws on expose, closes on any key.
    Legacy,
    /// `glXChooseFBConfig` + `glXCreateContextAttribsARB`; clears and swaps
    /// every iteration, closes only through `WM_DELETE_WINDOW`.
    Modern,
}

/// One way of negotiating a configuration and creating a context for it.
pub trait BootstrapStrategy<B: Driver> {
    fn variant(&self) -> Variant;

    fn negotiate(&self, driver: &mut B) -> Result<Configuration<B>, BootstrapError>;

    /// Creates the context. The returned context is not yet validated.
    fn create_context(
        &self,
        driver: &mut B,
        config: &Configuration<B>,
    ) -> Result<B::Context, BootstrapError>;

    /// Events the window must select for this variant's loop.
    fn event_mask(&self) -> EventMask;

    /// Checks the version of the now-current context.
    fn verify_api_version(&self, driver: &mut B) -> Result<(), BootstrapError>;
}

#[derive(Debug, Clone)]
pub struct LegacyStrategy {
    pub framebuffer: FramebufferConfig,
}

impl<B: Driver> BootstrapStrategy<B> for LegacyStrategy {
    fn variant(&self) -> Variant {
        Variant::Legacy
    }

    fn negotiate(&self, driver: &mut B) -> Result<Configuration<B>, BootstrapError> {
        negotiator::negotiate_legacy(driver, &self.framebuffer)
    }

    fn create_context(
        &self,
        driver: &mut B,
        config: &Configuration<B>,
    ) -> Result<B::Context, BootstrapError> {
        context::create_legacy(driver, config)
    }

    fn event_mask(&self) -> EventMask {
        EventMask::EXPOSURE | EventMask::KEY_PRESS
    }

    fn verify_api_version(&self, driver: &mut B) -> Result<(), BootstrapError> {
        // Whatever the driver granted is accepted.
        let (major, minor) = driver.gl_version();
        info!("Legacy context reports GL {}.{}", major, minor);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ModernStrategy {
    pub framebuffer: FramebufferConfig,
    pub context: ContextConfig,
}

impl ModernStrategy {
    fn min_glx(&self) -> (i32, i32) {
        (self.context.min_glx_major, self.context.min_glx_minor)
    }
}

impl<B: Driver> BootstrapStrategy<B> for ModernStrategy {
    fn variant(&self) -> Variant {
        Variant::Modern
    }

    fn negotiate(&self, driver: &mut B) -> Result<Configuration<B>, BootstrapError> {
        negotiator::negotiate_modern(driver, &self.framebuffer, self.min_glx())
    }

    fn create_context(
        &self,
        driver: &mut B,
        config: &Configuration<B>,
    ) -> Result<B::Context, BootstrapError> {
        context::create_modern(driver, config, &self.context)
    }

    fn event_mask(&self) -> EventMask {
        EventMask::EXPOSURE | EventMask::KEY_PRESS | EventMask::STRUCTURE_NOTIFY
    }

    fn verify_api_version(&self, driver: &mut B) -> Result<(), BootstrapError> {
        let found = driver.gl_version();
        info!("Context reports GL {}.{}", found.0, found.1);
        context::check_api_version(found, (self.context.major, self.context.minor))
    }
}

/// Picks the strategy for `config.strategy`, probing the server under `auto`.
///
/// Must be called with the display open.
pub fn select<B: Driver>(driver: &mut B, config: &Config) -> Box<dyn BootstrapStrategy<B>> {
    let variant = match config.strategy {
        StrategyPreference::Legacy => Variant::Legacy,
        StrategyPreference::Modern => Variant::Modern,
        StrategyPreference::Auto => probe(driver, &config.context),
    };
    info!("Using {:?} bootstrap strategy", variant);
    match variant {
        Variant::Legacy => Box::new(LegacyStrategy {
            framebuffer: config.framebuffer,
        }),
        Variant::Modern => Box::new(ModernStrategy {
            framebuffer: config.framebuffer,
            context: config.context,
        }),
    }
}

/// Modern if the server is at least the configured GLX floor and advertises
/// `GLX_ARB_create_context`; legacy otherwise.
pub fn probe<B: Driver>(driver: &mut B, context: &ContextConfig) -> Variant {
    let version = driver.glx_version().unwrap_or((0, 0));
    let floor = (context.min_glx_major, context.min_glx_minor);
    if version < floor {
        debug!("GLX {}.{} below {}.{}; probing selects legacy", version.0, version.1, floor.0, floor.1);
        return Variant::Legacy;
    }
    let extensions = driver.glx_extensions();
    if extensions
        .split_whitespace()
        .any(|ext| ext == CREATE_CONTEXT_EXTENSION)
    {
        Variant::Modern
    } else {
        debug!("{} not advertised; probing selects legacy", CREATE_CONTEXT_EXTENSION);
        Variant::Legacy
    }
}
