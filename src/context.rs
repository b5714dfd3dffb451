// src/context.rs

//! GL context creation and validation.

use crate::backends::Driver;
use crate::config::ContextConfig;
use crate::error::BootstrapError;
use crate::negotiator::Configuration;
use log::{debug, error, info};

/// Entry point resolved at run time for the modern path.
pub const CREATE_CONTEXT_ATTRIBS: &str = "glXCreateContextAttribsARB";

// GLX_ARB_create_context tokens.
pub const GLX_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
pub const GLX_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
pub const GLX_CONTEXT_FLAGS_ARB: i32 = 0x2094;
pub const GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB: i32 = 0x0002;

/// Attribute list for `glXCreateContextAttribsARB`.
pub fn context_attribs(request: &ContextConfig) -> Vec<i32> {
    let mut attribs = vec![
        GLX_CONTEXT_MAJOR_VERSION_ARB,
        request.major,
        GLX_CONTEXT_MINOR_VERSION_ARB,
        request.minor,
    ];
    if request.forward_compatible {
        attribs.extend([GLX_CONTEXT_FLAGS_ARB, GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB]);
    }
    attribs.push(0);
    attribs
}

/// `glXCreateContext` on the chosen visual, asking for direct rendering.
pub fn create_legacy<B: Driver>(
    driver: &mut B,
    config: &Configuration<B>,
) -> Result<B::Context, BootstrapError> {
    let context = driver
        .create_context(config.visual, true)
        .ok_or(BootstrapError::ContextCreationFailed(None))?;
    debug!("Legacy GLX context created: {:?}", context);
    Ok(context)
}

/// `glXCreateContextAttribsARB` with an explicit version, followed by a
/// server round-trip so any protocol error from creation is seen here.
pub fn create_modern<B: Driver>(
    driver: &mut B,
    config: &Configuration<B>,
    request: &ContextConfig,
) -> Result<B::Context, BootstrapError> {
    if !driver.load_create_context_attribs(CREATE_CONTEXT_ATTRIBS) {
        return Err(BootstrapError::ExtensionUnavailable(CREATE_CONTEXT_ATTRIBS));
    }
    let Some(fb_config) = config.fb_config else {
        error!("Modern context creation needs a framebuffer config; only a visual was negotiated.");
        return Err(BootstrapError::ContextCreationFailed(None));
    };

    info!(
        "Requesting GL {}.{} context (forward compatible: {})",
        request.major, request.minor, request.forward_compatible
    );
    let context = driver.create_context_attribs(fb_config, true, &context_attribs(request));

    // Context creation errors arrive asynchronously.
    let protocol_error = driver.sync();
    match (context, protocol_error) {
        (Some(context), None) => {
            debug!("GLX context created: {:?}", context);
            Ok(context)
        }
        (context, protocol_error) => {
            if let Some(context) = context {
                driver.destroy_context(context);
            }
            Err(BootstrapError::ContextCreationFailed(protocol_error))
        }
    }
}

/// Rejects contexts that would render through an indirect (non-hardware) path.
pub fn ensure_direct<B: Driver>(driver: &mut B, context: B::Context) -> Result<(), BootstrapError> {
    if driver.is_direct(context) {
        info!("Direct GLX rendering context obtained");
        Ok(())
    } else {
        Err(BootstrapError::IndirectContext)
    }
}

/// Compares the version reported by the current context against a floor.
pub fn check_api_version(found: (i32, i32), required: (i32, i32)) -> Result<(), BootstrapError> {
    if found < required {
        return Err(BootstrapError::UnsupportedApiVersion {
            found_major: found.0,
            found_minor: found.1,
            required_major: required.0,
            required_minor: required.1,
        });
    }
    Ok(())
}
