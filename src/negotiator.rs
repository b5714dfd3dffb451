// src/negotiator.rs

//! Framebuffer configuration negotiation.
//!
//! Two ways to arrive at a visual for the window:
//! - legacy: `glXChooseVisual` with a short fixed attribute list;
//! - modern: a GLX version floor, `glXChooseFBConfig` with the full attribute
//!   list, first-match selection, then the visual derived from that config.
//!
//! Neither path allocates anything the caller has to release on failure.

use crate::backends::{Driver, VisualDescriptor};
use crate::config::FramebufferConfig;
use crate::error::BootstrapError;
use log::{debug, info, warn};
use x11::glx;

/// GLX attribute lists are terminated by `None` (0).
const ATTRIB_LIST_END: i32 = 0;

/// A negotiated configuration. `visual` must eventually go back through
/// `Driver::free_visual`.
#[derive(Debug)]
pub struct Configuration<B: Driver> {
    /// Set on the modern path; the legacy path has only a visual.
    pub fb_config: Option<B::FbConfig>,
    pub visual: B::Visual,
    pub descriptor: VisualDescriptor,
}

/// `GLX_RGBA, GLX_DEPTH_SIZE, n, GLX_DOUBLEBUFFER, None`.
pub fn legacy_visual_attribs(request: &FramebufferConfig) -> Vec<i32> {
    let mut attribs = vec![glx::GLX_RGBA, glx::GLX_DEPTH_SIZE, request.depth_bits];
    if request.double_buffer {
        attribs.push(glx::GLX_DOUBLEBUFFER);
    }
    attribs.push(ATTRIB_LIST_END);
    attribs
}

/// Key/value list for `glXChooseFBConfig`. Order matters to some drivers and
/// is kept stable.
#[rustfmt::skip]
pub fn fb_config_attribs(request: &FramebufferConfig) -> Vec<i32> {
    vec![
        glx::GLX_X_RENDERABLE, 1,
        glx::GLX_DRAWABLE_TYPE, glx::GLX_WINDOW_BIT,
        glx::GLX_RENDER_TYPE, glx::GLX_RGBA_BIT,
        glx::GLX_X_VISUAL_TYPE, glx::GLX_TRUE_COLOR,
        glx::GLX_RED_SIZE, request.red_bits,
        glx::GLX_GREEN_SIZE, request.green_bits,
        glx::GLX_BLUE_SIZE, request.blue_bits,
        glx::GLX_ALPHA_SIZE, request.alpha_bits,
        glx::GLX_DEPTH_SIZE, request.depth_bits,
        glx::GLX_STENCIL_SIZE, request.stencil_bits,
        glx::GLX_DOUBLEBUFFER, request.double_buffer as i32,
        ATTRIB_LIST_END,
    ]
}

pub fn negotiate_legacy<B: Driver>(
    driver: &mut B,
    request: &FramebufferConfig,
) -> Result<Configuration<B>, BootstrapError> {
    let attribs = legacy_visual_attribs(request);
    let visual = driver
        .choose_visual(&attribs)
        .ok_or(BootstrapError::NoMatchingVisual)?;
    let descriptor = driver.describe_visual(visual);
    info!(
        "Chose visual 0x{:x} (depth {}, class {})",
        descriptor.visual_id, descriptor.depth, descriptor.class
    );
    Ok(Configuration {
        fb_config: None,
        visual,
        descriptor,
    })
}

pub fn negotiate_modern<B: Driver>(
    driver: &mut B,
    request: &FramebufferConfig,
    min_glx: (i32, i32),
) -> Result<Configuration<B>, BootstrapError> {
    let (major, minor) = driver.glx_version().unwrap_or((0, 0));
    info!("GLX version {}.{}", major, minor);
    if (major, minor) < min_glx {
        return Err(BootstrapError::UnsupportedServiceVersion {
            found_major: major,
            found_minor: minor,
            required_major: min_glx.0,
            required_minor: min_glx.1,
        });
    }

    let candidates = driver.choose_fb_configs(&fb_config_attribs(request));
    debug!("glXChooseFBConfig returned {} candidate(s)", candidates.len());
    let fb_config =
        select_first(driver, &candidates, request).ok_or(BootstrapError::NoMatchingConfig)?;

    let visual = driver
        .visual_from_fb_config(fb_config)
        .ok_or(BootstrapError::VisualDerivationFailed)?;
    let descriptor = driver.describe_visual(visual);
    info!(
        "Chose framebuffer config {:?} with visual 0x{:x} (depth {})",
        fb_config, descriptor.visual_id, descriptor.depth
    );
    Ok(Configuration {
        fb_config: Some(fb_config),
        visual,
        descriptor,
    })
}

/// First candidate whose attributes meet every requested minimum.
///
/// The server already orders candidates by its own preference; no further
/// ranking is attempted.
pub fn select_first<B: Driver>(
    driver: &mut B,
    candidates: &[B::FbConfig],
    request: &FramebufferConfig,
) -> Option<B::FbConfig> {
    let chosen = candidates
        .iter()
        .copied()
        .find(|&candidate| satisfies(driver, candidate, request));
    if chosen.is_none() && !candidates.is_empty() {
        warn!(
            "None of the {} framebuffer candidates meets the request {:?}",
            candidates.len(),
            request
        );
    }
    chosen
}

fn satisfies<B: Driver>(driver: &mut B, candidate: B::FbConfig, request: &FramebufferConfig) -> bool {
    let mut attrib = |name: i32| driver.fb_config_attrib(candidate, name);

    let minimums = [
        (glx::GLX_RED_SIZE, request.red_bits),
        (glx::GLX_GREEN_SIZE, request.green_bits),
        (glx::GLX_BLUE_SIZE, request.blue_bits),
        (glx::GLX_ALPHA_SIZE, request.alpha_bits),
        (glx::GLX_DEPTH_SIZE, request.depth_bits),
        (glx::GLX_STENCIL_SIZE, request.stencil_bits),
    ];
    for (name, min) in minimums {
        match attrib(name) {
            Some(value) if value >= min => {}
            other => {
                debug!(
                    "Candidate {:?} rejected: attribute 0x{:x} = {:?}, need >= {}",
                    candidate, name, other, min
                );
                return false;
            }
        }
    }

    let has_bits = |value: Option<i32>, bits: i32| value.is_some_and(|v| v & bits == bits);
    attrib(glx::GLX_X_RENDERABLE) == Some(1)
        && has_bits(attrib(glx::GLX_DRAWABLE_TYPE), glx::GLX_WINDOW_BIT)
        && has_bits(attrib(glx::GLX_RENDER_TYPE), glx::GLX_RGBA_BIT)
        && attrib(glx::GLX_DOUBLEBUFFER) == Some(request.double_buffer as i32)
}
