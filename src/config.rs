// src/config.rs

//! Configuration for the GL surface.
//!
//! Every section has a `Default` that reproduces the fixed values the surface
//! has always used (a 600×600 window, an RGBA8/D24/S8 double-buffered
//! framebuffer, a forward-compatible GL 4.4 context). A JSON file named by
//! `GLX_SURFACE_CONFIG` may override any subset of fields.

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "GLX_SURFACE_CONFIG";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

/// Root of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub strategy: StrategyPreference,
    pub window: WindowConfig,
    pub framebuffer: FramebufferConfig,
    pub context: ContextConfig,
    pub render: RenderConfig,
}

/// Which bootstrap path to take.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyPreference {
    /// Probe the server: modern when GLX 1.4 and `GLX_ARB_create_context` are
    /// available, legacy otherwise.
    #[default]
    Auto,
    Legacy,
    Modern,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            x: 0,
            y: 0,
            width: 600,
            height: 600,
            title: "glx-surface".to_string(),
        }
    }
}

/// Framebuffer capabilities requested from GLX.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FramebufferConfig {
    pub red_bits: i32,
    pub green_bits: i32,
    pub blue_bits: i32,
    pub alpha_bits: i32,
    pub depth_bits: i32,
    pub stencil_bits: i32,
    pub double_buffer: bool,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        FramebufferConfig {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
        }
    }
}

/// Requested GL context version and the GLX floor for the modern path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContextConfig {
    pub major: i32,
    pub minor: i32,
    pub forward_compatible: bool,
    pub min_glx_major: i32,
    pub min_glx_minor: i32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            major: 4,
            minor: 4,
            forward_compatible: true,
            min_glx_major: 1,
            min_glx_minor: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub triangle_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            triangle_color: [1.0, 0.0, 0.0],
        }
    }
}

impl Config {
    /// Parses a configuration from JSON text. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse configuration JSON")
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Loads from `GLX_SURFACE_CONFIG` if set; any failure falls back to defaults.
    pub fn load_or_default() -> Self {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => match Self::load_from(Path::new(&path)) {
                Ok(config) => {
                    info!("Configuration loaded from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("{:#}. Using default configuration.", e);
                    Config::default()
                }
            },
            None => {
                info!("{} not set, using default configuration.", CONFIG_PATH_ENV);
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults_match_fixed_surface() {
        let config = Config::default();
        assert_eq!(config.strategy, StrategyPreference::Auto);
        assert_eq!((config.window.width, config.window.height), (600, 600));
        assert_eq!((config.window.x, config.window.y), (0, 0));
        assert_eq!((config.context.major, config.context.minor), (4, 4));
        assert!(config.context.forward_compatible);
        assert_eq!(config.framebuffer.depth_bits, 24);
        assert_eq!(config.framebuffer.stencil_bits, 8);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = Config::from_json(
            r#"{ "strategy": "legacy", "window": { "title": "demo" }, "context": { "minor": 6 } }"#,
        )
        .unwrap();
        assert_eq!(config.strategy, StrategyPreference::Legacy);
        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, 600);
        assert_eq!(config.context.major, 4);
        assert_eq!(config.context.minor, 6);
        assert_eq!(config.framebuffer, FramebufferConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{ strategy: ").is_err());
        assert!(Config::from_json(r#"{ "strategy": "vulkan" }"#).is_err());
    }
}
