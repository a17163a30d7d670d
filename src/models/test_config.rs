//! Test configuration model
//!
//! The typed settings for one rendering test, with validation and the
//! standard presets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::renderer::{
    FramebufferFormat, FramebufferType, RendererType, SceneType, VersionSelection,
};

/// Multisample counts the engine accepts (0 = disabled)
pub const VALID_MULTISAMPLE_COUNTS: &[u32] = &[0, 2, 4, 8, 16];

/// Highest anisotropic filtering level
pub const MAX_ANISOTROPY: u32 = 16;

/// Invalid test configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Test duration must be greater than zero")]
    ZeroDuration,

    #[error("Invalid resolution {width}x{height}: width and height must be greater than zero")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Invalid multisample count {0}: expected one of 0, 2, 4, 8, 16")]
    InvalidMultisample(u32),

    #[error("Invalid anisotropy level {0}: expected 0-16")]
    InvalidAnisotropy(u32),
}

/// Configuration of a single rendering test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TestConfig {
    pub renderer: RendererType,

    pub fullscreen: bool,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,

    pub fog: bool,
    pub transparency: bool,
    pub user_clip_plane: bool,
    /// 0 = disabled, 2/4/8/16 = MSAA samples
    pub multisample_count: u32,
    /// 0 = disabled, 1-16 = anisotropic filtering
    pub max_anisotropy: u32,
    /// Texture level of detail bias
    pub texture_lod: i32,

    pub fb_format: FramebufferFormat,
    pub fb_type: FramebufferType,

    pub scene: SceneType,
    pub duration_secs: u32,
    pub debug_output: bool,

    /// Pixel format index
    pub pixel_format: i32,

    pub version_selection: VersionSelection,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            renderer: RendererType::OpenGl46,
            fullscreen: false,
            width: 1920,
            height: 1080,
            vsync: false,
            fog: false,
            transparency: false,
            user_clip_plane: false,
            multisample_count: 0,
            max_anisotropy: 0,
            texture_lod: 0,
            fb_format: FramebufferFormat::Linear,
            fb_type: FramebufferType::Default,
            scene: SceneType::SingleCube,
            duration_secs: 10,
            debug_output: false,
            pixel_format: 1,
            version_selection: VersionSelection::Exact,
        }
    }
}

impl TestConfig {
    /// Standard configuration: OpenGL 4.6, single cube, 5 seconds
    pub fn default_preset() -> Self {
        Self {
            duration_secs: 5,
            ..Self::default()
        }
    }

    /// Throughput-oriented configuration with MSAA and anisotropy disabled
    pub fn performance_preset() -> Self {
        Self {
            scene: SceneType::ManyCubes,
            duration_secs: 30,
            multisample_count: 0,
            max_anisotropy: 0,
            ..Self::default()
        }
    }

    /// Configuration with every quality feature enabled
    pub fn quality_preset() -> Self {
        Self {
            scene: SceneType::Character,
            duration_secs: 15,
            multisample_count: 8,
            max_anisotropy: 16,
            fog: true,
            transparency: true,
            fb_format: FramebufferFormat::Hdr,
            ..Self::default()
        }
    }

    /// Find preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_preset()),
            "performance" | "perf" => Some(Self::performance_preset()),
            "quality" => Some(Self::quality_preset()),
            _ => None,
        }
    }

    pub fn with_renderer(mut self, renderer: RendererType) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_scene(mut self, scene: SceneType) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Check the configuration invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if !VALID_MULTISAMPLE_COUNTS.contains(&self.multisample_count) {
            return Err(ConfigError::InvalidMultisample(self.multisample_count));
        }
        if self.max_anisotropy > MAX_ANISOTROPY {
            return Err(ConfigError::InvalidAnisotropy(self.max_anisotropy));
        }
        Ok(())
    }

    /// One-line description used in logs and reports
    pub fn describe(&self) -> String {
        format!(
            "{} / {} @ {}x{} for {}s",
            self.renderer, self.scene, self.width, self.height, self.duration_secs
        )
    }
}
