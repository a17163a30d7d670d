//! Renderer, scene, and framebuffer selectors
//!
//! Enumerations understood by the rendering engine, with their engine ids,
//! payload tokens, and display names.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Rendering API and version used by a test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum RendererType {
    #[serde(rename = "gdi")]
    Gdi,
    #[serde(rename = "gl2.0")]
    OpenGl20,
    #[serde(rename = "gl3.0")]
    OpenGl30,
    #[serde(rename = "gl3.1")]
    OpenGl31,
    #[serde(rename = "gl3.2")]
    OpenGl32,
    #[serde(rename = "gl3.3")]
    OpenGl33,
    #[serde(rename = "gl4.0")]
    OpenGl40,
    #[serde(rename = "gl4.1")]
    OpenGl41,
    #[serde(rename = "gl4.2")]
    OpenGl42,
    #[serde(rename = "gl4.3")]
    OpenGl43,
    #[serde(rename = "gl4.4")]
    OpenGl44,
    #[serde(rename = "gl4.5")]
    OpenGl45,
    #[serde(rename = "gl4.6")]
    OpenGl46,
    #[serde(rename = "vk1.0")]
    Vulkan10,
    #[serde(rename = "vk1.1")]
    Vulkan11,
    #[serde(rename = "vk1.2")]
    Vulkan12,
}

/// API family of a renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiFamily {
    Software,
    OpenGl,
    Vulkan,
}

impl RendererType {
    /// Numeric renderer id passed to the engine
    pub fn engine_id(&self) -> i32 {
        *self as i32
    }

    /// Get renderer display name
    pub fn name(&self) -> &'static str {
        match self {
            RendererType::Gdi => "GDI",
            RendererType::OpenGl20 => "OpenGL 2.0",
            RendererType::OpenGl30 => "OpenGL 3.0",
            RendererType::OpenGl31 => "OpenGL 3.1",
            RendererType::OpenGl32 => "OpenGL 3.2",
            RendererType::OpenGl33 => "OpenGL 3.3",
            RendererType::OpenGl40 => "OpenGL 4.0",
            RendererType::OpenGl41 => "OpenGL 4.1",
            RendererType::OpenGl42 => "OpenGL 4.2",
            RendererType::OpenGl43 => "OpenGL 4.3",
            RendererType::OpenGl44 => "OpenGL 4.4",
            RendererType::OpenGl45 => "OpenGL 4.5",
            RendererType::OpenGl46 => "OpenGL 4.6",
            RendererType::Vulkan10 => "Vulkan 1.0",
            RendererType::Vulkan11 => "Vulkan 1.1",
            RendererType::Vulkan12 => "Vulkan 1.2",
        }
    }

    /// Short identifier used on the command line and in config files
    pub fn key(&self) -> &'static str {
        match self {
            RendererType::Gdi => "gdi",
            RendererType::OpenGl20 => "gl2.0",
            RendererType::OpenGl30 => "gl3.0",
            RendererType::OpenGl31 => "gl3.1",
            RendererType::OpenGl32 => "gl3.2",
            RendererType::OpenGl33 => "gl3.3",
            RendererType::OpenGl40 => "gl4.0",
            RendererType::OpenGl41 => "gl4.1",
            RendererType::OpenGl42 => "gl4.2",
            RendererType::OpenGl43 => "gl4.3",
            RendererType::OpenGl44 => "gl4.4",
            RendererType::OpenGl45 => "gl4.5",
            RendererType::OpenGl46 => "gl4.6",
            RendererType::Vulkan10 => "vk1.0",
            RendererType::Vulkan11 => "vk1.1",
            RendererType::Vulkan12 => "vk1.2",
        }
    }

    pub fn family(&self) -> ApiFamily {
        match self {
            RendererType::Gdi => ApiFamily::Software,
            RendererType::Vulkan10 | RendererType::Vulkan11 | RendererType::Vulkan12 => {
                ApiFamily::Vulkan
            }
            _ => ApiFamily::OpenGl,
        }
    }

    /// Get all renderers
    pub fn all() -> Vec<RendererType> {
        vec![
            RendererType::Gdi,
            RendererType::OpenGl20,
            RendererType::OpenGl30,
            RendererType::OpenGl31,
            RendererType::OpenGl32,
            RendererType::OpenGl33,
            RendererType::OpenGl40,
            RendererType::OpenGl41,
            RendererType::OpenGl42,
            RendererType::OpenGl43,
            RendererType::OpenGl44,
            RendererType::OpenGl45,
            RendererType::OpenGl46,
            RendererType::Vulkan10,
            RendererType::Vulkan11,
            RendererType::Vulkan12,
        ]
    }

    /// Parse from string ("gl4.5", "opengl4.5", "vk1.2", "vulkan1.2", "gdi")
    pub fn from_str(s: &str) -> Option<RendererType> {
        let normalized = s
            .to_lowercase()
            .replace("opengl", "gl")
            .replace("vulkan", "vk")
            .replace([' ', '_'], "");
        Self::all().into_iter().find(|r| r.key() == normalized)
    }
}

impl fmt::Display for RendererType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Scene rendered during a test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SceneType {
    SingleCube,
    ManyCubes,
    Character,
    ManyCharacters,
    Raytracing,
}

impl SceneType {
    /// Numeric scene id passed to the engine
    pub fn engine_id(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        match self {
            SceneType::SingleCube => "Single Cube",
            SceneType::ManyCubes => "Many Cubes",
            SceneType::Character => "Character",
            SceneType::ManyCharacters => "Many Characters",
            SceneType::Raytracing => "Raytracing",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SceneType::SingleCube => "single-cube",
            SceneType::ManyCubes => "many-cubes",
            SceneType::Character => "character",
            SceneType::ManyCharacters => "many-characters",
            SceneType::Raytracing => "raytracing",
        }
    }

    pub fn all() -> Vec<SceneType> {
        vec![
            SceneType::SingleCube,
            SceneType::ManyCubes,
            SceneType::Character,
            SceneType::ManyCharacters,
            SceneType::Raytracing,
        ]
    }

    /// Parse from key or engine id
    pub fn from_str(s: &str) -> Option<SceneType> {
        let normalized = s.to_lowercase().replace([' ', '_'], "-");
        if let Ok(id) = normalized.parse::<usize>() {
            return Self::all().get(id).copied();
        }
        Self::all().into_iter().find(|scene| scene.key() == normalized)
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Framebuffer color format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum FramebufferFormat {
    #[default]
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "srgb")]
    Srgb,
    #[serde(rename = "hdr")]
    Hdr,
}

impl FramebufferFormat {
    /// Token understood by the engine
    pub fn token(&self) -> &'static str {
        match self {
            FramebufferFormat::Linear => "Linear",
            FramebufferFormat::Srgb => "sRGB",
            FramebufferFormat::Hdr => "HDR",
        }
    }

    /// Parse a format name, falling back to `Linear` for unknown names
    pub fn parse_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "linear" | "rgb" => FramebufferFormat::Linear,
            "srgb" => FramebufferFormat::Srgb,
            "hdr" => FramebufferFormat::Hdr,
            other => {
                warn!("Unknown framebuffer format '{}', using Linear", other);
                FramebufferFormat::Linear
            }
        }
    }
}

impl fmt::Display for FramebufferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Framebuffer kind the engine renders into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FramebufferType {
    #[default]
    Default,
    PixelBuffer,
    FramebufferObject,
}

impl FramebufferType {
    /// Token understood by the engine
    pub fn token(&self) -> &'static str {
        match self {
            FramebufferType::Default => "Default",
            FramebufferType::PixelBuffer => "PixelBuffer",
            FramebufferType::FramebufferObject => "FrameBufferObject",
        }
    }

    /// Parse a type name, falling back to `Default` for unknown names
    pub fn parse_or_default(s: &str) -> Self {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "default" => FramebufferType::Default,
            "pixelbuffer" | "pbuffer" => FramebufferType::PixelBuffer,
            "framebufferobject" | "fbo" => FramebufferType::FramebufferObject,
            other => {
                warn!("Unknown framebuffer type '{}', using Default", other);
                FramebufferType::Default
            }
        }
    }
}

impl fmt::Display for FramebufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

// Config files accept the same spellings as the command line.

impl<'de> Deserialize<'de> for RendererType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RendererType::from_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown renderer '{}'", s)))
    }
}

impl<'de> Deserialize<'de> for SceneType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SceneType::from_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown scene '{}'", s)))
    }
}

impl<'de> Deserialize<'de> for FramebufferFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FramebufferFormat::parse_or_default(&s))
    }
}

impl<'de> Deserialize<'de> for FramebufferType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FramebufferType::parse_or_default(&s))
    }
}

/// How the `test` version list is derived from the renderer
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum VersionSelection {
    /// Test only the selected API version
    #[default]
    Exact,
    /// Test every version of the renderer's API family the engine knows
    Sweep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_ids_follow_declaration_order() {
        assert_eq!(RendererType::Gdi.engine_id(), 0);
        assert_eq!(RendererType::OpenGl46.engine_id(), 12);
        assert_eq!(RendererType::Vulkan10.engine_id(), 13);
        assert_eq!(RendererType::Vulkan12.engine_id(), 15);
        assert_eq!(SceneType::Raytracing.engine_id(), 4);
    }

    #[test]
    fn test_renderer_from_str() {
        assert_eq!(RendererType::from_str("gl4.5"), Some(RendererType::OpenGl45));
        assert_eq!(
            RendererType::from_str("OpenGL 4.5"),
            Some(RendererType::OpenGl45)
        );
        assert_eq!(
            RendererType::from_str("vulkan1.2"),
            Some(RendererType::Vulkan12)
        );
        assert_eq!(RendererType::from_str("GDI"), Some(RendererType::Gdi));
        assert_eq!(RendererType::from_str("dx12"), None);
    }

    #[test]
    fn test_renderer_family() {
        assert_eq!(RendererType::Gdi.family(), ApiFamily::Software);
        assert_eq!(RendererType::OpenGl33.family(), ApiFamily::OpenGl);
        assert_eq!(RendererType::Vulkan11.family(), ApiFamily::Vulkan);
    }

    #[test]
    fn test_scene_from_str() {
        assert_eq!(SceneType::from_str("many-cubes"), Some(SceneType::ManyCubes));
        assert_eq!(
            SceneType::from_str("Many Characters"),
            Some(SceneType::ManyCharacters)
        );
        assert_eq!(SceneType::from_str("2"), Some(SceneType::Character));
        assert_eq!(SceneType::from_str("9"), None);
    }

    #[test]
    fn test_framebuffer_tokens() {
        assert_eq!(FramebufferFormat::Srgb.token(), "sRGB");
        assert_eq!(
            FramebufferType::FramebufferObject.token(),
            "FrameBufferObject"
        );
        assert_eq!(
            FramebufferFormat::parse_or_default("bogus"),
            FramebufferFormat::Linear
        );
        assert_eq!(
            FramebufferType::parse_or_default("fbo"),
            FramebufferType::FramebufferObject
        );
        assert_eq!(
            FramebufferType::parse_or_default("bogus"),
            FramebufferType::Default
        );
    }

    #[test]
    fn test_renderer_serde_names() {
        let json = serde_json::to_string(&RendererType::Vulkan12).unwrap();
        assert_eq!(json, "\"vk1.2\"");
        let scene: SceneType = serde_json::from_str("\"many-cubes\"").unwrap();
        assert_eq!(scene, SceneType::ManyCubes);
    }

    #[test]
    fn test_deserialize_accepts_cli_spellings() {
        let renderer: RendererType = serde_json::from_str("\"GL4.5\"").unwrap();
        assert_eq!(renderer, RendererType::OpenGl45);
        let scene: SceneType = serde_json::from_str("\"Many Characters\"").unwrap();
        assert_eq!(scene, SceneType::ManyCharacters);
        let format: FramebufferFormat = serde_json::from_str("\"sRGB\"").unwrap();
        assert_eq!(format, FramebufferFormat::Srgb);
        let fb_type: FramebufferType = serde_json::from_str("\"FrameBufferObject\"").unwrap();
        assert_eq!(fb_type, FramebufferType::FramebufferObject);
    }

    #[test]
    fn test_deserialize_unknown_names() {
        let format: FramebufferFormat = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(format, FramebufferFormat::Linear);
        let fb_type: FramebufferType = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(fb_type, FramebufferType::Default);
        assert!(serde_json::from_str::<RendererType>("\"dx12\"").is_err());
    }
}
