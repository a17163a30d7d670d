//! Payload serializer
//!
//! Builds the markup document the engine parses. Element order is fixed and
//! the output for a given configuration never changes.

use std::fmt;

use super::display::DisplayModes;
use super::options::EngineOptions;
use crate::models::{ApiFamily, RendererType, TestConfig, VersionSelection};

/// Serialized test configuration
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Payload(String);

impl Payload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const LEGACY_SWEEP: &str = "1.1;1.2;1.3;1.5;2.0";
const OPENGL_SWEEP: &str = "3.0;3.1;3.2;3.3;4.0;4.1;4.2;4.3;4.4;4.5";
const VULKAN_VERSION: &str = "1.0";

/// Version list for the `test` element
pub fn version_token(renderer: RendererType, selection: VersionSelection) -> &'static str {
    match selection {
        VersionSelection::Exact => match renderer {
            RendererType::Gdi | RendererType::OpenGl20 => "2.0",
            RendererType::OpenGl30 => "3.0",
            RendererType::OpenGl31 => "3.1",
            RendererType::OpenGl32 => "3.2",
            RendererType::OpenGl33 => "3.3",
            RendererType::OpenGl40 => "4.0",
            RendererType::OpenGl41 => "4.1",
            RendererType::OpenGl42 => "4.2",
            RendererType::OpenGl43 => "4.3",
            RendererType::OpenGl44 => "4.4",
            RendererType::OpenGl45 => "4.5",
            RendererType::OpenGl46 => "4.6",
            RendererType::Vulkan10 | RendererType::Vulkan11 | RendererType::Vulkan12 => {
                VULKAN_VERSION
            }
        },
        VersionSelection::Sweep => match renderer.family() {
            ApiFamily::Vulkan => VULKAN_VERSION,
            _ if matches!(renderer, RendererType::Gdi | RendererType::OpenGl20) => LEGACY_SWEEP,
            _ => OPENGL_SWEEP,
        },
    }
}

fn push_element(out: &mut String, name: &str, value: impl fmt::Display) {
    out.push_str(&format!("<{name}>{value}</{name}>\n"));
}

/// Turns test configurations into engine payloads
pub struct PayloadSerializer<'a> {
    display_modes: &'a dyn DisplayModes,
}

impl<'a> PayloadSerializer<'a> {
    pub fn new(display_modes: &'a dyn DisplayModes) -> Self {
        Self { display_modes }
    }

    /// Serialize a configuration
    pub fn serialize(&self, config: &TestConfig) -> Payload {
        let options = EngineOptions::from_config(config);
        let display_mode = self.display_modes.find(config.width, config.height);

        let mut body = String::new();
        push_element(&mut body, "option", options.bits());
        push_element(&mut body, "duration", config.duration_secs);
        push_element(&mut body, "multisample", config.multisample_count);
        push_element(&mut body, "anisotropy", config.max_anisotropy);
        push_element(&mut body, "texturelod", config.texture_lod);
        push_element(&mut body, "displaymode", display_mode);
        push_element(&mut body, "renderer", config.renderer.engine_id());
        push_element(&mut body, "pixelformat", config.pixel_format);
        push_element(
            &mut body,
            "test",
            version_token(config.renderer, config.version_selection),
        );
        push_element(&mut body, "fbenable", config.fb_type.token());
        push_element(&mut body, "fbformat", config.fb_format.token());
        push_element(&mut body, "scene", config.scene.engine_id());
        push_element(&mut body, "width", config.width);
        push_element(&mut body, "height", config.height);

        let mut payload = String::with_capacity(body.len() + 16);
        push_element(&mut payload, "root", body);
        Payload(payload)
    }
}
