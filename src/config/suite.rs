//! Test suites
//!
//! Named, ordered collections of test configurations, built in or loaded
//! from the configuration file.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{FramebufferFormat, RendererType, SceneType, TestConfig};

/// A labelled configuration within a suite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteEntry {
    /// Label shown in progress lines and reports
    pub label: String,
    /// Test configuration; unspecified fields take their defaults
    #[serde(default)]
    pub config: TestConfig,
}

impl SuiteEntry {
    pub fn new(label: impl Into<String>, config: TestConfig) -> Self {
        Self {
            label: label.into(),
            config,
        }
    }
}

/// Ordered collection of tests run as one batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Entries, run in order
    #[serde(default)]
    pub entries: Vec<SuiteEntry>,
}

impl TestSuite {
    /// Create an empty suite
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_entry(mut self, label: impl Into<String>, config: TestConfig) -> Self {
        self.entries.push(SuiteEntry::new(label, config));
        self
    }

    pub fn configs(&self) -> Vec<TestConfig> {
        self.entries.iter().map(|e| e.config.clone()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    /// Replace the duration of every entry
    pub fn with_duration(mut self, secs: u32) -> Self {
        for entry in &mut self.entries {
            entry.config.duration_secs = secs;
        }
        self
    }

    /// Single OpenGL 4.5 test on the simplest scene
    pub fn basic() -> Self {
        Self::new("basic")
            .with_description("Single OpenGL 4.5 test on the single cube scene")
            .with_entry(
                "OpenGL 4.5",
                TestConfig::default_preset().with_renderer(RendererType::OpenGl45),
            )
    }

    /// Single Vulkan 1.2 test
    pub fn vulkan() -> Self {
        Self::new("vulkan")
            .with_description("Single Vulkan 1.2 test on the many cubes scene")
            .with_entry(
                "Vulkan 1.2",
                TestConfig::default_preset()
                    .with_renderer(RendererType::Vulkan12)
                    .with_scene(SceneType::ManyCubes),
            )
    }

    /// Throughput across OpenGL core profile versions
    pub fn opengl_versions() -> Self {
        let mut suite = Self::new("opengl-versions")
            .with_description("Many cubes throughput across OpenGL 3.3 to 4.5");
        for renderer in [
            RendererType::OpenGl33,
            RendererType::OpenGl40,
            RendererType::OpenGl42,
            RendererType::OpenGl45,
        ] {
            suite = suite.with_entry(
                renderer.name(),
                TestConfig::performance_preset()
                    .with_renderer(renderer)
                    .with_duration(10),
            );
        }
        suite
    }

    /// Cost of quality features
    pub fn quality() -> Self {
        let low = TestConfig {
            multisample_count: 0,
            max_anisotropy: 0,
            fog: false,
            transparency: false,
            ..TestConfig::performance_preset()
        };
        let medium = TestConfig {
            multisample_count: 4,
            max_anisotropy: 4,
            fog: true,
            ..TestConfig::default_preset()
        };
        let high = TestConfig {
            multisample_count: 8,
            max_anisotropy: 16,
            fog: true,
            transparency: true,
            fb_format: FramebufferFormat::Hdr,
            ..TestConfig::quality_preset()
        };

        Self::new("quality")
            .with_description("Low, medium and high quality settings")
            .with_entry("Low Quality", low)
            .with_entry("Medium Quality", medium)
            .with_entry("High Quality", high)
    }

    /// Same scene under OpenGL 4.5 and Vulkan 1.2
    pub fn vulkan_vs_opengl() -> Self {
        let gl = TestConfig::performance_preset()
            .with_renderer(RendererType::OpenGl45)
            .with_scene(SceneType::ManyCharacters)
            .with_duration(15);
        let vk = gl.clone().with_renderer(RendererType::Vulkan12);

        Self::new("vulkan-vs-opengl")
            .with_description("Many characters under OpenGL 4.5 and Vulkan 1.2")
            .with_entry("OpenGL 4.5", gl)
            .with_entry("Vulkan 1.2", vk)
    }

    /// Many cubes from 720p to 4K
    pub fn resolution_scaling() -> Self {
        let mut suite =
            Self::new("resolution-scaling").with_description("Many cubes from 720p to 4K");
        for (label, width, height) in [
            ("720p", 1280, 720),
            ("1080p", 1920, 1080),
            ("1440p", 2560, 1440),
            ("4K", 3840, 2160),
        ] {
            suite = suite.with_entry(
                label,
                TestConfig::performance_preset()
                    .with_resolution(width, height)
                    .with_duration(8),
            );
        }
        suite
    }

    /// Every rasterized scene under OpenGL 4.5 at 1080p
    pub fn comprehensive() -> Self {
        let mut suite = Self::new("comprehensive")
            .with_description("Every rasterized scene under OpenGL 4.5 at 1080p");
        for scene in [
            SceneType::SingleCube,
            SceneType::ManyCubes,
            SceneType::Character,
            SceneType::ManyCharacters,
        ] {
            suite = suite.with_entry(
                scene.name(),
                TestConfig::default_preset()
                    .with_renderer(RendererType::OpenGl45)
                    .with_scene(scene)
                    .with_resolution(1920, 1080)
                    .with_duration(12),
            );
        }
        suite
    }

    /// Built-in suites
    pub fn predefined() -> Vec<TestSuite> {
        vec![
            Self::basic(),
            Self::vulkan(),
            Self::opengl_versions(),
            Self::quality(),
            Self::vulkan_vs_opengl(),
            Self::resolution_scaling(),
            Self::comprehensive(),
        ]
    }
}

/// Built-in suites merged with suites from configuration
pub struct SuiteRegistry {
    suites: Vec<TestSuite>,
}

impl SuiteRegistry {
    /// Registry holding the built-in suites
    pub fn new() -> Self {
        Self {
            suites: TestSuite::predefined(),
        }
    }

    /// Registry with `extra` added; an extra suite replaces a built-in one
    /// of the same name
    pub fn with_suites(extra: impl IntoIterator<Item = TestSuite>) -> Self {
        let mut registry = Self::new();
        for suite in extra {
            registry.add(suite);
        }
        registry
    }

    pub fn add(&mut self, suite: TestSuite) {
        match self.suites.iter_mut().find(|s| s.name == suite.name) {
            Some(existing) => *existing = suite,
            None => self.suites.push(suite),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TestSuite> {
        self.suites.iter().find(|s| s.name == name)
    }

    pub fn list(&self) -> &[TestSuite] {
        &self.suites
    }

    pub fn names(&self) -> Vec<&str> {
        self.suites.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
