//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::models::{
    FramebufferFormat, FramebufferType, RendererType, SceneType, TestConfig, VersionSelection,
};

/// OpenGL/Vulkan rendering test host
#[derive(Parser, Debug)]
#[command(name = "render-tester")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Run OpenGL and Vulkan rendering tests through the infogl engine")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (searched in standard locations when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single rendering test
    Run(RunArgs),

    /// Run a named test suite
    Suite(SuiteArgs),

    /// Print the engine payload for a configuration without running it
    Payload(TestConfigArgs),

    /// List renderers, scenes and suites
    List(ListArgs),

    /// Show processor information reported by the engine
    Cpu {
        /// Output format (table, json, json-pretty)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// View stored test results
    Results(ResultsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Settings for one test. Unset flags keep the preset's value.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TestConfigArgs {
    /// Base preset (default, performance, quality)
    #[arg(short, long, default_value = "default")]
    pub preset: String,

    /// Renderer (gdi, gl2.0 ... gl4.6, vk1.0, vk1.1, vk1.2)
    #[arg(short, long)]
    pub renderer: Option<String>,

    /// Scene (single-cube, many-cubes, character, many-characters, raytracing)
    #[arg(short, long)]
    pub scene: Option<String>,

    /// Window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height
    #[arg(long)]
    pub height: Option<u32>,

    /// Test duration in seconds
    #[arg(short, long)]
    pub duration: Option<u32>,

    /// Multisample count (0, 2, 4, 8, 16)
    #[arg(long)]
    pub msaa: Option<u32>,

    /// Anisotropic filtering level (0-16)
    #[arg(long)]
    pub aniso: Option<u32>,

    /// Texture LOD bias
    #[arg(long, allow_hyphen_values = true)]
    pub lod: Option<i32>,

    /// Pixel format index
    #[arg(long)]
    pub pixel_format: Option<i32>,

    /// Enable fog
    #[arg(long)]
    pub fog: bool,

    /// Enable transparency
    #[arg(long)]
    pub transparency: bool,

    /// Enable the user clip plane
    #[arg(long)]
    pub clip_plane: bool,

    /// Run fullscreen
    #[arg(long)]
    pub fullscreen: bool,

    /// Enable vertical sync
    #[arg(long)]
    pub vsync: bool,

    /// Enable engine debug output
    #[arg(long)]
    pub debug: bool,

    /// Framebuffer format (linear, srgb, hdr)
    #[arg(long)]
    pub fb_format: Option<String>,

    /// Framebuffer type (default, pbuffer, fbo)
    #[arg(long)]
    pub fb_type: Option<String>,

    /// Test every API version of the renderer's family
    #[arg(long)]
    pub sweep: bool,
}

impl TestConfigArgs {
    /// Build the test configuration from the preset and flags
    pub fn build(&self) -> Result<TestConfig> {
        let mut config = TestConfig::preset(&self.preset)
            .ok_or_else(|| anyhow!("Unknown preset: {}", self.preset))?;

        if let Some(name) = &self.renderer {
            config.renderer = RendererType::from_str(name)
                .ok_or_else(|| anyhow!("Unknown renderer: {name}"))?;
        }
        if let Some(name) = &self.scene {
            config.scene =
                SceneType::from_str(name).ok_or_else(|| anyhow!("Unknown scene: {name}"))?;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(secs) = self.duration {
            config.duration_secs = secs;
        }
        if let Some(samples) = self.msaa {
            config.multisample_count = samples;
        }
        if let Some(level) = self.aniso {
            config.max_anisotropy = level;
        }
        if let Some(lod) = self.lod {
            config.texture_lod = lod;
        }
        if let Some(index) = self.pixel_format {
            config.pixel_format = index;
        }
        if let Some(format) = &self.fb_format {
            config.fb_format = FramebufferFormat::parse_or_default(format);
        }
        if let Some(fb_type) = &self.fb_type {
            config.fb_type = FramebufferType::parse_or_default(fb_type);
        }

        config.fog |= self.fog;
        config.transparency |= self.transparency;
        config.user_clip_plane |= self.clip_plane;
        config.fullscreen |= self.fullscreen;
        config.vsync |= self.vsync;
        config.debug_output |= self.debug;
        if self.sweep {
            config.version_selection = VersionSelection::Sweep;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for run command
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub test: TestConfigArgs,

    /// Report every record the engine returned
    #[arg(long)]
    pub detailed: bool,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save the result to the results store
    #[arg(long)]
    pub save: bool,
}

/// Arguments for suite command
#[derive(clap::Args, Debug)]
pub struct SuiteArgs {
    /// Suite name (see `list --suites`)
    pub name: String,

    /// Override every entry's duration in seconds
    #[arg(short, long)]
    pub duration: Option<u32>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save the run to the results store
    #[arg(long)]
    pub save: bool,

    /// Write the formatted results to a file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print a report comparing entries (text, markdown)
    #[arg(long)]
    pub report: Option<String>,
}

/// Arguments for list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show renderers
    #[arg(short, long)]
    pub renderers: bool,

    /// Show scenes
    #[arg(short, long)]
    pub scenes: bool,

    /// Show test suites
    #[arg(long)]
    pub suites: bool,

    /// Show suite entries
    #[arg(short, long)]
    pub detailed: bool,
}

impl ListArgs {
    /// Nothing selected means everything
    pub fn show_all(&self) -> bool {
        !self.renderers && !self.scenes && !self.suites
    }
}

/// Arguments for results command
#[derive(clap::Args, Debug)]
pub struct ResultsArgs {
    #[command(subcommand)]
    pub action: ResultsAction,
}

#[derive(Subcommand, Debug)]
pub enum ResultsAction {
    /// List stored runs
    List {
        /// Only runs of this suite
        suite: Option<String>,

        /// Output format (table, json, json-pretty)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show a stored run as a report
    Show {
        /// Run ID
        id: String,

        /// Report format (text, markdown)
        #[arg(short, long, default_value = "text")]
        report: String,
    },

    /// Show the most recent run of a suite
    Latest {
        /// Suite name
        suite: String,

        /// Report format (text, markdown)
        #[arg(short, long, default_value = "text")]
        report: String,
    },

    /// Export a stored run
    Export {
        /// Run ID
        id: String,

        /// Destination file
        path: String,

        /// Export format (json, csv); taken from the file extension when omitted
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Delete stored runs
    Delete {
        /// Suite name
        suite: String,

        /// Run ID (the whole suite when omitted)
        id: Option<String>,
    },
}

/// Arguments for config command
#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./render-tester.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment overrides instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (standard locations when omitted)
        file: Option<String>,
    },

    /// Print the JSON Schema of the configuration file
    Schema,

    /// Describe the supported environment variables
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args() {
        let args = Args::parse_from(["render-tester", "list", "--suites"]);
        match args.command {
            Command::List(list_args) => {
                assert!(list_args.suites);
                assert!(!list_args.show_all());
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "render-tester",
            "run",
            "--renderer",
            "vk1.2",
            "--scene",
            "many-cubes",
            "--width",
            "1280",
            "--height",
            "720",
            "--msaa",
            "4",
            "--fog",
            "--save",
        ]);
        match args.command {
            Command::Run(run_args) => {
                assert!(run_args.save);
                let config = run_args.test.build().unwrap();
                assert_eq!(config.renderer, RendererType::Vulkan12);
                assert_eq!(config.scene, SceneType::ManyCubes);
                assert_eq!((config.width, config.height), (1280, 720));
                assert_eq!(config.multisample_count, 4);
                assert!(config.fog);
                assert_eq!(config.duration_secs, 5);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from([
            "render-tester",
            "cpu",
            "--verbose",
            "--config",
            "custom.yaml",
        ]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("custom.yaml"));
    }

    #[test]
    fn test_preset_is_kept_for_unset_flags() {
        let args = TestConfigArgs {
            preset: "quality".to_string(),
            duration: Some(3),
            ..Default::default()
        };
        let config = args.build().unwrap();
        assert_eq!(config.scene, SceneType::Character);
        assert_eq!(config.multisample_count, 8);
        assert_eq!(config.duration_secs, 3);
    }

    #[test]
    fn test_sweep_and_framebuffer() {
        let args = TestConfigArgs {
            preset: "default".to_string(),
            fb_format: Some("srgb".to_string()),
            fb_type: Some("fbo".to_string()),
            sweep: true,
            ..Default::default()
        };
        let config = args.build().unwrap();
        assert_eq!(config.fb_format, FramebufferFormat::Srgb);
        assert_eq!(config.fb_type, FramebufferType::FramebufferObject);
        assert_eq!(config.version_selection, VersionSelection::Sweep);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let unknown = TestConfigArgs {
            preset: "default".to_string(),
            renderer: Some("directx".to_string()),
            ..Default::default()
        };
        assert!(unknown.build().is_err());

        let bad_msaa = TestConfigArgs {
            preset: "default".to_string(),
            msaa: Some(3),
            ..Default::default()
        };
        assert!(bad_msaa.build().is_err());

        let bad_preset = TestConfigArgs {
            preset: "ultra".to_string(),
            ..Default::default()
        };
        assert!(bad_preset.build().is_err());
    }

    #[test]
    fn test_results_delete_args() {
        let args = Args::parse_from(["render-tester", "results", "delete", "basic"]);
        match args.command {
            Command::Results(ResultsArgs {
                action: ResultsAction::Delete { suite, id },
            }) => {
                assert_eq!(suite, "basic");
                assert!(id.is_none());
            }
            _ => panic!("Expected Results delete command"),
        }
    }
}
