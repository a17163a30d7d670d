//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;
mod file;
mod suite;

pub use env::{print_env_help, EnvConfig, ENV_PREFIX};
pub use file::{expand_path, ConfigFile};
pub use suite::SuiteRegistry;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::{ModuleLoader, DEFAULT_RESOURCE_PACKAGE};
use crate::payload::{DisplayMode, DisplayModes, FixedDisplayModes, SystemDisplayModes};

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Directory containing the engine module (library search path when unset)
    pub engine_dir: Option<String>,

    /// Engine module file name (platform default when unset)
    pub module_name: Option<String>,

    /// Resource package handed to the engine
    pub resource_path: String,

    /// Where stored runs are kept (platform data directory when unset)
    pub results_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Default output format
    pub output_format: String,

    /// Display modes to use instead of the ones the system reports
    pub display_modes: Vec<DisplayMode>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine_dir: None,
            module_name: None,
            resource_path: DEFAULT_RESOURCE_PACKAGE.to_string(),
            results_dir: None,
            log_level: "info".to_string(),
            output_format: "table".to_string(),
            display_modes: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Apply environment variable overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(dir) = &env.engine_dir {
            self.engine_dir = Some(dir.clone());
        }
        if let Some(resource) = &env.resource_path {
            self.resource_path = resource.clone();
        }
        if let Some(dir) = &env.results_dir {
            self.results_dir = Some(dir.clone());
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = &env.format {
            self.output_format = format.clone();
        }
    }

    /// Loader for the configured engine module
    pub fn module_loader(&self) -> ModuleLoader {
        let engine_dir = self.engine_dir.as_deref().map(expand_path);
        ModuleLoader::in_dir(engine_dir.as_deref(), self.module_name.as_deref())
    }

    pub fn resource_path(&self) -> PathBuf {
        expand_path(&self.resource_path)
    }

    pub fn results_dir(&self) -> Option<PathBuf> {
        self.results_dir.as_deref().map(expand_path)
    }

    /// Configured display modes, or the system's when none are configured
    pub fn display_modes(&self) -> Box<dyn DisplayModes> {
        if self.display_modes.is_empty() {
            Box::new(SystemDisplayModes)
        } else {
            Box::new(FixedDisplayModes::new(self.display_modes.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.resource_path, "GLVIEW.RMX");
        assert_eq!(config.log_level, "info");
        assert!(config.engine_dir.is_none());
    }

    #[test]
    fn test_apply_env() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            engine_dir: Some("/opt/glview".to_string()),
            format: Some("json".to_string()),
            ..Default::default()
        };
        config.apply_env(&env);

        assert_eq!(config.engine_dir.as_deref(), Some("/opt/glview"));
        assert_eq!(config.output_format, "json");
        assert_eq!(config.resource_path, "GLVIEW.RMX");
    }

    #[test]
    fn test_module_loader_uses_engine_dir() {
        let config = AppConfig {
            engine_dir: Some("/opt/glview".to_string()),
            module_name: Some("infogl.dll".to_string()),
            ..Default::default()
        };
        let loader = config.module_loader();
        assert_eq!(loader.module_path(), Path::new("/opt/glview/infogl.dll"));
    }

    #[test]
    fn test_display_mode_override() {
        let config = AppConfig {
            display_modes: vec![DisplayMode::new(800, 600), DisplayMode::new(1024, 768)],
            ..Default::default()
        };
        assert_eq!(config.display_modes().find(1024, 768), 1);
        assert_eq!(config.display_modes().find(640, 480), -1);
    }
}
