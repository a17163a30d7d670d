//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RENDER_TESTER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Engine directory from RENDER_TESTER_ENGINE_DIR
    pub engine_dir: Option<String>,
    /// Resource package from RENDER_TESTER_RESOURCE
    pub resource_path: Option<String>,
    /// Config file from RENDER_TESTER_CONFIG
    pub config_file: Option<String>,
    /// Output format from RENDER_TESTER_FORMAT
    pub format: Option<String>,
    /// Results directory from RENDER_TESTER_RESULTS_DIR
    pub results_dir: Option<String>,
    /// Log level from RENDER_TESTER_LOG
    pub log_level: Option<String>,
    /// Test duration override from RENDER_TESTER_DURATION
    pub duration: Option<u32>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            engine_dir: get_env("ENGINE_DIR"),
            resource_path: get_env("RESOURCE"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
            results_dir: get_env("RESULTS_DIR"),
            log_level: get_env("LOG"),
            duration: get_env_parse("DURATION"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.engine_dir.is_some()
            || self.resource_path.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
            || self.results_dir.is_some()
            || self.log_level.is_some()
            || self.duration.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_ENGINE_DIR:  {:?}", ENV_PREFIX, self.engine_dir);
        println!("  {}_RESOURCE:    {:?}", ENV_PREFIX, self.resource_path);
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_FORMAT:      {:?}", ENV_PREFIX, self.format);
        println!("  {}_RESULTS_DIR: {:?}", ENV_PREFIX, self.results_dir);
        println!("  {}_LOG:         {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_DURATION:    {:?}", ENV_PREFIX, self.duration);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Builder for setting environment variables in tests
#[cfg(test)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    pub fn engine_dir(self, dir: impl Into<String>) -> Self {
        self.var("ENGINE_DIR", dir)
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.var("FORMAT", format)
    }

    pub fn duration(self, secs: impl ToString) -> Self {
        self.var("DURATION", secs.to_string())
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all RENDER_TESTER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_ENGINE_DIR   Directory containing the engine module");
    println!("  {ENV_PREFIX}_RESOURCE     Resource package path (default GLVIEW.RMX)");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_FORMAT       Output format (table, json, json-pretty, csv, summary)");
    println!("  {ENV_PREFIX}_RESULTS_DIR  Directory for stored runs");
    println!("  {ENV_PREFIX}_LOG          Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_DURATION     Default test duration in seconds");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_ENGINE_DIR=C:\\glview");
    println!("  render-tester suite basic");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.engine_dir.is_none());
        assert!(!config.has_any());
        assert!(config.duration.is_none());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .engine_dir("/opt/glview")
            .format("json")
            .duration(7)
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.engine_dir, Some("/opt/glview".to_string()));
        assert_eq!(config.format, Some("json".to_string()));
        assert_eq!(config.duration, Some(7));
        assert!(config.has_any());
    }

    #[test]
    fn test_has_any() {
        let with_dir = EnvConfig {
            results_dir: Some("/tmp/results".to_string()),
            ..Default::default()
        };
        assert!(with_dir.has_any());
    }
}
