//! Test execution runner
//!
//! Owns the engine for the lifetime of a session and turns test
//! configurations into results, one at a time.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::engine::{
    CpuInfo, EngineError, EngineLoader, RawResultChain, RenderingEngine, DEFAULT_RESOURCE_PACKAGE,
};
use crate::models::{TestConfig, TestResult};
use crate::payload::{DisplayModes, PayloadSerializer, SystemDisplayModes};
use crate::results::ResultMapper;
use crate::utils::timer::Timer;

/// Returned by `cpu_specification` before the engine has reported anything
pub const CPU_INFO_UNAVAILABLE: &str = "CPU information not available";

/// Progress callback: (completed, total, latest result)
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize, &TestResult);

/// Sequential test runner
pub struct TestRunner<L: EngineLoader> {
    loader: L,
    resource_path: PathBuf,
    display_modes: Box<dyn DisplayModes>,
    engine: Option<L::Engine>,
    cpu: Option<CpuInfo>,
    last_error: Option<EngineError>,
}

impl<L: EngineLoader> TestRunner<L> {
    /// Create a runner. The engine is not loaded until first needed.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            resource_path: PathBuf::from(DEFAULT_RESOURCE_PACKAGE),
            display_modes: Box::new(SystemDisplayModes),
            engine: None,
            cpu: None,
            last_error: None,
        }
    }

    pub fn with_resource_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resource_path = path.into();
        self
    }

    pub fn with_display_modes(mut self, modes: Box<dyn DisplayModes>) -> Self {
        self.display_modes = modes;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    /// Load the engine and its resource package. Does nothing once
    /// initialization has succeeded.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.is_initialized() {
            return Ok(());
        }

        info!("Initializing engine from {}", self.loader.describe());
        match self.load_engine() {
            Ok((engine, cpu)) => {
                self.engine = Some(engine);
                self.cpu = Some(cpu);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Engine initialization failed: {}", e);
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// CPU information is only kept once the resource package is loaded.
    fn load_engine(&self) -> Result<(L::Engine, CpuInfo), EngineError> {
        let mut engine = self.loader.load()?;

        let cpu = engine.query_capabilities();
        debug!(
            "CPU: {}",
            cpu.specification.as_deref().unwrap_or(CPU_INFO_UNAVAILABLE)
        );

        engine.initialize_resources(&self.resource_path)?;
        info!("Resource package {} ready", self.resource_path.display());
        Ok((engine, cpu))
    }

    /// Run a single test. Every failure is reported through the result.
    pub fn run_one(&mut self, config: &TestConfig) -> TestResult {
        match self.execute(config) {
            Ok(chain) => {
                let result = ResultMapper::map(Some(&chain));
                log_result(config, &result);
                result
            }
            Err(result) => result,
        }
    }

    /// Run a single test and report every record the engine returned
    pub fn run_one_detailed(&mut self, config: &TestConfig) -> Vec<TestResult> {
        match self.execute(config) {
            Ok(chain) => {
                let results = ResultMapper::map_all(Some(&chain));
                for result in &results {
                    log_result(config, result);
                }
                results
            }
            Err(result) => vec![result],
        }
    }

    /// Run tests strictly in order, reporting progress after each one
    pub fn run_many(
        &mut self,
        configs: &[TestConfig],
        mut progress: Option<ProgressFn<'_>>,
    ) -> Vec<TestResult> {
        let total = configs.len();
        info!("Running {} tests", total);

        let mut results = Vec::with_capacity(total);
        for (i, config) in configs.iter().enumerate() {
            let result = self.run_one(config);
            if let Some(callback) = progress.as_deref_mut() {
                callback(i + 1, total, &result);
            }
            results.push(result);
        }

        let passed = results.iter().filter(|r| r.passed).count();
        info!("Completed {} tests: {}/{} passed", total, passed, total);
        results
    }

    fn execute(&mut self, config: &TestConfig) -> Result<RawResultChain, TestResult> {
        if let Err(e) = config.validate() {
            warn!("Rejected configuration {}: {}", config.describe(), e);
            return Err(TestResult::fail(None, format!("Invalid configuration: {e}")));
        }

        if let Err(e) = self.initialize() {
            return Err(ResultMapper::from_error(&e));
        }

        let payload = PayloadSerializer::new(&*self.display_modes).serialize(config);
        debug!("Payload:\n{}", payload);

        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return Err(TestResult::fail(None, "Engine not initialized")),
        };

        info!("Running {}", config.describe());
        let timer = Timer::start(config.describe());
        let outcome = engine.invoke(&payload);
        timer.stop();

        outcome.map_err(|e| {
            error!("Test {} failed with error: {}", config.describe(), e);
            ResultMapper::from_error(&e)
        })
    }

    /// Processor information reported during initialization
    pub fn cpu_info(&self) -> Option<&CpuInfo> {
        self.cpu.as_ref()
    }

    pub fn cpu_specification(&self) -> String {
        self.cpu
            .as_ref()
            .and_then(|cpu| cpu.specification.clone())
            .unwrap_or_else(|| CPU_INFO_UNAVAILABLE.to_string())
    }
}

fn log_result(config: &TestConfig, result: &TestResult) {
    if result.passed {
        info!("  {} [{}]", result, config.renderer);
    } else {
        error!("  {} [{}]", result, config.renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeLoader;
    use crate::engine::RawTestRecord;
    use crate::models::{RendererType, SceneType};
    use crate::payload::{DisplayMode, FixedDisplayModes};

    fn runner(loader: FakeLoader) -> TestRunner<FakeLoader> {
        TestRunner::new(loader).with_display_modes(Box::new(FixedDisplayModes::new(vec![
            DisplayMode::new(1920, 1080),
        ])))
    }

    #[test]
    fn test_lazy_initialization() {
        let mut runner = runner(FakeLoader::new());
        assert!(!runner.is_initialized());
        assert_eq!(runner.loader.log.borrow().loads, 0);

        let result = runner.run_one(&TestConfig::default());
        assert!(result.passed);
        assert!(runner.is_initialized());

        runner.run_one(&TestConfig::default());
        let log = runner.loader.log.borrow();
        assert_eq!(log.loads, 1);
        assert_eq!(log.resource_paths, vec![PathBuf::from("GLVIEW.RMX")]);
        assert_eq!(log.payloads.len(), 2);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut runner = runner(FakeLoader::new());
        assert!(runner.initialize().is_ok());
        assert!(runner.initialize().is_ok());
        assert_eq!(runner.loader.log.borrow().loads, 1);
    }

    #[test]
    fn test_passes_payload_to_engine() {
        let mut runner = runner(FakeLoader::new());
        let config = TestConfig::default()
            .with_renderer(RendererType::Vulkan11)
            .with_scene(SceneType::Character);
        runner.run_one(&config);

        let log = runner.loader.log.borrow();
        let payload = &log.payloads[0];
        assert!(payload.contains("<renderer>14</renderer>"));
        assert!(payload.contains("<scene>2</scene>"));
        assert!(payload.contains("<displaymode>0</displaymode>"));
    }

    #[test]
    fn test_unavailable_engine_becomes_failed_result() {
        let mut runner = runner(FakeLoader::new().unavailable());
        let result = runner.run_one(&TestConfig::default());

        assert!(!result.passed);
        assert_eq!(result.test_index, None);
        assert!(result.error_message.contains("not installed"));
        assert!(matches!(
            runner.last_error(),
            Some(EngineError::EngineUnavailable { .. })
        ));
    }

    #[test]
    fn test_resource_failure_becomes_failed_result() {
        let mut runner = runner(FakeLoader::new().with_init_failure(-3));
        let result = runner.run_one(&TestConfig::default());

        assert!(!result.passed);
        assert!(result.error_message.contains("code -3"));
        assert!(!runner.is_initialized());
        assert!(runner.loader.log.borrow().payloads.is_empty());
    }

    #[test]
    fn test_no_cpu_info_after_resource_failure() {
        let cpu = CpuInfo {
            specification: Some("X CPU".to_string()),
            ..CpuInfo::default()
        };
        let mut runner = runner(FakeLoader::new().with_cpu(cpu).with_init_failure(-1));
        let result = runner.run_one(&TestConfig::default());

        assert!(!result.passed);
        assert!(!runner.is_initialized());
        assert!(runner.cpu_info().is_none());
        assert_eq!(runner.cpu_specification(), CPU_INFO_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_config_never_reaches_engine() {
        let mut runner = runner(FakeLoader::new());
        let config = TestConfig::default().with_duration(0);
        let result = runner.run_one(&config);

        assert!(!result.passed);
        assert!(result.error_message.starts_with("Invalid configuration"));
        assert_eq!(runner.loader.log.borrow().loads, 0);
    }

    #[test]
    fn test_engine_status_failure() {
        let mut runner = runner(FakeLoader::new().with_record(2, 0.0, "DEVICE_LOST"));
        let result = runner.run_one(&TestConfig::default());

        assert!(!result.passed);
        assert_eq!(result.test_index, Some(2));
        assert_eq!(result.error_message, "DEVICE_LOST");
    }

    #[test]
    fn test_empty_engine_reply() {
        let loader = FakeLoader::new().with_reply(Err(EngineError::NoResultReturned));
        let mut runner = runner(loader);
        let result = runner.run_one(&TestConfig::default());

        assert!(!result.passed);
        assert_eq!(result.test_index, None);
        assert_eq!(result.error_message, "No test results returned");
    }

    #[test]
    fn test_failures_are_not_retried() {
        let mut runner = runner(FakeLoader::new().with_record(0, 0.0, "TIMEOUT"));
        let result = runner.run_one(&TestConfig::default());

        assert!(!result.passed);
        assert_eq!(runner.loader.log.borrow().payloads.len(), 1);
    }

    #[test]
    fn test_run_many_reports_progress() {
        let loader = FakeLoader::new()
            .with_record(0, 120.0, "OK")
            .with_record(1, 0.0, "DEVICE_LOST")
            .with_record(2, 75.5, "OK");
        let mut runner = runner(loader);
        let configs = vec![
            TestConfig::default(),
            TestConfig::performance_preset(),
            TestConfig::quality_preset(),
        ];

        let mut calls = Vec::new();
        let results = {
            let mut record = |done: usize, total: usize, result: &TestResult| {
                calls.push((done, total, result.passed));
            };
            runner.run_many(&configs, Some(&mut record))
        };

        assert_eq!(results.len(), 3);
        assert_eq!(calls, vec![(1, 3, true), (2, 3, false), (3, 3, true)]);
        assert!((results[2].average_fps - 75.5).abs() < 1e-6);
    }

    #[test]
    fn test_run_many_without_callback() {
        let mut runner = runner(FakeLoader::new());
        let results = runner.run_many(&[TestConfig::default(), TestConfig::default()], None);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_run_one_detailed() {
        let chain = RawResultChain::new(vec![
            RawTestRecord::new(0, 10, 100.0, Some("OK")),
            RawTestRecord::new(1, 10, 0.0, Some("TIMEOUT")),
        ]);
        let mut runner = runner(FakeLoader::new().with_reply(Ok(chain)));
        let results = runner.run_one_detailed(&TestConfig::default());

        assert_eq!(results.len(), 2);
        assert!(results[0].passed);
        assert_eq!(results[1].error_message, "TIMEOUT");
    }

    #[test]
    fn test_cpu_specification() {
        let cpu = CpuInfo {
            specification: Some("AMD Ryzen 9 5950X 16-Core Processor".to_string()),
            cores: 16,
            ..CpuInfo::default()
        };
        let mut runner = runner(FakeLoader::new().with_cpu(cpu));
        assert_eq!(runner.cpu_specification(), CPU_INFO_UNAVAILABLE);
        assert!(runner.cpu_info().is_none());

        runner.initialize().unwrap();
        assert_eq!(
            runner.cpu_specification(),
            "AMD Ryzen 9 5950X 16-Core Processor"
        );
        assert_eq!(runner.cpu_info().map(|c| c.cores), Some(16));
    }
}
