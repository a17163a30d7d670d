//! Rendering engine access
//!
//! The engine is a native module exposing three entry points: processor
//! identification, resource package initialization, and test execution.
//! `RenderingEngine` is the seam between the host and that module;
//! `DynamicEngine` is the real implementation.

mod dpi;
mod ffi;
mod module;

#[cfg(test)]
pub(crate) mod testing;

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::payload::Payload;

pub use module::ModuleLoader;

/// Status string the engine reports for a successful test
pub const STATUS_OK: &str = "OK";

/// Default resource package file name
pub const DEFAULT_RESOURCE_PACKAGE: &str = "GLVIEW.RMX";

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine module unavailable at {path}: {reason}")]
    EngineUnavailable { path: String, reason: String },

    #[error("Failed to initialize resource package {path} (code {code})")]
    ResourceInitFailed { path: String, code: i32 },

    #[error("No test results returned")]
    NoResultReturned,

    #[error("Test {index} failed: {status}")]
    TestFailed { index: i32, status: String },

    #[error("Payload contains a NUL byte at offset {0}")]
    InvalidPayload(usize),

    #[error("Path cannot be passed to the engine: {0}")]
    InvalidPath(String),
}

/// One record of an engine result chain, copied out of engine memory
#[derive(Debug, Clone, PartialEq)]
pub struct RawTestRecord {
    pub index: i32,
    pub duration: i32,
    pub fps: f32,
    pub status: Option<String>,
}

impl RawTestRecord {
    #[cfg(test)]
    pub fn new(index: i32, duration: i32, fps: f32, status: Option<&str>) -> Self {
        Self {
            index,
            duration,
            fps,
            status: status.map(str::to_string),
        }
    }

    /// Frame rate on success, the reported status otherwise
    pub fn outcome(&self) -> Result<f32, EngineError> {
        match self.status.as_deref() {
            Some(STATUS_OK) => Ok(self.fps),
            Some(status) => Err(EngineError::TestFailed {
                index: self.index,
                status: status.to_string(),
            }),
            None => Err(EngineError::NoResultReturned),
        }
    }
}

/// Owned copy of the engine's result chain, in chain order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResultChain {
    records: Vec<RawTestRecord>,
}

impl RawResultChain {
    pub fn new(records: Vec<RawTestRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RawTestRecord] {
        &self.records
    }

    pub fn head(&self) -> Option<&RawTestRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Host processor description reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuInfo {
    pub name: Option<String>,
    pub code_name: Option<String>,
    pub package: Option<String>,
    pub vendor_name: Option<String>,
    pub specification: Option<String>,
    pub technology: Option<String>,
    pub instructions: Option<String>,
    pub max_tdp: i32,
    pub stepping: i32,
    pub revision: i32,
    pub model: i32,
    pub family: i32,
    pub ext_model: i32,
    pub ext_family: i32,
    pub signature: i32,
    pub freq_ghz: i32,
    pub freq_mhz: i32,
    pub ram_bytes: i32,
    pub cores: i32,
    pub threads: i32,
}

/// Operations the host needs from a rendering engine
pub trait RenderingEngine {
    /// Processor identification
    fn query_capabilities(&self) -> CpuInfo;

    /// Load the resource package. Must succeed before `invoke`.
    fn initialize_resources(&mut self, resource_path: &Path) -> Result<(), EngineError>;

    /// Run the tests described by `payload` and copy out the result chain
    fn invoke(&mut self, payload: &Payload) -> Result<RawResultChain, EngineError>;
}

/// Produces an engine on first use
pub trait EngineLoader {
    type Engine: RenderingEngine;

    fn load(&self) -> Result<Self::Engine, EngineError>;

    /// Human readable location of the engine
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcome() {
        let ok = RawTestRecord::new(3, 20, 59.97, Some("OK"));
        assert_eq!(ok.outcome(), Ok(59.97));

        let lost = RawTestRecord::new(1, 20, 0.0, Some("DEVICE_LOST"));
        assert_eq!(
            lost.outcome(),
            Err(EngineError::TestFailed {
                index: 1,
                status: "DEVICE_LOST".to_string()
            })
        );

        let missing = RawTestRecord::new(0, 0, 0.0, None);
        assert_eq!(missing.outcome(), Err(EngineError::NoResultReturned));
    }

    #[test]
    fn test_status_is_case_sensitive() {
        let record = RawTestRecord::new(0, 10, 30.0, Some("ok"));
        assert!(record.outcome().is_err());
    }

    #[test]
    fn test_chain_head() {
        let chain = RawResultChain::new(vec![
            RawTestRecord::new(0, 5, 10.0, Some("OK")),
            RawTestRecord::new(1, 5, 20.0, Some("OK")),
        ]);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.head().map(|r| r.index), Some(0));
        assert!(RawResultChain::default().head().is_none());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EngineError::NoResultReturned.to_string(),
            "No test results returned"
        );
        let err = EngineError::ResourceInitFailed {
            path: "GLVIEW.RMX".to_string(),
            code: -2,
        };
        assert!(err.to_string().contains("GLVIEW.RMX"));
    }
}
