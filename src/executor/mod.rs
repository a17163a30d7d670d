//! Test execution
//!
//! Drives the engine one test at a time.

mod runner;

pub use runner::{ProgressFn, TestRunner};
