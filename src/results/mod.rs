//! Results module
//!
//! Maps engine output to test results and provides persistent storage and
//! report generation for runs.

mod mapper;
mod report;
mod storage;

pub use mapper::ResultMapper;
pub use report::{ReportFormat, ReportGenerator};
pub use storage::{ExportFormat, ResultsStorage, RunInfo, StoredRun};
