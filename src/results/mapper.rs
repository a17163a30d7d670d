//! Engine result mapping
//!
//! Converts copied engine result chains into `TestResult` values.

use crate::engine::{EngineError, RawResultChain, RawTestRecord};
use crate::models::TestResult;

/// Maps engine result chains to test results
pub struct ResultMapper;

impl ResultMapper {
    /// Result of the head record. An absent chain, an empty chain, or a head
    /// record without a status all map to "No test results returned".
    pub fn map(chain: Option<&RawResultChain>) -> TestResult {
        match chain.and_then(RawResultChain::head) {
            Some(record) => Self::map_record(record),
            None => Self::no_result(),
        }
    }

    /// One result per record, in chain order
    pub fn map_all(chain: Option<&RawResultChain>) -> Vec<TestResult> {
        match chain {
            Some(chain) if !chain.is_empty() => {
                chain.records().iter().map(Self::map_record).collect()
            }
            _ => vec![Self::no_result()],
        }
    }

    pub fn map_record(record: &RawTestRecord) -> TestResult {
        match record.outcome() {
            Ok(fps) => TestResult::pass(record.index, f64::from(fps)),
            Err(EngineError::NoResultReturned) => Self::no_result(),
            Err(EngineError::TestFailed { index, status }) => TestResult::fail(Some(index), status),
            Err(other) => TestResult::fail(Some(record.index), other.to_string()),
        }
        .with_duration(record.duration)
    }

    /// Failed result for an engine-level error
    pub fn from_error(error: &EngineError) -> TestResult {
        match error {
            EngineError::TestFailed { index, status } => {
                TestResult::fail(Some(*index), status.clone())
            }
            other => TestResult::fail(None, other.to_string()),
        }
    }

    fn no_result() -> TestResult {
        TestResult::fail(None, EngineError::NoResultReturned.to_string())
    }
}
