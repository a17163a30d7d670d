//! In-process engine doubles for tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{
    CpuInfo, EngineError, EngineLoader, RawResultChain, RawTestRecord, RenderingEngine,
};
use crate::payload::Payload;

/// Calls observed by a `FakeEngine`
#[derive(Debug, Default)]
pub struct FakeLog {
    pub loads: usize,
    pub resource_paths: Vec<PathBuf>,
    pub payloads: Vec<String>,
    pub capability_queries: usize,
}

/// Scripted engine. Replies are consumed in order; once exhausted every
/// invocation succeeds with a single 60 FPS record.
pub struct FakeEngine {
    log: Rc<RefCell<FakeLog>>,
    replies: VecDeque<Result<RawResultChain, EngineError>>,
    init_code: Option<i32>,
    cpu: CpuInfo,
}

impl RenderingEngine for FakeEngine {
    fn query_capabilities(&self) -> CpuInfo {
        self.log.borrow_mut().capability_queries += 1;
        self.cpu.clone()
    }

    fn initialize_resources(&mut self, resource_path: &Path) -> Result<(), EngineError> {
        self.log
            .borrow_mut()
            .resource_paths
            .push(resource_path.to_path_buf());
        match self.init_code {
            Some(code) => Err(EngineError::ResourceInitFailed {
                path: resource_path.display().to_string(),
                code,
            }),
            None => Ok(()),
        }
    }

    fn invoke(&mut self, payload: &Payload) -> Result<RawResultChain, EngineError> {
        let call = {
            let mut log = self.log.borrow_mut();
            log.payloads.push(payload.as_str().to_string());
            log.payloads.len() as i32 - 1
        };
        self.replies.pop_front().unwrap_or_else(|| {
            Ok(RawResultChain::new(vec![RawTestRecord::new(
                call,
                10,
                60.0,
                Some("OK"),
            )]))
        })
    }
}

/// Loader handing out one `FakeEngine`
pub struct FakeLoader {
    pub log: Rc<RefCell<FakeLog>>,
    replies: RefCell<Option<VecDeque<Result<RawResultChain, EngineError>>>>,
    load_error: Option<EngineError>,
    init_code: Option<i32>,
    cpu: CpuInfo,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(FakeLog::default())),
            replies: RefCell::new(Some(VecDeque::new())),
            load_error: None,
            init_code: None,
            cpu: CpuInfo::default(),
        }
    }

    pub fn with_reply(self, reply: Result<RawResultChain, EngineError>) -> Self {
        if let Some(replies) = self.replies.borrow_mut().as_mut() {
            replies.push_back(reply);
        }
        self
    }

    pub fn with_record(self, index: i32, fps: f32, status: &str) -> Self {
        self.with_reply(Ok(RawResultChain::new(vec![RawTestRecord::new(
            index,
            10,
            fps,
            Some(status),
        )])))
    }

    pub fn unavailable(mut self) -> Self {
        self.load_error = Some(EngineError::EngineUnavailable {
            path: "fake".to_string(),
            reason: "not installed".to_string(),
        });
        self
    }

    pub fn with_init_failure(mut self, code: i32) -> Self {
        self.init_code = Some(code);
        self
    }

    pub fn with_cpu(mut self, cpu: CpuInfo) -> Self {
        self.cpu = cpu;
        self
    }
}

impl EngineLoader for FakeLoader {
    type Engine = FakeEngine;

    fn load(&self) -> Result<FakeEngine, EngineError> {
        self.log.borrow_mut().loads += 1;
        if let Some(err) = &self.load_error {
            return Err(err.clone());
        }
        Ok(FakeEngine {
            log: Rc::clone(&self.log),
            replies: self.replies.borrow_mut().take().unwrap_or_default(),
            init_code: self.init_code,
            cpu: self.cpu.clone(),
        })
    }

    fn describe(&self) -> String {
        "fake engine".to_string()
    }
}
