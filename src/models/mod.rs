//! Data models for rendering tests
//!
//! Settings, selectors, and results shared by every layer.

mod renderer;
mod test_config;
mod test_result;

pub use renderer::{
    ApiFamily, FramebufferFormat, FramebufferType, RendererType, SceneType, VersionSelection,
};
pub use test_config::TestConfig;
pub use test_result::{TestResult, TestRunSummary};
