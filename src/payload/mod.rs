//! Engine payload construction
//!
//! Translates test configurations into the markup document consumed by the
//! rendering engine.

mod display;
mod options;
mod serializer;

pub use display::{DisplayMode, DisplayModes, FixedDisplayModes, SystemDisplayModes};
pub use serializer::{Payload, PayloadSerializer};
