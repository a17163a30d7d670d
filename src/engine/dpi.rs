//! Process display-scaling awareness
//!
//! The engine creates its own windows; the process must be per-monitor DPI
//! aware before the first one appears or the OS scales the test output.

use std::sync::Once;

static DPI_AWARENESS: Once = Once::new();

/// Apply the process DPI awareness mode. Runs at most once per process.
pub fn ensure_dpi_awareness() {
    DPI_AWARENESS.call_once(apply);
}

#[cfg(windows)]
fn apply() {
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwareness, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, PROCESS_PER_MONITOR_DPI_AWARE,
    };

    // SAFETY: both calls only change process-wide presentation state.
    unsafe {
        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).as_bool() {
            tracing::debug!("DPI awareness: per-monitor v2");
            return;
        }
        match SetProcessDpiAwareness(PROCESS_PER_MONITOR_DPI_AWARE) {
            Ok(()) => tracing::debug!("DPI awareness: per-monitor"),
            Err(e) => tracing::warn!("Failed to set DPI awareness: {}", e),
        }
    }
}

#[cfg(not(windows))]
fn apply() {
    tracing::debug!("DPI awareness adjustment not required on this platform");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_calls_are_harmless() {
        ensure_dpi_awareness();
        ensure_dpi_awareness();
        assert!(DPI_AWARENESS.is_completed());
    }
}
