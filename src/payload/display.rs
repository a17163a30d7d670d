//! Display mode lookup
//!
//! Resolves a requested resolution to the index of a system display mode.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Index emitted when no display mode matches
pub const DISPLAY_MODE_NOT_FOUND: i32 = -1;

/// A display resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
}

impl DisplayMode {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Source of the enumerated display modes
pub trait DisplayModes {
    /// Modes in enumeration order
    fn modes(&self) -> Vec<DisplayMode>;

    /// Index of the first mode matching `width` x `height`, or -1
    fn find(&self, width: u32, height: u32) -> i32 {
        self.modes()
            .iter()
            .position(|m| m.width == width && m.height == height)
            .map(|i| i as i32)
            .unwrap_or(DISPLAY_MODE_NOT_FOUND)
    }
}

/// Fixed list of display modes, from configuration or tests
#[derive(Clone, Debug, Default)]
pub struct FixedDisplayModes {
    modes: Vec<DisplayMode>,
}

impl FixedDisplayModes {
    pub fn new(modes: Vec<DisplayMode>) -> Self {
        Self { modes }
    }
}

impl DisplayModes for FixedDisplayModes {
    fn modes(&self) -> Vec<DisplayMode> {
        self.modes.clone()
    }
}

/// Display modes reported by the operating system
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemDisplayModes;

impl DisplayModes for SystemDisplayModes {
    #[cfg(windows)]
    fn modes(&self) -> Vec<DisplayMode> {
        use windows::core::PCWSTR;
        use windows::Win32::Graphics::Gdi::{
            EnumDisplaySettingsW, DEVMODEW, ENUM_DISPLAY_SETTINGS_MODE,
        };

        let mut modes = Vec::new();
        let mut devmode = DEVMODEW {
            dmSize: std::mem::size_of::<DEVMODEW>() as u16,
            ..Default::default()
        };

        let mut index = 0u32;
        // SAFETY: devmode is a properly sized DEVMODEW owned by this frame.
        while unsafe {
            EnumDisplaySettingsW(PCWSTR::null(), ENUM_DISPLAY_SETTINGS_MODE(index), &mut devmode)
        }
        .as_bool()
        {
            modes.push(DisplayMode::new(devmode.dmPelsWidth, devmode.dmPelsHeight));
            index += 1;
        }

        tracing::debug!("Enumerated {} display modes", modes.len());
        modes
    }

    #[cfg(not(windows))]
    fn modes(&self) -> Vec<DisplayMode> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_first_match() {
        let modes = FixedDisplayModes::new(vec![
            DisplayMode::new(1280, 720),
            DisplayMode::new(1920, 1080),
            DisplayMode::new(1920, 1080),
        ]);
        assert_eq!(modes.find(1280, 720), 0);
        assert_eq!(modes.find(1920, 1080), 1);
    }

    #[test]
    fn test_find_no_match() {
        let modes = FixedDisplayModes::new(vec![DisplayMode::new(1280, 720)]);
        assert_eq!(modes.find(3840, 2160), DISPLAY_MODE_NOT_FOUND);
        assert_eq!(FixedDisplayModes::default().find(1920, 1080), -1);
    }
}
