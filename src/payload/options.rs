//! Engine option bits
//!
//! The full option table of the engine. The host only ever sets the bits
//! that map to a `TestConfig` flag; the rest are listed so the reserved
//! positions stay visible.

use bitflags::bitflags;

use crate::models::TestConfig;

bitflags! {
    /// Value of the `option` payload element
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EngineOptions: u32 {
        const ANISO = 1;
        const MULTISAMPLE = 1 << 1;
        const PBUFFER = 1 << 2;
        const MULTISAMPLE_HINT = 1 << 3;
        const LOD_BIAS = 1 << 4;
        const FOG = 1 << 5;
        const FBO = 1 << 6;
        const ARGB = 1 << 7;
        const FB_FLOAT32 = 1 << 8;
        const CLIP_PLANE = 1 << 10;
        const FULLSCREEN = 1 << 11;
        const VSYNC = 1 << 12;
        const TRANSPARENCY = 1 << 13;
        const MIPMAP = 1 << 14;
        const RETINA_DISPLAY = 1 << 15;
        const MP_ENGINE = 1 << 16;
        const INSTANCING = 1 << 17;
        const VBUM = 1 << 18;
        const DEBUG = 1 << 20;
    }
}

impl EngineOptions {
    /// Bits the host derives from test configuration flags
    pub const HOST_CONTROLLED: EngineOptions = EngineOptions::FULLSCREEN
        .union(EngineOptions::DEBUG)
        .union(EngineOptions::VSYNC)
        .union(EngineOptions::FOG)
        .union(EngineOptions::TRANSPARENCY)
        .union(EngineOptions::CLIP_PLANE);

    pub fn from_config(config: &TestConfig) -> Self {
        let mut options = EngineOptions::empty();
        options.set(EngineOptions::FULLSCREEN, config.fullscreen);
        options.set(EngineOptions::DEBUG, config.debug_output);
        options.set(EngineOptions::VSYNC, config.vsync);
        options.set(EngineOptions::FOG, config.fog);
        options.set(EngineOptions::TRANSPARENCY, config.transparency);
        options.set(EngineOptions::CLIP_PLANE, config.user_clip_plane);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_zero() {
        assert_eq!(EngineOptions::from_config(&TestConfig::default()).bits(), 0);
    }

    #[test]
    fn test_mask_is_sum_of_set_flags() {
        let bits = [
            1u32 << 11, // fullscreen
            1 << 20,    // debug
            1 << 12,    // vsync
            1 << 5,     // fog
            1 << 13,    // transparency
            1 << 10,    // user clip plane
        ];

        for combo in 0u32..64 {
            let on = |n: u32| combo & (1 << n) != 0;
            let config = TestConfig {
                fullscreen: on(0),
                debug_output: on(1),
                vsync: on(2),
                fog: on(3),
                transparency: on(4),
                user_clip_plane: on(5),
                ..TestConfig::default()
            };

            let expected: u32 = (0..6).filter(|&n| on(n)).map(|n| bits[n as usize]).sum();
            let options = EngineOptions::from_config(&config);

            assert_eq!(options.bits(), expected, "flag combination {combo:#08b}");
            assert!(EngineOptions::HOST_CONTROLLED.contains(options));
        }
    }

    #[test]
    fn test_reserved_bits_are_not_defined() {
        assert!(EngineOptions::from_bits(1 << 9).is_none());
        assert!(EngineOptions::from_bits(1 << 19).is_none());
    }
}
