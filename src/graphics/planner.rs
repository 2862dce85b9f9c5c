//! Screen size and render frame planning.
//!
//! Both planners are pure: the largest display size is passed in, so the
//! same inputs always give the same answer regardless of backend state.

use crate::graphics::driver::DeviceQuery;
use crate::graphics::geometry::{proportional_stretch, scale_by_fixed, Rect, Size, SCALE_SHIFT, SCALE_UNIT};
use crate::graphics::mode::{DisplayModeSetup, FrameScaleDef, GameFrameSetup, ScreenSizeDef};

/// Largest usable display size: the desktop resolution, clamped to the
/// platform's window limits when `windowed`.
///
/// An unreadable desktop resolution yields the null size.
pub fn max_display_size(device: &dyn DeviceQuery, windowed: bool) -> Size {
    let desktop = match device.desktop_size() {
        Ok(size) => size,
        Err(err) => {
            log::error!("{}", err);
            return Size::default();
        }
    };
    if windowed {
        device.clamp_window_size(desktop, false)
    } else {
        desktop
    }
}

/// Size of the game frame when the native `game_size` is scaled into
/// `screen_size` according to `setup`.
///
/// Integer scales that would not fit on screen fall back to the largest
/// proportional fit.
pub fn plan_frame_size(game_size: Size, screen_size: Size, setup: &GameFrameSetup) -> Size {
    if game_size.is_empty() {
        return Size::default();
    }

    match setup.scale_def {
        FrameScaleDef::MaxStretch => screen_size,
        FrameScaleDef::MaxProportional => proportional_stretch(screen_size, game_size),
        FrameScaleDef::IntScale | FrameScaleDef::MaxRound => {
            let mut scale = if setup.scale_def == FrameScaleDef::MaxRound {
                let scale_w = (screen_size.width / game_size.width) << SCALE_SHIFT;
                let scale_h = (screen_size.height / game_size.height) << SCALE_SHIFT;
                scale_w.min(scale_h)
            } else {
                setup.scale_factor
            };
            if scale <= 0 {
                scale = SCALE_UNIT;
            }

            let frame = Size::new(
                scale_by_fixed(game_size.width, scale),
                scale_by_fixed(game_size.height, scale),
            );
            if frame.exceeds_by_any(screen_size) {
                proportional_stretch(screen_size, game_size)
            } else {
                frame
            }
        }
    }
}

/// Frame planned by [`plan_frame_size`], centered on a screen of
/// `screen_size`.
pub fn plan_render_rect(game_size: Size, screen_size: Size, setup: &GameFrameSetup) -> Rect {
    let frame = plan_frame_size(game_size, screen_size, setup);
    Rect::center_in(Rect::from_size(screen_size), Rect::from_size(frame))
}

/// Screen (window) size wanted by `mode_setup` before any backend is
/// consulted.
pub fn plan_screen_size(
    game_size: Size,
    mode_setup: &DisplayModeSetup,
    frame_setup: &GameFrameSetup,
    max_display: Size,
) -> Size {
    match mode_setup.size_def {
        ScreenSizeDef::Explicit => {
            let mut screen = mode_setup.size;
            if screen.width <= 0 || screen.height <= 0 {
                let frame = plan_frame_size(game_size, max_display, frame_setup);
                if screen.width <= 0 {
                    screen.width = frame.width;
                }
                if screen.height <= 0 {
                    screen.height = frame.height;
                }
            }
            screen
        }
        ScreenSizeDef::ByGameScaling => plan_frame_size(game_size, max_display, frame_setup),
        ScreenSizeDef::MaxDisplay => max_display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::driver::{DriverError, DriverResult};
    use proptest::prelude::*;
    use rstest::rstest;

    const GAME: Size = Size::new(320, 200);

    fn frame(def: FrameScaleDef, factor: i32) -> GameFrameSetup {
        GameFrameSetup::new(def, factor)
    }

    struct FixedDevice {
        desktop: Option<Size>,
        window_limit: Size,
    }

    impl DeviceQuery for FixedDevice {
        fn desktop_size(&self) -> DriverResult<Size> {
            self.desktop
                .ok_or_else(|| DriverError::DesktopQuery("no display".into()))
        }

        fn clamp_window_size(&self, size: Size, _fullscreen: bool) -> Size {
            Size::new(
                size.width.min(self.window_limit.width),
                size.height.min(self.window_limit.height),
            )
        }
    }

    #[test]
    fn test_max_round_fits() {
        let size = plan_frame_size(GAME, Size::new(1920, 1080), &frame(FrameScaleDef::MaxRound, 0));
        assert_eq!(size, Size::new(1600, 1000));
    }

    #[test]
    fn test_max_round_small_screen_and_centering() {
        let setup = frame(FrameScaleDef::MaxRound, 0);
        let screen = Size::new(330, 210);
        assert_eq!(plan_frame_size(GAME, screen, &setup), GAME);
        assert_eq!(
            plan_render_rect(GAME, screen, &setup),
            Rect::new(5, 5, 325, 205)
        );
    }

    #[test]
    fn test_max_round_screen_smaller_than_game() {
        // Scale rounds to zero, is clamped to 1x, and 1x does not fit.
        let size = plan_frame_size(GAME, Size::new(300, 300), &frame(FrameScaleDef::MaxRound, 0));
        assert_eq!(size, Size::new(300, 187));
    }

    #[rstest]
    #[case(FrameScaleDef::MaxStretch, 0, Size::new(1920, 1080))]
    #[case(FrameScaleDef::MaxProportional, 0, Size::new(1728, 1080))]
    #[case(FrameScaleDef::IntScale, 2 * SCALE_UNIT, Size::new(640, 400))]
    #[case(FrameScaleDef::IntScale, SCALE_UNIT / 2, Size::new(160, 100))]
    #[case(FrameScaleDef::IntScale, 10 * SCALE_UNIT, Size::new(1728, 1080))]
    fn test_frame_policies(#[case] def: FrameScaleDef, #[case] factor: i32, #[case] expected: Size) {
        let size = plan_frame_size(GAME, Size::new(1920, 1080), &frame(def, factor));
        assert_eq!(size, expected);
    }

    #[test]
    fn test_int_scale_non_positive_clamped() {
        // Invalid setups are rejected before planning, but the planner itself
        // still falls back to 1x.
        let size = plan_frame_size(GAME, Size::new(1920, 1080), &frame(FrameScaleDef::IntScale, 0));
        assert_eq!(size, GAME);
    }

    #[test]
    fn test_empty_game_size() {
        let size = plan_frame_size(Size::default(), Size::new(800, 600), &frame(FrameScaleDef::MaxRound, 0));
        assert!(size.is_null());
    }

    #[test]
    fn test_screen_size_explicit() {
        let setup = DisplayModeSetup {
            size_def: ScreenSizeDef::Explicit,
            size: Size::new(1024, 768),
            ..DisplayModeSetup::default()
        };
        let screen = plan_screen_size(GAME, &setup, &frame(FrameScaleDef::MaxRound, 0), Size::new(1920, 1080));
        assert_eq!(screen, Size::new(1024, 768));
    }

    #[test]
    fn test_screen_size_explicit_fills_unset_dimension() {
        let max = Size::new(1920, 1080);
        let round = frame(FrameScaleDef::MaxRound, 0);

        let null = DisplayModeSetup::default();
        assert_eq!(plan_screen_size(GAME, &null, &round, max), Size::new(1600, 1000));

        let width_only = DisplayModeSetup {
            size: Size::new(1280, 0),
            ..DisplayModeSetup::default()
        };
        assert_eq!(plan_screen_size(GAME, &width_only, &round, max), Size::new(1280, 1000));
    }

    #[test]
    fn test_screen_size_by_scaling_and_max() {
        let max = Size::new(1920, 1080);
        let scaling = DisplayModeSetup {
            size_def: ScreenSizeDef::ByGameScaling,
            ..DisplayModeSetup::default()
        };
        assert_eq!(
            plan_screen_size(GAME, &scaling, &frame(FrameScaleDef::IntScale, 3 * SCALE_UNIT), max),
            Size::new(960, 600)
        );

        let max_def = DisplayModeSetup {
            size_def: ScreenSizeDef::MaxDisplay,
            ..DisplayModeSetup::default()
        };
        assert_eq!(plan_screen_size(GAME, &max_def, &frame(FrameScaleDef::MaxRound, 0), max), max);
    }

    #[test]
    fn test_max_display_size() {
        let device = FixedDevice {
            desktop: Some(Size::new(1920, 1080)),
            window_limit: Size::new(1900, 1040),
        };
        assert_eq!(max_display_size(&device, false), Size::new(1920, 1080));
        assert_eq!(max_display_size(&device, true), Size::new(1900, 1040));

        let broken = FixedDevice {
            desktop: None,
            window_limit: Size::new(1900, 1040),
        };
        assert!(max_display_size(&broken, true).is_null());
    }

    proptest! {
        #[test]
        fn prop_proportional_never_exceeds_screen(
            gw in 1..4000i32, gh in 1..4000i32, sw in 1..8000i32, sh in 1..8000i32
        ) {
            let game = Size::new(gw, gh);
            let screen = Size::new(sw, sh);
            let size = plan_frame_size(game, screen, &frame(FrameScaleDef::MaxProportional, 0));
            prop_assert!(!size.exceeds_by_any(screen));
            // One axis is filled, the other keeps the game's aspect ratio to
            // within one pixel of rounding.
            prop_assert!(size.width == sw || size.height == sh);
            let expected_h = size.width as i64 * gh as i64 / gw as i64;
            let expected_w = size.height as i64 * gw as i64 / gh as i64;
            prop_assert!(
                (size.height as i64 - expected_h).abs() <= 1
                    || (size.width as i64 - expected_w).abs() <= 1
            );
        }

        #[test]
        fn prop_round_scale_never_exceeds_screen(
            gw in 1..2000i32, gh in 1..2000i32, sw in 1..8000i32, sh in 1..8000i32
        ) {
            let screen = Size::new(sw, sh);
            let size = plan_frame_size(Size::new(gw, gh), screen, &frame(FrameScaleDef::MaxRound, 0));
            prop_assert!(!size.exceeds_by_any(screen));
        }
    }
}
