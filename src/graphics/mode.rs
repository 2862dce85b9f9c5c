//! Display mode descriptions and the setup policies that drive mode
//! negotiation.

use std::fmt;
use std::str::FromStr;

use crate::graphics::geometry::{
    fixed_to_scaling, scaling_to_fixed, Size, SCALE_SHIFT, SCALE_UNIT,
};

/// A display mode, either requested (possibly partially unspecified) or
/// resolved by a backend (fully concrete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayMode {
    pub width: i32,
    pub height: i32,
    /// Bits per pixel.
    pub color_depth: i32,
    pub windowed: bool,
    /// Refresh rate in Hz, 0 for "don't care".
    pub refresh_rate: i32,
    pub vsync: bool,
}

impl DisplayMode {
    pub const fn new(size: Size, color_depth: i32, windowed: bool) -> Self {
        Self {
            width: size.width,
            height: size.height,
            color_depth,
            windowed,
            refresh_rate: 0,
            vsync: false,
        }
    }

    #[must_use]
    pub const fn with_refresh(mut self, refresh_rate: i32, vsync: bool) -> Self {
        self.refresh_rate = refresh_rate;
        self.vsync = vsync;
        self
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// A resolved mode has positive dimensions and color depth.
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.color_depth > 0
    }

    pub const fn kind(&self) -> &'static str {
        if self.windowed {
            "windowed"
        } else {
            "fullscreen"
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} ({}-bit) {}",
            self.width,
            self.height,
            self.color_depth,
            self.kind()
        )
    }
}

/// Two color depths to try in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDepthOption {
    pub prime: i32,
    /// Tried only when the prime depth fails and differs from it.
    pub alternate: i32,
}

impl ColorDepthOption {
    pub const fn new(prime: i32, alternate: i32) -> Self {
        Self { prime, alternate }
    }

    /// Depths to attempt, in order, without repeats.
    pub fn attempts(&self) -> impl Iterator<Item = i32> {
        let alternate = (self.alternate != self.prime).then_some(self.alternate);
        std::iter::once(self.prime).chain(alternate)
    }
}

impl Default for ColorDepthOption {
    fn default() -> Self {
        Self::new(32, 32)
    }
}

// ==============================================================================
// Screen size definition
// ==============================================================================

/// How the wanted screen (window) size is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenSizeDef {
    /// Use the configured size.
    #[default]
    Explicit,
    /// Use the game frame scaled against the largest display size.
    ByGameScaling,
    /// Use the largest display size.
    MaxDisplay,
}

impl ScreenSizeDef {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::ByGameScaling => "scaling",
            Self::MaxDisplay => "max",
        }
    }
}

impl FromStr for ScreenSizeDef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explicit" => Ok(Self::Explicit),
            "scaling" => Ok(Self::ByGameScaling),
            "max" => Ok(Self::MaxDisplay),
            _ => Err(format!(
                "Invalid screen definition: {}. Valid options: explicit, scaling, max",
                s
            )),
        }
    }
}

/// Display mode policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayModeSetup {
    pub size_def: ScreenSizeDef,
    /// Used only with [`ScreenSizeDef::Explicit`].
    pub size: Size,
    /// Prefer fullscreen modes with the desktop's aspect ratio.
    pub match_device_ratio: bool,
    pub refresh_rate: i32,
    pub vsync: bool,
    pub windowed: bool,
}

// ==============================================================================
// Game frame scaling
// ==============================================================================

/// How the native game frame is scaled inside the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameScaleDef {
    /// Fixed scale factor taken from the setup.
    #[default]
    IntScale,
    /// Largest proportional fit.
    MaxProportional,
    /// Fill the whole screen, ignoring aspect ratio.
    MaxStretch,
    /// Largest whole-number scale that fits.
    MaxRound,
}

/// Game frame policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameFrameSetup {
    pub scale_def: FrameScaleDef,
    /// Fixed-point factor, used only with [`FrameScaleDef::IntScale`].
    pub scale_factor: i32,
}

impl Default for GameFrameSetup {
    fn default() -> Self {
        Self {
            scale_def: FrameScaleDef::IntScale,
            scale_factor: SCALE_UNIT,
        }
    }
}

impl GameFrameSetup {
    pub const fn new(scale_def: FrameScaleDef, scale_factor: i32) -> Self {
        Self {
            scale_def,
            scale_factor,
        }
    }

    /// An integer scale needs a positive factor; every other policy is
    /// always usable.
    pub const fn is_valid(&self) -> bool {
        !matches!(self.scale_def, FrameScaleDef::IntScale) || self.scale_factor > 0
    }
}

/// Textual scaling option: `max_round`, `stretch`, `proportional` or a signed
/// integer factor (negative values mean 1/N).
pub fn make_scaling_option(setup: &GameFrameSetup) -> String {
    match setup.scale_def {
        FrameScaleDef::MaxRound => "max_round".to_string(),
        FrameScaleDef::MaxStretch => "stretch".to_string(),
        FrameScaleDef::MaxProportional => "proportional".to_string(),
        FrameScaleDef::IntScale => fixed_to_scaling(setup.scale_factor).to_string(),
    }
}

/// Parse a scaling option produced by [`make_scaling_option`].
pub fn parse_scaling_option(s: &str) -> Result<GameFrameSetup, String> {
    match s.trim().to_lowercase().as_str() {
        "max_round" | "round" => Ok(GameFrameSetup::new(FrameScaleDef::MaxRound, 0)),
        "stretch" => Ok(GameFrameSetup::new(FrameScaleDef::MaxStretch, 0)),
        "proportional" => Ok(GameFrameSetup::new(FrameScaleDef::MaxProportional, 0)),
        other => {
            let factor: i32 = other.parse().map_err(|_| {
                format!(
                    "Invalid scaling option: {}. Valid options: max_round, stretch, proportional, or an integer factor",
                    s
                )
            })?;
            match scaling_to_fixed(factor) {
                Some(scale) if scale > 0 => {
                    Ok(GameFrameSetup::new(FrameScaleDef::IntScale, scale))
                }
                _ => Err(format!(
                    "Invalid scaling factor: {}. Use 1..={} to enlarge or -1..=-{} to shrink",
                    factor,
                    i32::MAX >> SCALE_SHIFT,
                    SCALE_UNIT
                )),
            }
        }
    }
}

/// Filter request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GfxFilterSetup {
    /// Filter identifier passed to the backend.
    pub id: String,
    /// What the user originally asked for, kept for diagnostics.
    pub user_request: String,
}

impl GfxFilterSetup {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            user_request: id.clone(),
            id,
        }
    }
}

/// Everything the caller asks for when bringing up graphics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScreenSetup {
    pub driver_id: String,
    pub display_mode: DisplayModeSetup,
    pub game_frame: GameFrameSetup,
    pub filter: GfxFilterSetup,
    pub render_at_screen_res: bool,
}

/// Default policy for the windowed or fullscreen category.
///
/// Windows are sized from the scaled game; fullscreen uses the desktop size
/// and prefers its aspect ratio. Both scale the game by the largest whole
/// number that fits.
pub fn default_setup(windowed: bool) -> (DisplayModeSetup, GameFrameSetup) {
    let mode_setup = DisplayModeSetup {
        size_def: if windowed {
            ScreenSizeDef::ByGameScaling
        } else {
            ScreenSizeDef::MaxDisplay
        },
        size: Size::default(),
        match_device_ratio: !windowed,
        refresh_rate: 0,
        vsync: false,
        windowed,
    };
    (mode_setup, GameFrameSetup::new(FrameScaleDef::MaxRound, 0))
}

/// Adjust a frame policy for the target category: fixed integer scales look
/// poor in fullscreen, so fullscreen uses the largest round scale instead.
pub fn convert_frame_setup(setup: &GameFrameSetup, windowed: bool) -> GameFrameSetup {
    let mut converted = *setup;
    if !windowed && converted.scale_def == FrameScaleDef::IntScale {
        converted.scale_def = FrameScaleDef::MaxRound;
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_display_mode_display() {
        let dm = DisplayMode::new(Size::new(640, 480), 32, true);
        assert_eq!(dm.to_string(), "640 x 480 (32-bit) windowed");
        assert!(dm.is_valid());
        assert!(!DisplayMode::default().is_valid());
    }

    #[test]
    fn test_color_depth_attempts() {
        let same: Vec<i32> = ColorDepthOption::new(32, 32).attempts().collect();
        assert_eq!(same, vec![32]);
        let both: Vec<i32> = ColorDepthOption::new(32, 16).attempts().collect();
        assert_eq!(both, vec![32, 16]);
    }

    #[test]
    fn test_frame_setup_validity() {
        assert!(GameFrameSetup::default().is_valid());
        assert!(!GameFrameSetup::new(FrameScaleDef::IntScale, 0).is_valid());
        assert!(!GameFrameSetup::new(FrameScaleDef::IntScale, -5).is_valid());
        assert!(GameFrameSetup::new(FrameScaleDef::MaxRound, 0).is_valid());
        assert!(GameFrameSetup::new(FrameScaleDef::MaxStretch, -1).is_valid());
    }

    #[test]
    fn test_scaling_option_round_trip() {
        for option in ["max_round", "stretch", "proportional", "3", "-2"] {
            let setup = parse_scaling_option(option).unwrap();
            assert_eq!(make_scaling_option(&setup), option);
        }
        assert_eq!(
            parse_scaling_option("2").unwrap(),
            GameFrameSetup::new(FrameScaleDef::IntScale, 2 * SCALE_UNIT)
        );
        assert!(parse_scaling_option("huge").is_err());
    }

    #[rstest]
    #[case("0")]
    #[case("-4096")]
    #[case("-2147483648")]
    #[case("2147483647")]
    #[case("4194304")]
    fn test_scaling_option_out_of_range(#[case] option: &str) {
        let err = parse_scaling_option(option).unwrap_err();
        assert!(err.contains("Invalid scaling factor"), "{}", err);
    }

    #[test]
    fn test_scaling_option_range_limits() {
        assert_eq!(
            parse_scaling_option("-1024").unwrap(),
            GameFrameSetup::new(FrameScaleDef::IntScale, 1)
        );
        assert_eq!(
            parse_scaling_option("2097151").unwrap().scale_factor,
            2097151 * SCALE_UNIT
        );
    }

    #[test]
    fn test_screen_size_def_parse() {
        assert_eq!("MAX".parse::<ScreenSizeDef>().unwrap(), ScreenSizeDef::MaxDisplay);
        assert_eq!(
            "scaling".parse::<ScreenSizeDef>().unwrap(),
            ScreenSizeDef::ByGameScaling
        );
        assert!("nope".parse::<ScreenSizeDef>().is_err());
    }

    #[test]
    fn test_default_setup() {
        let (win, win_frame) = default_setup(true);
        assert!(win.windowed);
        assert_eq!(win.size_def, ScreenSizeDef::ByGameScaling);
        assert!(!win.match_device_ratio);
        assert_eq!(win_frame.scale_def, FrameScaleDef::MaxRound);

        let (fs, _) = default_setup(false);
        assert!(!fs.windowed);
        assert_eq!(fs.size_def, ScreenSizeDef::MaxDisplay);
        assert!(fs.match_device_ratio);
        assert!(fs.size.is_null());
    }

    #[test]
    fn test_convert_frame_setup() {
        let int_scale = GameFrameSetup::new(FrameScaleDef::IntScale, 2 * SCALE_UNIT);
        assert_eq!(convert_frame_setup(&int_scale, true), int_scale);
        assert_eq!(
            convert_frame_setup(&int_scale, false).scale_def,
            FrameScaleDef::MaxRound
        );
        let stretch = GameFrameSetup::new(FrameScaleDef::MaxStretch, 0);
        assert_eq!(convert_frame_setup(&stretch, false), stretch);
    }
}
