use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::graphics::geometry::Size;
use crate::graphics::mode::{
    convert_frame_setup, parse_scaling_option, ColorDepthOption, DisplayModeSetup,
    FrameScaleDef, GameFrameSetup, GfxFilterSetup, ScreenSetup, ScreenSizeDef,
};
use crate::graphics::software::FILTER_STD_SCALE;
use crate::propfile::parse_to_map;

/// Name of the setup file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "gfxmode.cfg";

/// Backend tried first when nothing else is configured.
#[cfg(feature = "sdl")]
pub const DEFAULT_DRIVER: &str = "sdl2";
#[cfg(not(feature = "sdl"))]
pub const DEFAULT_DRIVER: &str = crate::graphics::software::SOFTWARE_DRIVER_ID;

/// Options that can be set via CLI or setup file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    // Commandline-only options
    pub config_dir: Option<String>,

    // [log]
    pub log_file: Option<String>,
    pub log_level: Option<i32>,

    // [graphics]
    pub driver: String,
    pub windowed: bool,
    pub screen_def: ScreenSizeDef,
    pub screen_size: Size,
    pub match_device_ratio: bool,
    pub game_scale_fs: GameFrameSetup,
    pub game_scale_win: GameFrameSetup,
    pub filter: String,
    pub refresh: i32,
    pub vsync: bool,
    pub render_at_screenres: bool,
    pub color_depth: i32,
    pub alt_color_depth: i32,

    // [game]
    pub game_size: Size,

    // [debug]
    pub debugger: bool,
}

impl Default for Options {
    fn default() -> Self {
        let depths = ColorDepthOption::default();
        Self {
            log_file: None,
            config_dir: None,
            log_level: None,
            driver: DEFAULT_DRIVER.to_string(),
            windowed: false,
            screen_def: ScreenSizeDef::MaxDisplay,
            screen_size: Size::default(),
            match_device_ratio: true,
            game_scale_fs: GameFrameSetup::new(FrameScaleDef::MaxRound, 0),
            game_scale_win: GameFrameSetup::new(FrameScaleDef::MaxRound, 0),
            filter: FILTER_STD_SCALE.to_string(),
            refresh: 0,
            vsync: false,
            render_at_screenres: false,
            color_depth: depths.prime,
            alt_color_depth: depths.alternate,
            game_size: Size::new(320, 200),
            debugger: false,
        }
    }
}

impl Options {
    /// Scale option for the current windowed/fullscreen category.
    pub fn game_frame(&self) -> GameFrameSetup {
        let setup = if self.windowed {
            self.game_scale_win
        } else {
            self.game_scale_fs
        };
        convert_frame_setup(&setup, self.windowed)
    }

    pub fn color_depths(&self) -> ColorDepthOption {
        ColorDepthOption::new(self.color_depth, self.alt_color_depth)
    }

    /// Screen setup requested by these options.
    pub fn to_screen_setup(&self) -> ScreenSetup {
        ScreenSetup {
            driver_id: self.driver.clone(),
            display_mode: DisplayModeSetup {
                size_def: self.screen_def,
                size: self.screen_size,
                match_device_ratio: self.match_device_ratio,
                refresh_rate: self.refresh,
                vsync: self.vsync,
                windowed: self.windowed,
            },
            game_frame: self.game_frame(),
            filter: GfxFilterSetup::new(self.filter.clone()),
            render_at_screen_res: self.render_at_screenres,
        }
    }

    /// Apply `section.key` entries read from a setup file. Unknown keys are
    /// ignored.
    pub fn apply_entries(&mut self, entries: &HashMap<String, String>) -> Result<()> {
        let get = |key: &str| entries.get(key).map(String::as_str);

        if let Some(v) = get("graphics.driver") {
            if !v.is_empty() {
                self.driver = v.to_string();
            }
        }
        if let Some(v) = get("graphics.windowed") {
            self.windowed = parse_bool(v).context("graphics.windowed")?;
        }
        if let Some(v) = get("graphics.screen_def") {
            self.screen_def = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = get("graphics.screen_width") {
            self.screen_size.width = parse_int(v).context("graphics.screen_width")?;
        }
        if let Some(v) = get("graphics.screen_height") {
            self.screen_size.height = parse_int(v).context("graphics.screen_height")?;
        }
        if let Some(v) = get("graphics.match_device_ratio") {
            self.match_device_ratio = parse_bool(v).context("graphics.match_device_ratio")?;
        }
        if let Some(v) = get("graphics.game_scale_fs") {
            self.game_scale_fs = parse_scaling_option(v).map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = get("graphics.game_scale_win") {
            self.game_scale_win = parse_scaling_option(v).map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = get("graphics.filter") {
            if !v.is_empty() {
                self.filter = v.to_string();
            }
        }
        if let Some(v) = get("graphics.refresh") {
            self.refresh = parse_int(v).context("graphics.refresh")?;
        }
        if let Some(v) = get("graphics.vsync") {
            self.vsync = parse_bool(v).context("graphics.vsync")?;
        }
        if let Some(v) = get("graphics.render_at_screenres") {
            self.render_at_screenres = parse_bool(v).context("graphics.render_at_screenres")?;
        }
        if let Some(v) = get("graphics.color_depth") {
            self.color_depth = parse_color_depth(v)?;
        }
        if let Some(v) = get("graphics.alt_color_depth") {
            self.alt_color_depth = parse_color_depth(v)?;
        }
        if let Some(v) = get("game.width") {
            self.game_size.width = parse_int(v).context("game.width")?;
        }
        if let Some(v) = get("game.height") {
            self.game_size.height = parse_int(v).context("game.height")?;
        }
        if let Some(v) = get("log.level") {
            self.log_level = Some(parse_int(v).context("log.level")?);
        }
        if let Some(v) = get("log.file") {
            self.log_file = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = get("debug.debugger") {
            self.debugger = parse_bool(v).context("debug.debugger")?;
        }
        Ok(())
    }
}

/// Path of the setup file for `config_dir` (current directory if unset).
pub fn config_path(config_dir: &Option<String>) -> PathBuf {
    let dir = config_dir.as_deref().unwrap_or(".");
    Path::new(dir).join(CONFIG_FILE_NAME)
}

/// Load options from `gfxmode.cfg` in the config directory.
/// A missing file gives the default options.
pub fn load_config(config_dir: &Option<String>) -> Result<Options> {
    let path = config_path(config_dir);
    let mut options = Options {
        config_dir: config_dir.clone(),
        ..Options::default()
    };
    if !path.exists() {
        log::debug!("No setup file at {}, using defaults", path.display());
        return Ok(options);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read setup file {}", path.display()))?;
    options
        .apply_entries(&parse_to_map(&data))
        .with_context(|| format!("Invalid setting in {}", path.display()))?;
    log::info!("Loaded setup file {}", path.display());
    Ok(options)
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Size> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: i32 = parts[0].trim().parse().context("Invalid width value")?;
    let height: i32 = parts[1].trim().parse().context("Invalid height value")?;

    if width <= 0 || height <= 0 {
        anyhow::bail!("Resolution values must be positive");
    }

    Ok(Size::new(width, height))
}

/// Parse a boolean setting: 1/0, true/false, yes/no, on/off.
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid boolean value: {}", s),
    }
}

fn parse_int(s: &str) -> Result<i32> {
    s.trim()
        .parse()
        .with_context(|| format!("Invalid integer value: {}", s))
}

/// Parse a color depth in bits per pixel.
pub fn parse_color_depth(s: &str) -> Result<i32> {
    let depth = parse_int(s)?;
    match depth {
        8 | 15 | 16 | 24 | 32 => Ok(depth),
        _ => anyhow::bail!("Unsupported color depth: {}. Valid options: 8, 15, 16, 24, 32", depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::geometry::SCALE_UNIT;
    use std::io::Write;

    #[test]
    fn test_parse_resolution_valid() {
        assert_eq!(parse_resolution("640x480").unwrap(), Size::new(640, 480));
    }

    #[test]
    fn test_parse_resolution_invalid_format() {
        assert!(parse_resolution("640-480").is_err());
        assert!(parse_resolution("640x480x120").is_err());
    }

    #[test]
    fn test_parse_resolution_invalid_values() {
        assert!(parse_resolution("0x480").is_err());
        assert!(parse_resolution("640x-1").is_err());
        assert!(parse_resolution("abcxdef").is_err());
    }

    #[test]
    fn test_parse_bool_and_depth() {
        assert!(parse_bool("Yes").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
        assert_eq!(parse_color_depth("16").unwrap(), 16);
        assert!(parse_color_depth("12").is_err());
    }

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert_eq!(opts.game_size, Size::new(320, 200));
        assert_eq!(opts.screen_def, ScreenSizeDef::MaxDisplay);
        assert_eq!(opts.filter, FILTER_STD_SCALE);
        assert!(!opts.windowed);
    }

    #[test]
    fn test_screen_setup_uses_category_scale() {
        let mut opts = Options {
            game_scale_fs: GameFrameSetup::new(FrameScaleDef::IntScale, 2 * SCALE_UNIT),
            game_scale_win: GameFrameSetup::new(FrameScaleDef::IntScale, 3 * SCALE_UNIT),
            ..Default::default()
        };
        // Integer scaling is not kept in fullscreen.
        let setup = opts.to_screen_setup();
        assert_eq!(setup.game_frame.scale_def, FrameScaleDef::MaxRound);
        assert!(!setup.display_mode.windowed);

        opts.windowed = true;
        let setup = opts.to_screen_setup();
        assert_eq!(
            setup.game_frame,
            GameFrameSetup::new(FrameScaleDef::IntScale, 3 * SCALE_UNIT)
        );
        assert!(setup.display_mode.windowed);
        assert_eq!(setup.filter.user_request, FILTER_STD_SCALE);
    }

    #[test]
    fn test_load_config_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = Some(dir.path().to_string_lossy().into_owned());
        let opts = load_config(&config_dir).unwrap();
        assert_eq!(
            opts,
            Options {
                config_dir,
                ..Options::default()
            }
        );
    }

    #[test]
    fn test_load_config_reads_sections() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(
            file,
            "[graphics]\ndriver = software\nwindowed = 1\nscreen_def = explicit\n\
             screen_width = 1024\nscreen_height = 768\ngame_scale_win = 2\n\
             filter = Linear\ncolor_depth = 32\nalt_color_depth = 16\n\
             [game]\nwidth = 640\nheight = 400\n[debug]\ndebugger = yes\n\
             [log]\nlevel = 5\nfile = gfx.log"
        )
        .unwrap();

        let opts = load_config(&Some(dir.path().to_string_lossy().into_owned())).unwrap();
        assert_eq!(opts.driver, "software");
        assert!(opts.windowed);
        assert_eq!(opts.screen_def, ScreenSizeDef::Explicit);
        assert_eq!(opts.screen_size, Size::new(1024, 768));
        assert_eq!(
            opts.game_scale_win,
            GameFrameSetup::new(FrameScaleDef::IntScale, 2 * SCALE_UNIT)
        );
        assert_eq!(opts.filter, "Linear");
        assert_eq!(opts.color_depths(), ColorDepthOption::new(32, 16));
        assert_eq!(opts.game_size, Size::new(640, 400));
        assert!(opts.debugger);
        assert_eq!(opts.log_level, Some(5));
        assert_eq!(opts.log_file.as_deref(), Some("gfx.log"));
    }

    #[test]
    fn test_load_config_rejects_bad_value() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[graphics]\nscreen_def = huge\n",
        )
        .unwrap();
        let err = load_config(&Some(dir.path().to_string_lossy().into_owned())).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid screen definition"));
    }
}
