use crate::config::{parse_bool, parse_color_depth, parse_resolution, Options};
use crate::graphics::mode::{parse_scaling_option, ScreenSizeDef};
use anyhow::{Context, Result};
use clap::Parser;

/// Display mode negotiation tool
#[derive(Parser, Debug, Default)]
#[command(name = "gfxmode")]
#[command(version)]
#[command(about = "Find and activate a display mode for a game of a given size", long_about = None)]
pub struct Cli {
    /// Screen resolution (e.g., 1280x720); implies an explicit screen size
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub res: Option<String>,

    /// Enable fullscreen mode
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Enable windowed mode
    #[arg(short, long)]
    pub windowed: bool,

    /// Graphics backend to try first
    #[arg(long, value_name = "ID")]
    pub gfxdriver: Option<String>,

    /// Graphics filter
    #[arg(long, value_name = "ID")]
    pub gfxfilter: Option<String>,

    /// Game scaling (max_round, stretch, proportional or an integer factor)
    #[arg(short, long, value_name = "OPTION")]
    pub scaling: Option<String>,

    /// How the screen size is chosen (explicit, scaling, max)
    #[arg(long = "screen-def", value_name = "DEF")]
    pub screen_def: Option<String>,

    /// Prefer fullscreen modes with the desktop aspect ratio (1/0)
    #[arg(long = "match-device-ratio", value_name = "BOOL")]
    pub match_device_ratio: Option<String>,

    /// Enable vertical sync
    #[arg(long)]
    pub vsync: bool,

    /// Requested refresh rate in Hz
    #[arg(long, value_name = "HZ")]
    pub refresh: Option<i32>,

    /// Color depth in bits per pixel
    #[arg(long = "color-depth", value_name = "BITS")]
    pub color_depth: Option<String>,

    /// Color depth to try when the first one fails
    #[arg(long = "alt-color-depth", value_name = "BITS")]
    pub alt_color_depth: Option<String>,

    /// Native game resolution
    #[arg(long = "game-res", value_name = "WIDTHxHEIGHT")]
    pub game_res: Option<String>,

    /// Configuration directory path
    #[arg(short, long, value_name = "CONFIGDIR")]
    pub configdir: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<String>,

    /// Log level (0 = nothing .. 6 = all)
    #[arg(long, value_name = "LEVEL")]
    pub loglevel: Option<i32>,

    /// List the registered graphics backends and exit
    #[arg(long = "list-drivers")]
    pub list_drivers: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref res) = self.res {
            opts.screen_size = parse_resolution(res).context("Invalid resolution format")?;
            opts.screen_def = ScreenSizeDef::Explicit;
        }

        if self.fullscreen {
            opts.windowed = false;
        }
        if self.windowed {
            opts.windowed = true;
        }

        if let Some(ref driver) = self.gfxdriver {
            opts.driver = driver.clone();
        }

        if let Some(ref filter) = self.gfxfilter {
            opts.filter = filter.clone();
        }

        if let Some(ref scaling) = self.scaling {
            let setup = parse_scaling_option(scaling).map_err(anyhow::Error::msg)?;
            // Applies to whichever category ends up active.
            opts.game_scale_fs = setup;
            opts.game_scale_win = setup;
        }

        if let Some(ref def) = self.screen_def {
            opts.screen_def = def.parse().map_err(anyhow::Error::msg)?;
        }

        if let Some(ref ratio) = self.match_device_ratio {
            opts.match_device_ratio = parse_bool(ratio).context("Invalid --match-device-ratio")?;
        }

        if self.vsync {
            opts.vsync = true;
        }

        if let Some(refresh) = self.refresh {
            if refresh < 0 {
                anyhow::bail!("Refresh rate must not be negative");
            }
            opts.refresh = refresh;
        }

        if let Some(ref depth) = self.color_depth {
            opts.color_depth = parse_color_depth(depth)?;
        }

        if let Some(ref depth) = self.alt_color_depth {
            opts.alt_color_depth = parse_color_depth(depth)?;
        }

        if let Some(ref game_res) = self.game_res {
            opts.game_size = parse_resolution(game_res).context("Invalid game resolution")?;
        }

        if let Some(ref config_dir) = self.configdir {
            opts.config_dir = Some(config_dir.clone());
        }

        if let Some(ref log_file) = self.logfile {
            opts.log_file = Some(log_file.clone());
        }

        if let Some(level) = self.loglevel {
            opts.log_level = Some(level);
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::geometry::{Size, SCALE_UNIT};
    use crate::graphics::mode::{FrameScaleDef, GameFrameSetup};

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            res: Some("800x600".to_string()),
            windowed: true,
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.screen_size, Size::new(800, 600));
        assert_eq!(opts.screen_def, ScreenSizeDef::Explicit);
        assert!(opts.windowed);
    }

    #[test]
    fn test_merge_graphics_options() {
        let cli = Cli {
            gfxdriver: Some("software".to_string()),
            gfxfilter: Some("Linear".to_string()),
            scaling: Some("3".to_string()),
            screen_def: Some("scaling".to_string()),
            match_device_ratio: Some("0".to_string()),
            color_depth: Some("16".to_string()),
            alt_color_depth: Some("32".to_string()),
            game_res: Some("640x400".to_string()),
            loglevel: Some(5),
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.driver, "software");
        assert_eq!(opts.filter, "Linear");
        assert_eq!(
            opts.game_scale_win,
            GameFrameSetup::new(FrameScaleDef::IntScale, 3 * SCALE_UNIT)
        );
        assert_eq!(opts.screen_def, ScreenSizeDef::ByGameScaling);
        assert!(!opts.match_device_ratio);
        assert_eq!((opts.color_depth, opts.alt_color_depth), (16, 32));
        assert_eq!(opts.game_size, Size::new(640, 400));
        assert_eq!(opts.log_level, Some(5));
    }

    #[test]
    fn test_log_options_override_setup_file() {
        let from_file = Options {
            log_level: Some(2),
            log_file: Some("setup.log".to_string()),
            ..Options::default()
        };

        let kept = Cli::default().merge_into_options(from_file.clone()).unwrap();
        assert_eq!(kept.log_level, Some(2));
        assert_eq!(kept.log_file.as_deref(), Some("setup.log"));

        let cli = Cli {
            loglevel: Some(6),
            logfile: Some("cli.log".to_string()),
            ..Default::default()
        };
        let opts = cli.merge_into_options(from_file).unwrap();
        assert_eq!(opts.log_level, Some(6));
        assert_eq!(opts.log_file.as_deref(), Some("cli.log"));
    }

    #[test]
    fn test_windowed_wins_over_fullscreen() {
        let cli = Cli {
            fullscreen: true,
            windowed: true,
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).unwrap().windowed);
    }

    #[test]
    fn test_invalid_values() {
        let bad = [
            Cli {
                res: Some("invalid".to_string()),
                ..Default::default()
            },
            Cli {
                scaling: Some("huge".to_string()),
                ..Default::default()
            },
            Cli {
                scaling: Some("-2147483648".to_string()),
                ..Default::default()
            },
            Cli {
                color_depth: Some("12".to_string()),
                ..Default::default()
            },
            Cli {
                refresh: Some(-60),
                ..Default::default()
            },
        ];
        for cli in bad {
            assert!(cli.merge_into_options(Options::default()).is_err(), "{:?}", cli);
        }
    }

    #[test]
    fn test_clap_parses_flags() {
        let cli = Cli::try_parse_from([
            "gfxmode",
            "--windowed",
            "--res",
            "1024x768",
            "--screen-def",
            "explicit",
            "--list-drivers",
        ])
        .unwrap();
        assert!(cli.windowed);
        assert!(cli.list_drivers);
        assert_eq!(cli.res.as_deref(), Some("1024x768"));
    }
}
