//!
//! SDL2 window backend.
//!
//! Display modes come from SDL's mode list for display 0. Windows are
//! created lazily on the first mode switch and reused afterwards; fullscreen
//! switches set the exact display mode rather than a desktop-sized window.
//!
//! SDL2 must be initialized on the main thread. All calls into this backend
//! have to come from the thread that created the factory.
//!

use sdl2::{
    pixels::PixelFormatEnum,
    video::{FullscreenType, Window},
    Sdl, VideoSubsystem,
};

use crate::graphics::driver::{
    DeviceQuery, DriverError, DriverResult, FilterInfo, GfxDriverFactory, GfxFilter,
    GraphicsDriver,
};
use crate::graphics::geometry::{Rect, Size};
use crate::graphics::mode::DisplayMode;

/// Registry id of the SDL2 backend.
pub const SDL_DRIVER_ID: &str = "sdl2";

const FILTER_NEAREST: &str = "StdScale";
const FILTER_LINEAR: &str = "Linear";

const DISPLAY_INDEX: i32 = 0;

fn window_title() -> String {
    format!("gfxmode v{}", env!("CARGO_PKG_VERSION"))
}

/// Bits per pixel of an SDL pixel format, 0 if SDL cannot describe it.
fn format_depth(format: PixelFormatEnum) -> i32 {
    format.into_masks().map(|masks| i32::from(masks.bpp)).unwrap_or(0)
}

fn to_display_mode(mode: &sdl2::video::DisplayMode, windowed: bool) -> DisplayMode {
    DisplayMode::new(Size::new(mode.w, mode.h), format_depth(mode.format), windowed)
        .with_refresh(mode.refresh_rate, false)
}

fn video_subsystem() -> DriverResult<(Sdl, VideoSubsystem)> {
    let sdl = sdl2::init().map_err(|e| DriverError::Unavailable(format!("SDL2 init: {}", e)))?;
    let video = sdl
        .video()
        .map_err(|e| DriverError::Unavailable(format!("video subsystem: {}", e)))?;
    log::info!("SDL2 video driver: {}", video.current_video_driver());
    Ok((sdl, video))
}

/// Desktop queries against SDL display 0.
pub struct SdlDevice {
    _sdl: Sdl,
    video: VideoSubsystem,
}

impl SdlDevice {
    pub fn new() -> DriverResult<Self> {
        let (sdl, video) = video_subsystem()?;
        Ok(Self { _sdl: sdl, video })
    }

    /// Video subsystem shared with the backend factory.
    pub fn video(&self) -> &VideoSubsystem {
        &self.video
    }
}

impl DeviceQuery for SdlDevice {
    fn desktop_size(&self) -> DriverResult<Size> {
        self.video
            .desktop_display_mode(DISPLAY_INDEX)
            .map(|mode| Size::new(mode.w, mode.h))
            .map_err(DriverError::DesktopQuery)
    }

    fn clamp_window_size(&self, size: Size, fullscreen: bool) -> Size {
        if fullscreen {
            return size;
        }
        // Usable bounds exclude taskbars and docks.
        match self.video.display_usable_bounds(DISPLAY_INDEX) {
            Ok(bounds) => Size::new(
                size.width.min(bounds.width() as i32),
                size.height.min(bounds.height() as i32),
            ),
            Err(e) => {
                log::warn!("Unable to query usable display bounds: {}", e);
                size
            }
        }
    }
}

/// Factory for [`SdlDriver`].
pub struct SdlDriverFactory {
    video: VideoSubsystem,
    filters: Vec<FilterInfo>,
}

impl SdlDriverFactory {
    pub fn new(video: VideoSubsystem) -> Self {
        Self {
            video,
            filters: vec![
                FilterInfo::new(FILTER_NEAREST, "Nearest-neighbour"),
                FilterInfo::new(FILTER_LINEAR, "Linear interpolation"),
            ],
        }
    }
}

impl GfxDriverFactory for SdlDriverFactory {
    fn id(&self) -> &str {
        SDL_DRIVER_ID
    }

    fn create_driver(&mut self) -> DriverResult<Box<dyn GraphicsDriver>> {
        Ok(Box::new(SdlDriver::new(self.video.clone())))
    }

    fn filters(&self) -> &[FilterInfo] {
        &self.filters
    }

    fn default_filter_id(&self) -> &str {
        FILTER_NEAREST
    }

    fn shutdown(&mut self) {
        log::info!("SDL2 graphics factory shut down");
    }
}

/// SDL2 window driver.
pub struct SdlDriver {
    video: VideoSubsystem,
    window: Option<Window>,
    mode: Option<DisplayMode>,
    native_size: Option<Size>,
    render_frame: Rect,
    filter: Option<GfxFilter>,
}

impl SdlDriver {
    fn new(video: VideoSubsystem) -> Self {
        Self {
            video,
            window: None,
            mode: None,
            native_size: None,
            render_frame: Rect::default(),
            filter: None,
        }
    }

    fn find_sdl_mode(&self, mode: &DisplayMode) -> DriverResult<sdl2::video::DisplayMode> {
        let count = self
            .video
            .num_display_modes(DISPLAY_INDEX)
            .map_err(DriverError::ModeRejected)?;
        for index in 0..count {
            let Ok(candidate) = self.video.display_mode(DISPLAY_INDEX, index) else {
                continue;
            };
            if candidate.w == mode.width
                && candidate.h == mode.height
                && format_depth(candidate.format) == mode.color_depth
                && (mode.refresh_rate == 0 || candidate.refresh_rate == mode.refresh_rate)
            {
                return Ok(candidate);
            }
        }
        Err(DriverError::ModeRejected(format!("{} is not offered by the display", mode)))
    }

    fn window_mut(&mut self, size: Size) -> DriverResult<&mut Window> {
        if self.window.is_none() {
            log::info!("Creating window: {}", size);
            let window = self
                .video
                .window(&window_title(), size.width as u32, size.height as u32)
                .position_centered()
                .build()
                .map_err(|e| DriverError::ModeRejected(format!("window creation: {}", e)))?;
            self.window = Some(window);
        }
        self.window.as_mut().ok_or(DriverError::NotInitialized)
    }
}

impl GraphicsDriver for SdlDriver {
    fn name(&self) -> &str {
        "SDL2 window"
    }

    fn supported_modes(&self, color_depth: i32) -> DriverResult<Vec<DisplayMode>> {
        let count = self
            .video
            .num_display_modes(DISPLAY_INDEX)
            .map_err(|e| DriverError::Unavailable(format!("display mode list: {}", e)))?;
        let mut modes = Vec::new();
        for index in 0..count {
            match self.video.display_mode(DISPLAY_INDEX, index) {
                Ok(mode) if format_depth(mode.format) == color_depth => {
                    modes.push(to_display_mode(&mode, false));
                }
                Ok(_) => {}
                Err(e) => log::debug!("Skipping display mode {}: {}", index, e),
            }
        }
        Ok(modes)
    }

    fn set_display_mode(&mut self, mode: &DisplayMode) -> DriverResult<()> {
        if !mode.is_valid() {
            return Err(DriverError::ModeRejected(format!("invalid mode {}", mode)));
        }

        let sdl_mode = if mode.windowed {
            None
        } else {
            Some(self.find_sdl_mode(mode)?)
        };
        let size = mode.size();
        let window = self.window_mut(size)?;

        match sdl_mode {
            Some(sdl_mode) => {
                window
                    .set_display_mode(Some(sdl_mode))
                    .map_err(DriverError::ModeRejected)?;
                window
                    .set_fullscreen(FullscreenType::True)
                    .map_err(DriverError::ModeRejected)?;
            }
            None => {
                window
                    .set_fullscreen(FullscreenType::Off)
                    .map_err(DriverError::ModeRejected)?;
                window
                    .set_size(size.width as u32, size.height as u32)
                    .map_err(|e| DriverError::ModeRejected(e.to_string()))?;
            }
        }
        sdl2::hint::set("SDL_RENDER_VSYNC", if mode.vsync { "1" } else { "0" });

        let resolved = match sdl_mode {
            Some(sdl_mode) => DisplayMode {
                vsync: mode.vsync,
                ..to_display_mode(&sdl_mode, false)
            },
            None => *mode,
        };
        log::info!("SDL2 switched to {}", resolved);
        self.mode = Some(resolved);
        self.render_frame = Rect::from_size(resolved.size());
        Ok(())
    }

    fn display_mode(&self) -> Option<DisplayMode> {
        self.mode
    }

    fn set_native_size(&mut self, size: Size) -> DriverResult<()> {
        if size.is_empty() {
            return Err(DriverError::InvalidOperation(format!("native size {} is empty", size)));
        }
        self.native_size = Some(size);
        Ok(())
    }

    fn native_size(&self) -> Option<Size> {
        self.native_size
    }

    fn set_render_frame(&mut self, frame: Rect) -> DriverResult<()> {
        let mode = self.mode.ok_or(DriverError::NotInitialized)?;
        let screen = Rect::from_size(mode.size());
        if frame.width() <= 0
            || frame.height() <= 0
            || frame.left < screen.left
            || frame.top < screen.top
            || frame.right > screen.right
            || frame.bottom > screen.bottom
        {
            return Err(DriverError::InvalidOperation(format!(
                "render frame {} outside screen {}",
                frame, screen
            )));
        }
        self.render_frame = frame;
        if let Some(filter) = self.filter.as_mut() {
            filter.destination = frame;
        }
        Ok(())
    }

    fn render_destination(&self) -> Rect {
        self.render_frame
    }

    fn set_graphics_filter(&mut self, filter: GfxFilter) -> DriverResult<()> {
        if self.mode.is_none() {
            return Err(DriverError::NotInitialized);
        }
        let quality = if filter.info.id.eq_ignore_ascii_case(FILTER_LINEAR) {
            "linear"
        } else {
            "nearest"
        };
        sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", quality);
        self.filter = Some(filter);
        Ok(())
    }

    fn graphics_filter(&self) -> Option<&GfxFilter> {
        self.filter.as_ref()
    }
}
