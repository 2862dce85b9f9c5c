//!
//! In-memory software backend.
//!
//! The software backend keeps no real window: it validates requests against
//! a fixed mode list and remembers what was set. Fullscreen modes must be in
//! the list; windows may have any size at a listed color depth.
//!

use crate::graphics::driver::{
    DeviceQuery, DriverError, DriverResult, FilterInfo, GfxDriverFactory, GfxFilter,
    GraphicsDriver,
};
use crate::graphics::geometry::{Rect, Size};
use crate::graphics::mode::DisplayMode;

/// Registry id of the software backend.
pub const SOFTWARE_DRIVER_ID: &str = "software";

/// Nearest-neighbour scaling, the default filter.
pub const FILTER_STD_SCALE: &str = "StdScale";
/// Smooth scaling.
pub const FILTER_LINEAR: &str = "Linear";

/// Common display resolutions offered when no explicit list is given.
const STANDARD_SIZES: [(i32, i32); 12] = [
    (640, 400),
    (640, 480),
    (800, 600),
    (1024, 768),
    (1280, 720),
    (1280, 800),
    (1280, 1024),
    (1366, 768),
    (1600, 900),
    (1680, 1050),
    (1920, 1080),
    (1920, 1200),
];

/// Standard fullscreen modes at each of `depths` that fit on `desktop`,
/// plus the desktop size itself.
pub fn standard_modes(desktop: Size, depths: &[i32]) -> Vec<DisplayMode> {
    let mut modes = Vec::new();
    for &depth in depths {
        for &(w, h) in STANDARD_SIZES.iter() {
            let size = Size::new(w, h);
            if !size.exceeds_by_any(desktop) {
                modes.push(DisplayMode::new(size, depth, false));
            }
        }
        let has_desktop = modes
            .iter()
            .any(|m| m.color_depth == depth && m.size() == desktop);
        if !has_desktop && !desktop.is_empty() {
            modes.push(DisplayMode::new(desktop, depth, false));
        }
    }
    modes
}

/// Factory for [`SoftwareDriver`].
#[derive(Debug, Clone)]
pub struct SoftwareDriverFactory {
    id: String,
    modes: Vec<DisplayMode>,
    filters: Vec<FilterInfo>,
}

impl SoftwareDriverFactory {
    pub fn new(modes: Vec<DisplayMode>) -> Self {
        Self::with_id(SOFTWARE_DRIVER_ID, modes)
    }

    /// Same backend registered under a different id.
    pub fn with_id(id: impl Into<String>, modes: Vec<DisplayMode>) -> Self {
        Self {
            id: id.into(),
            modes,
            filters: vec![
                FilterInfo::new(FILTER_STD_SCALE, "Nearest-neighbour"),
                FilterInfo::new(FILTER_LINEAR, "Linear interpolation"),
            ],
        }
    }
}

impl GfxDriverFactory for SoftwareDriverFactory {
    fn id(&self) -> &str {
        &self.id
    }

    fn create_driver(&mut self) -> DriverResult<Box<dyn GraphicsDriver>> {
        Ok(Box::new(SoftwareDriver::new(self.modes.clone())))
    }

    fn filters(&self) -> &[FilterInfo] {
        &self.filters
    }

    fn default_filter_id(&self) -> &str {
        FILTER_STD_SCALE
    }
}

/// Software driver state.
#[derive(Debug, Clone, Default)]
pub struct SoftwareDriver {
    modes: Vec<DisplayMode>,
    mode: Option<DisplayMode>,
    native_size: Option<Size>,
    render_frame: Rect,
    filter: Option<GfxFilter>,
}

impl SoftwareDriver {
    pub fn new(modes: Vec<DisplayMode>) -> Self {
        Self {
            modes,
            ..Self::default()
        }
    }

    fn supports_depth(&self, color_depth: i32) -> bool {
        self.modes.iter().any(|m| m.color_depth == color_depth)
    }
}

impl GraphicsDriver for SoftwareDriver {
    fn name(&self) -> &str {
        "Software renderer"
    }

    fn supported_modes(&self, color_depth: i32) -> DriverResult<Vec<DisplayMode>> {
        Ok(self
            .modes
            .iter()
            .filter(|m| m.color_depth == color_depth)
            .copied()
            .collect())
    }

    fn set_display_mode(&mut self, mode: &DisplayMode) -> DriverResult<()> {
        if !mode.is_valid() {
            return Err(DriverError::ModeRejected(format!("invalid mode {}", mode)));
        }
        if !self.supports_depth(mode.color_depth) {
            return Err(DriverError::ModeRejected(format!(
                "{}-bit color is not supported",
                mode.color_depth
            )));
        }

        let mut resolved = *mode;
        if !mode.windowed {
            let listed = self
                .modes
                .iter()
                .find(|m| m.color_depth == mode.color_depth && m.size() == mode.size())
                .ok_or_else(|| DriverError::ModeRejected(format!("{} is not listed", mode)))?;
            if resolved.refresh_rate == 0 {
                resolved.refresh_rate = listed.refresh_rate;
            }
        }

        log::debug!("Software driver switched to {}", resolved);
        self.mode = Some(resolved);
        // A new screen invalidates the previous frame placement.
        self.render_frame = Rect::from_size(resolved.size());
        Ok(())
    }

    fn display_mode(&self) -> Option<DisplayMode> {
        self.mode
    }

    fn set_native_size(&mut self, size: Size) -> DriverResult<()> {
        if size.is_empty() {
            return Err(DriverError::InvalidOperation(format!(
                "native size {} is empty",
                size
            )));
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
        self.filter = Some(filter);
        Ok(())
    }

    fn graphics_filter(&self) -> Option<&GfxFilter> {
        self.filter.as_ref()
    }
}

/// Fixed desktop description for running without a real display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftwareDevice {
    desktop: Size,
    /// Space taken by window decorations, subtracted from the desktop when
    /// clamping a decorated window.
    decorations: Size,
}

impl SoftwareDevice {
    pub const fn new(desktop: Size) -> Self {
        Self {
            desktop,
            decorations: Size::new(0, 0),
        }
    }

    #[must_use]
    pub const fn with_decorations(mut self, decorations: Size) -> Self {
        self.decorations = decorations;
        self
    }
}

impl DeviceQuery for SoftwareDevice {
    fn desktop_size(&self) -> DriverResult<Size> {
        if self.desktop.is_empty() {
            return Err(DriverError::DesktopQuery("no display attached".to_string()));
        }
        Ok(self.desktop)
    }

    fn clamp_window_size(&self, size: Size, fullscreen: bool) -> Size {
        let limit = if fullscreen {
            self.desktop
        } else {
            Size::new(
                self.desktop.width - self.decorations.width,
                self.desktop.height - self.decorations.height,
            )
        };
        Size::new(size.width.min(limit.width), size.height.min(limit.height))
    }
}
