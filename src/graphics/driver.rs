//!
//! Backend interfaces used by mode negotiation.
//!
//! A backend is selected by a string id from a [`DriverRegistry`]. The
//! registry hands out a [`GfxDriverFactory`], which creates the
//! [`GraphicsDriver`] and applies post-process filters to it. Desktop and
//! window-size information comes from a separate [`DeviceQuery`], since it
//! belongs to the platform rather than to any one backend.
//!

use std::fmt;

use crate::graphics::geometry::{Rect, Size};
use crate::graphics::mode::DisplayMode;

/// Error types for backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Driver not initialized.
    #[error("Graphics driver not initialized")]
    NotInitialized,
    /// The backend could not be brought up at all.
    #[error("Graphics backend unavailable: {0}")]
    Unavailable(String),
    /// The backend refused to activate a display mode.
    #[error("Display mode rejected: {0}")]
    ModeRejected(String),
    /// The backend has no filter with the requested id.
    #[error("Unsupported graphics filter: {0}")]
    UnsupportedFilter(String),
    /// Invalid operation for current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// The desktop resolution could not be read.
    #[error("Unable to obtain device resolution: {0}")]
    DesktopQuery(String),
}

/// Result type for backend operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Static description of a filter a factory can provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInfo {
    /// Identifier used in setup files, compared case-insensitively.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl FilterInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A filter applied to a driver, with the rectangle it renders into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxFilter {
    pub info: FilterInfo,
    pub destination: Rect,
}

impl fmt::Display for GfxFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}', filter dest {}", self.info.id, self.destination)
    }
}

/// A concrete graphics driver.
///
/// Every call is synchronous and runs on the thread that owns the
/// negotiation context.
pub trait GraphicsDriver {
    /// Driver name for diagnostics.
    fn name(&self) -> &str;

    /// Modes the backend supports at `color_depth`. Entries at other depths
    /// may be present and are filtered out by the caller.
    fn supported_modes(&self, color_depth: i32) -> DriverResult<Vec<DisplayMode>>;

    /// Try to switch to `mode`.
    fn set_display_mode(&mut self, mode: &DisplayMode) -> DriverResult<()>;

    /// The active mode as actually set by the backend.
    fn display_mode(&self) -> Option<DisplayMode>;

    /// Native (game) resolution the driver renders from.
    fn set_native_size(&mut self, size: Size) -> DriverResult<()>;

    fn native_size(&self) -> Option<Size>;

    /// Rectangle of the screen the native frame is scaled into.
    fn set_render_frame(&mut self, frame: Rect) -> DriverResult<()>;

    /// Where the game image currently lands on screen.
    fn render_destination(&self) -> Rect;

    fn set_graphics_filter(&mut self, filter: GfxFilter) -> DriverResult<()>;

    fn graphics_filter(&self) -> Option<&GfxFilter>;

    fn is_mode_set(&self) -> bool {
        self.display_mode().is_some()
    }
}

/// Creates drivers and filters for one backend.
pub trait GfxDriverFactory {
    /// Backend id this factory was registered under.
    fn id(&self) -> &str;

    /// Instantiate the driver.
    fn create_driver(&mut self) -> DriverResult<Box<dyn GraphicsDriver>>;

    /// Filters this backend provides.
    fn filters(&self) -> &[FilterInfo];

    fn default_filter_id(&self) -> &str;

    /// Create the filter `id` and attach it to `driver`.
    fn set_filter(&mut self, driver: &mut dyn GraphicsDriver, id: &str) -> DriverResult<GfxFilter> {
        let info = self
            .filters()
            .iter()
            .find(|info| info.id.eq_ignore_ascii_case(id))
            .cloned()
            .ok_or_else(|| DriverError::UnsupportedFilter(id.to_string()))?;
        let filter = GfxFilter {
            info,
            destination: driver.render_destination(),
        };
        driver.set_graphics_filter(filter.clone())?;
        Ok(filter)
    }

    /// Release backend resources.
    fn shutdown(&mut self) {}
}

/// Platform display information.
pub trait DeviceQuery {
    /// Current desktop resolution.
    fn desktop_size(&self) -> DriverResult<Size>;

    /// Clamp a window size to what the platform allows. `fullscreen` asks for
    /// the limits of a borderless full-screen window instead of a decorated
    /// one.
    fn clamp_window_size(&self, size: Size, fullscreen: bool) -> Size;
}

type FactoryCtor = Box<dyn Fn() -> Box<dyn GfxDriverFactory>>;

/// Ordered table of backend constructors keyed by id.
#[derive(Default)]
pub struct DriverRegistry {
    entries: Vec<(String, FactoryCtor)>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. A later registration under the same id replaces
    /// the constructor but keeps the original position.
    pub fn register<F>(&mut self, id: impl Into<String>, ctor: F)
    where
        F: Fn() -> Box<dyn GfxDriverFactory> + 'static,
    {
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = Box::new(ctor),
            None => self.entries.push((id, Box::new(ctor))),
        }
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == id)
    }

    pub fn create_factory(&self, id: &str) -> Option<Box<dyn GfxDriverFactory>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, ctor)| ctor())
    }

    /// Ids with `preferred` moved to the front; the rest keep their order.
    /// `None` in the second slot means the preferred id is unknown.
    pub fn ordered_ids(&self, preferred: &str) -> (Vec<String>, Option<usize>) {
        let mut ids = self.ids();
        let found = ids.iter().position(|id| id == preferred);
        if let Some(pos) = found {
            ids[..=pos].rotate_right(1);
        }
        (ids, found)
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
