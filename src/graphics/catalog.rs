//! Supported-mode catalog: one read-only snapshot of the modes a driver
//! reports for a color depth.

use crate::graphics::driver::{DriverResult, GraphicsDriver};
use crate::graphics::mode::DisplayMode;

/// Modes per line in the log listing.
const MODES_PER_LINE: usize = 8;

/// Snapshot of the modes a driver supports at one color depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeCatalog {
    color_depth: i32,
    modes: Vec<DisplayMode>,
}

impl ModeCatalog {
    /// Query `driver` once for its modes at `color_depth`.
    pub fn query(driver: &dyn GraphicsDriver, color_depth: i32) -> DriverResult<Self> {
        let modes = driver.supported_modes(color_depth)?;
        Ok(Self { color_depth, modes })
    }

    pub fn from_modes(color_depth: i32, modes: Vec<DisplayMode>) -> Self {
        Self { color_depth, modes }
    }

    pub fn color_depth(&self) -> i32 {
        self.color_depth
    }

    /// Everything the driver reported, including entries at other depths.
    pub fn modes(&self) -> &[DisplayMode] {
        &self.modes
    }

    /// Entries at the catalog's color depth.
    pub fn matching(&self) -> impl Iterator<Item = &DisplayMode> {
        self.modes
            .iter()
            .filter(move |mode| mode.color_depth == self.color_depth)
    }

    /// Human-readable listing, `WxH;` entries wrapped every few modes.
    pub fn describe(&self) -> String {
        let mut listing = String::new();
        for (i, mode) in self.matching().enumerate() {
            if i % MODES_PER_LINE == 0 {
                listing.push_str("\n\t");
            }
            listing.push_str(&format!("{}x{};", mode.width, mode.height));
        }

        let mut out = format!("Supported gfx modes ({}-bit): ", self.color_depth);
        if listing.is_empty() {
            out.push_str("none");
        } else {
            out.push_str(&listing);
        }
        out
    }
}

/// Write the modes `driver` supports at `color_depth` to the log.
pub fn log_driver_modes(driver: &dyn GraphicsDriver, color_depth: i32) {
    match ModeCatalog::query(driver, color_depth) {
        Ok(catalog) => log::info!("{}", catalog.describe()),
        Err(err) => log::warn!(
            "Couldn't get a list of supported resolutions for color depth = {}: {}",
            color_depth,
            err
        ),
    }
}
