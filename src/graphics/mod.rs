//!
//! Graphics mode negotiation.
//!
//! Turns a requested screen setup into a running display mode on whichever
//! backend can provide one:
//! - `geometry`: sizes, rects and fixed-point scaling
//! - `mode`: display mode and setup descriptions
//! - `driver`: backend traits and the backend registry
//! - `catalog` / `matcher`: supported mode lists and nearest-mode search
//! - `planner`: screen size and render frame planning
//! - `filter`: filter selection with default fallback
//! - `activation`: the fallback ladder and runtime mode switching
//! - `software`: in-memory backend
//! - `sdl`: SDL2 backend (feature `sdl`)

pub mod activation;
pub mod catalog;
pub mod driver;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod matcher;
pub mod mode;
pub mod planner;
pub mod software;

#[cfg(feature = "sdl")]
pub mod sdl;

pub use activation::{ActivationStage, GraphicsModeContext, ModeResult};
pub use driver::{
    DeviceQuery, DriverError, DriverRegistry, DriverResult, FilterInfo, GfxDriverFactory,
    GfxFilter, GraphicsDriver,
};
pub use error::GraphicsModeError;
pub use geometry::{PlaneScaling, Rect, Size, SCALE_SHIFT, SCALE_UNIT};
pub use mode::{
    ColorDepthOption, DisplayMode, DisplayModeSetup, FrameScaleDef, GameFrameSetup,
    GfxFilterSetup, ScreenSetup, ScreenSizeDef,
};
pub use software::{SoftwareDevice, SoftwareDriverFactory, SOFTWARE_DRIVER_ID};
