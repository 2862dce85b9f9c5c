//! Errors reported by display mode negotiation.

use crate::graphics::driver::DriverError;
use crate::graphics::geometry::{Rect, Size};
use crate::graphics::mode::DisplayMode;

/// Mode negotiation errors.
///
/// Everything except [`GraphicsModeError::InvalidFrameSetup`] and
/// [`GraphicsModeError::InitFailed`] is recoverable inside the activation
/// ladder: the next color depth, policy or backend is tried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphicsModeError {
    /// Integer frame scaling was requested with a non-positive factor.
    #[error("Invalid game frame setup: integer scaling needs a positive factor (got {scale_factor})")]
    InvalidFrameSetup { scale_factor: i32 },

    #[error("Failed to initialize {0} graphics factory: no such backend")]
    FactoryNotFound(String),

    #[error("Failed to create graphics driver '{id}': {source}")]
    DriverCreation { id: String, source: DriverError },

    #[error("No graphics driver is active")]
    NoDriver,

    #[error("Could not find compatible mode for {mode}")]
    NoCompatibleMode { mode: DisplayMode },

    #[error("Failed to init gfx mode {mode}: {source}")]
    ModeActivation { mode: DisplayMode, source: DriverError },

    #[error("Failed to set native size {size}: {source}")]
    NativeSize { size: Size, source: DriverError },

    #[error("Failed to set render frame {frame}: {source}")]
    RenderFrame { frame: Rect, source: DriverError },

    #[error("Unable to set graphics filter '{id}': {source}")]
    Filter { id: String, source: DriverError },

    /// Every backend and both windowed/fullscreen policies failed.
    #[error("{message}")]
    InitFailed { message: String },
}

impl GraphicsModeError {
    /// Backend error text behind this failure, if any.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::DriverCreation { source, .. }
            | Self::ModeActivation { source, .. }
            | Self::NativeSize { source, .. }
            | Self::RenderFrame { source, .. }
            | Self::Filter { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = GraphicsModeError::NoCompatibleMode {
            mode: DisplayMode::new(Size::new(1920, 1080), 32, false),
        };
        assert_eq!(
            err.to_string(),
            "Could not find compatible mode for 1920 x 1080 (32-bit) fullscreen"
        );
        assert!(err.driver_error().is_none());

        let err = GraphicsModeError::Filter {
            id: "hq3x".into(),
            source: DriverError::UnsupportedFilter("hq3x".into()),
        };
        assert_eq!(
            err.to_string(),
            "Unable to set graphics filter 'hq3x': Unsupported graphics filter: hq3x"
        );
        assert_eq!(
            err.driver_error(),
            Some(&DriverError::UnsupportedFilter("hq3x".into()))
        );
    }
}
