//!
//! SDL2 backend for graphics mode negotiation.
//!

pub mod sdl2;

pub use self::sdl2::{SdlDevice, SdlDriver, SdlDriverFactory, SDL_DRIVER_ID};
