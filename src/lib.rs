// gfxmode library
// Display mode negotiation and render frame planning

pub mod cli;
pub mod config;
pub mod graphics;
pub mod logging;
pub mod propfile;

pub use cli::Cli;
pub use config::Options;
pub use graphics::{GraphicsModeContext, GraphicsModeError};
pub use logging::LogLevel;
