//! Driver command implementations
//!
//! Grouped the way the wire surface groups them: element operations and
//! screenshot capture.

pub mod element;
pub mod screenshot;

pub use element::ElementCommands;
pub use screenshot::{ScreenshotCommands, ScreenshotConfig};
