//! Command-translation layer for an Instruments/UIAutomation iOS driver
//!
//! Converts abstract UI-element operations into `au.*` command strings for
//! the native automation bridge or atom executions for web content, computes
//! scrollable content extents for table/collection containers, and acquires
//! screenshots through a capture-then-poll protocol with bounded retry.
//!
//! The bridge, atom executor, filesystem, and image collaborators are all
//! injected traits, so everything here runs under test without a device.

pub mod client;
pub mod commands;
pub mod content_size;
pub mod error;
pub mod retry;
pub mod utils;

// Re-export common items
pub use client::{AtomExecutor, Orientation, SessionContext, UiAutoClient};
pub use commands::element::{ElementCommands, ElementOptions};
pub use commands::screenshot::{
    crop_base64_image, CropRect, LocalScreenshotIo, ScreenshotCommands, ScreenshotConfig,
    ScreenshotIo,
};
pub use content_size::{
    compute_content_size, ContainerKind, ContentSize, Dimensions, Frame, Point,
};
pub use error::DriverError;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
