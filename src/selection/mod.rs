//! Interactive region selection.
//!
//! This module provides:
//! - [`SelectionRect`]: normalized drag geometry in viewport pixels
//! - [`SelectionController`] / [`RegionSelector`]: the drag-to-select overlay
//!   state machine, driven by pointer events from an [`OverlaySurface`]
//! - a compositor-native picker (`slurp`) used by the CLI for interactive
//!   region selection

pub mod overlay;
pub mod rect;
pub mod slurp;

pub use overlay::{
    OverlaySurface, PointerEvent, RegionSelector, SelectionController, SelectionStatus,
};
pub use rect::SelectionRect;

use thiserror::Error;

/// Errors produced by selection sessions and region pickers.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A second session was requested while one is still pending.
    #[error("a selection overlay is already active")]
    AlreadyActive,

    /// The user aborted the selection; no rectangle is available.
    #[error("selection cancelled")]
    Cancelled,

    /// An event was fed into a session that already reached a terminal state.
    #[error("selection session already finished")]
    SessionFinished,

    /// The overlay surface failed to mount or tear down.
    #[error("overlay surface error: {0}")]
    Surface(String),

    /// A picker emitted geometry that could not be parsed.
    #[error("invalid region geometry '{0}'")]
    InvalidGeometry(String),

    /// The external region picker failed to run.
    #[error("region picker failed: {0}")]
    Picker(String),
}
