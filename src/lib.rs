//! Library exports for the snapgrab subsystems.
//!
//! The capture pipeline, selection state machine, gallery store and
//! configuration types are exposed so integration tests and external tools
//! can drive them without going through the CLI.

pub mod capture;
pub mod config;
pub mod gallery;
pub mod notification;
pub mod selection;

pub use config::Config;
