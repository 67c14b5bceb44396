//! Shared data model, constants, and formatting. Compiles on every target.

pub mod format;
pub mod model;
pub mod paths;
