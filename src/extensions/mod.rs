//! Host-facing extension points.
//!
//! Plugins observe engine events; they never mutate engine internals.

pub mod plugins;

pub use plugins::{GanttEvent, GanttPlugin, PluginContext};
