//! gantt-rs: Gantt timeline layout and interaction engine.
//!
//! The crate turns a hierarchical item list into rows, bars, time-axis ticks,
//! table columns and dependence connectors for a scrollable timeline, and
//! runs the drag/resize state machine that edits bars and panels. Drawing is
//! left to a host [`render::Renderer`].

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{GanttEngine, GanttEngineConfig};
pub use error::{GanttError, GanttResult};
