//! Engine facade and its controllers.
//!
//! Every controller extends [`GanttEngine`] through its own `impl` block; state
//! lives in the engine core and derived layout is memoized by revision.

mod commit_controller;
mod data_controller;
mod derived_cache;
mod engine;
mod engine_config;
mod engine_init;
mod interaction_controller;
mod invalidation;
mod layout_access;
mod plugin_dispatch;
mod plugin_registry;
mod validation;
mod viewport_controller;

pub use commit_controller::{CommitRequest, DragOutcome};
pub use derived_cache::DerivedCacheStats;
pub use engine::GanttEngine;
pub use engine_config::GanttEngineConfig;
pub use invalidation::{
    InvalidationLevel, InvalidationMask, InvalidationTopic, InvalidationTopics,
};
pub use layout_access::{BarHit, RESIZE_HANDLE_PX};
pub use validation::{MIN_CHART_WIDTH, MIN_TABLE_WIDTH, clamp_table_width};
pub use viewport_controller::MIN_SCROLL_THUMB_WIDTH;
