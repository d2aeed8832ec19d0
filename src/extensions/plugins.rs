use serde::{Deserialize, Serialize};

use crate::api::CommitRequest;
use crate::core::{Geometry, ItemId, Sight, Viewport};
use crate::interaction::DragTarget;

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub container: Viewport,
    pub sight: Sight,
    pub translation: (f64, f64),
    pub item_count: usize,
    pub dragging: bool,
    pub disabled: bool,
}

/// Event stream exposed to plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GanttEvent {
    DataUpdated { item_count: usize },
    RowsCollapsed { item: ItemId, collapsed: bool },
    SightChanged { from: Sight, to: Sight },
    TranslationChanged { x: f64, y: f64 },
    DragStarted { target: DragTarget },
    /// Continuous geometry while the pointer moves or auto-scroll runs.
    DragUpdated { target: DragTarget, geometry: Geometry },
    /// Final geometry, emitted once per completed gesture.
    DragEnded { target: DragTarget, geometry: Geometry },
    DragCancelled { target: DragTarget },
    Clicked { target: DragTarget },
    CommitRequested(CommitRequest),
    CommitResolved { ticket: u64, item: ItemId, accepted: bool },
    ColumnResized { name: String, width: f64 },
    TableResized { width: f64 },
    AutoScrolled { delta: f64 },
}

/// Extension hook interface for bounded custom logic.
pub trait GanttPlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &GanttEvent, context: PluginContext);
}
