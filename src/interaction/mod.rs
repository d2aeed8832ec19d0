//! Pointer gesture state shared by every draggable surface.
//!
//! A session records the pointer and geometry at press time; each move
//! recomputes the live geometry from that anchor, never incrementally.

pub mod auto_scroll;

use serde::{Deserialize, Serialize};

use crate::core::ItemId;
use crate::core::types::Geometry;

pub use auto_scroll::{AutoScrollConfig, AutoScrollController, Edge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Move,
    LeftResize,
    RightResize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    /// Pressed, not yet moved.
    Armed,
    Dragging,
}

/// Surface a session manipulates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragTarget {
    Bar { item: ItemId, kind: DragKind },
    /// Creates dates for an item that has none.
    BarCreate { item: ItemId },
    Column { name: String },
    /// Boundary between the table panel and the chart.
    Divider,
    Pan,
    TimeAxisPan,
    ScrollThumb,
}

impl DragTarget {
    #[must_use]
    pub fn kind(&self) -> DragKind {
        match self {
            Self::Bar { kind, .. } => *kind,
            Self::BarCreate { .. } | Self::Column { .. } | Self::Divider => DragKind::RightResize,
            Self::Pan | Self::TimeAxisPan | Self::ScrollThumb => DragKind::Move,
        }
    }

    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::Bar { item, .. } | Self::BarCreate { item } => Some(*item),
            _ => None,
        }
    }

    /// Auto-scroll only follows gestures that move bars in time.
    #[must_use]
    pub fn auto_scrolls(&self) -> bool {
        matches!(self, Self::Bar { .. } | Self::BarCreate { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragOptions {
    pub min_width: f64,
    /// Snap step in pixels; `None` disables snapping.
    pub grid: Option<f64>,
    /// Enter `Dragging` on press instead of on first move.
    pub click_start: bool,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            grid: None,
            click_start: false,
        }
    }
}

impl DragOptions {
    #[must_use]
    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = min_width;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: f64) -> Self {
        self.grid = (grid.is_finite() && grid > 0.0).then_some(grid);
        self
    }

    #[must_use]
    pub fn with_click_start(mut self, click_start: bool) -> Self {
        self.click_start = click_start;
        self
    }
}

/// How a session ended on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DragEnd {
    /// Released without moving.
    Click,
    Committed(Geometry),
}

/// `round(value / grid) * grid`.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

/// Geometry for `kind` after moving `delta` away from `anchor`.
#[must_use]
pub fn resolve_geometry(kind: DragKind, anchor: Geometry, delta: (f64, f64), options: DragOptions) -> Geometry {
    let (dx, dy) = delta;
    let snap_to_grid = |value: f64| options.grid.map_or(value, |grid| snap(value, grid));
    match kind {
        DragKind::LeftResize => {
            let width = snap_to_grid((anchor.width - dx).max(options.min_width));
            Geometry {
                x: anchor.x - (width - anchor.width),
                width,
                ..anchor
            }
        }
        DragKind::RightResize => Geometry {
            width: snap_to_grid((anchor.width + dx).max(options.min_width)),
            ..anchor
        },
        DragKind::Move => Geometry {
            x: anchor.x + snap_to_grid(dx),
            y: anchor.y + dy,
            ..anchor
        },
    }
}

/// The single in-flight pointer gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    target: DragTarget,
    phase: DragPhase,
    anchor_pointer: (f64, f64),
    anchor_geometry: Geometry,
    pointer: (f64, f64),
    auto_scroll_offset: f64,
    options: DragOptions,
}

impl DragSession {
    #[must_use]
    pub fn arm(target: DragTarget, pointer: (f64, f64), anchor_geometry: Geometry, options: DragOptions) -> Self {
        let phase = if options.click_start {
            DragPhase::Dragging
        } else {
            DragPhase::Armed
        };
        Self {
            target,
            phase,
            anchor_pointer: pointer,
            anchor_geometry,
            pointer,
            auto_scroll_offset: 0.0,
            options,
        }
    }

    #[must_use]
    pub fn target(&self) -> &DragTarget {
        &self.target
    }

    #[must_use]
    pub fn kind(&self) -> DragKind {
        self.target.kind()
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    #[must_use]
    pub fn anchor_geometry(&self) -> Geometry {
        self.anchor_geometry
    }

    #[must_use]
    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    #[must_use]
    pub fn auto_scroll_offset(&self) -> f64 {
        self.auto_scroll_offset
    }

    #[must_use]
    pub fn options(&self) -> DragOptions {
        self.options
    }

    /// Pointer travel since press, plus horizontal auto-scroll.
    #[must_use]
    pub fn delta(&self) -> (f64, f64) {
        (
            self.pointer.0 - self.anchor_pointer.0 + self.auto_scroll_offset,
            self.pointer.1 - self.anchor_pointer.1,
        )
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        resolve_geometry(self.kind(), self.anchor_geometry, self.delta(), self.options)
    }

    /// Records a pointer move. The first move away from the press point
    /// promotes `Armed` to `Dragging`; a move onto it keeps the session armed.
    pub fn update(&mut self, pointer: (f64, f64)) -> Geometry {
        self.pointer = pointer;
        if pointer != self.anchor_pointer {
            self.phase = DragPhase::Dragging;
        }
        self.geometry()
    }

    /// Swaps the press-time geometry and options, keeping the pointer travel.
    pub fn rebase(&mut self, anchor_geometry: Geometry, options: DragOptions) {
        self.anchor_geometry = anchor_geometry;
        self.options = options;
    }

    /// Folds an auto-scroll step into the horizontal delta.
    pub fn add_auto_scroll(&mut self, delta_x: f64) -> Geometry {
        self.auto_scroll_offset += delta_x;
        self.geometry()
    }

    #[must_use]
    pub fn finish(self) -> DragEnd {
        match self.phase {
            DragPhase::Armed => DragEnd::Click,
            DragPhase::Dragging => DragEnd::Committed(self.geometry()),
        }
    }

    /// Abandons the gesture, returning the geometry at press time.
    #[must_use]
    pub fn cancel(self) -> Geometry {
        self.anchor_geometry
    }
}
