use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
}

/// Tuning for edge auto-scroll while dragging bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoScrollConfig {
    /// Distance from a chart edge that activates scrolling.
    #[serde(default = "default_edge_threshold_px")]
    pub edge_threshold_px: f64,
    /// Step per interval when the pointer is one threshold deep.
    #[serde(default = "default_max_step_px")]
    pub max_step_px: f64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Intervals replayed by one poll after a stall.
    #[serde(default = "default_max_catch_up")]
    pub max_catch_up: u32,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_threshold_px: default_edge_threshold_px(),
            max_step_px: default_max_step_px(),
            interval_ms: default_interval_ms(),
            max_catch_up: default_max_catch_up(),
        }
    }
}

impl AutoScrollConfig {
    #[must_use]
    pub fn interval(self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

fn default_edge_threshold_px() -> f64 {
    50.0
}

fn default_max_step_px() -> f64 {
    5.0
}

fn default_interval_ms() -> u64 {
    16
}

fn default_max_catch_up() -> u32 {
    4
}

/// Polled edge scroller.
///
/// Nothing runs in the background: the host calls [`AutoScrollController::poll`]
/// with the current time and applies the returned horizontal delta.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoScrollController {
    config: AutoScrollConfig,
    active: bool,
    pointer_x: Option<f64>,
    view_width: f64,
    left_reached: bool,
    right_reached: bool,
    last_tick: Option<Instant>,
}

impl AutoScrollController {
    #[must_use]
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            active: false,
            pointer_x: None,
            view_width: 0.0,
            left_reached: false,
            right_reached: false,
            last_tick: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> AutoScrollConfig {
        self.config
    }

    pub fn set_config(&mut self, config: AutoScrollConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, view_width: f64) {
        self.active = true;
        self.view_width = view_width;
        self.pointer_x = None;
        self.left_reached = false;
        self.right_reached = false;
        self.last_tick = None;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.pointer_x = None;
        self.last_tick = None;
    }

    /// Pointer x relative to the chart's left edge.
    pub fn update_pointer(&mut self, local_x: f64, view_width: f64) {
        self.pointer_x = Some(local_x);
        self.view_width = view_width;
    }

    pub fn set_edge_reached(&mut self, edge: Edge, reached: bool) {
        match edge {
            Edge::Left => self.left_reached = reached,
            Edge::Right => self.right_reached = reached,
        }
    }

    #[must_use]
    pub fn edge_reached(&self, edge: Edge) -> bool {
        match edge {
            Edge::Left => self.left_reached,
            Edge::Right => self.right_reached,
        }
    }

    /// Edge zone the pointer is in and how deep, capped at twice the threshold.
    #[must_use]
    pub fn zone(&self) -> Option<(Edge, f64)> {
        let x = self.pointer_x?;
        let threshold = self.config.edge_threshold_px;
        let (edge, depth) = if x < threshold {
            (Edge::Left, threshold - x)
        } else if x > self.view_width - threshold {
            (Edge::Right, x - (self.view_width - threshold))
        } else {
            return None;
        };
        Some((edge, depth.min(threshold * 2.0)))
    }

    /// Horizontal scroll owed since the previous poll, if any.
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        if !self.active {
            return None;
        }
        let Some((edge, depth)) = self.zone().filter(|(edge, _)| !self.edge_reached(*edge)) else {
            self.last_tick = Some(now);
            return None;
        };
        let Some(last_tick) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };

        let interval = self.config.interval();
        let elapsed = now.saturating_duration_since(last_tick);
        let due = u32::try_from(elapsed.as_nanos() / interval.as_nanos()).unwrap_or(u32::MAX);
        if due == 0 {
            return None;
        }
        let steps = due.min(self.config.max_catch_up.max(1));
        self.last_tick = if due > steps {
            Some(now)
        } else {
            Some(last_tick + interval * steps)
        };

        let threshold = self.config.edge_threshold_px.max(f64::EPSILON);
        let step = self.config.max_step_px * depth / threshold * f64::from(steps);
        Some(match edge {
            Edge::Left => -step,
            Edge::Right => step,
        })
    }
}

impl Default for AutoScrollController {
    fn default() -> Self {
        Self::new(AutoScrollConfig::default())
    }
}
