use serde::{Deserialize, Serialize};

use crate::core::{
    Bar, Connector, EventMarker, Row, ScrollBar, ScrollExtent, Sight, TableLayout, TickSet,
    Viewport,
};
use crate::error::{GanttError, GanttResult};

/// Everything a backend needs to paint one pass of the table and chart.
///
/// Horizontal positions are absolute timeline pixels; backends subtract
/// `translation.0` when drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttFrame {
    pub viewport: Viewport,
    pub sight: Sight,
    pub translation: (f64, f64),
    pub scroll_extent: ScrollExtent,
    pub scroll_bar: ScrollBar,
    pub header_height: f64,
    pub row_height: f64,
    pub table: TableLayout,
    pub rows: Vec<Row>,
    pub bars: Vec<Bar>,
    pub ticks: TickSet,
    pub connectors: Vec<Connector>,
    pub markers: Vec<EventMarker>,
    pub today_x: f64,
}

impl GanttFrame {
    pub fn validate(&self) -> GanttResult<()> {
        if !self.viewport.is_valid() {
            return Err(GanttError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for bar in &self.bars {
            let geometry = bar.geometry();
            let finite = [geometry.x, geometry.y, geometry.width, geometry.height]
                .iter()
                .all(|value| value.is_finite());
            if !finite || geometry.width < 0.0 {
                return Err(GanttError::InvalidData(format!(
                    "bar for item {} has invalid geometry",
                    bar.item
                )));
            }
        }
        for tick in self.ticks.majors.iter().chain(&self.ticks.minors) {
            if !tick.left.is_finite() || !tick.width.is_finite() || tick.width < 0.0 {
                return Err(GanttError::InvalidData(format!(
                    "tick {} has invalid geometry",
                    tick.key
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.bars.is_empty()
    }
}
