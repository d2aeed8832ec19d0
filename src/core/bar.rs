use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::hierarchy::{EffectiveSpan, Flattened, Row};
use crate::core::item::{ItemId, ItemTree};
use crate::core::time_scale::TimeScale;
use crate::core::types::Geometry;

/// Vertical metrics shared by every bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarMetrics {
    pub row_height: f64,
    pub bar_height: f64,
}

impl BarMetrics {
    /// Top of the bar inside row `index`, centred in the row.
    #[must_use]
    pub fn bar_top(self, index: usize) -> f64 {
        index as f64 * self.row_height + (self.row_height - self.bar_height) / 2.0
    }

    /// Vertical centre of row `index`.
    #[must_use]
    pub fn row_center(self, index: usize) -> f64 {
        index as f64 * self.row_height + self.row_height / 2.0
    }
}

/// Renderable bar for one visible row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub item: ItemId,
    pub row_index: usize,
    pub depth: usize,
    pub translate_x: f64,
    pub translate_y: f64,
    pub width: f64,
    pub height: f64,
    /// `true` when the item has no usable date range; geometry is zeroed.
    pub invalid: bool,
    pub group: bool,
    pub collapsed: bool,
    pub child_count: usize,
    pub label: String,
    /// Localized duration text such as `"3 days"`; `None` for invalid bars.
    pub duration_label: Option<String>,
    /// Dates currently displayed (optimistic while a drag or commit is pending).
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// A confirmation for this bar's new dates is outstanding.
    pub loading: bool,
    pub draggable: bool,
}

impl Bar {
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.translate_x, self.translate_y, self.width, self.height)
    }
}

/// Replaces a row's derived placement while a gesture or commit is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarOverride {
    /// Live drag geometry in pixels of the current scale.
    Live(Geometry),
    /// Dates awaiting confirmation, projected through whatever scale is current.
    Pending { start: NaiveDate, end: NaiveDate },
}

impl BarOverride {
    #[must_use]
    pub fn live_geometry(self) -> Option<Geometry> {
        match self {
            Self::Live(geometry) => Some(geometry),
            Self::Pending { .. } => None,
        }
    }
}

/// Builds the bar for `row` from its resolved span.
///
/// `override_geometry` carries a live drag or a pending commit; it replaces the
/// horizontal placement while the row keeps its vertical slot.
#[must_use]
pub fn project_bar(
    tree: &ItemTree,
    row: &Row,
    span: EffectiveSpan,
    scale: TimeScale,
    metrics: BarMetrics,
    override_geometry: Option<BarOverride>,
    engine_disabled: bool,
) -> Bar {
    let node = tree.get(row.item);
    let label = node.map(|node| node.content.clone()).unwrap_or_default();
    let draggable = !engine_disabled
        && node.is_some_and(|node| !node.disabled && !node.has_derived_span());
    let translate_y = metrics.bar_top(row.index);

    let mut bar = Bar {
        item: row.item,
        row_index: row.index,
        depth: row.depth,
        translate_x: 0.0,
        translate_y,
        width: 0.0,
        height: metrics.bar_height,
        invalid: true,
        group: row.group,
        collapsed: row.collapsed,
        child_count: row.child_count,
        label,
        duration_label: None,
        start: None,
        end: None,
        loading: false,
        draggable,
    };

    match override_geometry {
        Some(BarOverride::Live(geometry)) => {
            bar.translate_x = geometry.x;
            bar.width = geometry.width;
            bar.invalid = false;
            bar.start = Some(scale.to_date(geometry.x));
            bar.end = Some(scale.to_date(geometry.right()));
            return bar;
        }
        Some(BarOverride::Pending { start, end }) => {
            bar.translate_x = scale.to_pixel(start);
            bar.width = scale.width_between(start, end);
            bar.invalid = false;
            bar.loading = true;
            bar.start = Some(start);
            bar.end = Some(end);
            return bar;
        }
        None => {}
    }

    if let Some((start, end)) = span.dates() {
        bar.translate_x = scale.to_pixel(start);
        bar.width = scale.width_between(start, end);
        bar.invalid = false;
        bar.start = Some(start);
        bar.end = Some(end);
    }
    bar
}

/// Projects every visible row.
#[must_use]
pub fn project_bars(
    tree: &ItemTree,
    flattened: &Flattened,
    scale: TimeScale,
    metrics: BarMetrics,
    override_for: &(dyn Fn(ItemId) -> Option<BarOverride> + Sync),
    engine_disabled: bool,
) -> Vec<Bar> {
    let project = |row: &Row| {
        project_bar(
            tree,
            row,
            flattened.span(row.item),
            scale,
            metrics,
            override_for(row.item),
            engine_disabled,
        )
    };

    #[cfg(feature = "parallel-projection")]
    {
        use rayon::prelude::*;
        flattened.rows.par_iter().map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        flattened.rows.iter().map(project).collect()
    }
}
