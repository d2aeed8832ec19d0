use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::core::label_format::is_weekend;
use crate::core::{
    BarOverride, Column, ColumnConfig, CustomEvent, Dependence, DurationFn, GanttLocale, ItemId,
    ItemTree, RecordKeys, RestDayFn, Sight, SightCatalog, TimeScale, TimelineRange, Viewport, WorkdayMode,
};
use crate::error::GanttResult;
use crate::extensions::GanttPlugin;
use crate::interaction::{AutoScrollController, DragSession};
use crate::render::{GanttFrame, Renderer};

use super::commit_controller::PendingCommit;
use super::derived_cache::{DerivedCache, DerivedCacheStats};
use super::interaction_controller::DragSnapshot;
use super::invalidation::{InvalidationMask, Revisions};

/// Main orchestration facade consumed by host applications.
///
/// `GanttEngine` owns the item tree, the scale window and viewport, the single
/// drag session and pending commits, and memoizes everything derived from them.
pub struct GanttEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) core: EngineCore,
}

pub(super) struct EngineCore {
    pub(super) model: GanttModel,
    pub(super) view: ViewState,
    pub(super) interaction: InteractionRuntime,
    pub(super) runtime: RuntimeState,
}

/// Host-supplied data and presentation rules.
pub(super) struct GanttModel {
    pub(super) tree: ItemTree,
    /// Record fields that mirror item dates.
    pub(super) record_keys: RecordKeys,
    pub(super) dependencies: Vec<Dependence>,
    pub(super) custom_events: Vec<CustomEvent>,
    pub(super) columns: Vec<Column>,
    pub(super) column_config: ColumnConfig,
    pub(super) locale: GanttLocale,
    pub(super) rest_day: RestDayFn,
    pub(super) duration_fn: Option<DurationFn>,
    pub(super) workday_mode: WorkdayMode,
    pub(super) today: NaiveDate,
}

/// Scale window, container metrics and the single translation pair.
pub(super) struct ViewState {
    pub(super) container: Viewport,
    pub(super) sight: Sight,
    pub(super) sights: SightCatalog,
    pub(super) range: TimelineRange,
    pub(super) scale: TimeScale,
    pub(super) translate_x: f64,
    pub(super) translate_y: f64,
    pub(super) table_width: f64,
    pub(super) hide_table: bool,
    pub(super) row_height: f64,
    pub(super) bar_height: f64,
    pub(super) header_height: f64,
    pub(super) padding_days: u32,
    pub(super) hovered_row: Option<usize>,
}

pub(super) struct InteractionRuntime {
    pub(super) session: Option<DragSession>,
    pub(super) snapshot: Option<DragSnapshot>,
    pub(super) auto_scroll: AutoScrollController,
    pub(super) disabled: bool,
    /// Live drag geometry and pending dates, keyed by item.
    pub(super) overrides: HashMap<ItemId, BarOverride>,
    pub(super) pending: IndexMap<u64, PendingCommit>,
    pub(super) next_ticket: u64,
}

pub(super) struct RuntimeState {
    pub(super) plugins: Vec<Box<dyn GanttPlugin>>,
    pub(super) pending_invalidation: InvalidationMask,
    pub(super) revisions: Revisions,
    pub(super) derived: DerivedCache,
}

pub(super) fn default_rest_day() -> RestDayFn {
    Arc::new(is_weekend)
}

impl<R: Renderer> GanttEngine<R> {
    /// Materializes the current frame.
    pub fn build_frame(&mut self) -> GanttFrame {
        let rows = self.rows().to_vec();
        let bars = self.bars().to_vec();
        let ticks = self.ticks().clone();
        let table = self.table_layout().clone();
        let connectors = self.connectors().to_vec();
        let markers = self.custom_event_markers();
        GanttFrame {
            viewport: self.core.view.container,
            sight: self.core.view.sight,
            translation: self.translation(),
            scroll_extent: self.scroll_extent(),
            scroll_bar: self.scroll_bar(),
            header_height: self.core.view.header_height,
            row_height: self.core.view.row_height,
            table,
            rows,
            bars,
            ticks,
            connectors,
            markers,
            today_x: self.today_offset(),
        }
    }

    /// Builds the frame and hands it to the renderer.
    pub fn render(&mut self) -> GanttResult<()> {
        let frame = self.build_frame();
        self.renderer.render(&frame)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn derived_cache_stats(&self) -> DerivedCacheStats {
        self.core.runtime.derived.stats()
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
