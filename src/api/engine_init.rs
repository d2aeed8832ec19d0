use std::collections::HashMap;

use chrono::Local;
use indexmap::IndexMap;
use tracing::debug;

use crate::core::{
    ColumnConfig, ItemTree, RecordKeys, SightCatalog, TimeScale, TimelineRange, column::default_columns,
};
use crate::error::GanttResult;
use crate::interaction::AutoScrollController;
use crate::render::Renderer;

use super::derived_cache::DerivedCache;
use super::engine::{
    EngineCore, GanttModel, InteractionRuntime, RuntimeState, ViewState, default_rest_day,
};
use super::invalidation::{InvalidationMask, Revisions};
use super::validation::{clamp_table_width, validate_engine_config};
use super::{GanttEngine, GanttEngineConfig};

impl<R: Renderer> GanttEngine<R> {
    /// Creates an engine with no items, the default column set and today centred.
    pub fn new(renderer: R, config: GanttEngineConfig) -> GanttResult<Self> {
        validate_engine_config(&config)?;
        let sights = SightCatalog::with_overrides(&config.sight_configs)?;
        let today = config.today.unwrap_or_else(|| Local::now().date_naive());
        let range = TimelineRange::fit(today, today, config.timeline_padding_days)?;
        let scale = TimeScale::new(range.origin, sights.get(config.sight).seconds_per_pixel)?;

        let mut engine = Self {
            renderer,
            core: EngineCore {
                model: GanttModel {
                    tree: ItemTree::default(),
                    record_keys: RecordKeys::default(),
                    dependencies: Vec::new(),
                    custom_events: Vec::new(),
                    columns: default_columns(),
                    column_config: ColumnConfig::default(),
                    locale: config.locale,
                    rest_day: default_rest_day(),
                    duration_fn: None,
                    workday_mode: config.workday_mode,
                    today,
                },
                view: ViewState {
                    container: config.container,
                    sight: config.sight,
                    sights,
                    range,
                    scale,
                    translate_x: 0.0,
                    translate_y: 0.0,
                    table_width: clamp_table_width(config.table_width, config.container.width),
                    hide_table: config.hide_table,
                    row_height: config.row_height,
                    bar_height: config.bar_height,
                    header_height: config.header_height,
                    padding_days: config.timeline_padding_days,
                    hovered_row: None,
                },
                interaction: InteractionRuntime {
                    session: None,
                    snapshot: None,
                    auto_scroll: AutoScrollController::new(config.auto_scroll),
                    disabled: config.disabled,
                    overrides: HashMap::new(),
                    pending: IndexMap::new(),
                    next_ticket: 1,
                },
                runtime: RuntimeState {
                    plugins: Vec::new(),
                    pending_invalidation: InvalidationMask::full(),
                    revisions: Revisions::default(),
                    derived: DerivedCache::default(),
                },
            },
        };

        engine.back_to_today();
        debug!(
            sight = ?engine.core.view.sight,
            origin = %engine.core.view.range.origin,
            today = %today,
            "gantt engine initialized"
        );
        Ok(engine)
    }
}
