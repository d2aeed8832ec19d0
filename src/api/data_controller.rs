use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use crate::core::column::resize_column;
use crate::core::item::items_from_json;
use crate::core::{
    Column, ColumnConfig, CustomEvent, Dependence, DurationFn, GanttLocale, ItemId, ItemInput,
    ItemNode, ItemTree, RecordKeys, RestDayFn, SightCatalog, SightConfig, WorkdayMode,
};
use crate::error::{GanttError, GanttResult};
use crate::extensions::GanttEvent;
use crate::render::Renderer;

use super::GanttEngine;
use super::invalidation::InvalidationTopic;
use super::validation::{validate_column_config, validate_columns};

impl<R: Renderer> GanttEngine<R> {
    /// Replaces the whole item tree.
    ///
    /// Any gesture in flight is cancelled and pending commits are dropped, since
    /// their item ids no longer refer to the same records.
    pub fn set_items(&mut self, items: Vec<ItemInput>) -> GanttResult<()> {
        let mut tree = ItemTree::from_inputs(items)?;
        tree.store_dates(&self.core.model.record_keys);
        self.pointer_cancel();
        self.core.interaction.auto_scroll.stop();
        self.clear_pending_commits();

        self.core.model.tree = tree;
        self.core.view.hovered_row = None;
        self.invalidate(InvalidationTopic::Data);
        self.refresh_scale_window()?;

        let item_count = self.core.model.tree.len();
        debug!(
            item_count,
            roots = self.core.model.tree.roots().len(),
            "set items"
        );
        self.emit_event(GanttEvent::DataUpdated { item_count });
        Ok(())
    }

    /// Imports nested JSON records using `keys` for the date and content fields.
    pub fn set_records_json(
        &mut self,
        records: &serde_json::Value,
        keys: &RecordKeys,
    ) -> GanttResult<()> {
        let items = items_from_json(records, keys)?;
        let previous_keys = std::mem::replace(&mut self.core.model.record_keys, keys.clone());
        let result = self.set_items(items);
        if result.is_err() {
            self.core.model.record_keys = previous_keys;
        }
        result
    }

    /// Record fields that mirror item dates; replaced by [`Self::set_records_json`].
    #[must_use]
    pub fn record_keys(&self) -> &RecordKeys {
        &self.core.model.record_keys
    }

    /// Flips the collapsed flag of `item`. Returns the new state.
    pub fn toggle_collapse(&mut self, item: ItemId) -> GanttResult<bool> {
        let collapsed = !self.core.model.tree.node(item)?.collapsed;
        self.set_collapsed(item, collapsed)?;
        Ok(collapsed)
    }

    pub fn set_collapsed(&mut self, item: ItemId, collapsed: bool) -> GanttResult<()> {
        let node = self.core.model.tree.node_mut(item)?;
        if node.collapsed == collapsed {
            return Ok(());
        }
        node.collapsed = collapsed;
        self.invalidate(InvalidationTopic::Rows);
        self.clamp_translation();
        trace!(item = %item, collapsed, "row collapse changed");
        self.emit_event(GanttEvent::RowsCollapsed { item, collapsed });
        Ok(())
    }

    /// Edits the stored dates of one item; `None` leaves a side untouched.
    pub fn update_item_dates(
        &mut self,
        item: ItemId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> GanttResult<()> {
        let node = self.core.model.tree.node_mut(item)?;
        let next_start = start.or(node.start);
        let next_end = end.or(node.end);
        if let (Some(next_start), Some(next_end)) = (next_start, next_end) {
            if next_end < next_start {
                return Err(GanttError::InvalidData(format!(
                    "item {item} end {next_end} precedes start {next_start}"
                )));
            }
        }
        node.start = next_start;
        node.end = next_end;
        node.store_dates(&self.core.model.record_keys);
        self.invalidate(InvalidationTopic::Data);
        self.refresh_scale_window()
    }

    /// Moves `item` under `parent` (or to the top level) at sibling `position`.
    pub fn reparent_item(
        &mut self,
        item: ItemId,
        parent: Option<ItemId>,
        position: usize,
    ) -> GanttResult<()> {
        self.core.model.tree.reparent(item, parent, position)?;
        self.invalidate(InvalidationTopic::Data);
        self.clamp_translation();
        debug!(item = %item, parent = ?parent, position, "item reparented");
        Ok(())
    }

    /// Replaces the dependence list. Links naming unknown keys are kept but never drawn.
    pub fn set_dependencies(&mut self, dependencies: Vec<Dependence>) {
        let unknown = dependencies
            .iter()
            .filter(|dependence| {
                self.core.model.tree.id_of(&dependence.from).is_none()
                    || self.core.model.tree.id_of(&dependence.to).is_none()
            })
            .count();
        if unknown > 0 {
            warn!(unknown, "dependencies reference unknown item keys");
        }
        self.core.model.dependencies = dependencies;
        self.invalidate(InvalidationTopic::Dependencies);
    }

    pub fn set_custom_events(&mut self, events: Vec<CustomEvent>) {
        self.core.model.custom_events = events;
        self.invalidate(InvalidationTopic::Presentation);
    }

    /// Replaces the column definitions. Explicit widths of removed columns are dropped.
    pub fn set_columns(&mut self, columns: Vec<Column>) -> GanttResult<()> {
        validate_columns(&columns)?;
        self.core
            .model
            .column_config
            .column_widths
            .retain(|name, _| columns.iter().any(|column| &column.name == name));
        self.core.model.columns = columns;
        self.invalidate(InvalidationTopic::Columns);
        Ok(())
    }

    pub fn set_column_config(&mut self, config: ColumnConfig) -> GanttResult<()> {
        validate_column_config(&config)?;
        self.core.model.column_config = config;
        self.invalidate(InvalidationTopic::Columns);
        Ok(())
    }

    /// Sets an explicit width for one column. Returns the applied width.
    pub fn resize_column(&mut self, name: &str, width: f64) -> GanttResult<f64> {
        if !self.core.model.columns.iter().any(|column| column.name == name) {
            return Err(GanttError::UnknownColumn(name.to_owned()));
        }
        if !width.is_finite() {
            return Err(GanttError::InvalidData(format!(
                "column width for `{name}` must be finite"
            )));
        }
        let applied = resize_column(&mut self.core.model.column_config, name, width);
        self.invalidate(InvalidationTopic::Columns);
        self.emit_event(GanttEvent::ColumnResized {
            name: name.to_owned(),
            width: applied,
        });
        Ok(applied)
    }

    pub fn set_locale(&mut self, locale: GanttLocale) {
        self.core.model.locale = locale;
        self.invalidate(InvalidationTopic::Presentation);
    }

    /// Predicate marking rest days in tick shading and business-day durations.
    pub fn set_rest_day_fn(&mut self, rest_day: RestDayFn) {
        self.core.model.rest_day = rest_day;
        self.invalidate(InvalidationTopic::Presentation);
    }

    /// Host duration rule for bar labels; `None` restores the built-in count.
    pub fn set_duration_fn(&mut self, duration_fn: Option<DurationFn>) {
        self.core.model.duration_fn = duration_fn;
        self.invalidate(InvalidationTopic::Presentation);
    }

    pub fn set_workday_mode(&mut self, mode: WorkdayMode) {
        if self.core.model.workday_mode != mode {
            self.core.model.workday_mode = mode;
            self.invalidate(InvalidationTopic::Presentation);
        }
    }

    /// Moves the today anchor. The scale window refits to keep today inside.
    pub fn set_today(&mut self, today: NaiveDate) -> GanttResult<()> {
        if self.core.model.today == today {
            return Ok(());
        }
        self.core.model.today = today;
        self.invalidate(InvalidationTopic::Scale);
        self.invalidate(InvalidationTopic::Presentation);
        self.refresh_scale_window()
    }

    /// Replaces sight constants. The current sight is rescaled around the view centre.
    pub fn set_sight_configs(&mut self, configs: &[SightConfig]) -> GanttResult<()> {
        let sights = SightCatalog::with_overrides(configs)?;
        let seconds_per_pixel = sights.get(self.core.view.sight).seconds_per_pixel;
        self.core.view.sights = sights;
        if seconds_per_pixel != self.core.view.scale.seconds_per_pixel() {
            self.rescale(self.core.view.range, seconds_per_pixel)?;
        }
        debug!(count = configs.len(), "sight configs replaced");
        Ok(())
    }

    #[must_use]
    pub fn sight_configs(&self) -> &[SightConfig] {
        self.core.view.sights.configs()
    }

    /// Resolves a host key to the arena id of the current tree.
    #[must_use]
    pub fn item_id(&self, key: &str) -> Option<ItemId> {
        self.core.model.tree.id_of(key)
    }

    pub fn item(&self, item: ItemId) -> GanttResult<&ItemNode> {
        self.core.model.tree.node(item)
    }

    pub fn item_by_key(&self, key: &str) -> GanttResult<&ItemNode> {
        let id = self
            .item_id(key)
            .ok_or_else(|| GanttError::UnknownItemKey(key.to_owned()))?;
        self.item(id)
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.core.model.tree.len()
    }

    #[must_use]
    pub fn tree(&self) -> &ItemTree {
        &self.core.model.tree
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependence] {
        &self.core.model.dependencies
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.core.model.columns
    }

    #[must_use]
    pub fn column_config(&self) -> &ColumnConfig {
        &self.core.model.column_config
    }

    #[must_use]
    pub fn locale(&self) -> &GanttLocale {
        &self.core.model.locale
    }
}
