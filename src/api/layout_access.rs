use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::bar::project_bars;
use crate::core::column::{format_cell, resolve_layout};
use crate::core::dependence::build_connectors;
use crate::core::hierarchy::{count_visible_rows, flatten};
use crate::core::label_format::{count_days, duration_label};
use crate::core::marker::project_markers;
use crate::core::ticks::generate_ticks;
use crate::core::{
    Bar, BarMetrics, Connector, EventMarker, ItemId, Row, SpanWarning, TableLayout, TickSet,
};
use crate::error::{GanttError, GanttResult};
use crate::interaction::{DragKind, DragTarget};
use crate::render::Renderer;

use super::GanttEngine;
use super::derived_cache::{
    BAR_INPUTS, CONNECTOR_INPUTS, FLATTEN_INPUTS, TABLE_INPUTS, TICK_INPUTS,
};

/// Grab zone on each bar edge that starts a resize instead of a move.
pub const RESIZE_HANDLE_PX: f64 = 6.0;

/// What a press at a chart position would drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarHit {
    pub item: ItemId,
    pub row_index: usize,
    pub target: DragTarget,
}

impl<R: Renderer> GanttEngine<R> {
    /// Visible rows in pre-order.
    pub fn rows(&mut self) -> &[Row] {
        self.ensure_flattened();
        &self.core.runtime.derived.flattened.value().rows
    }

    /// Descendants extending past fixed group dates.
    pub fn span_warnings(&mut self) -> &[SpanWarning] {
        self.ensure_flattened();
        &self.core.runtime.derived.flattened.value().warnings
    }

    /// One bar per visible row, in row order.
    pub fn bars(&mut self) -> &[Bar] {
        self.ensure_bars();
        self.core.runtime.derived.bars.value()
    }

    #[must_use]
    pub fn bar(&mut self, item: ItemId) -> Option<Bar> {
        self.bars().iter().find(|bar| bar.item == item).cloned()
    }

    /// Ticks covering the visible pixel range.
    pub fn ticks(&mut self) -> &TickSet {
        let fingerprint = self.core.runtime.revisions.fingerprint(TICK_INPUTS);
        let fresh = self.core.runtime.derived.ticks.is_fresh(fingerprint);
        if self.core.runtime.derived.record_lookup(fresh) {
            let model = &self.core.model;
            let view = &self.core.view;
            let ticks = generate_ticks(
                view.scale,
                view.sight,
                self.visible_pixel_range(),
                &model.locale,
                model.rest_day.as_ref(),
                model.today,
            );
            self.core.runtime.derived.ticks.store(fingerprint, ticks);
        }
        self.core.runtime.derived.ticks.value()
    }

    pub fn table_layout(&mut self) -> &TableLayout {
        let fingerprint = self.core.runtime.revisions.fingerprint(TABLE_INPUTS);
        let fresh = self.core.runtime.derived.table.is_fresh(fingerprint);
        if self.core.runtime.derived.record_lookup(fresh) {
            let layout = resolve_layout(
                &self.core.model.columns,
                &self.core.model.column_config,
                Some(self.table_width()),
            );
            self.core.runtime.derived.table.store(fingerprint, layout);
        }
        self.core.runtime.derived.table.value()
    }

    /// Connector polylines for dependences between visible, valid bars.
    pub fn connectors(&mut self) -> &[Connector] {
        self.ensure_bars();
        let fingerprint = self.core.runtime.revisions.fingerprint(CONNECTOR_INPUTS);
        let fresh = self.core.runtime.derived.connectors.is_fresh(fingerprint);
        if self.core.runtime.derived.record_lookup(fresh) {
            let connectors = build_connectors(
                &self.core.model.tree,
                &self.core.model.dependencies,
                self.core.runtime.derived.bars.value(),
                self.bar_metrics(),
            );
            self.core.runtime.derived.connectors.store(fingerprint, connectors);
        }
        self.core.runtime.derived.connectors.value()
    }

    /// Day-sight markers for custom events inside the visible range.
    pub fn custom_event_markers(&mut self) -> Vec<EventMarker> {
        let scale = self.core.view.scale;
        let sight = self.core.view.sight;
        let height = self.scroll_extent().height;
        let ticks = self.ticks().clone();
        project_markers(&self.core.model.custom_events, &ticks, scale, sight, height)
    }

    /// Display text of one table cell.
    pub fn cell_text(&self, item: ItemId, column: &str) -> GanttResult<String> {
        let node = self.core.model.tree.node(item)?;
        let column = self
            .core
            .model
            .columns
            .iter()
            .find(|candidate| candidate.name == column)
            .ok_or_else(|| GanttError::UnknownColumn(column.to_owned()))?;
        Ok(format_cell(column, &node.record))
    }

    /// Tracks the row under the pointer; `y` is container-relative.
    pub fn pointer_hover(&mut self, y: f64) -> Option<usize> {
        let row = self.row_at(y);
        self.core.view.hovered_row = row;
        row
    }

    pub fn pointer_leave(&mut self) {
        self.core.view.hovered_row = None;
    }

    #[must_use]
    pub fn hovered_row(&self) -> Option<usize> {
        self.core.view.hovered_row
    }

    /// Resolves which drag a press at container position `(x, y)` starts.
    ///
    /// Presses near a bar edge resize it, presses inside move it, and presses on
    /// an undated row create a bar. Bars that cannot be dragged yield `None`.
    pub fn hit_test_bar(&mut self, x: f64, y: f64) -> Option<BarHit> {
        let row_index = self.row_at(y)?;
        let chart_x = self.chart_x(x);
        let chart_y = y - self.core.view.header_height + self.core.view.translate_y;
        let bar = self.bars().get(row_index)?.clone();
        if !bar.draggable {
            return None;
        }
        if bar.invalid {
            return Some(BarHit {
                item: bar.item,
                row_index,
                target: DragTarget::BarCreate { item: bar.item },
            });
        }

        let geometry = bar.geometry();
        if chart_y < geometry.y || chart_y > geometry.y + geometry.height {
            return None;
        }
        if chart_x < geometry.x - RESIZE_HANDLE_PX || chart_x > geometry.right() + RESIZE_HANDLE_PX
        {
            return None;
        }
        let (edge, distance) = [
            (DragKind::LeftResize, (chart_x - geometry.x).abs()),
            (DragKind::RightResize, (chart_x - geometry.right()).abs()),
        ]
        .into_iter()
        .min_by_key(|(_, distance)| OrderedFloat(*distance))?;
        let kind = if distance <= RESIZE_HANDLE_PX {
            edge
        } else {
            DragKind::Move
        };
        Some(BarHit {
            item: bar.item,
            row_index,
            target: DragTarget::Bar {
                item: bar.item,
                kind,
            },
        })
    }

    /// Converts a container x to an absolute timeline pixel.
    #[must_use]
    pub fn chart_x(&self, x: f64) -> f64 {
        x - self.table_width() + self.core.view.translate_x
    }

    /// Visible row under container-relative `y`, if any.
    #[must_use]
    pub fn row_at(&self, y: f64) -> Option<usize> {
        let body_y = y - self.core.view.header_height;
        if body_y < 0.0 || body_y > self.body_height() {
            return None;
        }
        let index = ((body_y + self.core.view.translate_y) / self.core.view.row_height).floor();
        let index = index as usize;
        (index < self.visible_row_count()).then_some(index)
    }

    pub(super) fn bar_metrics(&self) -> BarMetrics {
        BarMetrics {
            row_height: self.core.view.row_height,
            bar_height: self.core.view.bar_height,
        }
    }

    pub(super) fn visible_row_count(&self) -> usize {
        let fingerprint = self.core.runtime.revisions.fingerprint(FLATTEN_INPUTS);
        let memo = &self.core.runtime.derived.flattened;
        if memo.is_fresh(fingerprint) {
            memo.value().rows.len()
        } else {
            count_visible_rows(&self.core.model.tree)
        }
    }

    pub(super) fn ensure_flattened(&mut self) {
        let fingerprint = self.core.runtime.revisions.fingerprint(FLATTEN_INPUTS);
        let fresh = self.core.runtime.derived.flattened.is_fresh(fingerprint);
        if self.core.runtime.derived.record_lookup(fresh) {
            let flattened = flatten(&self.core.model.tree);
            self.core.runtime.derived.flattened.store(fingerprint, flattened);
        }
    }

    fn ensure_bars(&mut self) {
        self.ensure_flattened();
        let fingerprint = self.core.runtime.revisions.fingerprint(BAR_INPUTS);
        let fresh = self.core.runtime.derived.bars.is_fresh(fingerprint);
        if !self.core.runtime.derived.record_lookup(fresh) {
            return;
        }

        let metrics = self.bar_metrics();
        let model = &self.core.model;
        let overrides = &self.core.interaction.overrides;
        let override_for = |item: ItemId| overrides.get(&item).copied();
        let mut bars = project_bars(
            &model.tree,
            self.core.runtime.derived.flattened.value(),
            self.core.view.scale,
            metrics,
            &override_for,
            self.core.interaction.disabled,
        );
        for bar in &mut bars {
            if let (Some(start), Some(end)) = (bar.start, bar.end) {
                let days = match &model.duration_fn {
                    Some(duration_fn) => duration_fn(start, end),
                    None => count_days(start, end, model.workday_mode, model.rest_day.as_ref()),
                };
                bar.duration_label = Some(duration_label(&model.locale, days));
            }
        }
        self.core.runtime.derived.bars.store(fingerprint, bars);
    }
}
