use std::time::Instant;

use tracing::{debug, trace};

use crate::core::column::{MIN_COLUMN_WIDTH, resize_column};
use crate::core::{BarOverride, ColumnConfig, Geometry, ItemId, TimeScale};
use crate::error::{GanttError, GanttResult};
use crate::extensions::GanttEvent;
use crate::interaction::{DragEnd, DragKind, DragOptions, DragSession, DragTarget, Edge};
use crate::render::Renderer;

use super::commit_controller::DragOutcome;
use super::invalidation::InvalidationTopic;
use super::GanttEngine;
use super::validation::MIN_TABLE_WIDTH;

/// State restored when a gesture is cancelled.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DragSnapshot {
    pub(super) translation: (f64, f64),
    pub(super) table_width: f64,
    pub(super) column_config: Option<ColumnConfig>,
    /// Pending dates the bar showed before the gesture.
    pub(super) previous_override: Option<BarOverride>,
}

impl<R: Renderer> GanttEngine<R> {
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.core.interaction.disabled
    }

    /// Disabling cancels an in-flight bar gesture.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.core.interaction.disabled == disabled {
            return;
        }
        self.core.interaction.disabled = disabled;
        let bar_session = self
            .core
            .interaction
            .session
            .as_ref()
            .is_some_and(|session| session.target().auto_scrolls());
        if disabled && bar_session {
            self.pointer_cancel();
        }
        self.invalidate(InvalidationTopic::Drag);
        debug!(disabled, "engine disabled state changed");
    }

    #[must_use]
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.core.interaction.session.as_ref()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.core
            .interaction
            .session
            .as_ref()
            .is_some_and(DragSession::is_dragging)
    }

    #[must_use]
    pub fn auto_scroll_active(&self) -> bool {
        self.core.interaction.auto_scroll.is_active()
    }

    /// Host report that the scroll container hit one of its edges.
    pub fn set_edge_reached(&mut self, edge: Edge, reached: bool) {
        self.core.interaction.auto_scroll.set_edge_reached(edge, reached);
    }

    /// Starts a gesture on `target` at container position `(x, y)`.
    ///
    /// Returns `Ok(false)` when the press is ignored: another session exists or
    /// the target refuses to be dragged.
    pub fn pointer_down(&mut self, target: DragTarget, x: f64, y: f64) -> GanttResult<bool> {
        if self.core.interaction.session.is_some() {
            trace!(?target, "pointer down ignored while a session is active");
            return Ok(false);
        }
        let Some((anchor, options)) = self.drag_anchor(&target, x)? else {
            trace!(?target, "drag target refused to arm");
            return Ok(false);
        };

        let previous_override = target
            .item()
            .and_then(|item| self.core.interaction.overrides.get(&item).copied());
        let column_config = matches!(target, DragTarget::Column { .. })
            .then(|| self.core.model.column_config.clone());
        self.core.interaction.snapshot = Some(DragSnapshot {
            translation: self.translation(),
            table_width: self.core.view.table_width,
            column_config,
            previous_override,
        });

        let session = DragSession::arm(target.clone(), (x, y), anchor, options);
        let dragging = session.is_dragging();
        let geometry = session.geometry();
        self.core.interaction.session = Some(session);
        if target.auto_scrolls() {
            let view_width = self.view_width();
            let local_x = x - self.table_width();
            let auto_scroll = &mut self.core.interaction.auto_scroll;
            auto_scroll.start(view_width);
            auto_scroll.update_pointer(local_x, view_width);
        }
        debug!(?target, click_start = options.click_start, "drag armed");

        if dragging {
            self.emit_event(GanttEvent::DragStarted {
                target: target.clone(),
            });
            let geometry = self.apply_live_geometry(&target, geometry);
            self.emit_event(GanttEvent::DragUpdated { target, geometry });
        }
        Ok(true)
    }

    /// Feeds a pointer move. Without a session this only tracks the hovered row.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<Geometry> {
        let Some(session) = self.core.interaction.session.as_mut() else {
            self.pointer_hover(y);
            return None;
        };
        let was_armed = !session.is_dragging();
        let geometry = session.update((x, y));
        if !session.is_dragging() {
            return None;
        }
        let target = session.target().clone();

        if was_armed {
            self.emit_event(GanttEvent::DragStarted {
                target: target.clone(),
            });
        }
        if target.auto_scrolls() {
            let view_width = self.view_width();
            let local_x = x - self.table_width();
            self.core
                .interaction
                .auto_scroll
                .update_pointer(local_x, view_width);
        }
        let geometry = self.apply_live_geometry(&target, geometry);
        self.emit_event(GanttEvent::DragUpdated {
            target,
            geometry,
        });
        Some(geometry)
    }

    /// Ends the gesture.
    pub fn pointer_up(&mut self) -> GanttResult<DragOutcome> {
        let Some(session) = self.core.interaction.session.take() else {
            return Ok(DragOutcome::Idle);
        };
        let snapshot = self.core.interaction.snapshot.take();
        self.core.interaction.auto_scroll.stop();
        let target = session.target().clone();

        let geometry = match session.finish() {
            DragEnd::Click => {
                if let Some(item) = target.item() {
                    let previous = snapshot.and_then(|snapshot| snapshot.previous_override);
                    self.restore_bar_override(item, previous);
                }
                debug!(?target, "drag released without movement");
                self.emit_event(GanttEvent::Clicked {
                    target: target.clone(),
                });
                return Ok(DragOutcome::Click { target });
            }
            DragEnd::Committed(geometry) => geometry,
        };

        let outcome = match &target {
            DragTarget::Bar { item, .. } | DragTarget::BarCreate { item } => {
                let previous = snapshot.and_then(|snapshot| snapshot.previous_override);
                return self.commit_bar(target.clone(), *item, geometry, previous);
            }
            DragTarget::Column { name } => {
                let width = self
                    .core
                    .model
                    .column_config
                    .column_widths
                    .get(name)
                    .copied()
                    .unwrap_or(geometry.width);
                self.emit_event(GanttEvent::ColumnResized {
                    name: name.clone(),
                    width,
                });
                DragOutcome::Committed {
                    target: target.clone(),
                    geometry: Geometry { width, ..geometry },
                }
            }
            DragTarget::Divider => {
                let width = self.core.view.table_width;
                self.emit_event(GanttEvent::TableResized { width });
                DragOutcome::Committed {
                    target: target.clone(),
                    geometry: Geometry { width, ..geometry },
                }
            }
            DragTarget::Pan | DragTarget::TimeAxisPan | DragTarget::ScrollThumb => {
                DragOutcome::Committed {
                    target: target.clone(),
                    geometry,
                }
            }
        };
        if let DragOutcome::Committed { geometry, .. } = &outcome {
            self.emit_event(GanttEvent::DragEnded {
                target: target.clone(),
                geometry: *geometry,
            });
        }
        debug!(?target, "drag committed");
        Ok(outcome)
    }

    /// Abandons the gesture and restores the state captured at press time.
    pub fn pointer_cancel(&mut self) -> bool {
        let Some(session) = self.core.interaction.session.take() else {
            return false;
        };
        let snapshot = self.core.interaction.snapshot.take();
        self.core.interaction.auto_scroll.stop();
        let target = session.target().clone();
        let anchor = session.cancel();

        match &target {
            DragTarget::Bar { item, .. } | DragTarget::BarCreate { item } => {
                let previous = snapshot.as_ref().and_then(|snapshot| snapshot.previous_override);
                self.restore_bar_override(*item, previous);
            }
            DragTarget::Column { .. } => {
                if let Some(config) = snapshot.as_ref().and_then(|snapshot| snapshot.column_config.clone()) {
                    self.core.model.column_config = config;
                    self.invalidate(InvalidationTopic::Columns);
                }
            }
            DragTarget::Divider => {
                let width = snapshot.as_ref().map_or(anchor.width, |snapshot| snapshot.table_width);
                if width != self.core.view.table_width {
                    self.core.view.table_width = width;
                    self.invalidate(InvalidationTopic::Viewport);
                    self.clamp_translation();
                }
            }
            DragTarget::Pan | DragTarget::TimeAxisPan | DragTarget::ScrollThumb => {
                if let Some(snapshot) = &snapshot {
                    let (x, y) = snapshot.translation;
                    self.set_translation(x, y);
                }
            }
        }
        debug!(?target, "drag cancelled");
        self.emit_event(GanttEvent::DragCancelled { target });
        true
    }

    /// Advances auto-scroll to `now`. Returns the applied horizontal scroll.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        let session = self.core.interaction.session.as_ref()?;
        if !session.is_dragging() || !session.target().auto_scrolls() {
            return None;
        }
        let requested = self.core.interaction.auto_scroll.poll(now)?;

        let before = self.core.view.translate_x;
        let (after, _) = self.pan_by(requested, 0.0);
        let applied = after - before;
        if (applied - requested).abs() > f64::EPSILON {
            let edge = if requested < 0.0 { Edge::Left } else { Edge::Right };
            self.core.interaction.auto_scroll.set_edge_reached(edge, true);
            debug!(?edge, "auto-scroll reached timeline edge");
        }
        if applied == 0.0 {
            return None;
        }

        let session = self.core.interaction.session.as_mut()?;
        let geometry = session.add_auto_scroll(applied);
        let target = session.target().clone();
        let geometry = self.apply_live_geometry(&target, geometry);
        self.emit_event(GanttEvent::AutoScrolled { delta: applied });
        self.emit_event(GanttEvent::DragUpdated { target, geometry });
        Some(applied)
    }

    /// Anchor geometry and options for a press, or `None` when the target refuses.
    fn drag_anchor(&mut self, target: &DragTarget, x: f64) -> GanttResult<Option<(Geometry, DragOptions)>> {
        let day_px = self.core.view.scale.pixels_per_day();
        let bar_options = DragOptions::default()
            .with_min_width(day_px)
            .with_grid(day_px);

        let anchor = match target {
            DragTarget::Bar { item, .. } => {
                if !self.bar_accepts_drag(*item)? {
                    return Ok(None);
                }
                match self.bar(*item) {
                    Some(bar) if !bar.invalid => Some((bar.geometry(), bar_options)),
                    _ => None,
                }
            }
            DragTarget::BarCreate { item } => {
                if !self.bar_accepts_drag(*item)? {
                    return Ok(None);
                }
                match self.bar(*item) {
                    Some(bar) if bar.invalid => {
                        let scale = self.core.view.scale;
                        let day = scale.to_date(self.chart_x(x));
                        let anchor = Geometry::new(scale.to_pixel(day), bar.translate_y, day_px, bar.height);
                        Some((anchor, bar_options.with_click_start(true)))
                    }
                    _ => None,
                }
            }
            DragTarget::Column { name } => {
                let header_height = self.core.view.header_height;
                let column = self
                    .table_layout()
                    .column(name)
                    .ok_or_else(|| GanttError::UnknownColumn(name.clone()))?;
                let anchor = Geometry::new(column.left, 0.0, column.width, header_height);
                Some((anchor, DragOptions::default().with_min_width(MIN_COLUMN_WIDTH)))
            }
            DragTarget::Divider => {
                let anchor = Geometry::new(0.0, 0.0, self.table_width(), self.core.view.container.height);
                Some((anchor, DragOptions::default().with_min_width(MIN_TABLE_WIDTH)))
            }
            DragTarget::Pan | DragTarget::TimeAxisPan => {
                let (tx, ty) = self.translation();
                Some((Geometry::new(tx, ty, 0.0, 0.0), DragOptions::default()))
            }
            DragTarget::ScrollThumb => {
                let thumb = self.scroll_bar();
                thumb
                    .visible
                    .then(|| (Geometry::new(thumb.left, 0.0, thumb.width, 0.0), DragOptions::default()))
            }
        };
        Ok(anchor)
    }

    /// Re-expresses the live gesture after the scale moved away from `old_scale`.
    ///
    /// Bar anchors keep their instants and snap to the new day width; pans and
    /// the scroll thumb re-anchor on the current translation.
    pub(super) fn rebase_live_drag(&mut self, old_scale: TimeScale) {
        let scale = self.core.view.scale;
        let half_view = self.view_width() / 2.0;
        if let Some(snapshot) = self.core.interaction.snapshot.as_mut() {
            let (x, y) = snapshot.translation;
            snapshot.translation = (scale.rebase_pixel(old_scale, x + half_view) - half_view, y);
        }

        let Some(session) = self.core.interaction.session.as_ref() else {
            return;
        };
        let target = session.target().clone();
        let anchor = session.anchor_geometry();
        let options = session.options();
        let (dx, _) = session.delta();
        let rebased = match &target {
            DragTarget::Bar { .. } | DragTarget::BarCreate { .. } => {
                let left = scale.rebase_pixel(old_scale, anchor.x);
                let right = scale.rebase_pixel(old_scale, anchor.right());
                let day_px = scale.pixels_per_day();
                let anchor = Geometry {
                    x: left,
                    width: right - left,
                    ..anchor
                };
                Some((anchor, options.with_min_width(day_px).with_grid(day_px)))
            }
            DragTarget::Pan | DragTarget::TimeAxisPan => {
                let x = self.translation().0 + dx;
                Some((Geometry { x, ..anchor }, options))
            }
            DragTarget::ScrollThumb => {
                let x = self.scroll_bar().left - dx;
                Some((Geometry { x, ..anchor }, options))
            }
            DragTarget::Column { .. } | DragTarget::Divider => None,
        };
        let Some((anchor, options)) = rebased else {
            return;
        };
        let Some(session) = self.core.interaction.session.as_mut() else {
            return;
        };
        session.rebase(anchor, options);
        let geometry = session.geometry();
        if target.auto_scrolls() && session.is_dragging() {
            self.apply_live_geometry(&target, geometry);
        }
        trace!(?target, "live drag rebased onto the new scale");
    }

    fn bar_accepts_drag(&self, item: ItemId) -> GanttResult<bool> {
        let node = self.core.model.tree.node(item)?;
        Ok(!self.core.interaction.disabled && !node.disabled && !node.has_derived_span())
    }

    /// Applies live session geometry to the state it drives; returns what was applied.
    fn apply_live_geometry(&mut self, target: &DragTarget, geometry: Geometry) -> Geometry {
        match target {
            DragTarget::Bar { item, kind } => self.apply_bar_geometry(*item, *kind, geometry),
            DragTarget::BarCreate { item } => {
                self.apply_bar_geometry(*item, DragKind::RightResize, geometry)
            }
            DragTarget::Column { name } => {
                let width = resize_column(&mut self.core.model.column_config, name, geometry.width);
                self.invalidate(InvalidationTopic::Columns);
                Geometry { width, ..geometry }
            }
            DragTarget::Divider => {
                let width = self.set_table_width(geometry.width);
                Geometry { width, ..geometry }
            }
            DragTarget::Pan | DragTarget::TimeAxisPan | DragTarget::ScrollThumb => {
                let Some(session) = self.core.interaction.session.as_ref() else {
                    return geometry;
                };
                let anchor = session.anchor_geometry();
                let (dx, dy) = session.delta();
                let (tx, ty) = self.translation();
                let (x, y) = match target {
                    DragTarget::Pan => (anchor.x - dx, anchor.y - dy),
                    DragTarget::TimeAxisPan => (anchor.x - dx, ty),
                    _ => {
                        let view = self.view_width();
                        let scroll = self.scroll_extent().width;
                        if view > 0.0 {
                            (geometry.x * scroll / view, ty)
                        } else {
                            (tx, ty)
                        }
                    }
                };
                let (x, y) = self.set_translation(x, y);
                Geometry { x, y, ..geometry }
            }
        }
    }

    fn apply_bar_geometry(&mut self, item: ItemId, kind: DragKind, geometry: Geometry) -> Geometry {
        let right = geometry.right();
        let x = geometry.x.max(0.0);
        let width = if kind == DragKind::LeftResize {
            right - x
        } else {
            geometry.width
        };
        let geometry = Geometry { x, width, ..geometry };
        self.core
            .interaction
            .overrides
            .insert(item, BarOverride::Live(geometry));
        self.invalidate(InvalidationTopic::Drag);
        geometry
    }

    fn restore_bar_override(&mut self, item: ItemId, previous: Option<BarOverride>) {
        match previous {
            Some(previous) => {
                self.core.interaction.overrides.insert(item, previous);
            }
            None => {
                self.core.interaction.overrides.remove(&item);
            }
        }
        self.invalidate(InvalidationTopic::Drag);
    }

    fn commit_bar(
        &mut self,
        target: DragTarget,
        item: ItemId,
        released: Geometry,
        previous: Option<BarOverride>,
    ) -> GanttResult<DragOutcome> {
        let geometry = self
            .core
            .interaction
            .overrides
            .get(&item)
            .and_then(|live| live.live_geometry())
            .unwrap_or(released);

        if self.pending_ticket_for(item).is_some() {
            self.restore_bar_override(item, previous);
            debug!(item = %item, "commit rejected: confirmation already pending");
            self.emit_event(GanttEvent::DragCancelled { target });
            return Ok(DragOutcome::Rejected { item });
        }

        let scale = self.core.view.scale;
        let start = scale.to_nearest_date(geometry.x);
        let end = scale.to_nearest_date(geometry.right());
        self.emit_event(GanttEvent::DragEnded {
            target: target.clone(),
            geometry,
        });

        let node = self.core.model.tree.node(item)?;
        if node.start == Some(start) && node.end == Some(end) {
            self.restore_bar_override(item, None);
            return Ok(DragOutcome::Committed { target, geometry });
        }
        let request = self.open_commit(item, start, end)?;
        Ok(DragOutcome::PendingConfirmation(request))
    }
}
