use std::ops::Range;

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::core::{PixelRange, ScrollBar, ScrollExtent, Sight, TimeScale, TimelineRange, Viewport};
use crate::error::GanttResult;
use crate::extensions::GanttEvent;
use crate::render::Renderer;

use super::GanttEngine;
use super::invalidation::InvalidationTopic;
use super::validation::{clamp_table_width, validate_container};

/// Thumbs never shrink below this width.
pub const MIN_SCROLL_THUMB_WIDTH: f64 = 30.0;

impl<R: Renderer> GanttEngine<R> {
    #[must_use]
    pub fn container(&self) -> Viewport {
        self.core.view.container
    }

    #[must_use]
    pub fn sight(&self) -> Sight {
        self.core.view.sight
    }

    #[must_use]
    pub fn time_scale(&self) -> TimeScale {
        self.core.view.scale
    }

    #[must_use]
    pub fn timeline_range(&self) -> TimelineRange {
        self.core.view.range
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.core.model.today
    }

    #[must_use]
    pub fn row_height(&self) -> f64 {
        self.core.view.row_height
    }

    #[must_use]
    pub fn header_height(&self) -> f64 {
        self.core.view.header_height
    }

    /// Width of the table panel, zero when the table is hidden.
    #[must_use]
    pub fn table_width(&self) -> f64 {
        if self.core.view.hide_table {
            0.0
        } else {
            self.core.view.table_width
        }
    }

    /// Width of the chart area right of the table panel.
    #[must_use]
    pub fn view_width(&self) -> f64 {
        (self.core.view.container.width - self.table_width()).max(0.0)
    }

    /// Height of the chart body below the time axis header.
    #[must_use]
    pub fn body_height(&self) -> f64 {
        (self.core.view.container.height - self.core.view.header_height).max(0.0)
    }

    #[must_use]
    pub fn translation(&self) -> (f64, f64) {
        (self.core.view.translate_x, self.core.view.translate_y)
    }

    /// Scrollable size; the height never drops below the body height.
    #[must_use]
    pub fn scroll_extent(&self) -> ScrollExtent {
        let rows_height = self.visible_row_count() as f64 * self.core.view.row_height;
        ScrollExtent {
            width: self.core.view.scale.to_pixel(self.core.view.range.end),
            height: rows_height.max(self.body_height()),
        }
    }

    #[must_use]
    pub fn max_translation(&self) -> (f64, f64) {
        let extent = self.scroll_extent();
        (
            (extent.width - self.view_width()).max(0.0),
            (extent.height - self.body_height()).max(0.0),
        )
    }

    /// Absolute timeline pixels currently inside the chart area.
    #[must_use]
    pub fn visible_pixel_range(&self) -> PixelRange {
        let start = self.core.view.translate_x;
        PixelRange::new(start, start + self.view_width())
    }

    /// Rows to materialize for the current vertical scroll, `overscan` rows
    /// extra on each side.
    #[must_use]
    pub fn visible_row_range(&self, overscan: usize) -> Range<usize> {
        let row_height = self.core.view.row_height;
        let row_count = self.visible_row_count();
        let top = self.core.view.translate_y;
        let first = (top / row_height).floor().max(0.0) as usize;
        let last = ((top + self.body_height()) / row_height).ceil().max(0.0) as usize;
        let start = first.saturating_sub(overscan).min(row_count);
        let end = last.saturating_add(overscan).min(row_count);
        start..end.max(start)
    }

    #[must_use]
    pub fn today_offset(&self) -> f64 {
        self.core.view.scale.to_pixel(self.core.model.today)
    }

    /// Horizontal scrollbar thumb in chart-local pixels.
    #[must_use]
    pub fn scroll_bar(&self) -> ScrollBar {
        let view = self.view_width();
        let scroll = self.scroll_extent().width;
        if scroll <= view || scroll <= 0.0 {
            return ScrollBar {
                left: 0.0,
                width: view,
                visible: false,
            };
        }
        ScrollBar {
            left: self.core.view.translate_x * view / scroll,
            width: (view * view / scroll).max(MIN_SCROLL_THUMB_WIDTH),
            visible: true,
        }
    }

    /// Sets the translation, clamped to the scrollable area. Returns the applied pair.
    pub fn set_translation(&mut self, x: f64, y: f64) -> (f64, f64) {
        let (max_x, max_y) = self.max_translation();
        let x = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
        let y = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };
        if x != self.core.view.translate_x || y != self.core.view.translate_y {
            self.core.view.translate_x = x;
            self.core.view.translate_y = y;
            self.invalidate(InvalidationTopic::Viewport);
            trace!(x, y, "translation changed");
            self.emit_event(GanttEvent::TranslationChanged { x, y });
        }
        (x, y)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> (f64, f64) {
        let (x, y) = self.translation();
        self.set_translation(x + dx, y + dy)
    }

    /// Mouse wheel input; with `shift` the vertical wheel scrolls horizontally.
    pub fn wheel(&mut self, dx: f64, dy: f64, shift: bool) -> (f64, f64) {
        if shift {
            self.pan_by(dx + dy, 0.0)
        } else {
            self.pan_by(dx, dy)
        }
    }

    /// Centres `date` in the chart area; dates beyond the window clamp.
    pub fn scroll_to_date(&mut self, date: NaiveDate) -> (f64, f64) {
        let x = self.core.view.scale.to_pixel(date) - self.view_width() / 2.0;
        let y = self.core.view.translate_y;
        self.set_translation(x, y)
    }

    pub fn back_to_today(&mut self) -> (f64, f64) {
        self.scroll_to_date(self.core.model.today)
    }

    /// Changes the zoom level keeping the instant at the view centre in place.
    pub fn switch_sight(&mut self, sight: Sight) -> GanttResult<()> {
        let from = self.core.view.sight;
        if from == sight {
            return Ok(());
        }
        let seconds_per_pixel = self.core.view.sights.get(sight).seconds_per_pixel;
        self.core.view.sight = sight;
        self.rescale(self.core.view.range, seconds_per_pixel)?;
        debug!(?from, to = ?sight, "sight switched");
        self.emit_event(GanttEvent::SightChanged { from, to: sight });
        Ok(())
    }

    pub fn set_container_size(&mut self, width: f64, height: f64) -> GanttResult<()> {
        let container = validate_container(Viewport::new(width, height))?;
        self.core.view.container = container;
        self.invalidate(InvalidationTopic::Viewport);
        self.clamp_translation();
        Ok(())
    }

    /// Sets the table panel width within the divider bounds. Returns the applied width.
    pub fn set_table_width(&mut self, width: f64) -> f64 {
        let width = clamp_table_width(width, self.core.view.container.width);
        if width != self.core.view.table_width {
            self.core.view.table_width = width;
            self.invalidate(InvalidationTopic::Viewport);
            self.clamp_translation();
        }
        width
    }

    pub fn set_hide_table(&mut self, hide_table: bool) {
        if self.core.view.hide_table != hide_table {
            self.core.view.hide_table = hide_table;
            self.invalidate(InvalidationTopic::Viewport);
            self.clamp_translation();
        }
    }

    /// Re-applies the clamp after any extent change.
    pub(super) fn clamp_translation(&mut self) {
        let (x, y) = self.translation();
        self.set_translation(x, y);
    }

    /// Recomputes the scale window from the item extent and today.
    pub(super) fn refresh_scale_window(&mut self) -> GanttResult<()> {
        let today = self.core.model.today;
        let (earliest, latest) = match self.core.model.tree.date_extent() {
            Some((earliest, latest)) => (earliest.min(today), latest.max(today)),
            None => (today, today),
        };
        let range = TimelineRange::fit(earliest, latest, self.core.view.padding_days)?;
        let seconds_per_pixel = self.core.view.scale.seconds_per_pixel();
        if range != self.core.view.range {
            self.rescale(range, seconds_per_pixel)?;
        } else {
            self.clamp_translation();
        }
        Ok(())
    }

    /// Swaps the scale window and re-anchors the translation on the centred instant.
    pub(super) fn rescale(&mut self, range: TimelineRange, seconds_per_pixel: f64) -> GanttResult<()> {
        let old_scale = self.core.view.scale;
        let half_view = self.view_width() / 2.0;
        let centre = self.core.view.translate_x + half_view;

        let scale = TimeScale::new(range.origin, seconds_per_pixel)?;
        self.core.view.range = range;
        self.core.view.scale = scale;
        self.invalidate(InvalidationTopic::Scale);

        let x = scale.rebase_pixel(old_scale, centre) - half_view;
        let y = self.core.view.translate_y;
        self.set_translation(x, y);
        self.rebase_live_drag(old_scale);
        Ok(())
    }
}
