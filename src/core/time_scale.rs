use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::sight::SECONDS_PER_DAY;
use crate::error::{GanttError, GanttResult};

/// Guard against `x.999999` results when a pixel maps back onto a day boundary.
const DAY_FLOOR_EPSILON: f64 = 1e-9;

/// Calendar span covered by the scrollable timeline.
///
/// `origin` maps to pixel `0`; `end` is exclusive and maps to the scrollable width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRange {
    pub origin: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineRange {
    /// Fits a year-aligned range around `[earliest, latest]` with symmetric padding.
    pub fn fit(earliest: NaiveDate, latest: NaiveDate, padding_days: u32) -> GanttResult<Self> {
        let (earliest, latest) = if earliest <= latest {
            (earliest, latest)
        } else {
            (latest, earliest)
        };
        let padded_start = earliest
            .checked_sub_days(Days::new(u64::from(padding_days)))
            .unwrap_or(NaiveDate::MIN);
        let padded_end = latest
            .checked_add_days(Days::new(u64::from(padding_days)))
            .unwrap_or(NaiveDate::MAX);

        let origin = NaiveDate::from_ymd_opt(padded_start.year(), 1, 1).ok_or_else(|| {
            GanttError::InvalidData("timeline origin is out of the calendar range".to_owned())
        })?;
        let end = NaiveDate::from_ymd_opt(padded_end.year() + 1, 1, 1).ok_or_else(|| {
            GanttError::InvalidData("timeline end is out of the calendar range".to_owned())
        })?;
        Ok(Self { origin, end })
    }

    #[must_use]
    pub fn days(self) -> i64 {
        (self.end - self.origin).num_days()
    }
}

/// Date <-> pixel mapping for one sight and one timeline origin.
///
/// Pixel offsets are absolute within the scrollable timeline; the viewport
/// translation is subtracted by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    origin: NaiveDate,
    seconds_per_pixel: f64,
}

impl TimeScale {
    pub fn new(origin: NaiveDate, seconds_per_pixel: f64) -> GanttResult<Self> {
        if !seconds_per_pixel.is_finite() || seconds_per_pixel <= 0.0 {
            return Err(GanttError::InvalidData(
                "seconds per pixel must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            origin,
            seconds_per_pixel,
        })
    }

    #[must_use]
    pub fn origin(self) -> NaiveDate {
        self.origin
    }

    #[must_use]
    pub fn seconds_per_pixel(self) -> f64 {
        self.seconds_per_pixel
    }

    #[must_use]
    pub fn pixels_per_day(self) -> f64 {
        SECONDS_PER_DAY / self.seconds_per_pixel
    }

    /// Absolute pixel offset of midnight at the start of `date`.
    #[must_use]
    pub fn to_pixel(self, date: NaiveDate) -> f64 {
        let days = (date - self.origin).num_days() as f64;
        days * SECONDS_PER_DAY / self.seconds_per_pixel
    }

    /// Pixel offset of an instant expressed in seconds since the origin.
    #[must_use]
    pub fn instant_to_pixel(self, seconds_since_origin: f64) -> f64 {
        seconds_since_origin / self.seconds_per_pixel
    }

    #[must_use]
    pub fn pixel_to_instant(self, offset: f64) -> f64 {
        offset * self.seconds_per_pixel
    }

    /// Calendar day containing the pixel `offset`.
    ///
    /// Offsets outside the representable calendar clamp to its bounds.
    #[must_use]
    pub fn to_date(self, offset: f64) -> NaiveDate {
        let days = (offset * self.seconds_per_pixel / SECONDS_PER_DAY + DAY_FLOOR_EPSILON).floor();
        self.origin_plus_days(days)
    }

    /// Date nearest to the pixel `offset`, rounding to the closest day boundary.
    #[must_use]
    pub fn to_nearest_date(self, offset: f64) -> NaiveDate {
        let days = (offset * self.seconds_per_pixel / SECONDS_PER_DAY).round();
        self.origin_plus_days(days)
    }

    /// Seconds since the origin for midnight of `date`.
    #[must_use]
    pub fn date_to_instant(self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 * SECONDS_PER_DAY
    }

    /// Offset in this scale of the instant found at `offset` in `from`.
    #[must_use]
    pub fn rebase_pixel(self, from: TimeScale, offset: f64) -> f64 {
        let origin_shift = (from.origin - self.origin).num_days() as f64 * SECONDS_PER_DAY;
        self.instant_to_pixel(from.pixel_to_instant(offset) + origin_shift)
    }

    /// Pixel width of the half-open span `[start, end)`.
    #[must_use]
    pub fn width_between(self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.to_pixel(end) - self.to_pixel(start)
    }

    fn origin_plus_days(self, days: f64) -> NaiveDate {
        if days >= 0.0 {
            self.origin
                .checked_add_days(Days::new(days as u64))
                .unwrap_or(NaiveDate::MAX)
        } else {
            self.origin
                .checked_sub_days(Days::new((-days) as u64))
                .unwrap_or(NaiveDate::MIN)
        }
    }
}
