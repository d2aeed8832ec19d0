//! Major/minor time-axis tick generation.
//!
//! Minor ticks follow calendar units (day, ISO week, month, quarter, half-year)
//! so their widths track true calendar lengths. Majors are built by grouping
//! minors, which keeps each major exactly as wide as the minors beneath it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::label_format::GanttLocale;
use crate::core::sight::{CalendarUnit, Sight};
use crate::core::time_scale::TimeScale;
use crate::core::types::PixelRange;

/// One header cell of the time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub key: String,
    pub label: String,
    pub left: f64,
    pub width: f64,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    /// Day sight only.
    pub is_rest_day: bool,
    pub is_today: bool,
}

impl Tick {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickSet {
    pub majors: Vec<Tick>,
    pub minors: Vec<Tick>,
}

impl TickSet {
    /// Minor tick whose unit contains `date`.
    #[must_use]
    pub fn minor_containing(&self, date: NaiveDate) -> Option<&Tick> {
        self.minors.iter().find(|tick| tick.contains(date))
    }
}

/// Stable identifier of the unit starting at `start`.
#[must_use]
pub fn unit_key(unit: CalendarUnit, start: NaiveDate) -> String {
    match unit {
        CalendarUnit::Day => start.format("%Y-%m-%d").to_string(),
        CalendarUnit::IsoWeek => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        CalendarUnit::Month => start.format("%Y-%m").to_string(),
        CalendarUnit::Quarter => format!("{}-Q{}", start.year(), start.month0() / 3 + 1),
        CalendarUnit::HalfYear => {
            let half = if start.month() <= 6 { 1 } else { 2 };
            format!("{}-H{half}", start.year())
        }
        CalendarUnit::Year => start.year().to_string(),
    }
}

/// Generates the ticks covering `visible`.
///
/// Minors run from the unit containing the range start up to the unit
/// containing the range end. `rest_day` is only consulted in `Sight::Day`.
#[must_use]
pub fn generate_ticks(
    scale: TimeScale,
    sight: Sight,
    visible: PixelRange,
    locale: &GanttLocale,
    rest_day: &dyn Fn(NaiveDate) -> bool,
    today: NaiveDate,
) -> TickSet {
    let minor_unit = sight.minor_unit();
    let major_unit = sight.major_unit();
    let first_day = scale.to_date(visible.start);
    let last_day = scale.to_date(visible.end);

    let mut minors = Vec::new();
    let mut cursor = minor_unit.start_of(first_day);
    while let Some(start) = cursor {
        if start > last_day {
            break;
        }
        let Some(end) = minor_unit.next_start(start) else {
            break;
        };
        let left = scale.to_pixel(start);
        minors.push(Tick {
            key: unit_key(minor_unit, start),
            label: locale.format_date(start, locale.minor_format.for_sight(sight)),
            left,
            width: scale.to_pixel(end) - left,
            start,
            end,
            is_rest_day: sight == Sight::Day && rest_day(start),
            is_today: start <= today && today < end,
        });
        cursor = Some(end);
    }

    let majors = group_majors(&minors, major_unit, sight, locale);
    TickSet { majors, minors }
}

fn group_majors(minors: &[Tick], unit: CalendarUnit, sight: Sight, locale: &GanttLocale) -> Vec<Tick> {
    let mut majors: Vec<Tick> = Vec::new();
    for minor in minors {
        let Some(start) = unit.start_of(minor.start) else {
            continue;
        };
        match majors.last_mut() {
            Some(major) if major.start == start => {
                major.width += minor.width;
                major.is_today |= minor.is_today;
            }
            _ => majors.push(Tick {
                key: unit_key(unit, start),
                label: locale.format_date(start, locale.major_format.for_sight(sight)),
                left: minor.left,
                width: minor.width,
                start,
                end: unit.next_start(start).unwrap_or(minor.end),
                is_rest_day: false,
                is_today: minor.is_today,
            }),
        }
    }
    majors
}
