use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::sight::Sight;

/// Host-supplied rest-day predicate.
pub type RestDayFn = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync + 'static>;

/// Host-supplied duration function returning a day count for `[start, end)`.
pub type DurationFn = Arc<dyn Fn(NaiveDate, NaiveDate) -> i64 + Send + Sync + 'static>;

/// Quarter placeholder expanded before strftime formatting.
pub const QUARTER_TOKEN: &str = "{Q}";
/// Half-year placeholder expanded to `GanttLocale::first_half`/`second_half`.
pub const HALF_TOKEN: &str = "{H}";

/// Per-sight strftime patterns for major/minor tick labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SightFormats {
    pub day: String,
    pub week: String,
    pub month: String,
    pub quarter: String,
    pub half_year: String,
}

impl SightFormats {
    #[must_use]
    pub fn for_sight(&self, sight: Sight) -> &str {
        match sight {
            Sight::Day => &self.day,
            Sight::Week => &self.week,
            Sight::Month => &self.month,
            Sight::Quarter => &self.quarter,
            Sight::HalfYear => &self.half_year,
        }
    }
}

/// Localized words and tick format strings.
///
/// Patterns use chrono strftime syntax plus the `{Q}` (quarter number) and
/// `{H}` (half-year name) placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttLocale {
    pub today: String,
    pub day: String,
    pub days: String,
    pub week: String,
    pub month: String,
    pub quarter: String,
    pub half_year: String,
    pub first_half: String,
    pub second_half: String,
    pub major_format: SightFormats,
    pub minor_format: SightFormats,
}

impl Default for GanttLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl GanttLocale {
    #[must_use]
    pub fn en_us() -> Self {
        Self {
            today: "Today".to_owned(),
            day: "Day".to_owned(),
            days: "days".to_owned(),
            week: "Week".to_owned(),
            month: "Month".to_owned(),
            quarter: "Quarter".to_owned(),
            half_year: "Half year".to_owned(),
            first_half: "H1".to_owned(),
            second_half: "H2".to_owned(),
            major_format: SightFormats {
                day: "%B %Y".to_owned(),
                week: "%B %Y".to_owned(),
                month: "%Y".to_owned(),
                quarter: "%Y".to_owned(),
                half_year: "%Y".to_owned(),
            },
            minor_format: SightFormats {
                day: "%-d".to_owned(),
                week: "W%V".to_owned(),
                month: "%b".to_owned(),
                quarter: "Q{Q}".to_owned(),
                half_year: "{H}".to_owned(),
            },
        }
    }

    #[must_use]
    pub fn pt_br() -> Self {
        Self {
            today: "Hoje".to_owned(),
            day: "Dia".to_owned(),
            days: "dias".to_owned(),
            week: "Semana".to_owned(),
            month: "Mês".to_owned(),
            quarter: "Trimestre".to_owned(),
            half_year: "Semestre".to_owned(),
            first_half: "Primeiro Semestre".to_owned(),
            second_half: "Segundo Semestre".to_owned(),
            major_format: SightFormats {
                day: "%m/%Y".to_owned(),
                week: "%m/%Y".to_owned(),
                month: "%Y".to_owned(),
                quarter: "%Y".to_owned(),
                half_year: "%Y".to_owned(),
            },
            minor_format: SightFormats {
                day: "%-d".to_owned(),
                week: "Semana %V".to_owned(),
                month: "%m".to_owned(),
                quarter: "T{Q}".to_owned(),
                half_year: "{H}".to_owned(),
            },
        }
    }

    /// Formats `date` with `pattern`, expanding the quarter/half placeholders.
    ///
    /// Patterns chrono cannot parse fall back to ISO `YYYY-MM-DD`.
    #[must_use]
    pub fn format_date(&self, date: NaiveDate, pattern: &str) -> String {
        let quarter = date.month0() / 3 + 1;
        let half = if date.month() <= 6 {
            self.first_half.as_str()
        } else {
            self.second_half.as_str()
        };
        let expanded = pattern
            .replace(QUARTER_TOKEN, &quarter.to_string())
            .replace(HALF_TOKEN, &half.replace('%', "%%"));

        let items: Vec<Item<'_>> = StrftimeItems::new(&expanded).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            warn!(pattern, "invalid tick label pattern, using ISO date");
            return date.format("%Y-%m-%d").to_string();
        }
        date.format_with_items(items.into_iter()).to_string()
    }
}

/// How default bar durations count days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkdayMode {
    #[default]
    AllDays,
    BusinessDays,
}

#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Day count of `[start, end)` honoring the workday mode and rest-day predicate.
#[must_use]
pub fn count_days(
    start: NaiveDate,
    end: NaiveDate,
    mode: WorkdayMode,
    is_rest_day: &dyn Fn(NaiveDate) -> bool,
) -> i64 {
    if end <= start {
        return 0;
    }
    match mode {
        WorkdayMode::AllDays => (end - start).num_days(),
        WorkdayMode::BusinessDays => start
            .iter_days()
            .take_while(|day| *day < end)
            .filter(|day| !is_rest_day(*day))
            .count() as i64,
    }
}

/// `"<n> <days>"` label for `[start, end)`.
#[must_use]
pub fn duration_label(locale: &GanttLocale, days: i64) -> String {
    let unit = if days == 1 { &locale.day } else { &locale.days };
    format!("{days} {}", unit.to_lowercase())
}
