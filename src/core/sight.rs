use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GanttError, GanttResult};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Timeline zoom level.
///
/// Variants are ordered from the most detailed (`Day`) to the coarsest (`HalfYear`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sight {
    Day,
    Week,
    Month,
    Quarter,
    HalfYear,
}

impl Sight {
    pub const ALL: [Sight; 5] = [
        Sight::Day,
        Sight::Week,
        Sight::Month,
        Sight::Quarter,
        Sight::HalfYear,
    ];

    /// Default seconds represented by one horizontal pixel.
    #[must_use]
    pub const fn default_seconds_per_pixel(self) -> f64 {
        match self {
            Self::Day => 2_880.0,
            Self::Week => 3_600.0,
            Self::Month => 14_400.0,
            Self::Quarter => 86_400.0,
            Self::HalfYear => 115_200.0,
        }
    }

    #[must_use]
    pub const fn minor_unit(self) -> CalendarUnit {
        match self {
            Self::Day => CalendarUnit::Day,
            Self::Week => CalendarUnit::IsoWeek,
            Self::Month => CalendarUnit::Month,
            Self::Quarter => CalendarUnit::Quarter,
            Self::HalfYear => CalendarUnit::HalfYear,
        }
    }

    #[must_use]
    pub const fn major_unit(self) -> CalendarUnit {
        match self {
            Self::Day | Self::Week => CalendarUnit::Month,
            Self::Month | Self::Quarter | Self::HalfYear => CalendarUnit::Year,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Day => 0,
            Self::Week => 1,
            Self::Month => 2,
            Self::Quarter => 3,
            Self::HalfYear => 4,
        }
    }
}

/// Calendar granularity used for tick boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarUnit {
    Day,
    IsoWeek,
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl CalendarUnit {
    /// First day of the unit containing `date`.
    #[must_use]
    pub fn start_of(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => Some(date),
            Self::IsoWeek => date.checked_sub_days(Days::new(u64::from(
                date.weekday().num_days_from_monday(),
            ))),
            Self::Month => date.with_day(1),
            Self::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1)
            }
            Self::HalfYear => {
                let month = if date.month() <= 6 { 1 } else { 7 };
                NaiveDate::from_ymd_opt(date.year(), month, 1)
            }
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }

    /// First day after the unit that starts at `start`.
    #[must_use]
    pub fn next_start(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => start.checked_add_days(Days::new(1)),
            Self::IsoWeek => start.checked_add_days(Days::new(7)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::Quarter => start.checked_add_months(Months::new(3)),
            Self::HalfYear => start.checked_add_months(Months::new(6)),
            Self::Year => start.checked_add_months(Months::new(12)),
        }
    }
}

/// Per-sight scale constant, optionally overridden by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightConfig {
    pub sight: Sight,
    pub label: String,
    pub seconds_per_pixel: f64,
}

impl SightConfig {
    #[must_use]
    pub fn new(sight: Sight, label: impl Into<String>, seconds_per_pixel: f64) -> Self {
        Self {
            sight,
            label: label.into(),
            seconds_per_pixel,
        }
    }

    #[must_use]
    pub fn pixels_per_day(&self) -> f64 {
        SECONDS_PER_DAY / self.seconds_per_pixel
    }
}

/// Validated set of scale constants, one per sight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightCatalog {
    configs: [SightConfig; 5],
}

impl Default for SightCatalog {
    fn default() -> Self {
        Self {
            configs: Sight::ALL.map(|sight| {
                SightConfig::new(
                    sight,
                    format!("{sight:?}"),
                    sight.default_seconds_per_pixel(),
                )
            }),
        }
    }
}

impl SightCatalog {
    /// Builds a catalogue from defaults with the given overrides applied.
    ///
    /// Seconds-per-pixel must be finite, positive and strictly increasing from
    /// `Day` to `HalfYear`.
    pub fn with_overrides(overrides: &[SightConfig]) -> GanttResult<Self> {
        let mut catalog = Self::default();
        for config in overrides {
            catalog.configs[config.sight.index()] = config.clone();
        }
        catalog.validate()
    }

    fn validate(self) -> GanttResult<Self> {
        for config in &self.configs {
            if !config.seconds_per_pixel.is_finite() || config.seconds_per_pixel <= 0.0 {
                return Err(GanttError::InvalidConfig(format!(
                    "seconds per pixel for {:?} must be finite and > 0",
                    config.sight
                )));
            }
        }
        for pair in self.configs.windows(2) {
            if pair[0].seconds_per_pixel >= pair[1].seconds_per_pixel {
                return Err(GanttError::InvalidConfig(format!(
                    "seconds per pixel must increase from {:?} to {:?}",
                    pair[0].sight, pair[1].sight
                )));
            }
        }
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, sight: Sight) -> &SightConfig {
        &self.configs[sight.index()]
    }

    #[must_use]
    pub fn configs(&self) -> &[SightConfig] {
        &self.configs
    }
}
