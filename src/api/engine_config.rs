use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{GanttLocale, Sight, SightConfig, Viewport, WorkdayMode};
use crate::error::{GanttError, GanttResult};
use crate::interaction::AutoScrollConfig;

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load gantt setup
/// without inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttEngineConfig {
    /// Full widget size: table panel, chart and header together.
    pub container: Viewport,
    #[serde(default = "default_sight")]
    pub sight: Sight,
    /// Overrides of the built-in seconds-per-pixel constants.
    #[serde(default)]
    pub sight_configs: Vec<SightConfig>,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_bar_height")]
    pub bar_height: f64,
    #[serde(default = "default_header_height")]
    pub header_height: f64,
    #[serde(default = "default_table_width")]
    pub table_width: f64,
    #[serde(default)]
    pub hide_table: bool,
    #[serde(default)]
    pub disabled: bool,
    /// Days of empty timeline kept before the earliest and after the latest date.
    #[serde(default = "default_timeline_padding_days")]
    pub timeline_padding_days: u32,
    #[serde(default)]
    pub auto_scroll: AutoScrollConfig,
    #[serde(default)]
    pub workday_mode: WorkdayMode,
    /// Fixed "today"; the local date is used when absent.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub locale: GanttLocale,
}

impl GanttEngineConfig {
    /// Creates a config with default metrics for the given container.
    #[must_use]
    pub fn new(container: Viewport) -> Self {
        Self {
            container,
            sight: default_sight(),
            sight_configs: Vec::new(),
            row_height: default_row_height(),
            bar_height: default_bar_height(),
            header_height: default_header_height(),
            table_width: default_table_width(),
            hide_table: false,
            disabled: false,
            timeline_padding_days: default_timeline_padding_days(),
            auto_scroll: AutoScrollConfig::default(),
            workday_mode: WorkdayMode::default(),
            today: None,
            locale: GanttLocale::default(),
        }
    }

    #[must_use]
    pub fn with_sight(mut self, sight: Sight) -> Self {
        self.sight = sight;
        self
    }

    #[must_use]
    pub fn with_sight_configs(mut self, configs: Vec<SightConfig>) -> Self {
        self.sight_configs = configs;
        self
    }

    #[must_use]
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    #[must_use]
    pub fn with_bar_height(mut self, bar_height: f64) -> Self {
        self.bar_height = bar_height;
        self
    }

    #[must_use]
    pub fn with_header_height(mut self, header_height: f64) -> Self {
        self.header_height = header_height;
        self
    }

    #[must_use]
    pub fn with_table_width(mut self, table_width: f64) -> Self {
        self.table_width = table_width;
        self
    }

    /// Hides the table panel; the chart takes the full container width.
    #[must_use]
    pub fn with_hide_table(mut self, hide_table: bool) -> Self {
        self.hide_table = hide_table;
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_timeline_padding_days(mut self, days: u32) -> Self {
        self.timeline_padding_days = days;
        self
    }

    #[must_use]
    pub fn with_auto_scroll(mut self, auto_scroll: AutoScrollConfig) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    #[must_use]
    pub fn with_workday_mode(mut self, mode: WorkdayMode) -> Self {
        self.workday_mode = mode;
        self
    }

    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: GanttLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Parses config from JSON.
    pub fn from_json_str(input: &str) -> GanttResult<Self> {
        serde_json::from_str(input).map_err(GanttError::from)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_string(&self) -> GanttResult<String> {
        serde_json::to_string_pretty(self).map_err(GanttError::from)
    }
}

fn default_sight() -> Sight {
    Sight::Day
}

fn default_row_height() -> f64 {
    28.0
}

fn default_bar_height() -> f64 {
    14.0
}

fn default_header_height() -> f64 {
    56.0
}

fn default_table_width() -> f64 {
    400.0
}

fn default_timeline_padding_days() -> u32 {
    365
}
