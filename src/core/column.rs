//! Table column model and width resolution.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::record::{Record, RecordValue};

/// Smallest width a column can be dragged to.
pub const MIN_COLUMN_WIDTH: f64 = 50.0;
/// Width of a flex column per unit of weight when no table width is known.
pub const FLEX_FALLBACK_WIDTH: f64 = 100.0;

const EMPTY_CELL: &str = "-";

/// Host formatter for one column's cells.
pub type CellFormatterFn = Arc<dyn Fn(&RecordValue, &Record) -> String + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Date,
    Number,
    Progress,
    Status,
    Priority,
    User,
    Tags,
    Currency,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A column is either fixed-width or flex-weighted, never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSizing {
    Fixed { width: f64 },
    Flex { weight: f64 },
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Column {
    /// Unique key used by the column configuration.
    pub name: String,
    /// Record field read by the cell; defaults to `name`.
    #[serde(default)]
    pub field: Option<String>,
    pub label: String,
    #[serde(default)]
    pub kind: ColumnKind,
    pub sizing: ColumnSizing,
    #[serde(default)]
    pub min_width: Option<f64>,
    #[serde(default)]
    pub max_width: Option<f64>,
    #[serde(default)]
    pub align: ColumnAlign,
    #[serde(skip)]
    pub formatter: Option<CellFormatterFn>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("sizing", &self.sizing)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .field("align", &self.align)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl Column {
    #[must_use]
    pub fn fixed(name: impl Into<String>, label: impl Into<String>, width: f64) -> Self {
        Self::with_sizing(name, label, ColumnSizing::Fixed { width })
    }

    #[must_use]
    pub fn flex(name: impl Into<String>, label: impl Into<String>, weight: f64) -> Self {
        Self::with_sizing(name, label, ColumnSizing::Flex { weight })
    }

    fn with_sizing(name: impl Into<String>, label: impl Into<String>, sizing: ColumnSizing) -> Self {
        Self {
            name: name.into(),
            field: None,
            label: label.into(),
            kind: ColumnKind::Text,
            sizing,
            min_width: None,
            max_width: None,
            align: ColumnAlign::Left,
            formatter: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min_width: Option<f64>, max_width: Option<f64>) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: ColumnAlign) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: CellFormatterFn) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn field_name(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    fn clamp(&self, width: f64) -> f64 {
        let width = self.max_width.map_or(width, |max| width.min(max));
        self.min_width.map_or(width, |min| width.max(min))
    }
}

/// Host view configuration: visibility, order and explicit widths.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// `None` shows every column.
    #[serde(default)]
    pub visible_columns: Option<Vec<String>>,
    #[serde(default)]
    pub column_order: Option<Vec<String>>,
    #[serde(default)]
    pub column_widths: IndexMap<String, f64>,
}

/// Resolved placement of one visible column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub name: String,
    pub label: String,
    pub kind: ColumnKind,
    pub align: ColumnAlign,
    pub left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableLayout {
    pub columns: Vec<ResolvedColumn>,
    pub total_width: f64,
}

impl TableLayout {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Visible columns in display order.
///
/// Filtered by `visible_columns`, then stable-sorted by `column_order`; columns
/// missing from the order keep their relative position after the ordered ones.
#[must_use]
pub fn visible_columns<'a>(columns: &'a [Column], config: &ColumnConfig) -> Vec<&'a Column> {
    let mut visible: Vec<&Column> = columns
        .iter()
        .filter(|column| {
            config
                .visible_columns
                .as_ref()
                .is_none_or(|names| names.iter().any(|name| *name == column.name))
        })
        .collect();

    if let Some(order) = &config.column_order {
        visible.sort_by_key(|column| {
            order
                .iter()
                .position(|name| *name == column.name)
                .unwrap_or(usize::MAX)
        });
    }
    visible
}

/// Resolves widths and offsets.
///
/// `table_width` is the width of the table panel; flex columns share what the
/// fixed columns leave of it. Without a panel width flex columns fall back to
/// their minimum (or [`FLEX_FALLBACK_WIDTH`] per weight unit).
#[must_use]
pub fn resolve_layout(columns: &[Column], config: &ColumnConfig, table_width: Option<f64>) -> TableLayout {
    let visible = visible_columns(columns, config);

    let explicit = |column: &Column| config.column_widths.get(&column.name).copied();
    let fixed_sum: f64 = visible
        .iter()
        .map(|column| match (explicit(column), column.sizing) {
            (Some(width), _) => width,
            (None, ColumnSizing::Fixed { width }) => column.clamp(width),
            (None, ColumnSizing::Flex { .. }) => 0.0,
        })
        .sum();
    let total_weight: f64 = visible
        .iter()
        .filter(|column| explicit(column).is_none())
        .filter_map(|column| match column.sizing {
            ColumnSizing::Flex { weight } if weight > 0.0 => Some(weight),
            _ => None,
        })
        .sum();
    let remaining = table_width.map(|width| (width - fixed_sum).max(0.0));

    let mut left = 0.0;
    let mut resolved = Vec::with_capacity(visible.len());
    for column in visible {
        let width = match (explicit(column), column.sizing) {
            (Some(width), _) => width,
            (None, ColumnSizing::Fixed { width }) => column.clamp(width),
            (None, ColumnSizing::Flex { weight }) => {
                let share = match remaining {
                    Some(remaining) if total_weight > 0.0 => remaining * weight.max(0.0) / total_weight,
                    _ => column
                        .min_width
                        .unwrap_or(FLEX_FALLBACK_WIDTH * weight.max(0.0)),
                };
                column.clamp(share)
            }
        };
        resolved.push(ResolvedColumn {
            name: column.name.clone(),
            label: column.label.clone(),
            kind: column.kind,
            align: column.align,
            left,
            width,
        });
        left += width;
    }

    TableLayout {
        columns: resolved,
        total_width: left,
    }
}

/// Records an explicit width for `name`, floored at [`MIN_COLUMN_WIDTH`].
///
/// Other columns are untouched. Returns the stored width.
pub fn resize_column(config: &mut ColumnConfig, name: &str, width: f64) -> f64 {
    let width = width.max(MIN_COLUMN_WIDTH);
    config.column_widths.insert(name.to_owned(), width);
    width
}

/// Display text of `column` for `record`.
#[must_use]
pub fn format_cell(column: &Column, record: &Record) -> String {
    let value = record.get(column.field_name()).unwrap_or(&RecordValue::Null);
    if let Some(formatter) = &column.formatter {
        return formatter(value, record);
    }
    if value.is_null() {
        return EMPTY_CELL.to_owned();
    }

    match column.kind {
        ColumnKind::Date => value
            .as_date()
            .map_or_else(|| EMPTY_CELL.to_owned(), |date| date.format("%d/%m/%Y").to_string()),
        ColumnKind::Number | ColumnKind::Priority => {
            value.as_f64().map_or_else(|| plain_text(value), format_number)
        }
        ColumnKind::Progress => {
            let progress = value.as_f64().unwrap_or(0.0).clamp(0.0, 100.0);
            format!("{}%", progress.round())
        }
        ColumnKind::Currency => value.as_decimal().map_or_else(
            || plain_text(value),
            |amount| amount.round_dp(2).to_string(),
        ),
        ColumnKind::Status => value
            .field("title")
            .map_or_else(|| plain_text(value), plain_text),
        ColumnKind::User => value
            .field("name")
            .map_or_else(|| plain_text(value), plain_text),
        ColumnKind::Tags => match value {
            RecordValue::List(tags) => tags
                .iter()
                .map(|tag| tag.field("name").map_or_else(|| plain_text(tag), plain_text))
                .collect::<Vec<_>>()
                .join(", "),
            other => plain_text(other),
        },
        ColumnKind::Text | ColumnKind::Custom => plain_text(value),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn plain_text(value: &RecordValue) -> String {
    match value {
        RecordValue::Null => EMPTY_CELL.to_owned(),
        RecordValue::Bool(flag) => flag.to_string(),
        RecordValue::Integer(number) => number.to_string(),
        RecordValue::Number(number) => format_number(*number),
        RecordValue::Decimal(amount) => amount.normalize().to_string(),
        RecordValue::Date(date) => date.to_string(),
        RecordValue::Text(text) => text.clone(),
        RecordValue::List(values) => values.iter().map(plain_text).collect::<Vec<_>>().join(", "),
        RecordValue::Map(_) => EMPTY_CELL.to_owned(),
    }
}

/// Standard task table: name, start, end, progress, hours, status, priority, owner.
#[must_use]
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::flex("name", "Task", 2.0).with_bounds(Some(200.0), None),
        Column::fixed("start", "Start", 120.0)
            .with_kind(ColumnKind::Date)
            .with_field("startDate")
            .with_align(ColumnAlign::Center),
        Column::fixed("end", "End", 120.0)
            .with_kind(ColumnKind::Date)
            .with_field("endDate")
            .with_align(ColumnAlign::Center),
        Column::fixed("progress", "Progress", 120.0).with_kind(ColumnKind::Progress),
        Column::fixed("hours", "Hours", 100.0)
            .with_kind(ColumnKind::Number)
            .with_align(ColumnAlign::Center)
            .with_formatter(Arc::new(|value: &RecordValue, _: &Record| match value.as_f64() {
                Some(hours) if hours != 0.0 => format!("{}h", format_number(hours)),
                _ => EMPTY_CELL.to_owned(),
            })),
        Column::fixed("status", "Status", 120.0).with_kind(ColumnKind::Status),
        Column::fixed("priority", "Priority", 100.0)
            .with_kind(ColumnKind::Priority)
            .with_align(ColumnAlign::Center),
        Column::fixed("owner", "Owner", 150.0)
            .with_kind(ColumnKind::User)
            .with_field("user"),
    ]
}
