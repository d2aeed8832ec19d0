use std::collections::HashSet;

use crate::core::{Column, ColumnConfig, ColumnSizing, Viewport};
use crate::error::{GanttError, GanttResult};

use super::GanttEngineConfig;

/// Narrowest table panel the divider can produce.
pub const MIN_TABLE_WIDTH: f64 = 200.0;
/// Chart width the divider always leaves visible.
pub const MIN_CHART_WIDTH: f64 = 100.0;

pub(super) fn validate_container(container: Viewport) -> GanttResult<Viewport> {
    if !container.is_valid() {
        return Err(GanttError::InvalidViewport {
            width: container.width,
            height: container.height,
        });
    }
    Ok(container)
}

pub(super) fn validate_engine_config(config: &GanttEngineConfig) -> GanttResult<()> {
    validate_container(config.container)?;
    if !config.row_height.is_finite() || config.row_height <= 0.0 {
        return Err(GanttError::InvalidConfig(
            "row height must be finite and > 0".to_owned(),
        ));
    }
    if !config.bar_height.is_finite()
        || config.bar_height <= 0.0
        || config.bar_height > config.row_height
    {
        return Err(GanttError::InvalidConfig(
            "bar height must be finite, > 0 and <= row height".to_owned(),
        ));
    }
    if !config.header_height.is_finite() || config.header_height < 0.0 {
        return Err(GanttError::InvalidConfig(
            "header height must be finite and >= 0".to_owned(),
        ));
    }
    if !config.table_width.is_finite() || config.table_width < 0.0 {
        return Err(GanttError::InvalidConfig(
            "table width must be finite and >= 0".to_owned(),
        ));
    }
    let auto_scroll = config.auto_scroll;
    if !auto_scroll.edge_threshold_px.is_finite()
        || auto_scroll.edge_threshold_px <= 0.0
        || !auto_scroll.max_step_px.is_finite()
        || auto_scroll.max_step_px < 0.0
    {
        return Err(GanttError::InvalidConfig(
            "auto-scroll threshold must be > 0 and step >= 0".to_owned(),
        ));
    }
    Ok(())
}

pub(super) fn validate_columns(columns: &[Column]) -> GanttResult<()> {
    let mut names = HashSet::with_capacity(columns.len());
    for column in columns {
        if column.name.is_empty() {
            return Err(GanttError::InvalidConfig(
                "column name must not be empty".to_owned(),
            ));
        }
        if !names.insert(column.name.as_str()) {
            return Err(GanttError::InvalidConfig(format!(
                "duplicate column name `{}`",
                column.name
            )));
        }
        let sizing_valid = match column.sizing {
            ColumnSizing::Fixed { width } => width.is_finite() && width >= 0.0,
            ColumnSizing::Flex { weight } => weight.is_finite() && weight >= 0.0,
        };
        if !sizing_valid {
            return Err(GanttError::InvalidConfig(format!(
                "column `{}` sizing must be finite and >= 0",
                column.name
            )));
        }
        if let (Some(min), Some(max)) = (column.min_width, column.max_width) {
            if min > max {
                return Err(GanttError::InvalidConfig(format!(
                    "column `{}` min width exceeds max width",
                    column.name
                )));
            }
        }
    }
    Ok(())
}

pub(super) fn validate_column_config(config: &ColumnConfig) -> GanttResult<()> {
    for (name, width) in &config.column_widths {
        if !width.is_finite() || *width < 0.0 {
            return Err(GanttError::InvalidConfig(format!(
                "explicit width of column `{name}` must be finite and >= 0"
            )));
        }
    }
    Ok(())
}

/// Clamps a table panel width to what the divider allows for `container_width`.
#[must_use]
pub fn clamp_table_width(width: f64, container_width: f64) -> f64 {
    width
        .min(container_width - MIN_CHART_WIDTH)
        .max(MIN_TABLE_WIDTH)
}
