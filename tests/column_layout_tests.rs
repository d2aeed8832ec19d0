use std::sync::Arc;

use approx::assert_relative_eq;
use gantt_rs::core::column::{
    MIN_COLUMN_WIDTH, default_columns, format_cell, resize_column, resolve_layout, visible_columns,
};
use gantt_rs::core::{Column, ColumnConfig, ColumnKind, Record, RecordValue};
use indexmap::IndexMap;
use rust_decimal::Decimal;

fn fixed_columns() -> Vec<Column> {
    vec![
        Column::fixed("name", "Task", 180.0),
        Column::fixed("start", "Start", 100.0),
        Column::fixed("end", "End", 100.0),
    ]
}

fn record(entries: &[(&str, RecordValue)]) -> Record {
    entries
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect()
}

#[test]
fn fixed_columns_stack_left_to_right() {
    let layout = resolve_layout(&fixed_columns(), &ColumnConfig::default(), Some(400.0));

    let lefts: Vec<f64> = layout.columns.iter().map(|column| column.left).collect();
    assert_eq!(lefts, vec![0.0, 180.0, 280.0]);
    assert_relative_eq!(layout.total_width, 380.0);
}

#[test]
fn flex_columns_share_remaining_width_by_weight() {
    let columns = vec![
        Column::flex("name", "Task", 1.0),
        Column::fixed("owner", "Owner", 100.0),
        Column::flex("notes", "Notes", 3.0),
    ];
    let layout = resolve_layout(&columns, &ColumnConfig::default(), Some(500.0));

    assert_relative_eq!(layout.column("name").expect("name").width, 100.0);
    assert_relative_eq!(layout.column("notes").expect("notes").width, 300.0);
    assert_relative_eq!(layout.column("notes").expect("notes").left, 200.0);
    assert_relative_eq!(layout.total_width, 500.0);
}

#[test]
fn flex_columns_respect_bounds_and_fallback_without_table_width() {
    let columns = vec![
        Column::flex("name", "Task", 1.0).with_bounds(Some(150.0), Some(220.0)),
        Column::fixed("owner", "Owner", 300.0),
    ];
    let narrow = resolve_layout(&columns, &ColumnConfig::default(), Some(350.0));
    assert_relative_eq!(narrow.column("name").expect("name").width, 150.0);

    let wide = resolve_layout(&columns, &ColumnConfig::default(), Some(1_000.0));
    assert_relative_eq!(wide.column("name").expect("name").width, 220.0);

    let unknown = resolve_layout(&columns, &ColumnConfig::default(), None);
    assert_relative_eq!(unknown.column("name").expect("name").width, 150.0);
}

#[test]
fn visibility_and_order_filter_then_sort_stably() {
    let columns = vec![
        Column::fixed("a", "A", 50.0),
        Column::fixed("b", "B", 50.0),
        Column::fixed("c", "C", 50.0),
        Column::fixed("d", "D", 50.0),
    ];
    let config = ColumnConfig {
        visible_columns: Some(vec!["a".to_owned(), "c".to_owned(), "d".to_owned()]),
        column_order: Some(vec!["d".to_owned()]),
        column_widths: IndexMap::new(),
    };

    let names: Vec<&str> = visible_columns(&columns, &config)
        .into_iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(names, vec!["d", "a", "c"]);
}

#[test]
fn resize_touches_only_the_named_column() {
    let columns = fixed_columns();
    let mut config = ColumnConfig::default();
    let before = resolve_layout(&columns, &config, Some(400.0));

    let applied = resize_column(&mut config, "start", 160.0);
    let after = resolve_layout(&columns, &config, Some(400.0));

    assert_relative_eq!(applied, 160.0);
    assert_eq!(config.column_widths.len(), 1);
    assert_relative_eq!(after.column("start").expect("start").width, 160.0);
    for name in ["name", "end"] {
        assert_relative_eq!(
            after.column(name).expect("column").width,
            before.column(name).expect("column").width
        );
    }
    assert_relative_eq!(after.column("end").expect("end").left, 340.0);
}

#[test]
fn resize_floors_at_minimum_and_ignores_declared_bounds() {
    let columns = vec![Column::fixed("name", "Task", 180.0).with_bounds(Some(150.0), Some(200.0))];
    let mut config = ColumnConfig::default();

    assert_relative_eq!(resize_column(&mut config, "name", 10.0), MIN_COLUMN_WIDTH);
    assert_relative_eq!(resize_column(&mut config, "name", 320.0), 320.0);
    let layout = resolve_layout(&columns, &config, Some(400.0));
    assert_relative_eq!(layout.column("name").expect("name").width, 320.0);
}

#[test]
fn cells_are_formatted_by_column_kind() {
    let row = record(&[
        ("startDate", RecordValue::Text("2024-01-05".to_owned())),
        ("progress", RecordValue::Number(45.6)),
        ("hours", RecordValue::Integer(8)),
        (
            "status",
            RecordValue::Map(record(&[("title", RecordValue::Text("Done".to_owned()))])),
        ),
        (
            "user",
            RecordValue::Map(record(&[("name", RecordValue::Text("Ana".to_owned()))])),
        ),
        ("priority", RecordValue::Number(2.0)),
    ]);
    let columns = default_columns();
    let cell = |name: &str| {
        let column = columns
            .iter()
            .find(|column| column.name == name)
            .expect("default column");
        format_cell(column, &row)
    };

    assert_eq!(cell("start"), "05/01/2024");
    assert_eq!(cell("end"), "-");
    assert_eq!(cell("progress"), "46%");
    assert_eq!(cell("hours"), "8h");
    assert_eq!(cell("status"), "Done");
    assert_eq!(cell("owner"), "Ana");
    assert_eq!(cell("priority"), "2");
}

#[test]
fn currency_tags_and_custom_formatters() {
    let row = record(&[
        ("budget", RecordValue::Decimal(Decimal::new(123_456, 3))),
        (
            "tags",
            RecordValue::List(vec![
                RecordValue::Map(record(&[("name", RecordValue::Text("ui".to_owned()))])),
                RecordValue::Text("api".to_owned()),
            ]),
        ),
        ("code", RecordValue::Text("abc".to_owned())),
    ]);

    let budget = Column::fixed("budget", "Budget", 100.0).with_kind(ColumnKind::Currency);
    let tags = Column::fixed("tags", "Tags", 100.0).with_kind(ColumnKind::Tags);
    let code = Column::fixed("code", "Code", 80.0).with_formatter(Arc::new(
        |value: &RecordValue, _: &Record| value.as_str().unwrap_or_default().to_uppercase(),
    ));

    assert_eq!(format_cell(&budget, &row), "123.46");
    assert_eq!(format_cell(&tags, &row), "ui, api");
    assert_eq!(format_cell(&code, &row), "ABC");
}

#[test]
fn columns_round_trip_through_json_without_formatters() {
    let columns = default_columns();
    let json = serde_json::to_string(&columns).expect("serialize columns");
    let restored: Vec<Column> = serde_json::from_str(&json).expect("deserialize columns");

    assert_eq!(restored.len(), columns.len());
    assert!(restored.iter().all(|column| column.formatter.is_none()));
    assert_eq!(restored[1].field_name(), "startDate");
}
