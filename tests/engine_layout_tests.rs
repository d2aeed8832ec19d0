use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use gantt_rs::api::{InvalidationLevel, InvalidationTopic, MIN_SCROLL_THUMB_WIDTH};
use gantt_rs::core::{
    CustomEvent, ItemInput, RecordValue, Sight, SightConfig, Viewport, WorkdayMode,
};
use gantt_rs::render::NullRenderer;
use gantt_rs::{GanttEngine, GanttEngineConfig, GanttError};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// 40 px per day, today 2024-01-15, 800 px of chart next to a 400 px table.
fn config() -> GanttEngineConfig {
    GanttEngineConfig::new(Viewport::new(1200.0, 600.0))
        .with_today(date(2024, 1, 15))
        .with_sight_configs(vec![SightConfig::new(Sight::Day, "Day", 2160.0)])
}

fn engine() -> GanttEngine<NullRenderer> {
    GanttEngine::new(NullRenderer::default(), config()).expect("engine init")
}

fn project_items() -> Vec<ItemInput> {
    vec![
        ItemInput::new("a", "Alpha").with_dates(date(2024, 1, 1), date(2024, 1, 3)),
        ItemInput::new("b", "Beta").with_dates(date(2024, 1, 3), date(2024, 1, 6)),
        ItemInput::new("c", "Undated"),
    ]
}

fn loaded_engine() -> GanttEngine<NullRenderer> {
    let mut engine = engine();
    engine.set_items(project_items()).expect("set items");
    engine
}

#[test]
fn construction_fits_a_year_aligned_window_and_centres_today() {
    let engine = engine();

    let range = engine.timeline_range();
    assert_eq!(range.origin, date(2023, 1, 1));
    assert_eq!(range.end, date(2026, 1, 1));
    assert_eq!(range.days(), 1096);

    assert_relative_eq!(engine.view_width(), 800.0);
    assert_relative_eq!(engine.body_height(), 544.0);
    assert_relative_eq!(engine.today_offset(), 15_160.0);
    assert_relative_eq!(engine.translation().0, 14_760.0);
    assert_relative_eq!(engine.scroll_extent().width, 1096.0 * 40.0);
    assert_relative_eq!(engine.scroll_extent().height, 544.0);
}

#[test]
fn two_day_item_projects_an_eighty_pixel_bar() {
    let mut engine = loaded_engine();
    let a = engine.item_id("a").expect("a id");

    let bar = engine.bar(a).expect("bar a");
    assert_relative_eq!(bar.translate_x, 14_600.0);
    assert_relative_eq!(bar.width, 80.0);
    assert_relative_eq!(bar.translate_y, 7.0);
    assert_relative_eq!(bar.height, 14.0);
    assert_eq!(bar.duration_label.as_deref(), Some("2 days"));
    assert!(bar.draggable);
    assert!(!bar.loading);

    let c = engine.item_id("c").expect("c id");
    let undated = engine.bar(c).expect("bar c");
    assert!(undated.invalid);
    assert_relative_eq!(undated.width, 0.0);
    assert_eq!(undated.duration_label, None);
    assert_eq!(undated.row_index, 2);
}

#[test]
fn collapsing_a_group_removes_rows_and_keeps_its_span() {
    let mut engine = engine();
    engine
        .set_items(vec![
            ItemInput::new("phase", "Phase").with_children(vec![
                ItemInput::new("x", "X").with_dates(date(2024, 1, 2), date(2024, 1, 4)),
                ItemInput::new("y", "Y").with_dates(date(2024, 1, 6), date(2024, 1, 9)),
            ]),
            ItemInput::new("z", "Z").with_dates(date(2024, 2, 1), date(2024, 2, 2)),
        ])
        .expect("set items");
    let phase = engine.item_id("phase").expect("phase id");
    assert_eq!(engine.rows().len(), 4);

    let collapsed = engine.toggle_collapse(phase).expect("toggle");
    assert!(collapsed);
    assert_eq!(engine.rows().len(), 2);

    let group = engine.bar(phase).expect("group bar");
    assert!(group.group);
    assert!(group.collapsed);
    assert!(!group.draggable);
    assert_eq!(group.start, Some(date(2024, 1, 2)));
    assert_eq!(group.end, Some(date(2024, 1, 9)));
    assert_relative_eq!(group.width, 7.0 * 40.0);

    let z = engine.item_id("z").expect("z id");
    assert_eq!(engine.bar(z).expect("bar z").row_index, 1);
}

#[test]
fn visible_row_range_adds_overscan_and_clamps_to_row_count() {
    let mut engine = engine();
    let items = (0..30)
        .map(|index| {
            ItemInput::new(format!("item-{index}"), format!("Item {index}"))
                .with_dates(date(2024, 1, 1), date(2024, 1, 2))
        })
        .collect();
    engine.set_items(items).expect("set items");

    assert_relative_eq!(engine.scroll_extent().height, 30.0 * 28.0);
    assert_eq!(engine.visible_row_range(2), 0..22);

    let (_, y) = engine.set_translation(engine.translation().0, 100.0);
    assert_relative_eq!(y, 100.0);
    assert_eq!(engine.visible_row_range(2), 1..25);

    let (_, y) = engine.set_translation(engine.translation().0, 10_000.0);
    assert_relative_eq!(y, 30.0 * 28.0 - 544.0);
    assert_eq!(engine.visible_row_range(2).end, 30);
}

#[test]
fn translation_is_clamped_to_the_scrollable_area() {
    let mut engine = loaded_engine();
    let (max_x, max_y) = engine.max_translation();
    assert_relative_eq!(max_x, 1096.0 * 40.0 - 800.0);
    assert_relative_eq!(max_y, 0.0);

    assert_eq!(engine.set_translation(-50.0, -10.0), (0.0, 0.0));
    assert_eq!(engine.set_translation(1e9, 0.0), (max_x, 0.0));
    assert_eq!(engine.set_translation(f64::NAN, 0.0), (0.0, 0.0));

    let (x, _) = engine.wheel(0.0, 120.0, true);
    assert_relative_eq!(x, 120.0);
}

#[test]
fn scroll_bar_thumb_tracks_translation_with_minimum_width() {
    let mut engine = loaded_engine();
    engine.set_translation(4_384.0, 0.0);

    let thumb = engine.scroll_bar();
    assert!(thumb.visible);
    assert_relative_eq!(thumb.width, MIN_SCROLL_THUMB_WIDTH);
    assert_relative_eq!(thumb.left, 4_384.0 * 800.0 / 43_840.0);
}

#[test]
fn switching_sight_keeps_the_centred_date() {
    let mut engine = GanttEngine::new(
        NullRenderer::default(),
        GanttEngineConfig::new(Viewport::new(1200.0, 600.0)).with_today(date(2024, 1, 15)),
    )
    .expect("engine init");
    assert_relative_eq!(engine.time_scale().pixels_per_day(), 30.0);
    assert_relative_eq!(engine.translation().0, 10_970.0);

    engine.switch_sight(Sight::Week).expect("switch to week");
    assert_eq!(engine.sight(), Sight::Week);
    assert_relative_eq!(engine.time_scale().pixels_per_day(), 24.0);
    let centre = engine.translation().0 + engine.view_width() / 2.0;
    assert_relative_eq!(centre, 379.0 * 24.0);
    assert_eq!(engine.time_scale().to_date(centre), date(2024, 1, 15));

    engine.switch_sight(Sight::Day).expect("switch back");
    assert_relative_eq!(engine.translation().0, 10_970.0, epsilon = 1e-6);
}

#[test]
fn day_sight_markers_only_for_visible_events() {
    let mut engine = loaded_engine();
    engine.set_custom_events(vec![
        CustomEvent::new("release", date(2024, 1, 15), "Release"),
        CustomEvent::new("later", date(2025, 6, 1), "Out of view"),
    ]);

    let markers = engine.custom_event_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].key, "release");
    assert_relative_eq!(markers[0].x, 15_160.0);
    assert_relative_eq!(markers[0].height, 544.0);

    engine.switch_sight(Sight::Month).expect("switch sight");
    assert!(engine.custom_event_markers().is_empty());
}

#[test]
fn duration_labels_follow_workday_mode_and_host_rule() {
    let mut engine = engine();
    engine
        .set_items(vec![
            ItemInput::new("weekend", "Fri to Mon").with_dates(date(2024, 1, 5), date(2024, 1, 8)),
        ])
        .expect("set items");
    let id = engine.item_id("weekend").expect("id");
    let label = |engine: &mut GanttEngine<NullRenderer>| {
        engine
            .bar(id)
            .and_then(|bar| bar.duration_label)
            .expect("duration label")
    };

    assert_eq!(label(&mut engine), "3 days");
    engine.set_workday_mode(WorkdayMode::BusinessDays);
    assert_eq!(label(&mut engine), "1 day");

    engine.set_rest_day_fn(Arc::new(|_| false));
    assert_eq!(label(&mut engine), "3 days");

    engine.set_duration_fn(Some(Arc::new(|_, _| 42)));
    assert_eq!(label(&mut engine), "42 days");
    engine.set_duration_fn(None);
    assert_eq!(label(&mut engine), "3 days");
}

#[test]
fn cell_text_reads_item_records() {
    let mut engine = engine();
    engine
        .set_items(vec![
            ItemInput::new("a", "Alpha")
                .with_field("startDate", RecordValue::Text("2024-01-01".to_owned()))
                .with_field("hours", RecordValue::Integer(8))
                .with_field("progress", RecordValue::Number(45.6)),
            ItemInput::new("b", "Beta"),
        ])
        .expect("set items");
    let a = engine.item_id("a").expect("a id");
    let b = engine.item_id("b").expect("b id");

    assert_eq!(engine.cell_text(a, "start").expect("start"), "01/01/2024");
    assert_eq!(engine.cell_text(a, "hours").expect("hours"), "8h");
    assert_eq!(engine.cell_text(b, "hours").expect("hours"), "-");
    assert_eq!(engine.cell_text(a, "progress").expect("progress"), "46%");
    assert!(matches!(
        engine.cell_text(a, "missing"),
        Err(GanttError::UnknownColumn(_))
    ));
}

#[test]
fn derived_layout_is_memoized_until_an_input_changes() {
    let mut engine = loaded_engine();
    assert_eq!(engine.derived_cache_stats().hits, 0);

    engine.bars();
    let stats = engine.derived_cache_stats();
    assert_eq!((stats.hits, stats.misses), (0, 2));

    engine.bars();
    assert_eq!(engine.derived_cache_stats().hits, 2);

    engine.pan_by(10.0, 0.0);
    engine.bars();
    let stats = engine.derived_cache_stats();
    assert_eq!((stats.hits, stats.misses), (4, 2));

    let a = engine.item_id("a").expect("a id");
    engine
        .update_item_dates(a, None, Some(date(2024, 1, 4)))
        .expect("update dates");
    engine.bars();
    assert_eq!(engine.derived_cache_stats().misses, 4);
    assert_relative_eq!(engine.bar(a).expect("bar a").width, 120.0);
}

#[test]
fn invalidation_reports_topics_and_levels() {
    let mut engine = loaded_engine();
    assert_eq!(
        engine.take_pending_invalidation().level(),
        InvalidationLevel::Full
    );
    assert!(engine.take_pending_invalidation().is_none());

    let before = engine.revision(InvalidationTopic::Viewport);
    engine.pan_by(40.0, 0.0);
    let mask = engine.take_pending_invalidation();
    assert_eq!(mask.level(), InvalidationLevel::Light);
    assert!(mask.has_topic(InvalidationTopic::Viewport));
    assert!(!mask.has_topic(InvalidationTopic::Data));
    assert_eq!(engine.revision(InvalidationTopic::Viewport), before + 1);

    engine.set_locale(gantt_rs::core::GanttLocale::pt_br());
    let mask = engine.take_pending_invalidation();
    assert_eq!(mask.level(), InvalidationLevel::Full);
    assert!(mask.has_topic(InvalidationTopic::Presentation));
}

#[test]
fn update_item_dates_rejects_reversed_range_and_refits_window() {
    let mut engine = loaded_engine();
    let a = engine.item_id("a").expect("a id");

    let result = engine.update_item_dates(a, Some(date(2024, 1, 10)), None);
    assert!(matches!(result, Err(GanttError::InvalidData(_))));
    assert_eq!(engine.item(a).expect("a").start, Some(date(2024, 1, 1)));

    engine
        .update_item_dates(a, Some(date(2021, 6, 1)), None)
        .expect("move start back");
    assert_eq!(engine.timeline_range().origin, date(2020, 1, 1));
    let centre = engine.translation().0 + engine.view_width() / 2.0;
    assert_relative_eq!(centre, 1475.0 * 40.0);
    assert_eq!(engine.time_scale().to_date(centre), date(2024, 1, 15));
}

#[test]
fn hidden_table_gives_the_chart_the_full_container() {
    let mut engine = loaded_engine();
    engine.set_hide_table(true);
    assert_relative_eq!(engine.table_width(), 0.0);
    assert_relative_eq!(engine.view_width(), 1200.0);

    engine.set_hide_table(false);
    assert_relative_eq!(engine.set_table_width(5_000.0), 1_100.0);
    assert_relative_eq!(engine.set_table_width(10.0), 200.0);
}

#[test]
fn render_hands_a_valid_frame_to_the_renderer() {
    let mut engine = loaded_engine();
    engine.render().expect("render");

    let renderer = engine.renderer();
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_bar_count, 3);
    assert!(renderer.last_tick_count >= 20);

    let frame = engine.build_frame();
    assert_eq!(frame.rows.len(), 3);
    assert_relative_eq!(frame.today_x, 15_160.0);
    assert_eq!(frame.table.columns.len(), 8);
}

#[test]
fn date_cells_mirror_item_dates() {
    let mut engine = loaded_engine();
    let a = engine.item_id("a").expect("a id");
    assert_eq!(engine.cell_text(a, "start").expect("start"), "01/01/2024");
    assert_eq!(engine.cell_text(a, "end").expect("end"), "03/01/2024");

    engine
        .update_item_dates(a, Some(date(2024, 2, 1)), Some(date(2024, 2, 3)))
        .expect("update dates");
    assert_eq!(engine.cell_text(a, "start").expect("start"), "01/02/2024");
    assert_eq!(engine.cell_text(a, "end").expect("end"), "03/02/2024");
    assert_eq!(
        engine.item(a).expect("a").record.get("startDate"),
        Some(&RecordValue::Date(date(2024, 2, 1)))
    );

    let c = engine.item_id("c").expect("c id");
    assert_eq!(engine.cell_text(c, "start").expect("start"), "-");
}
