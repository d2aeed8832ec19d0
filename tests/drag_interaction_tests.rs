use approx::assert_relative_eq;
use chrono::NaiveDate;
use gantt_rs::api::DragOutcome;
use gantt_rs::core::{ItemId, ItemInput, Sight, SightConfig, Viewport};
use gantt_rs::interaction::{DragKind, DragTarget};
use gantt_rs::render::NullRenderer;
use gantt_rs::{GanttEngine, GanttEngineConfig, GanttError};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// 40 px per day; bar `a` spans pixels 14600..14680.
fn engine() -> GanttEngine<NullRenderer> {
    let config = GanttEngineConfig::new(Viewport::new(1200.0, 600.0))
        .with_today(date(2024, 1, 15))
        .with_sight_configs(vec![SightConfig::new(Sight::Day, "Day", 2160.0)]);
    let mut engine = GanttEngine::new(NullRenderer::default(), config).expect("engine init");
    engine
        .set_items(vec![
            ItemInput::new("a", "Alpha").with_dates(date(2024, 1, 1), date(2024, 1, 3)),
            ItemInput::new("b", "Beta").with_dates(date(2024, 1, 3), date(2024, 1, 6)),
            ItemInput::new("c", "Undated"),
            ItemInput::new("group", "Group").with_children(vec![
                ItemInput::new("child", "Child").with_dates(date(2024, 1, 2), date(2024, 1, 5)),
            ]),
        ])
        .expect("set items");
    engine
}

fn id(engine: &GanttEngine<NullRenderer>, key: &str) -> ItemId {
    engine.item_id(key).expect("known key")
}

fn bar_target(item: ItemId, kind: DragKind) -> DragTarget {
    DragTarget::Bar { item, kind }
}

fn drag(engine: &mut GanttEngine<NullRenderer>, target: DragTarget, dx: f64) -> DragOutcome {
    assert!(engine.pointer_down(target, 700.0, 70.0).expect("pointer down"));
    engine.pointer_move(700.0 + dx, 70.0);
    engine.pointer_up().expect("pointer up")
}

fn expect_pending(outcome: DragOutcome) -> gantt_rs::api::CommitRequest {
    match outcome {
        DragOutcome::PendingConfirmation(request) => request,
        other => panic!("expected a pending commit, got {other:?}"),
    }
}

#[test]
fn right_resize_snaps_to_whole_days() {
    let mut engine = engine();
    let a = id(&engine, "a");
    assert!(engine
        .pointer_down(bar_target(a, DragKind::RightResize), 700.0, 70.0)
        .expect("pointer down"));

    let cases = [(120.0, 200.0), (135.0, 200.0), (145.0, 240.0), (-200.0, 40.0)];
    for (dx, expected) in cases {
        let geometry = engine.pointer_move(700.0 + dx, 70.0).expect("live geometry");
        assert_relative_eq!(geometry.width, expected);
        assert_relative_eq!(geometry.x, 14_600.0);
    }

    engine.pointer_move(820.0, 70.0);
    let live = engine.bar(a).expect("bar a");
    assert_relative_eq!(live.width, 200.0);

    let request = expect_pending(engine.pointer_up().expect("pointer up"));
    assert_eq!(request.key, "a");
    assert_eq!(request.start, date(2024, 1, 1));
    assert_eq!(request.end, date(2024, 1, 6));
}

#[test]
fn left_resize_keeps_the_right_edge() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let request = expect_pending(drag(&mut engine, bar_target(a, DragKind::LeftResize), -40.0));

    let bar = engine.bar(a).expect("bar a");
    assert_relative_eq!(bar.translate_x, 14_560.0);
    assert_relative_eq!(bar.width, 120.0);
    assert_eq!(request.start, date(2023, 12, 31));
    assert_eq!(request.end, date(2024, 1, 3));
}

#[test]
fn rejected_commit_reverts_the_bar() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let request = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));
    assert_eq!(request.start, date(2024, 1, 3));
    assert_eq!(request.end, date(2024, 1, 5));

    let pending = engine.bar(a).expect("pending bar");
    assert!(pending.loading);
    assert_relative_eq!(pending.translate_x, 14_680.0);
    assert_eq!(pending.start, Some(date(2024, 1, 3)));
    assert!(engine.has_pending_commit(a));

    engine.resolve_commit(request.ticket, false).expect("reject");
    let reverted = engine.bar(a).expect("reverted bar");
    assert!(!reverted.loading);
    assert_relative_eq!(reverted.translate_x, 14_600.0);
    assert_relative_eq!(reverted.width, 80.0);
    assert_eq!(engine.item(a).expect("a").start, Some(date(2024, 1, 1)));
    assert!(engine.pending_commits().is_empty());
}

#[test]
fn accepted_commit_persists_the_dates() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let request = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));

    engine.resolve_commit(request.ticket, true).expect("accept");
    let node = engine.item(a).expect("a");
    assert_eq!(node.start, Some(date(2024, 1, 3)));
    assert_eq!(node.end, Some(date(2024, 1, 5)));

    let bar = engine.bar(a).expect("bar a");
    assert!(!bar.loading);
    assert_relative_eq!(bar.translate_x, 14_680.0);
}

#[test]
fn second_commit_for_the_same_item_is_rejected_while_pending() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let first = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));

    let outcome = drag(&mut engine, bar_target(a, DragKind::Move), 160.0);
    assert_eq!(outcome, DragOutcome::Rejected { item: a });

    let bar = engine.bar(a).expect("bar a");
    assert!(bar.loading);
    assert_relative_eq!(bar.translate_x, 14_680.0);
    assert_eq!(engine.pending_commits(), vec![first]);
}

#[test]
fn releasing_on_the_original_dates_commits_without_confirmation() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let outcome = drag(&mut engine, bar_target(a, DragKind::Move), 10.0);

    assert!(matches!(outcome, DragOutcome::Committed { .. }));
    assert!(engine.pending_commits().is_empty());
    assert_relative_eq!(engine.bar(a).expect("bar a").translate_x, 14_600.0);
}

#[test]
fn cancel_restores_geometry_captured_at_press() {
    let mut engine = engine();
    let a = id(&engine, "a");
    engine
        .pointer_down(bar_target(a, DragKind::Move), 700.0, 70.0)
        .expect("pointer down");
    engine.pointer_move(900.0, 70.0);
    assert_relative_eq!(engine.bar(a).expect("live").translate_x, 14_800.0);

    assert!(engine.pointer_cancel());
    assert!(engine.drag_session().is_none());
    assert_relative_eq!(engine.bar(a).expect("restored").translate_x, 14_600.0);
    assert!(!engine.pointer_cancel());
}

#[test]
fn release_without_movement_is_a_click() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let target = bar_target(a, DragKind::Move);
    engine
        .pointer_down(target.clone(), 700.0, 70.0)
        .expect("pointer down");

    assert_eq!(
        engine.pointer_up().expect("pointer up"),
        DragOutcome::Click { target }
    );
    assert_eq!(engine.pointer_up().expect("idle"), DragOutcome::Idle);
}

#[test]
fn second_press_is_ignored_while_a_session_exists() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let b = id(&engine, "b");
    assert!(engine
        .pointer_down(bar_target(a, DragKind::Move), 700.0, 70.0)
        .expect("first press"));
    assert!(!engine
        .pointer_down(bar_target(b, DragKind::Move), 700.0, 98.0)
        .expect("second press"));
    assert_eq!(
        engine.drag_session().map(|session| session.target().clone()),
        Some(bar_target(a, DragKind::Move))
    );
}

#[test]
fn disabled_engine_and_derived_groups_refuse_bar_drags() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let group = id(&engine, "group");

    assert!(!engine
        .pointer_down(bar_target(group, DragKind::Move), 700.0, 126.0)
        .expect("group press"));

    engine.set_disabled(true);
    assert!(!engine.bar(a).expect("bar a").draggable);
    assert!(!engine
        .pointer_down(bar_target(a, DragKind::Move), 700.0, 70.0)
        .expect("disabled press"));
    assert!(engine
        .pointer_down(DragTarget::Pan, 700.0, 70.0)
        .expect("pan press"));
}

#[test]
fn disabling_cancels_a_live_bar_drag() {
    let mut engine = engine();
    let a = id(&engine, "a");
    engine
        .pointer_down(bar_target(a, DragKind::Move), 700.0, 70.0)
        .expect("pointer down");
    engine.pointer_move(780.0, 70.0);

    engine.set_disabled(true);
    assert!(engine.drag_session().is_none());
    assert_relative_eq!(engine.bar(a).expect("bar a").translate_x, 14_600.0);
    assert!(engine.pending_commits().is_empty());
}

#[test]
fn hit_test_picks_resize_handles_move_and_create() {
    let mut engine = engine();
    let (x, _) = engine.scroll_to_date(date(2024, 1, 2));
    assert_relative_eq!(x, 14_240.0);
    let a = id(&engine, "a");
    let c = id(&engine, "c");

    let hit = engine.hit_test_bar(800.0, 70.0).expect("inside a");
    assert_eq!(hit.target, bar_target(a, DragKind::Move));
    assert_eq!(hit.row_index, 0);
    assert_eq!(
        engine.hit_test_bar(762.0, 70.0).map(|hit| hit.target),
        Some(bar_target(a, DragKind::LeftResize))
    );
    assert_eq!(
        engine.hit_test_bar(839.0, 70.0).map(|hit| hit.target),
        Some(bar_target(a, DragKind::RightResize))
    );
    assert_eq!(engine.hit_test_bar(1_000.0, 70.0), None);
    assert_eq!(engine.hit_test_bar(800.0, 30.0), None);

    let create = engine.hit_test_bar(800.0, 126.0).expect("undated row");
    assert_eq!(create.target, DragTarget::BarCreate { item: c });
    assert_eq!(create.row_index, 2);
}

#[test]
fn bar_create_drafts_one_day_at_the_pressed_date() {
    let mut engine = engine();
    engine.scroll_to_date(date(2024, 1, 2));
    let c = id(&engine, "c");

    assert!(engine
        .pointer_down(DragTarget::BarCreate { item: c }, 800.0, 126.0)
        .expect("create press"));
    assert!(engine.is_dragging());
    let draft = engine.bar(c).expect("draft bar");
    assert!(!draft.invalid);
    assert_relative_eq!(draft.translate_x, 14_640.0);
    assert_relative_eq!(draft.width, 40.0);

    let request = expect_pending(engine.pointer_up().expect("pointer up"));
    assert_eq!(request.start, date(2024, 1, 2));
    assert_eq!(request.end, date(2024, 1, 3));

    engine.resolve_commit(request.ticket, true).expect("accept");
    assert_eq!(engine.item(c).expect("c").start, Some(date(2024, 1, 2)));
}

#[test]
fn column_drag_resizes_and_cancel_restores_config() {
    let mut engine = engine();
    let target = DragTarget::Column {
        name: "start".to_owned(),
    };
    engine
        .pointer_down(target.clone(), 500.0, 20.0)
        .expect("column press");
    let geometry = engine.pointer_move(540.0, 20.0).expect("live");
    assert_relative_eq!(geometry.width, 160.0);
    assert_relative_eq!(
        engine.table_layout().column("start").expect("start").width,
        160.0
    );

    engine.pointer_move(300.0, 20.0);
    assert_relative_eq!(
        engine.table_layout().column("start").expect("start").width,
        50.0
    );

    engine.pointer_cancel();
    assert!(engine.column_config().column_widths.is_empty());
    assert_relative_eq!(
        engine.table_layout().column("start").expect("start").width,
        120.0
    );

    engine.pointer_down(target, 500.0, 20.0).expect("press again");
    engine.pointer_move(540.0, 20.0);
    match engine.pointer_up().expect("release") {
        DragOutcome::Committed { geometry, .. } => assert_relative_eq!(geometry.width, 160.0),
        other => panic!("expected committed column resize, got {other:?}"),
    }
}

#[test]
fn unknown_column_target_is_an_error() {
    let mut engine = engine();
    let result = engine.pointer_down(
        DragTarget::Column {
            name: "nope".to_owned(),
        },
        0.0,
        0.0,
    );
    assert!(matches!(result, Err(GanttError::UnknownColumn(_))));
    assert!(engine.drag_session().is_none());
}

#[test]
fn divider_drag_is_clamped_between_table_and_chart_minimums() {
    let mut engine = engine();
    engine
        .pointer_down(DragTarget::Divider, 400.0, 300.0)
        .expect("divider press");

    engine.pointer_move(1_400.0, 300.0);
    assert_relative_eq!(engine.table_width(), 1_100.0);
    engine.pointer_move(-100.0, 300.0);
    assert_relative_eq!(engine.table_width(), 200.0);
    engine.pointer_move(450.0, 300.0);
    assert_relative_eq!(engine.table_width(), 450.0);

    engine.pointer_cancel();
    assert_relative_eq!(engine.table_width(), 400.0);
}

#[test]
fn pan_moves_the_view_opposite_to_the_pointer() {
    let mut engine = engine();
    let (start_x, _) = engine.translation();
    engine
        .pointer_down(DragTarget::Pan, 600.0, 300.0)
        .expect("pan press");
    engine.pointer_move(500.0, 300.0);
    assert_relative_eq!(engine.translation().0, start_x + 100.0);

    engine.pointer_cancel();
    assert_relative_eq!(engine.translation().0, start_x);
}

#[test]
fn scroll_thumb_maps_thumb_travel_to_timeline_pixels() {
    let mut engine = engine();
    engine.set_translation(0.0, 0.0);
    engine
        .pointer_down(DragTarget::ScrollThumb, 420.0, 590.0)
        .expect("thumb press");
    engine.pointer_move(500.0, 590.0);

    assert_relative_eq!(engine.translation().0, 80.0 * 43_840.0 / 800.0);
}

#[test]
fn resolving_an_unknown_ticket_fails() {
    let mut engine = engine();
    assert!(matches!(
        engine.resolve_commit(99, true),
        Err(GanttError::UnknownCommit(99))
    ));
}

#[test]
fn replacing_items_drops_pending_commits_and_sessions() {
    let mut engine = engine();
    let a = id(&engine, "a");
    expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));
    engine
        .pointer_down(DragTarget::Pan, 600.0, 300.0)
        .expect("pan press");

    engine
        .set_items(vec![ItemInput::new("fresh", "Fresh")])
        .expect("set items");
    assert!(engine.pending_commits().is_empty());
    assert!(engine.drag_session().is_none());
}

#[test]
fn zero_travel_move_keeps_the_press_a_click() {
    let mut engine = engine();
    let column = DragTarget::Column {
        name: "start".to_owned(),
    };
    engine
        .pointer_down(column.clone(), 500.0, 20.0)
        .expect("column press");
    assert_eq!(engine.pointer_move(500.0, 20.0), None);
    assert!(!engine.is_dragging());
    assert_eq!(
        engine.pointer_up().expect("release"),
        DragOutcome::Click { target: column }
    );
    assert!(engine.column_config().column_widths.is_empty());

    let a = id(&engine, "a");
    let target = bar_target(a, DragKind::Move);
    engine
        .pointer_down(target.clone(), 700.0, 70.0)
        .expect("bar press");
    assert_eq!(engine.pointer_move(700.0, 70.0), None);
    assert_eq!(
        engine.pointer_up().expect("release"),
        DragOutcome::Click { target }
    );
    assert!(engine.pending_commits().is_empty());
    assert_relative_eq!(engine.bar(a).expect("bar a").translate_x, 14_600.0);
}

#[test]
fn pending_bar_follows_a_sight_switch() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let request = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));

    engine.switch_sight(Sight::Month).expect("switch sight");
    let bar = engine.bar(a).expect("pending bar");
    assert!(bar.loading);
    assert_eq!(bar.start, Some(request.start));
    assert_eq!(bar.end, Some(request.end));
    assert_relative_eq!(bar.translate_x, 2_202.0);
    assert_relative_eq!(bar.width, 12.0);

    engine.resolve_commit(request.ticket, true).expect("accept");
    let bar = engine.bar(a).expect("committed bar");
    assert!(!bar.loading);
    assert_relative_eq!(bar.translate_x, 2_202.0);
}

#[test]
fn pending_bar_follows_new_sight_constants() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let request = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));

    engine
        .set_sight_configs(&[SightConfig::new(Sight::Day, "Day", 2_880.0)])
        .expect("day constants");
    let bar = engine.bar(a).expect("pending bar");
    assert_eq!(bar.start, Some(request.start));
    assert_relative_eq!(bar.translate_x, 367.0 * 30.0);
    assert_relative_eq!(bar.width, 60.0);
}

#[test]
fn pending_bar_survives_a_window_refit() {
    let mut engine = engine();
    let a = id(&engine, "a");
    let b = id(&engine, "b");
    let moved = expect_pending(drag(&mut engine, bar_target(b, DragKind::Move), 40.0));
    assert_eq!((moved.start, moved.end), (date(2024, 1, 4), date(2024, 1, 7)));

    let widened = expect_pending(drag(
        &mut engine,
        bar_target(a, DragKind::LeftResize),
        -14_600.0,
    ));
    assert_eq!(widened.start, date(2023, 1, 1));
    engine.resolve_commit(widened.ticket, true).expect("accept");
    assert_eq!(engine.timeline_range().origin, date(2022, 1, 1));

    let bar = engine.bar(b).expect("pending bar");
    assert!(bar.loading);
    assert_eq!(bar.start, Some(date(2024, 1, 4)));
    assert_eq!(bar.end, Some(date(2024, 1, 7)));
    assert_relative_eq!(bar.translate_x, 733.0 * 40.0);
    assert_relative_eq!(bar.width, 120.0);
    assert_relative_eq!(engine.bar(a).expect("bar a").translate_x, 14_600.0);
}

#[test]
fn live_drag_is_rebased_when_the_sight_changes() {
    let mut engine = engine();
    let a = id(&engine, "a");
    engine
        .pointer_down(bar_target(a, DragKind::Move), 700.0, 70.0)
        .expect("pointer down");
    engine.pointer_move(780.0, 70.0);

    engine.switch_sight(Sight::Month).expect("switch sight");
    let live = engine.bar(a).expect("live bar");
    assert_relative_eq!(live.width, 12.0);
    assert_relative_eq!(live.translate_x, 2_268.0);
    assert_eq!(live.start, Some(date(2024, 1, 14)));

    let request = expect_pending(engine.pointer_up().expect("pointer up"));
    assert_eq!(request.start, date(2024, 1, 14));
    assert_eq!(request.end, date(2024, 1, 16));
}

#[test]
fn date_cells_follow_resolved_commits() {
    let mut engine = engine();
    let a = id(&engine, "a");
    assert_eq!(engine.cell_text(a, "start").expect("start"), "01/01/2024");
    assert_eq!(engine.cell_text(a, "end").expect("end"), "03/01/2024");

    let rejected = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 40.0));
    engine.resolve_commit(rejected.ticket, false).expect("reject");
    assert_eq!(engine.cell_text(a, "start").expect("start"), "01/01/2024");

    let accepted = expect_pending(drag(&mut engine, bar_target(a, DragKind::Move), 80.0));
    engine.resolve_commit(accepted.ticket, true).expect("accept");
    assert_eq!(engine.cell_text(a, "start").expect("start"), "03/01/2024");
    assert_eq!(engine.cell_text(a, "end").expect("end"), "05/01/2024");
}
