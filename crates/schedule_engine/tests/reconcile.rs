mod common;

use common::{init_logging, names, single_window_dashboard, RecordingSurface, ScriptedSource, IN_PROGRESS};
use pretty_assertions::assert_eq;
use schedule_core::{Feed, Item};
use schedule_engine::{Dashboard, StatsView, Surface};
use serde_json::json;

const ID: &str = "scroll-in-progress";

fn titles(items: &[Item]) -> Vec<String> {
    items.iter().map(|item| item.title.clone()).collect()
}

#[tokio::test]
async fn cold_start_paints_one_batch_when_it_fills_the_viewport() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(37));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();

    dashboard.cold_start(window).await;

    let view = window.view();
    assert_eq!(view.buffered, 15);
    assert_eq!(view.rendered, 15);
    assert_eq!(surface.painted_count(ID), 15);
    assert_eq!(source.page_calls(), 1);
}

#[tokio::test]
async fn immediately_exhausted_feed_stops_filling() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, Vec::new());
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();

    dashboard.cold_start(window).await;

    let view = window.view();
    assert!(view.exhausted);
    assert_eq!(view.rendered, 0);
    assert_eq!(source.page_calls(), 1);
}

#[tokio::test]
async fn filling_gives_up_after_the_retry_limit() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(1000));
    let surface = RecordingSurface::with_geometry(10_000, 20);
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();

    dashboard.cold_start(window).await;

    assert_eq!(source.page_calls(), 6);
    assert_eq!(window.view().rendered, 90);
    assert!(!surface.fills_viewport(ID));
}

#[tokio::test]
async fn scroll_with_a_full_batch_buffered_does_not_fetch() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(25));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;
    dashboard.pager().load_next_page(window).await;
    assert_eq!(window.view().buffered - window.view().rendered, 10);

    surface.scroll_to_bottom(ID);
    dashboard.on_scroll_near_bottom(window).await;

    assert_eq!(window.view().rendered, 25);
    assert_eq!(surface.painted_count(ID), 25);
    assert_eq!(source.page_calls(), 2);
}

#[tokio::test]
async fn scroll_near_the_end_of_the_buffer_prefetches() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(40));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;

    surface.scroll_to_bottom(ID);
    dashboard.on_scroll(ID).await;

    let view = window.view();
    assert_eq!(view.cursor, 30);
    assert_eq!(view.rendered, 30);
    assert_eq!(source.page_calls(), 2);
}

#[tokio::test]
async fn scroll_away_from_the_bottom_is_ignored() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(40));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;

    dashboard.on_scroll(ID).await;
    dashboard.on_scroll("scroll-unknown").await;

    assert_eq!(window.view().rendered, 15);
    assert_eq!(source.page_calls(), 1);
}

#[tokio::test]
async fn warm_reconcile_restores_depth_and_scroll_position() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(40));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;
    surface.scroll_to_bottom(ID);
    dashboard.on_scroll_near_bottom(window).await;
    surface.set_scroll_position(ID, 150);
    let painted_before = surface.painted(ID);

    dashboard.warm_reconcile(window).await;

    let view = window.view();
    assert_eq!(view.cursor, 30);
    assert_eq!(view.rendered, 30);
    assert_eq!(surface.painted(ID), painted_before);
    assert_eq!(surface.scroll_position(ID), 150);
    assert_eq!(source.page_calls(), 4);
}

#[tokio::test]
async fn warm_reconcile_replays_partial_render_depth_exactly() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(40));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;
    dashboard.pager().load_next_page(window).await;

    dashboard.warm_reconcile(window).await;

    let view = window.view();
    assert_eq!(view.cursor, 30);
    assert_eq!(view.buffered, 30);
    assert_eq!(view.rendered, 15);
    assert_eq!(surface.painted_count(ID), 15);
}

#[tokio::test]
async fn scroll_fetch_in_flight_during_warm_reconcile_is_discarded() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(60));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;
    surface.scroll_to_bottom(ID);
    dashboard.on_scroll_near_bottom(window).await;
    assert_eq!((window.view().cursor, window.view().rendered), (30, 30));
    surface.scroll_to_bottom(ID);
    let scroll = surface.scroll_position(ID);

    // The scroll starts the fetch at offset 30; the replay resets underneath it.
    tokio::join!(
        dashboard.on_scroll_near_bottom(window),
        dashboard.warm_reconcile(window)
    );

    let view = window.view();
    assert_eq!(view.cursor, 30);
    assert_eq!(view.rendered, 30);
    assert!(!view.fetching);
    assert_eq!(source.max_in_flight(), 1);
    assert_eq!(surface.painted_count(ID), view.rendered);
    let expected: Vec<String> = (0..30).map(|n| format!("job-{n}")).collect();
    assert_eq!(titles(&surface.painted(ID)), expected);
    assert_eq!(surface.scroll_position(ID), scroll);
}

#[tokio::test]
async fn scroll_during_warm_reconcile_joins_the_replay_fetch() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(40));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;
    dashboard.pager().load_next_page(window).await;
    surface.scroll_to_bottom(ID);
    let scroll = surface.scroll_position(ID);
    let calls_before = source.page_calls();

    tokio::join!(
        dashboard.warm_reconcile(window),
        dashboard.on_scroll_near_bottom(window)
    );

    let view = window.view();
    assert_eq!(view.cursor, 30);
    assert_eq!(view.rendered, 15);
    assert_eq!(source.max_in_flight(), 1);
    assert_eq!(source.page_calls(), calls_before + 2);
    assert_eq!(surface.painted_count(ID), view.rendered);
    let expected: Vec<String> = (0..15).map(|n| format!("job-{n}")).collect();
    assert_eq!(titles(&surface.painted(ID)), expected);
    assert_eq!(surface.scroll_position(ID), scroll);
}

#[tokio::test]
async fn warm_reconcile_replaces_stale_content() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(20));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;

    let fresh: Vec<_> = (0..20).map(|n| json!(format!("fresh-{n}"))).collect();
    source.set_feed(IN_PROGRESS, fresh);
    dashboard.warm_reconcile(window).await;

    let painted = titles(&surface.painted(ID));
    assert_eq!(painted.len(), 15);
    assert_eq!(painted[0], "fresh-0");
    assert_eq!(painted[14], "fresh-14");
}

#[tokio::test]
async fn warm_reconcile_stops_when_the_source_fails() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(40));
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);
    let window = dashboard.window(ID).unwrap();
    dashboard.cold_start(window).await;
    let calls_before = source.page_calls();

    source.fail_next_pages(usize::MAX);
    dashboard.warm_reconcile(window).await;

    let view = window.view();
    assert_eq!(view.buffered, 0);
    assert_eq!(view.cursor, 0);
    assert!(!view.fetching);
    assert_eq!(source.page_calls(), calls_before + 1);
    assert_eq!(surface.errors().len(), 1);
}

#[tokio::test]
async fn refresh_all_cold_starts_idle_windows_and_replays_the_rest() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(20));
    let surface = RecordingSurface::new();
    let dashboard = Dashboard::new(source.clone(), surface.clone(), Feed::well_known());

    dashboard.refresh_all().await;

    assert_eq!(source.stats_calls(), 1);
    assert_eq!(
        surface.stats(),
        vec![StatsView {
            busy: Some(2),
            idle: Some(3),
            total: Some(5),
            doing: Some(4),
            todo: Some(11),
        }]
    );
    assert_eq!(surface.painted_count(ID), 15);
    assert_eq!(source.page_calls(), 5);
    for window in dashboard.windows().filter(|w| w.container_id() != ID) {
        assert!(window.view().exhausted);
        assert_eq!(window.view().generation, 1);
    }

    dashboard.refresh_all().await;

    assert_eq!(source.page_calls(), 10);
    let view = dashboard.window(ID).unwrap().view();
    assert_eq!(view.generation, 2);
    assert_eq!(view.rendered, 15);
    assert_eq!(source.stats_calls(), 2);
}

#[tokio::test]
async fn failed_stats_do_not_block_window_refresh() {
    init_logging();
    let source = ScriptedSource::with_feed(IN_PROGRESS, names(20));
    source.fail_stats(true);
    let surface = RecordingSurface::new();
    let dashboard = single_window_dashboard(&source, &surface);

    dashboard.refresh_all().await;

    assert!(surface.stats().is_empty());
    assert_eq!(surface.errors().len(), 1);
    assert!(surface.errors()[0].starts_with("stats"));
    assert_eq!(surface.painted_count(ID), 15);
}
