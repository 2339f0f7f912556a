use std::cell::Cell;
use std::future::pending;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::Dashboard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// The operator scrolled the container close to its bottom.
    ScrollNearBottom { container_id: String },
    /// Run a full refresh now.
    Refresh,
    /// Change the refresh period; zero disables the timer.
    SetRefreshPeriod(Duration),
    /// Stop accepting events and return once running work has finished.
    Shutdown,
}

/// Sending side of the dashboard event queue.
#[derive(Debug, Clone)]
pub struct EventHandle {
    tx: mpsc::UnboundedSender<DashboardEvent>,
}

impl EventHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: DashboardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn scroll_near_bottom(&self, container_id: impl Into<String>) {
        self.send(DashboardEvent::ScrollNearBottom {
            container_id: container_id.into(),
        });
    }

    pub fn refresh(&self) {
        self.send(DashboardEvent::Refresh);
    }

    pub fn set_refresh_period(&self, period: Duration) {
        self.send(DashboardEvent::SetRefreshPeriod(period));
    }

    pub fn shutdown(&self) {
        self.send(DashboardEvent::Shutdown);
    }
}

/// Drives the dashboard on the current thread.
///
/// Runs one refresh immediately, then multiplexes the refresh timer, incoming
/// events and the operations they started. Operations run concurrently with
/// each other; only suspension at a source fetch lets them interleave. A timer
/// tick or refresh request that arrives while a refresh is running is dropped.
/// Returns after `Shutdown` (or once every sender is gone) when all running
/// operations have completed.
pub async fn run_event_loop(
    dashboard: &Dashboard,
    mut events: mpsc::UnboundedReceiver<DashboardEvent>,
    refresh_period: Duration,
) {
    let refreshing = Cell::new(false);
    let mut timer = refresh_timer(refresh_period);
    let mut running: FuturesUnordered<LocalBoxFuture<'_, ()>> = FuturesUnordered::new();
    let mut accepting = true;

    start_refresh(dashboard, &refreshing, &mut running);

    loop {
        if !accepting && running.is_empty() {
            break;
        }
        tokio::select! {
            biased;
            Some(()) = running.next(), if !running.is_empty() => {}
            event = events.recv(), if accepting => match event {
                Some(DashboardEvent::ScrollNearBottom { container_id }) => {
                    running.push(
                        async move { dashboard.on_scroll(&container_id).await }.boxed_local(),
                    );
                }
                Some(DashboardEvent::Refresh) => {
                    start_refresh(dashboard, &refreshing, &mut running);
                }
                Some(DashboardEvent::SetRefreshPeriod(period)) => {
                    engine_info!("refresh period set to {:?}", period);
                    timer = refresh_timer(period);
                }
                Some(DashboardEvent::Shutdown) | None => {
                    engine_debug!("event loop draining {} operations", running.len());
                    accepting = false;
                }
            },
            _ = next_tick(&mut timer), if accepting => {
                start_refresh(dashboard, &refreshing, &mut running);
            }
        }
    }
}

fn start_refresh<'a>(
    dashboard: &'a Dashboard,
    refreshing: &'a Cell<bool>,
    running: &mut FuturesUnordered<LocalBoxFuture<'a, ()>>,
) {
    if refreshing.replace(true) {
        engine_debug!("refresh already running; skipping");
        return;
    }
    running.push(
        async move {
            dashboard.refresh_all().await;
            refreshing.set(false);
        }
        .boxed_local(),
    );
}

fn refresh_timer(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(timer)
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => pending::<()>().await,
    }
}
