#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use schedule_core::{Feed, Item, SCROLL_THRESHOLD_PX};
use schedule_engine::{
    Dashboard, FailureKind, JobStats, PageSource, SchedulerStats, SourceError, StatsView, Surface,
    WorkerStats,
};
use serde_json::{json, Value};

pub const IN_PROGRESS: &str = "/api/schedule/in-progress";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn names(count: usize) -> Vec<Value> {
    (0..count).map(|n| json!(format!("job-{n}"))).collect()
}

/// In-memory feed server. Every page fetch yields to the scheduler a few
/// times so concurrent callers really overlap.
#[derive(Default)]
pub struct ScriptedSource {
    feeds: Mutex<HashMap<String, Vec<Value>>>,
    failing_pages: AtomicUsize,
    failing_stats: AtomicBool,
    page_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_feed(endpoint: &str, records: Vec<Value>) -> Arc<Self> {
        let source = Self::new();
        source.set_feed(endpoint, records);
        source
    }

    pub fn set_feed(&self, endpoint: &str, records: Vec<Value>) {
        self.feeds
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), records);
    }

    pub fn fail_next_pages(&self, count: usize) {
        self.failing_pages.store(count, Ordering::SeqCst);
    }

    pub fn fail_stats(&self, fail: bool) {
        self.failing_stats.store(fail, Ordering::SeqCst);
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(
        &self,
        endpoint: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Value, SourceError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failing = self
            .failing_pages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SourceError {
                kind: FailureKind::HttpStatus(503),
                message: "unavailable".to_string(),
            });
        }

        let feeds = self.feeds.lock().unwrap();
        let records = feeds.get(endpoint).cloned().unwrap_or_default();
        let page: Vec<Value> = records.into_iter().skip(offset).take(limit).collect();
        Ok(Value::Array(page))
    }

    async fn fetch_stats(&self) -> Result<SchedulerStats, SourceError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing_stats.load(Ordering::SeqCst) {
            return Err(SourceError {
                kind: FailureKind::Timeout,
                message: "stats timed out".to_string(),
            });
        }
        Ok(SchedulerStats {
            workers: WorkerStats {
                busy: Some(2),
                idle: Some(3),
            },
            jobs: JobStats {
                doing: Some(4),
                todo: Some(11),
            },
        })
    }
}

#[derive(Debug, Default)]
struct Container {
    items: Vec<Item>,
    scroll_top: u32,
}

/// Surface double that lays items out at a fixed pixel height.
pub struct RecordingSurface {
    client_height: u32,
    item_height: u32,
    containers: RefCell<HashMap<String, Container>>,
    stats: RefCell<Vec<StatsView>>,
    errors: RefCell<Vec<String>>,
}

impl RecordingSurface {
    /// 200px viewport with 20px items: ten items are visible, eleven scroll.
    pub fn new() -> Rc<Self> {
        Self::with_geometry(200, 20)
    }

    pub fn with_geometry(client_height: u32, item_height: u32) -> Rc<Self> {
        Rc::new(Self {
            client_height,
            item_height,
            containers: RefCell::new(HashMap::new()),
            stats: RefCell::new(Vec::new()),
            errors: RefCell::new(Vec::new()),
        })
    }

    pub fn painted(&self, container_id: &str) -> Vec<Item> {
        self.containers
            .borrow()
            .get(container_id)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    pub fn painted_count(&self, container_id: &str) -> usize {
        self.painted(container_id).len()
    }

    pub fn scroll_to_bottom(&self, container_id: &str) {
        let max = self.max_scroll(container_id);
        self.set_scroll_position(container_id, max);
    }

    pub fn stats(&self) -> Vec<StatsView> {
        self.stats.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    fn scroll_height(&self, container_id: &str) -> u32 {
        let content = self.painted_count(container_id) as u32 * self.item_height;
        content.max(self.client_height)
    }

    fn max_scroll(&self, container_id: &str) -> u32 {
        self.scroll_height(container_id) - self.client_height
    }
}

impl Surface for RecordingSurface {
    fn paint(&self, container_id: &str, items: &[Item], append: bool) {
        let mut containers = self.containers.borrow_mut();
        let container = containers.entry(container_id.to_string()).or_default();
        if !append {
            container.items.clear();
        }
        container.items.extend_from_slice(items);
    }

    fn clear(&self, container_id: &str) {
        let mut containers = self.containers.borrow_mut();
        let container = containers.entry(container_id.to_string()).or_default();
        container.items.clear();
        container.scroll_top = 0;
    }

    fn scroll_position(&self, container_id: &str) -> u32 {
        self.containers
            .borrow()
            .get(container_id)
            .map_or(0, |c| c.scroll_top)
    }

    fn set_scroll_position(&self, container_id: &str, position: u32) {
        let clamped = position.min(self.max_scroll(container_id));
        self.containers
            .borrow_mut()
            .entry(container_id.to_string())
            .or_default()
            .scroll_top = clamped;
    }

    fn is_near_bottom(&self, container_id: &str) -> bool {
        let scroll_top = self.scroll_position(container_id);
        scroll_top + self.client_height
            >= self
                .scroll_height(container_id)
                .saturating_sub(SCROLL_THRESHOLD_PX)
    }

    fn fills_viewport(&self, container_id: &str) -> bool {
        self.painted_count(container_id) as u32 * self.item_height > self.client_height
    }

    fn show_stats(&self, stats: &StatsView) {
        self.stats.borrow_mut().push(*stats);
    }

    fn notify_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

pub fn single_window_dashboard(
    source: &Arc<ScriptedSource>,
    surface: &Rc<RecordingSurface>,
) -> Dashboard {
    Dashboard::new(
        source.clone(),
        surface.clone(),
        [Feed::new("scroll-in-progress", IN_PROGRESS)],
    )
}
