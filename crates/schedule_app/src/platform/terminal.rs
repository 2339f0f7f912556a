use std::cell::RefCell;
use std::collections::BTreeMap;

use schedule_core::{Item, SCROLL_THRESHOLD_PX};
use schedule_engine::{StatsView, Surface};

/// Height of one painted row in the pixel model shared with the engine.
const ROW_HEIGHT_PX: u32 = 20;

#[derive(Debug, Default)]
struct Pane {
    rows: u32,
    scroll_top: u32,
}

/// Prints painted items to stdout and keeps a per-container scroll model,
/// `visible_rows` rows tall.
pub struct TerminalSurface {
    visible_rows: u32,
    panes: RefCell<BTreeMap<String, Pane>>,
}

impl TerminalSurface {
    pub fn new(visible_rows: u32) -> Self {
        Self {
            visible_rows: visible_rows.max(1),
            panes: RefCell::new(BTreeMap::new()),
        }
    }

    /// Moves the container to its bottom. Returns false for unknown containers.
    pub fn scroll_to_bottom(&self, container_id: &str) -> bool {
        let client = self.client_height();
        let mut panes = self.panes.borrow_mut();
        match panes.get_mut(container_id) {
            Some(pane) => {
                pane.scroll_top = scroll_height(pane, client) - client;
                true
            }
            None => false,
        }
    }

    fn client_height(&self) -> u32 {
        self.visible_rows.saturating_mul(ROW_HEIGHT_PX)
    }
}

fn scroll_height(pane: &Pane, client: u32) -> u32 {
    pane.rows.saturating_mul(ROW_HEIGHT_PX).max(client)
}

fn unknown(value: Option<i64>) -> i64 {
    value.unwrap_or(-1)
}

impl Surface for TerminalSurface {
    fn paint(&self, container_id: &str, items: &[Item], append: bool) {
        let mut panes = self.panes.borrow_mut();
        let pane = panes.entry(container_id.to_string()).or_default();
        if !append {
            pane.rows = 0;
        }
        for item in items {
            println!("[{container_id}] {}", item.title);
            for line in item.info.lines().filter(|line| !line.is_empty()) {
                println!("[{container_id}]     {line}");
            }
        }
        let painted = u32::try_from(items.len()).unwrap_or(u32::MAX);
        pane.rows = pane.rows.saturating_add(painted);
    }

    fn clear(&self, container_id: &str) {
        let mut panes = self.panes.borrow_mut();
        let pane = panes.entry(container_id.to_string()).or_default();
        pane.rows = 0;
        pane.scroll_top = 0;
    }

    fn scroll_position(&self, container_id: &str) -> u32 {
        self.panes
            .borrow()
            .get(container_id)
            .map_or(0, |pane| pane.scroll_top)
    }

    fn set_scroll_position(&self, container_id: &str, position: u32) {
        let client = self.client_height();
        let mut panes = self.panes.borrow_mut();
        let pane = panes.entry(container_id.to_string()).or_default();
        pane.scroll_top = position.min(scroll_height(pane, client) - client);
    }

    fn is_near_bottom(&self, container_id: &str) -> bool {
        let client = self.client_height();
        let panes = self.panes.borrow();
        let Some(pane) = panes.get(container_id) else {
            return true;
        };
        pane.scroll_top.saturating_add(client)
            >= scroll_height(pane, client).saturating_sub(SCROLL_THRESHOLD_PX)
    }

    fn fills_viewport(&self, container_id: &str) -> bool {
        self.panes
            .borrow()
            .get(container_id)
            .is_some_and(|pane| pane.rows.saturating_mul(ROW_HEIGHT_PX) > self.client_height())
    }

    fn show_stats(&self, stats: &StatsView) {
        println!(
            "[stats {}] workers busy {} idle {} total {} | jobs doing {} todo {}",
            chrono::Local::now().format("%H:%M:%S"),
            unknown(stats.busy),
            unknown(stats.idle),
            unknown(stats.total),
            unknown(stats.doing),
            unknown(stats.todo),
        );
    }

    fn notify_error(&self, message: &str) {
        eprintln!("API ERROR: {message}");
    }
}
