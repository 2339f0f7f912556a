use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use engine_logging::{begin_refresh_pass, engine_debug, engine_info, engine_warn};
use schedule_core::{Feed, PageOutcome, PREFETCH_THRESHOLD};

use crate::render::{ensure_fills_viewport, render_batch, render_until};
use crate::{PageSource, Pager, Surface, WindowHandle};

/// Owns every window of the dashboard and keeps them in sync with the server.
pub struct Dashboard {
    pager: Pager,
    surface: Rc<dyn Surface>,
    windows: BTreeMap<String, WindowHandle>,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn PageSource>,
        surface: Rc<dyn Surface>,
        feeds: impl IntoIterator<Item = Feed>,
    ) -> Self {
        let mut dashboard = Self {
            pager: Pager::new(source, surface.clone()),
            surface,
            windows: BTreeMap::new(),
        };
        for feed in feeds {
            dashboard.register(feed);
        }
        dashboard
    }

    /// Adds a window for `feed`, replacing any window with the same container id.
    pub fn register(&mut self, feed: Feed) -> WindowHandle {
        let handle = WindowHandle::new(feed);
        self.windows
            .insert(handle.container_id().to_string(), handle.clone());
        handle
    }

    pub fn window(&self, container_id: &str) -> Option<&WindowHandle> {
        self.windows.get(container_id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &WindowHandle> {
        self.windows.values()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Restates the world: statistics first, then every window in turn.
    pub async fn refresh_all(&self) {
        let pass = begin_refresh_pass();
        engine_debug!("refresh pass {} over {} windows", pass, self.windows.len());
        self.update_stats().await;
        for window in self.windows.values() {
            if window.with(|state| state.has_progress()) {
                self.warm_reconcile(window).await;
            } else {
                self.cold_start(window).await;
            }
        }
    }

    /// Fetches scheduler statistics and shows them. Returns false when the
    /// request failed; the failure is notified and the display left as is.
    pub async fn update_stats(&self) -> bool {
        match self.pager.source().fetch_stats().await {
            Ok(stats) => {
                self.surface.show_stats(&stats.view());
                true
            }
            Err(err) => {
                engine_warn!("stats fetch failed: {}", err);
                self.surface.notify_error(&format!("stats: {err}"));
                false
            }
        }
    }

    /// Starts a new session and populates the window from offset zero.
    pub async fn cold_start(&self, window: &WindowHandle) {
        engine_info!("{}: cold start", window.container_id());
        window.with_mut(|state| state.reset());
        self.surface.clear(window.container_id());

        self.pager.load_next_page(window).await;
        render_batch(window, self.surface.as_ref());
        ensure_fills_viewport(&self.pager, self.surface.as_ref(), window).await;
    }

    /// Re-fetches the window from scratch up to its previous cursor and render
    /// depth, then restores the scroll position the operator had.
    pub async fn warm_reconcile(&self, window: &WindowHandle) {
        let container_id = window.container_id();
        let (target_offset, target_rendered) =
            window.with(|state| (state.cursor(), state.rendered()));
        let scroll = self.surface.scroll_position(container_id);
        engine_debug!(
            "{}: warm reconcile to offset {} rendered {} scroll {}",
            container_id,
            target_offset,
            target_rendered,
            scroll
        );

        window.with_mut(|state| state.reset());
        self.surface.clear(container_id);

        while window.with(|state| state.cursor() < target_offset && !state.is_exhausted()) {
            let outcome = self.pager.load_next_page(window).await;
            if outcome == PageOutcome::Failed {
                engine_warn!(
                    "{}: replay stopped at offset {}",
                    container_id,
                    window.with(|state| state.cursor())
                );
                break;
            }
            while render_until(window, self.surface.as_ref(), target_rendered) > 0 {}
        }
        while render_until(window, self.surface.as_ref(), target_rendered) > 0 {}

        if target_offset == 0 && target_rendered == 0 {
            ensure_fills_viewport(&self.pager, self.surface.as_ref(), window).await;
        }

        self.surface.set_scroll_position(container_id, scroll);
    }

    /// Grows the window when the operator scrolls close to its bottom.
    pub async fn on_scroll_near_bottom(&self, window: &WindowHandle) {
        let container_id = window.container_id();
        if !self.surface.is_near_bottom(container_id) {
            return;
        }

        let remaining = window.with(|state| state.unrendered());
        render_batch(window, self.surface.as_ref());

        if remaining <= PREFETCH_THRESHOLD && !window.with(|state| state.is_exhausted()) {
            self.pager.load_next_page(window).await;
            if self.surface.is_near_bottom(container_id) {
                render_batch(window, self.surface.as_ref());
            }
        }
    }

    /// Scroll event addressed by container id. Unknown containers are ignored.
    pub async fn on_scroll(&self, container_id: &str) {
        match self.windows.get(container_id) {
            Some(window) => self.on_scroll_near_bottom(window).await,
            None => engine_debug!("scroll event for unknown container {}", container_id),
        }
    }
}
