use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};
use schedule_core::{Feed, FetchTicket, Item, PageOutcome, Window, WindowView};

use crate::{PageSource, Surface};

type PendingFetch = Shared<LocalBoxFuture<'static, PageOutcome>>;

struct WindowSlot {
    container_id: String,
    state: RefCell<Window>,
    pending: RefCell<Option<PendingFetch>>,
}

/// Shared handle to one window. Cloning is cheap; all clones see the same state.
///
/// At most one fetch is outstanding per window. Its future is kept in a single
/// slot so that later triggers await the same result instead of starting a
/// second request.
#[derive(Clone)]
pub struct WindowHandle {
    slot: Rc<WindowSlot>,
}

impl WindowHandle {
    pub fn new(feed: Feed) -> Self {
        Self {
            slot: Rc::new(WindowSlot {
                container_id: feed.container_id.clone(),
                state: RefCell::new(Window::new(feed)),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn container_id(&self) -> &str {
        &self.slot.container_id
    }

    pub fn view(&self) -> WindowView {
        self.slot.state.borrow().view()
    }

    /// Runs `f` against the window state. Never held across an await.
    pub fn with<R>(&self, f: impl FnOnce(&Window) -> R) -> R {
        f(&self.slot.state.borrow())
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Window) -> R) -> R {
        f(&mut self.slot.state.borrow_mut())
    }

    fn pending(&self) -> Option<PendingFetch> {
        self.slot.pending.borrow().clone()
    }

    fn set_pending(&self, fetch: PendingFetch) {
        *self.slot.pending.borrow_mut() = Some(fetch);
    }

    fn clear_pending(&self) {
        self.slot.pending.borrow_mut().take();
    }
}

/// Fetches, formats and appends pages for windows.
#[derive(Clone)]
pub struct Pager {
    source: Arc<dyn PageSource>,
    surface: Rc<dyn Surface>,
}

impl Pager {
    pub fn new(source: Arc<dyn PageSource>, surface: Rc<dyn Surface>) -> Self {
        Self { source, surface }
    }

    pub fn source(&self) -> &Arc<dyn PageSource> {
        &self.source
    }

    /// Loads the page at the window's cursor.
    ///
    /// When a fetch is already outstanding this awaits it and reports its
    /// outcome instead of starting a second request. Exhausted windows return
    /// immediately.
    pub async fn load_next_page(&self, window: &WindowHandle) -> PageOutcome {
        if let Some(pending) = window.pending() {
            engine_debug!("{}: joining outstanding fetch", window.container_id());
            return pending.await;
        }

        let started = window.with_mut(|state| {
            state
                .begin_fetch()
                .map(|ticket| (ticket, state.feed().clone()))
                .ok_or(PageOutcome::AlreadyExhausted)
        });
        // The pending slot is set in the same step as the in-flight flag, so a
        // refused fetch here always means the session is exhausted.
        let (ticket, feed) = match started {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let fetch = run_fetch(
            self.source.clone(),
            self.surface.clone(),
            window.clone(),
            feed,
            ticket,
        )
        .boxed_local()
        .shared();
        window.set_pending(fetch.clone());
        fetch.await
    }
}

async fn run_fetch(
    source: Arc<dyn PageSource>,
    surface: Rc<dyn Surface>,
    window: WindowHandle,
    feed: Feed,
    ticket: FetchTicket,
) -> PageOutcome {
    let result = source
        .fetch_page(&feed.endpoint, ticket.offset, ticket.limit)
        .await;
    let page: Option<Vec<Item>> = match result {
        Ok(content) => Some(feed.kind.format(&content)),
        Err(err) => {
            engine_warn!(
                "{}: fetch at offset {} failed: {}",
                feed.container_id,
                ticket.offset,
                err
            );
            surface.notify_error(&format!("{}: {}", feed.endpoint, err));
            None
        }
    };

    window.clear_pending();
    let outcome = window.with_mut(|state| state.finish_fetch(ticket, page));
    engine_debug!(
        "{}: page at offset {} -> {:?}",
        feed.container_id,
        ticket.offset,
        outcome
    );
    outcome
}
