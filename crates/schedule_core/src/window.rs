use crate::{Feed, Item};

/// Page size for fetches and the number of items painted per render batch.
pub const BATCH_SIZE: usize = 15;
/// Unrendered items at or below which a scroll event also fetches the next page.
pub const PREFETCH_THRESHOLD: usize = 5;
/// Distance from the bottom of a container that still counts as "near bottom".
pub const SCROLL_THRESHOLD_PX: u32 = 60;
/// Upper bound on render/fetch rounds spent trying to fill a viewport.
pub const FILL_RETRY_LIMIT: usize = 5;

pub type Generation = u64;

/// Result of one attempt to load the next page into a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page produced this many items, all appended.
    Appended(usize),
    /// The page was empty; the session is now exhausted.
    Exhausted,
    /// Nothing was requested because the session was already exhausted.
    AlreadyExhausted,
    /// The source failed; the window is unchanged.
    Failed,
    /// The page belonged to an earlier session and was dropped.
    Stale,
}

impl PageOutcome {
    pub fn made_progress(self) -> bool {
        matches!(self, PageOutcome::Appended(_))
    }
}

/// Issued by [`Window::begin_fetch`]; identifies the session and offset the
/// fetch was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowView {
    pub container_id: String,
    pub buffered: usize,
    pub rendered: usize,
    pub cursor: usize,
    pub exhausted: bool,
    pub fetching: bool,
    pub generation: Generation,
}

/// Pagination state of one scrollable list.
///
/// Invariants: `rendered <= buffer.len()`, `cursor` only moves by the number of
/// items a fetch appended, and `exhausted` stays set until the next [`reset`].
///
/// [`reset`]: Window::reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    feed: Feed,
    buffer: Vec<Item>,
    rendered: usize,
    cursor: usize,
    exhausted: bool,
    fetch_in_flight: bool,
    generation: Generation,
}

impl Window {
    pub fn new(feed: Feed) -> Self {
        Self {
            feed,
            buffer: Vec::new(),
            rendered: 0,
            cursor: 0,
            exhausted: false,
            fetch_in_flight: false,
            generation: 0,
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn items(&self) -> &[Item] {
        &self.buffer
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn unrendered(&self) -> usize {
        self.buffer.len() - self.rendered
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True once the session has fetched or painted anything.
    pub fn has_progress(&self) -> bool {
        self.cursor != 0 || self.rendered != 0
    }

    /// Starts a new session. An outstanding fetch is left alone: it still
    /// clears the in-flight flag when it lands, but its page is discarded.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.rendered = 0;
        self.cursor = 0;
        self.exhausted = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Marks a fetch as in flight and returns what to request, or `None` when
    /// the session is exhausted or another fetch is outstanding.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.fetch_in_flight || self.exhausted {
            return None;
        }
        self.fetch_in_flight = true;
        Some(FetchTicket {
            generation: self.generation,
            offset: self.cursor,
            limit: BATCH_SIZE,
        })
    }

    /// Applies the formatted page of a finished fetch. `None` means the fetch
    /// failed. The in-flight flag is cleared on every path.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, page: Option<Vec<Item>>) -> PageOutcome {
        self.fetch_in_flight = false;
        if ticket.generation != self.generation {
            return PageOutcome::Stale;
        }
        match page {
            None => PageOutcome::Failed,
            Some(items) if items.is_empty() => {
                self.exhausted = true;
                PageOutcome::Exhausted
            }
            Some(items) => {
                let appended = items.len();
                self.buffer.extend(items);
                self.cursor += appended;
                PageOutcome::Appended(appended)
            }
        }
    }

    /// Takes the next render batch: at most [`BATCH_SIZE`] buffered items past
    /// the rendered prefix, and never beyond `depth` rendered items in total.
    pub fn take_batch_until(&mut self, depth: usize) -> Vec<Item> {
        let end = (self.rendered + BATCH_SIZE)
            .min(self.buffer.len())
            .min(depth.max(self.rendered));
        let batch = self.buffer[self.rendered..end].to_vec();
        self.rendered = end;
        batch
    }

    pub fn take_batch(&mut self) -> Vec<Item> {
        self.take_batch_until(usize::MAX)
    }

    pub fn view(&self) -> WindowView {
        WindowView {
            container_id: self.feed.container_id.clone(),
            buffered: self.buffer.len(),
            rendered: self.rendered,
            cursor: self.cursor,
            exhausted: self.exhausted,
            fetching: self.fetch_in_flight,
            generation: self.generation,
        }
    }
}
