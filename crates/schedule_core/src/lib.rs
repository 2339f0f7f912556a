//! Schedule core: pure window state, feed kinds and item formatting.
mod feed;
mod format;
mod window;

pub use feed::{Feed, FeedKind};
pub use format::{format_duration, format_page, Item};
pub use window::{
    FetchTicket, Generation, PageOutcome, Window, WindowView, BATCH_SIZE, FILL_RETRY_LIMIT,
    PREFETCH_THRESHOLD, SCROLL_THRESHOLD_PX,
};
