use engine_logging::engine_trace;
use schedule_core::FILL_RETRY_LIMIT;

use crate::{Pager, Surface, WindowHandle};

/// Paints the next batch of buffered items. Returns how many were painted.
pub fn render_batch(window: &WindowHandle, surface: &dyn Surface) -> usize {
    render_until(window, surface, usize::MAX)
}

/// Like [`render_batch`], but stops once `depth` items are rendered in total.
pub fn render_until(window: &WindowHandle, surface: &dyn Surface, depth: usize) -> usize {
    let batch = window.with_mut(|state| state.take_batch_until(depth));
    if batch.is_empty() {
        return 0;
    }
    surface.paint(window.container_id(), &batch, true);
    batch.len()
}

/// Renders buffered batches, fetching more when the buffer runs dry, until the
/// container can scroll or the feed is exhausted. Gives up after
/// [`FILL_RETRY_LIMIT`] rounds.
pub async fn ensure_fills_viewport(pager: &Pager, surface: &dyn Surface, window: &WindowHandle) {
    for round in 0..FILL_RETRY_LIMIT {
        if surface.fills_viewport(window.container_id()) || window.with(|state| state.is_exhausted())
        {
            return;
        }
        engine_trace!("{}: fill round {}", window.container_id(), round);
        if window.with(|state| state.unrendered() > 0) {
            render_batch(window, surface);
        } else {
            pager.load_next_page(window).await;
            render_batch(window, surface);
        }
    }
}
