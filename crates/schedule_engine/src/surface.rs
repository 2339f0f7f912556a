use schedule_core::Item;

use crate::StatsView;

/// Rendering boundary of the dashboard. Containers are addressed by the
/// container id of their feed. Implementations use interior mutability; the
/// engine only ever calls them from one thread.
pub trait Surface {
    /// Appends `items` to the container, or replaces its content when `append` is false.
    fn paint(&self, container_id: &str, items: &[Item], append: bool);

    fn clear(&self, container_id: &str);

    fn scroll_position(&self, container_id: &str) -> u32;

    fn set_scroll_position(&self, container_id: &str, position: u32);

    /// Whether the visible bottom is within
    /// [`SCROLL_THRESHOLD_PX`](schedule_core::SCROLL_THRESHOLD_PX) of the content bottom.
    fn is_near_bottom(&self, container_id: &str) -> bool;

    /// Whether painted content is taller than the visible area, i.e. the
    /// container can scroll.
    fn fills_viewport(&self, container_id: &str) -> bool;

    fn show_stats(&self, stats: &StatsView);

    /// Generic user-visible notification for a failed API call.
    fn notify_error(&self, message: &str);
}
