//! Schedule engine: page sources, rendering boundary and window reconciliation.
mod events;
mod pager;
mod reconcile;
mod render;
mod source;
mod surface;
mod types;

pub use events::{run_event_loop, DashboardEvent, EventHandle};
pub use pager::{Pager, WindowHandle};
pub use reconcile::Dashboard;
pub use render::{ensure_fills_viewport, render_batch, render_until};
pub use source::{PageSource, ReqwestSource, SourceSettings};
pub use surface::Surface;
pub use types::{FailureKind, JobStats, SchedulerStats, SourceError, StatsView, WorkerStats};
