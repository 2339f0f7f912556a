use serde::Deserialize;

pub const IN_PROGRESS_ENDPOINT: &str = "/api/schedule/in-progress";
pub const DOING_ENDPOINT: &str = "/api/schedule/doing";
pub const TO_DO_ENDPOINT: &str = "/api/schedule/to-do";
pub const SUCCEEDED_ENDPOINT: &str = "/api/schedule/succeeded";
pub const FAILED_ENDPOINT: &str = "/api/schedule/failed";

/// Formatting rule applied to the raw records of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FeedKind {
    /// A plain list of names.
    NameOnly,
    /// Job records carrying `runid/target/task` and a `timing` block.
    TimedJob,
    /// A mapping of title to detail (string or list).
    LabelDetail,
    /// A list of `{name, info}` records.
    Generic,
}

impl FeedKind {
    pub fn for_endpoint(endpoint: &str) -> Self {
        match endpoint {
            IN_PROGRESS_ENDPOINT => FeedKind::NameOnly,
            SUCCEEDED_ENDPOINT | FAILED_ENDPOINT => FeedKind::TimedJob,
            DOING_ENDPOINT | TO_DO_ENDPOINT | "/api/schedule/todo" => FeedKind::LabelDetail,
            _ => FeedKind::Generic,
        }
    }
}

/// One scrollable result list: where it is painted, where it reads from and
/// how its records are formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub container_id: String,
    pub endpoint: String,
    pub kind: FeedKind,
}

impl Feed {
    pub fn new(container_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let kind = FeedKind::for_endpoint(&endpoint);
        Self {
            container_id: container_id.into(),
            endpoint,
            kind,
        }
    }

    pub fn with_kind(mut self, kind: FeedKind) -> Self {
        self.kind = kind;
        self
    }

    /// The five schedule lists shown on the dashboard.
    pub fn well_known() -> Vec<Feed> {
        vec![
            Feed::new("scroll-in-progress", IN_PROGRESS_ENDPOINT),
            Feed::new("scroll-doing", DOING_ENDPOINT),
            Feed::new("scroll-to-do", TO_DO_ENDPOINT),
            Feed::new("scroll-succeeded", SUCCEEDED_ENDPOINT),
            Feed::new("scroll-failed", FAILED_ENDPOINT),
        ]
    }
}
