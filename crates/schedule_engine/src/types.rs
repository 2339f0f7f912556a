use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: FailureKind,
    pub message: String,
}

impl SourceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    /// The envelope reported a status other than `success`.
    Api { status: String },
    /// A success envelope whose content was null.
    MissingContent,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Api { status } => write!(f, "api {status}"),
            FailureKind::MissingContent => write!(f, "null content"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct WorkerStats {
    #[serde(default)]
    pub busy: Option<i64>,
    #[serde(default)]
    pub idle: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct JobStats {
    #[serde(default)]
    pub doing: Option<i64>,
    #[serde(default)]
    pub todo: Option<i64>,
}

/// Content of the scheduler statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SchedulerStats {
    #[serde(default)]
    pub workers: WorkerStats,
    #[serde(default)]
    pub jobs: JobStats,
}

impl SchedulerStats {
    pub fn view(&self) -> StatsView {
        let total = match (self.workers.busy, self.workers.idle) {
            (Some(busy), Some(idle)) => Some(busy + idle),
            _ => None,
        };
        StatsView {
            busy: self.workers.busy,
            idle: self.workers.idle,
            total,
            doing: self.jobs.doing,
            todo: self.jobs.todo,
        }
    }
}

/// What the statistics panel shows; `None` is rendered as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsView {
    pub busy: Option<i64>,
    pub idle: Option<i64>,
    pub total: Option<i64>,
    pub doing: Option<i64>,
    pub todo: Option<i64>,
}
