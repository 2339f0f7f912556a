use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::FeedKind;

const GENERIC_TITLE: &str = "Task";

/// One formatted row of a window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub title: String,
    pub info: String,
}

impl Item {
    pub fn new(title: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            info: info.into(),
        }
    }
}

impl FeedKind {
    /// Formats the content of one page. Total: content of the wrong shape
    /// yields no items and missing record fields render as empty text.
    pub fn format(self, content: &Value) -> Vec<Item> {
        format_page(self, content)
    }
}

pub fn format_page(kind: FeedKind, content: &Value) -> Vec<Item> {
    match kind {
        FeedKind::NameOnly => match content {
            Value::Array(names) => names.iter().map(name_only_item).collect(),
            _ => Vec::new(),
        },
        FeedKind::TimedJob => match content {
            Value::Array(records) => records.iter().map(timed_job_item).collect(),
            Value::Object(records) => records.values().map(timed_job_item).collect(),
            _ => Vec::new(),
        },
        FeedKind::LabelDetail => match content {
            Value::Object(entries) => entries
                .iter()
                .map(|(label, detail)| label_detail_item(label, detail))
                .collect(),
            Value::Array(details) => details
                .iter()
                .enumerate()
                .map(|(index, detail)| label_detail_item(&index.to_string(), detail))
                .collect(),
            _ => Vec::new(),
        },
        FeedKind::Generic => match content {
            Value::Array(records) => records.iter().map(generic_item).collect(),
            _ => Vec::new(),
        },
    }
}

fn name_only_item(name: &Value) -> Item {
    Item::new(text_of(name).unwrap_or_default(), "")
}

fn timed_job_item(record: &Value) -> Item {
    let title = ["runid", "target", "task"]
        .iter()
        .filter_map(|key| field(record, key).and_then(text_of))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".");

    let timing = field(record, "timing");
    let timestamp = |key: &str| {
        timing
            .and_then(|timing| field(timing, key))
            .and_then(text_of)
            .unwrap_or_default()
    };
    let scheduled = timestamp("scheduled");
    let started = timestamp("started");
    let completed = timestamp("completed");

    let mut lines = vec![
        format!("scheduled: {scheduled}"),
        format!("starting: {started}"),
        format!("completed: {completed}"),
    ];
    if let Some(duration) = format_duration(&started, &completed) {
        lines.push(format!("duration: {duration}"));
    }

    Item::new(title, lines.join("\n"))
}

fn label_detail_item(label: &str, detail: &Value) -> Item {
    let info = match detail {
        Value::Array(parts) => parts
            .iter()
            .map(|part| text_of(part).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", "),
        other => text_of(other).unwrap_or_default(),
    };
    Item::new(label, info)
}

fn generic_item(record: &Value) -> Item {
    let title = field(record, "name")
        .filter(|value| is_truthy(value))
        .and_then(text_of)
        .unwrap_or_else(|| GENERIC_TITLE.to_string());
    let info = field(record, "info")
        .filter(|value| is_truthy(value))
        .and_then(text_of)
        .unwrap_or_default();
    Item::new(title, info)
}

/// Elapsed time between two timestamps as seconds with three decimals
/// (`"2.500s"`). `None` when either side does not parse or the span is negative.
pub fn format_duration(started: &str, completed: &str) -> Option<String> {
    let start = parse_timestamp(started)?;
    let end = parse_timestamp(completed)?;
    let millis = (end - start).num_milliseconds();
    if millis < 0 {
        return None;
    }
    Some(format!("{}.{:03}s", millis / 1000, millis % 1000))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn field<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record.as_object().and_then(|object: &Map<String, Value>| object.get(key))
}

/// Display text of a JSON value; `None` for null.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .map(|part| text_of(part).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some("[object Object]".to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::Array(_) | Value::Object(_) => true,
    }
}
