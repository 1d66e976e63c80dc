//! Offset pagination as a synchronous state machine.
//!
//! [`PageCursor`] tracks the next offset, the records accumulated for one
//! parameter set and whether the walk is over. It performs no I/O: the
//! fetcher feeds it one [`PageOutcome`] per response and reads back a
//! [`Step`].

use harvest_core::Record;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Characters of an unparseable body kept in the error detail.
const BODY_EXCERPT_CHARS: usize = 200;

/// Why the walk over one parameter set stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// An empty page was returned; the normal end.
    Exhausted,
    /// The API answered with `success: false`.
    ApiError { errors: Vec<String> },
    /// The body was not the expected JSON envelope.
    ProtocolError { detail: String },
    /// No body could be obtained.
    Transport { detail: String },
}

impl Termination {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Exhausted)
    }

    /// Short stable name, used as a log field and a report key.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::ApiError { .. } => "api_error",
            Self::ProtocolError { .. } => "protocol_error",
            Self::Transport { .. } => "transport_error",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "exhausted"),
            Self::ApiError { errors } => write!(f, "api error: {}", errors.join("; ")),
            Self::ProtocolError { detail } => write!(f, "protocol error: {detail}"),
            Self::Transport { detail } => write!(f, "transport error: {detail}"),
        }
    }
}

/// What one page request produced, before it is applied to the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Items(Vec<Value>),
    ApiError(Vec<String>),
    Malformed(String),
    TransportFailed(String),
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    success: bool,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default)]
    result: Option<PageResult>,
}

#[derive(Debug, Deserialize)]
struct PageResult {
    #[serde(default)]
    items: Option<Vec<Value>>,
}

/// Interpret a response body.
///
/// A missing or null `result`/`items` counts as an empty page.
#[must_use]
pub fn parse_page(body: &str) -> PageOutcome {
    let envelope: PageEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            let excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
            return PageOutcome::Malformed(format!("{e}; body: {excerpt:?}"));
        }
    };

    if !envelope.success {
        return PageOutcome::ApiError(error_messages(envelope.errors));
    }

    let items = envelope
        .result
        .and_then(|result| result.items)
        .unwrap_or_default();
    PageOutcome::Items(items)
}

fn error_messages(errors: Option<Value>) -> Vec<String> {
    match errors {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        Some(other) => vec![other.to_string()],
    }
}

/// Result of applying one page to the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Items were appended; request the next page.
    Continue { accepted: usize, malformed: usize },
    /// The walk is over.
    Done(Termination),
}

/// Pagination state for one parameter set.
#[derive(Debug)]
pub struct PageCursor {
    page_size: u32,
    offset: u64,
    calls: u32,
    malformed: usize,
    records: Vec<Record>,
    finished: bool,
}

impl PageCursor {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            offset: 0,
            calls: 0,
            malformed: 0,
            records: Vec::new(),
            finished: false,
        }
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset of the next page to request, or `None` once finished.
    #[must_use]
    pub fn next_offset(&self) -> Option<u64> {
        (!self.finished).then_some(self.offset)
    }

    /// Pages applied so far.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Items dropped for lacking a usable `id`.
    #[must_use]
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Apply the outcome of the page at [`next_offset`](Self::next_offset).
    ///
    /// Applying to a finished cursor is a no-op that reports `Exhausted`.
    pub fn apply(&mut self, outcome: PageOutcome) -> Step {
        if self.finished {
            return Step::Done(Termination::Exhausted);
        }
        self.calls += 1;

        let termination = match outcome {
            PageOutcome::Items(items) if items.is_empty() => Termination::Exhausted,
            PageOutcome::Items(items) => {
                let total = items.len();
                let before = self.records.len();
                self.records
                    .extend(items.into_iter().filter_map(Record::from_value));
                let accepted = self.records.len() - before;
                let malformed = total - accepted;
                self.malformed += malformed;
                self.offset += u64::from(self.page_size);
                return Step::Continue {
                    accepted,
                    malformed,
                };
            }
            PageOutcome::ApiError(errors) => Termination::ApiError { errors },
            PageOutcome::Malformed(detail) => Termination::ProtocolError { detail },
            PageOutcome::TransportFailed(detail) => Termination::Transport { detail },
        };

        self.finished = true;
        Step::Done(termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(ids: &[i64]) -> PageOutcome {
        PageOutcome::Items(ids.iter().map(|id| json!({ "id": id })).collect())
    }

    #[test]
    fn test_parse_items_page() {
        let body = r#"{"success": true, "result": {"items": [{"id": 1}, {"id": 2}]}}"#;
        assert_eq!(
            parse_page(body),
            PageOutcome::Items(vec![json!({"id": 1}), json!({"id": 2})])
        );
    }

    #[test]
    fn test_parse_missing_result_is_empty() {
        assert_eq!(parse_page(r#"{"success": true}"#), PageOutcome::Items(vec![]));
        assert_eq!(
            parse_page(r#"{"success": true, "result": {"items": null}}"#),
            PageOutcome::Items(vec![])
        );
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"success": false, "errors": ["bad filter", {"code": 7}]}"#;
        assert_eq!(
            parse_page(body),
            PageOutcome::ApiError(vec!["bad filter".to_string(), r#"{"code":7}"#.to_string()])
        );
        assert_eq!(
            parse_page(r#"{"success": false}"#),
            PageOutcome::ApiError(vec![])
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_page("<html>gateway timeout</html>"),
            PageOutcome::Malformed(detail) if detail.contains("gateway timeout")
        ));
        // missing success flag
        assert!(matches!(
            parse_page(r#"{"result": {"items": []}}"#),
            PageOutcome::Malformed(_)
        ));
    }

    #[test]
    fn test_offsets_advance_by_page_size() {
        let mut cursor = PageCursor::new(2);
        assert_eq!(cursor.next_offset(), Some(0));

        assert_eq!(
            cursor.apply(items(&[1, 2])),
            Step::Continue {
                accepted: 2,
                malformed: 0
            }
        );
        assert_eq!(cursor.next_offset(), Some(2));

        cursor.apply(items(&[3]));
        assert_eq!(cursor.next_offset(), Some(4));

        assert_eq!(cursor.apply(items(&[])), Step::Done(Termination::Exhausted));
        assert_eq!(cursor.next_offset(), None);
        assert_eq!(cursor.calls(), 3);
        assert_eq!(cursor.records().len(), 3);
    }

    #[test]
    fn test_failure_keeps_collected_records() {
        let mut cursor = PageCursor::new(30);
        cursor.apply(items(&[10, 11]));
        let step = cursor.apply(PageOutcome::ApiError(vec!["bad filter".to_string()]));

        assert_eq!(
            step,
            Step::Done(Termination::ApiError {
                errors: vec!["bad filter".to_string()]
            })
        );
        assert_eq!(cursor.calls(), 2);
        assert_eq!(cursor.into_records().len(), 2);
    }

    #[test]
    fn test_items_without_id_are_counted_not_kept() {
        let mut cursor = PageCursor::new(3);
        let step = cursor.apply(PageOutcome::Items(vec![
            json!({"id": 1}),
            json!({"price": 5}),
            json!("stray"),
        ]));

        assert_eq!(
            step,
            Step::Continue {
                accepted: 1,
                malformed: 2
            }
        );
        assert_eq!(cursor.malformed(), 2);
        // a non-empty page advances even if nothing was kept
        assert_eq!(cursor.next_offset(), Some(3));
    }

    #[test]
    fn test_apply_after_finish_is_noop() {
        let mut cursor = PageCursor::new(5);
        cursor.apply(PageOutcome::TransportFailed("reset".to_string()));
        assert_eq!(cursor.apply(items(&[1])), Step::Done(Termination::Exhausted));
        assert_eq!(cursor.calls(), 1);
        assert!(cursor.records().is_empty());
    }

    #[test]
    fn test_termination_kinds() {
        assert!(!Termination::Exhausted.is_failure());
        assert_eq!(
            Termination::ProtocolError {
                detail: String::new()
            }
            .kind(),
            "protocol_error"
        );
        assert!(Termination::Transport {
            detail: "timeout".to_string()
        }
        .is_failure());
    }
}
