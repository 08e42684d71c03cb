//! Non-fatal fetch failures collected over one crawl run.

use std::fmt;

/// What was being fetched when a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Index,
    Page,
    Asset,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Index => write!(f, "index"),
            FailureKind::Page => write!(f, "page"),
            FailureKind::Asset => write!(f, "asset"),
        }
    }
}

/// A single failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub path: String,
    pub cause: String,
}

/// Accumulator owned by a crawl run and read once when it ends.
#[derive(Debug, Clone, Default)]
pub struct FailureLog {
    failures: Vec<FetchFailure>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: FailureKind, path: impl Into<String>, cause: impl fmt::Display) {
        self.failures.push(FetchFailure {
            kind,
            path: path.into(),
            cause: cause.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FetchFailure> {
        self.failures.iter()
    }

    /// Paths of every failure, in the order they happened.
    pub fn paths(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_log_records_in_order() {
        let mut log = FailureLog::new();
        assert!(log.is_empty());

        log.record(FailureKind::Page, "/wiki/Missing", "HTTP 404: Not Found");
        log.record(FailureKind::Asset, "/site/logo.png", "timeout");

        assert_eq!(log.len(), 2);
        assert_eq!(log.paths(), vec!["/wiki/Missing", "/site/logo.png"]);
        assert_eq!(log.count(FailureKind::Asset), 1);
        assert_eq!(log.iter().next().unwrap().cause, "HTTP 404: Not Found");
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Index.to_string(), "index");
        assert_eq!(FailureKind::Asset.to_string(), "asset");
    }
}
