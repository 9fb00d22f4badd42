//! Module: error
//! Responsibility: error taxonomy for descriptor misuse, dispatch, and results.
//! Does not own: storage error types; those pass through unmodified.
//! Boundary: every fallible core API surfaces `QueryError`.

use thiserror::Error as ThisError;

///
/// UsageError
///
/// Build-time misuse of the fluent API. Always surfaced to the caller before
/// any execution attempt reaches storage; never retried or suppressed.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum UsageError {
    #[error("call order_by(...) before specifying a direction")]
    DirectionWithoutOrderBy,

    #[error("invalid query: order_by(\"{property}\") was never given a direction")]
    PendingOrder { property: String },

    #[error("raw query dispatched without a statement")]
    MissingStatement,
}

///
/// ResultError
///
/// Run-time result-cardinality violations.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum ResultError {
    #[error("query returned {count} results where at most 1 was expected")]
    TooManyResults { count: usize },
}

///
/// DispatchError
///
/// Failures in routing a descriptor to an execution context.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum DispatchError {
    #[error("no ambient execution context is active on this thread")]
    NoAmbientContext,

    #[error("ambient execution context is not the type this query expects")]
    ContextTypeMismatch,

    #[error("dispatcher returned without running the submitted unit")]
    DispatcherDidNotRun,

    #[error("execution produced a result of the wrong shape")]
    ShapeMismatch,
}

///
/// QueryError
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("{0}")]
    Usage(#[from] UsageError),

    #[error("{0}")]
    Result(#[from] ResultError),

    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// Pass-through of an executor or context error, unmodified.
    #[error("{0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// Wrap a storage-layer error for pass-through propagation.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }

    /// True when this error was raised before execution reached storage.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_results_reports_count() {
        let err = QueryError::from(ResultError::TooManyResults { count: 4 });
        assert_eq!(
            err.to_string(),
            "query returned 4 results where at most 1 was expected"
        );
    }

    #[test]
    fn storage_errors_pass_through_display() {
        let err = QueryError::storage(std::io::Error::other("segment missing"));
        assert_eq!(err.to_string(), "segment missing");
        assert!(!err.is_usage());
    }
}
