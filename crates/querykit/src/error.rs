use querykit_core::error::{DispatchError, QueryError, ResultError, UsageError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ErrorKind {
    /// The query was malformed before execution.
    Usage,
    /// A single-result query matched more than one row.
    NotUnique,
    /// The query could not be routed to an execution context.
    Dispatch,
    /// The storage layer reported a failure.
    Storage,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ErrorOrigin {
    Descriptor,
    Gateway,
    Executor,
    Response,
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let (kind, origin) = match &err {
            QueryError::Usage(_) => (ErrorKind::Usage, ErrorOrigin::Descriptor),
            QueryError::Result(_) => (ErrorKind::NotUnique, ErrorOrigin::Response),
            QueryError::Dispatch(_) => (ErrorKind::Dispatch, ErrorOrigin::Gateway),
            QueryError::Storage(_) => (ErrorKind::Storage, ErrorOrigin::Executor),
        };

        Self::new(kind, origin, err.to_string())
    }
}

impl From<UsageError> for Error {
    fn from(err: UsageError) -> Self {
        QueryError::from(err).into()
    }
}

impl From<ResultError> for Error {
    fn from(err: ResultError) -> Self {
        QueryError::from(err).into()
    }
}

impl From<DispatchError> for Error {
    fn from(err: DispatchError) -> Self {
        QueryError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_classify_as_descriptor_misuse() {
        let err = Error::from(UsageError::DirectionWithoutOrderBy);
        assert_eq!(err.kind, ErrorKind::Usage);
        assert_eq!(err.origin, ErrorOrigin::Descriptor);
    }

    #[test]
    fn cardinality_errors_classify_as_response() {
        let err = Error::from(ResultError::TooManyResults { count: 2 });
        assert_eq!(err.kind, ErrorKind::NotUnique);
        assert_eq!(err.origin, ErrorOrigin::Response);
        assert!(err.message.contains('2'));
    }

    #[test]
    fn storage_errors_classify_as_executor() {
        let err = Error::from(QueryError::storage(std::io::Error::other("disk gone")));
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(err.origin, ErrorOrigin::Executor);
        assert_eq!(err.message, "disk gone");
    }

    #[test]
    fn error_serializes_for_transport() {
        let err = Error::from(DispatchError::NoAmbientContext);
        let json = serde_json::to_string(&err).unwrap();
        let back: Error = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
