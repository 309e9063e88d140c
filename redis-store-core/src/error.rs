//! Error types for store operations

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Classified error returned by every facade operation.
///
/// Raw transport and protocol failures never cross the facade boundary;
/// they are folded into one of these kinds so callers can decide whether
/// to retry (`Unavailable`), treat the result as a plain miss (`NotFound`,
/// `EmptyCollection`), or fix their input (`TypeMismatch`,
/// `InvalidArgument`).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached while constructing the client.
    /// Construction-time only; operations report `Unavailable` instead.
    #[error("failed to connect to store: {0}")]
    Connection(String),

    /// Transient failure during an operation: I/O error, timeout, or a
    /// transient server condition. The only kind the retry policy acts on.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The queried key, field, or member does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation needs a non-empty collection and none exists.
    #[error("empty collection: {0}")]
    EmptyCollection(String),

    /// The key holds a different data model, or its value is non-numeric
    /// where a number is required.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A caller-supplied precondition was violated. Raised before any
    /// store request is issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller's cancellation token or deadline fired mid-operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Classify an error reply from the server.
    ///
    /// `WRONGTYPE` and numeric-conversion complaints are permanent
    /// (`TypeMismatch`); recognized transient server states and anything
    /// unrecognized classify as `Unavailable`.
    pub fn from_reply_error(msg: &str) -> Self {
        let code = msg.split_whitespace().next().unwrap_or("");
        match code {
            "WRONGTYPE" => StoreError::TypeMismatch(msg.to_string()),
            "LOADING" | "READONLY" | "MASTERDOWN" | "CLUSTERDOWN" | "TRYAGAIN" | "BUSY" => {
                StoreError::Unavailable(msg.to_string())
            }
            _ if msg.contains("not an integer") || msg.contains("not a valid float") => {
                StoreError::TypeMismatch(msg.to_string())
            }
            _ => StoreError::Unavailable(msg.to_string()),
        }
    }

    /// Whether the retry policy may re-issue the request.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Whether this is the "key/field/member absent" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Downgrade a construction-time `Connection` error to `Unavailable`.
    ///
    /// Re-dialing inside the pool after construction reuses the dial path;
    /// at that point an unreachable store is an operational condition, not
    /// a construction failure.
    pub fn into_operational(self) -> Self {
        match self {
            StoreError::Connection(msg) => StoreError::Unavailable(msg),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrongtype_is_type_mismatch() {
        let err = StoreError::from_reply_error(
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        );
        assert!(matches!(err, StoreError::TypeMismatch(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_non_numeric_is_type_mismatch() {
        let err = StoreError::from_reply_error("ERR value is not an integer or out of range");
        assert!(matches!(err, StoreError::TypeMismatch(_)));

        let err = StoreError::from_reply_error("ERR value is not a valid float");
        assert!(matches!(err, StoreError::TypeMismatch(_)));
    }

    #[test]
    fn test_transient_server_states() {
        let err = StoreError::from_reply_error("LOADING Redis is loading the dataset in memory");
        assert!(err.is_transient());

        let err =
            StoreError::from_reply_error("READONLY You can't write against a read only replica.");
        assert!(err.is_transient());
    }

    #[test]
    fn test_unknown_reply_error_is_unavailable() {
        let err = StoreError::from_reply_error("ERR unknown command 'FROB'");
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_application_kinds_are_not_transient() {
        assert!(!StoreError::NotFound("key k".into()).is_transient());
        assert!(!StoreError::EmptyCollection("list k".into()).is_transient());
        assert!(!StoreError::InvalidArgument("min > max".into()).is_transient());
        assert!(!StoreError::Cancelled.is_transient());
    }

    #[test]
    fn test_into_operational() {
        let err = StoreError::Connection("dial tcp: refused".into()).into_operational();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err = StoreError::NotFound("key k".into()).into_operational();
        assert!(err.is_not_found());
    }
}
