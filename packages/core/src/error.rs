//! Error taxonomy shared by the Hearth crates.

use std::time::Duration;

use thiserror::Error;

use crate::path::PathError;

/// One failed item of a batch filesystem operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFailure {
    /// The path the item operated on.
    pub path: String,
    /// What went wrong for this item.
    pub error: String,
}

/// Errors that can occur across the Hearth platform.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: relative path, bad props shape, busy port.
    #[error("validation error: {0}")]
    Validation(String),

    /// An entity was denied access to a path.
    #[error("permission denied: '{who_asks}' may not {action} '{path}' on behalf of '{permit_for}'")]
    PermissionDenied {
        who_asks: String,
        permit_for: String,
        action: String,
        path: String,
    },

    /// An entity declared dependencies that are not initialized.
    #[error("unmet dependencies for '{entity}': {missing:?}")]
    DependencyUnmet { entity: String, missing: Vec<String> },

    /// A name, mount point or protocol category was registered twice.
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// Registering the mount point would make the redirection graph cyclic.
    #[error("mount cycle detected through '{0}'")]
    CycleDetected(String),

    /// A phase or batch exceeded its budget.
    #[error("timed out after {budget:?}: {context}")]
    Timeout { budget: Duration, context: String },

    /// A transport adapter reported a failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// An entity, instance or server id is unknown.
    #[error("not found: {0}")]
    NotFound(String),

    /// A batch operation failed for some items; raised once after all settle.
    #[error("batch operation failed for {} item(s)", .0.len())]
    Batch(Vec<PathFailure>),

    /// A path failed validation.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// A persisted document could not be read or written.
    #[error("config store error: {0}")]
    Config(String),

    /// A document failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Hearth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_message() {
        let err = Error::PermissionDenied {
            who_asks: "runtime".to_string(),
            permit_for: "app1".to_string(),
            action: "write".to_string(),
            path: "/secret".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("app1"));
        assert!(msg.contains("write"));
        assert!(msg.contains("/secret"));
    }

    #[test]
    fn path_error_converts() {
        let err: Error = crate::VPath::parse("relative").unwrap_err().into();
        assert!(matches!(err, Error::Path(_)));
    }

    #[test]
    fn batch_counts_items() {
        let err = Error::Batch(vec![
            PathFailure {
                path: "/a".to_string(),
                error: "gone".to_string(),
            },
            PathFailure {
                path: "/b".to_string(),
                error: "busy".to_string(),
            },
        ]);
        assert!(err.to_string().contains("2 item(s)"));
    }
}
