/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or validating definition data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Two nodes in the same graph share an identifier.
    #[error("duplicate node id \"{id}\" in graph \"{graph}\"")]
    DuplicateNodeId {
        /// The graph containing the duplicate.
        graph: String,
        /// The duplicated node identifier.
        id: String,
    },

    /// A referenced node identifier does not exist.
    #[error("node not found: \"{0}\"")]
    NodeNotFound(String),

    /// A definition failed a structural check.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
