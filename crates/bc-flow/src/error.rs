/// Alias for `Result<T, FlowError>`.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that can occur when starting story content.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// No dialogue graph is registered under the given id.
    #[error("unknown dialogue graph: \"{0}\"")]
    UnknownGraph(String),

    /// No level is registered under the given id.
    #[error("unknown level: \"{0}\"")]
    UnknownLevel(String),
}
