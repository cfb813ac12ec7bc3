use thiserror::Error;

/// Failures surfaced by the rating model. Both variants are synchronous,
/// local failures signaled at the offending call site; there is no retry or
/// partial-result path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Singular model: {0}")]
    SingularModel(String)
}
