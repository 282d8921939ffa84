use thiserror::Error;

/// Failure taxonomy for all model mutations.
///
/// Every operation that returns `Err` leaves the model exactly as it was
/// before the call. Business-rule violations never panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A value was out of range (pitch, velocity, non-positive duration, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// The operation would collide with an existing clip and refuses to
    /// mutate anything.
    #[error("operation would overlap an existing clip")]
    OverlapConflict,
    /// The referenced track or clip does not exist.
    #[error("track or clip not found")]
    NotFound,
}

pub type ModelResult<T> = Result<T, ModelError>;
