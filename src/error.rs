//! Typed failure taxonomy for the session core.
//!
//! Three recoverable families (source, generator transport, generator output
//! rejected by validation) and a set of caller errors that indicate misuse of
//! the session API rather than anything retryable.

use crate::session::Stage;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
  /// The article source could not supply content. Retry or pick another category.
  #[error("article source unavailable: {0}")]
  SourceUnavailable(String),

  /// The content generator failed at the transport/provider level.
  #[error("content generation failed: {0}")]
  GenerationFailed(String),

  /// The generator responded, but the output failed domain validation.
  #[error("generated content rejected: {0}")]
  GenerationInvalid(String),

  /// Operation attempted in a stage where it is not allowed.
  #[error("operation '{op}' is not allowed in stage {stage:?}")]
  WrongStage { op: &'static str, stage: Stage },

  /// `advance` was called while no practice mode is active.
  #[error("no practice mode is active")]
  NoActiveMode,

  /// The input kind does not match the active practice mode.
  #[error("input does not match the active practice mode ({0})")]
  InputMismatch(&'static str),

  /// Malformed caller input (non-letter guess, empty sentence, ...).
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A cloze blank or quiz item was answered a second time.
  #[error("item {0} was already answered")]
  AlreadyAnswered(usize),

  #[error("index {index} out of range (len {len})")]
  OutOfRange { index: usize, len: usize },

  /// The word is not part of the session vocabulary.
  #[error("word '{0}' is not in the session vocabulary")]
  UnknownWord(String),

  #[error("unknown session: {0}")]
  UnknownSession(String),

  /// A prior operation on the same session is still in flight.
  #[error("session is busy with another operation")]
  StateConflict,
}

impl CoreError {
  /// Whether the caller may reasonably retry the same operation.
  /// `GenerationInvalid` counts as retryable: the generator is
  /// non-deterministic, so a retry can produce acceptable output.
  pub fn retryable(&self) -> bool {
    matches!(
      self,
      CoreError::SourceUnavailable(_)
        | CoreError::GenerationFailed(_)
        | CoreError::GenerationInvalid(_)
        | CoreError::StateConflict
    )
  }
}
