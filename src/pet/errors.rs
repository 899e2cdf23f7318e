use thiserror::Error;

/// Errors that can arise while advancing, acting on, storing or reaching the pet.
#[derive(Debug, Error)]
pub enum PetError {
    /// An action other than `shake` or `set_name` was attempted on an egg.
    #[error("the egg has not hatched yet, try shaking it first")]
    NotHatched,

    /// A rename was attempted with an empty name or one longer than the limit.
    #[error("name must be between 1 and {max} characters")]
    InvalidName { max: usize },

    /// Any action attempted after the pet ran away.
    #[error("{name} has run away, the game is over")]
    GameOver { name: String },

    /// The action name is not one the pet understands.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The pet service could not be reached by the tool adapter.
    #[error("pet service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The pet service refused a request (HTTP 400); carries its detail text.
    #[error("{0}")]
    Rejected(String),

    /// Wrapper around IO errors (record file, directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON encode/decode errors for the persisted record.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PetError {
    /// True for semantic rejections of a request. These leave the record untouched
    /// and must never be retried.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PetError::NotHatched
                | PetError::InvalidName { .. }
                | PetError::GameOver { .. }
                | PetError::UnknownAction(_)
                | PetError::Rejected(_)
        )
    }
}

pub type PetResult<T> = Result<T, PetError>;
