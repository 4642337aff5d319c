use thiserror::Error;

/// Failures of community-note operations.
///
/// Everything except `Storage` is a business outcome the caller can act on;
/// `Storage` wraps unexpected persistence failures.
#[derive(Error, Debug)]
pub enum CommunityNoteError {
    #[error("{0}")]
    Validation(String),

    #[error("You can only submit one community note per question every 24 hours")]
    RateLimited,

    #[error("User has already voted on this note")]
    AlreadyVoted,

    #[error("Community note not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl CommunityNoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type CommunityNoteResult<T> = Result<T, CommunityNoteError>;
