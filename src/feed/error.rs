use crate::notification::TargetError;

/// Errors returned by feed operations
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("no notification at position {index} (feed holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Target(#[from] TargetError),
}
