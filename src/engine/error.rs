//! Pagination error types

use thiserror::Error;

use crate::domain::message::MessageId;
use crate::store::StoreError;

/// Errors surfaced by pagination and jump operations
///
/// None of these are fatal to the view: a rejected fetch retries on the next
/// qualifying scroll event, a failed fetch leaves the cursors untouched for a
/// retry, and a failed jump leaves the window unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginateError {
    /// A fetch was requested while another one is outstanding
    #[error("a fetch is already in flight")]
    ConcurrentFetchRejected,

    /// The message store failed to serve a fetch
    #[error("store fetch failed: {0}")]
    StoreFetchFailed(#[from] StoreError),

    /// A jump's around-fetch found no such message in the store
    #[error("message {0} not found in store")]
    TargetNotFound(MessageId),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, PaginateError>;
