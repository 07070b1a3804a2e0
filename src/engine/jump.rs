//! Jump coordination
//!
//! Jumping to a message that is already loaded is a pure surface scroll.
//! Anything else replaces the window with a single around-fetch centered on
//! the target and re-seeds the pagination cursors from the new window, after
//! which the scroll to the target waits for the new layout to settle. A jump
//! deliberately skips the fetch in-flight gate; a pagination completion
//! overtaken by the replacement is detected as stale and dropped.

use crate::domain::filter::Direction;
use crate::domain::message::{Message, MessageId};
use crate::engine::error::{PaginateError, Result};
use crate::engine::mutation::Effect;
use crate::engine::Paginator;
use crate::store::StoreResult;

/// What a jump request resolved to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpPlan {
    /// The target is loaded; the effect can be applied right away
    Loaded(Effect),
    /// The target must be fetched around first
    Fetch(JumpRequest),
}

/// An around-fetch for the driver to run against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpRequest {
    target: MessageId,
    before: usize,
    after: usize,
}

impl JumpRequest {
    /// Get the message to center the fetch on
    pub fn target(&self) -> MessageId {
        self.target
    }

    /// Get the number of messages requested before the target
    pub fn before(&self) -> usize {
        self.before
    }

    /// Get the number of messages requested after the target
    pub fn after(&self) -> usize {
        self.after
    }
}

/// What a completed jump did to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpSummary {
    /// The message jumped to
    pub target: MessageId,
    /// Size of the replacement window
    pub loaded: usize,
    /// Whether older history remains around the new window
    pub has_older: bool,
    /// Whether newer history remains around the new window
    pub has_newer: bool,
}

impl Paginator {
    /// Ask to jump to a message
    ///
    /// A loaded target needs no store access and yields the scroll effect
    /// directly. Otherwise the returned fetch must be run against the store
    /// and resolved through [`Paginator::complete_jump`].
    pub fn request_jump(&self, target: MessageId) -> JumpPlan {
        if self.window().contains(target) {
            log::debug!("jump target {target} is already loaded");
            return JumpPlan::Loaded(Effect::ScrollToMessage(target));
        }
        JumpPlan::Fetch(JumpRequest {
            target,
            before: self.config.around_before,
            after: self.config.around_after,
        })
    }

    /// Apply the result of a jump's around-fetch
    ///
    /// An empty result means the target does not exist in the store; the
    /// window is left untouched. Otherwise the window is replaced as a
    /// whole, the pagination cursors re-seed from the replacement, and the
    /// scroll to the target is deferred until the new layout settles.
    pub fn complete_jump(
        &mut self,
        request: JumpRequest,
        result: StoreResult<Vec<Message>>,
        extents: Option<(MessageId, MessageId)>,
    ) -> Result<JumpSummary> {
        let messages = match result {
            Ok(messages) => messages,
            Err(error) => {
                log::warn!("around-fetch for {} failed: {error}", request.target);
                return Err(PaginateError::StoreFetchFailed(error));
            }
        };
        if messages.is_empty() {
            log::warn!("jump target {} not found in store", request.target);
            return Err(PaginateError::TargetNotFound(request.target));
        }
        debug_assert!(
            messages.iter().any(|m| m.id() == request.target),
            "around-fetch result must include the target"
        );

        self.controller.replace_all(messages, Some(request.target));
        self.pagination.seed(self.window().bounds(), extents);
        log::info!("jumped to {}: {}", request.target, self.stats());
        Ok(JumpSummary {
            target: request.target,
            loaded: self.window().len(),
            has_older: self.pagination.has_more(Direction::Older),
            has_newer: self.pagination.has_more(Direction::Newer),
        })
    }
}
