//! List mutation control
//!
//! All window mutations flow through this controller so their interaction
//! with the scroll position stays in one place. A prepend under normal
//! orientation captures the scroll anchor before mutating and restores the
//! offset once layout settles; inverted lists need no correction because
//! prepending at the start does not shift visible content. Mutations raise a
//! settling flag that suppresses follow-to-latest behavior until the surface
//! reports the new layout, covering the gap between fetch completion and
//! render settling.

use crate::domain::message::{Message, MessageId};
use crate::domain::window::MessageWindow;
use crate::engine::trigger::{Orientation, ScrollFrame};

/// A programmatic instruction for the render surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Move the viewport to an absolute offset
    ScrollToOffset(f64),
    /// Bring a loaded message into view
    ScrollToMessage(MessageId),
}

/// Deferred work that runs when the surface reports layout settled
#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingSettle {
    RestoreOffset { offset: f64, prior_extent: f64 },
    ScrollToMessage(MessageId),
}

/// Owns the message window and applies every mutation to it
#[derive(Debug, Clone, PartialEq)]
pub struct MutationController {
    window: MessageWindow,
    orientation: Orientation,
    last_frame: Option<ScrollFrame>,
    pending: Option<PendingSettle>,
    settling: bool,
}

impl MutationController {
    /// Create a new controller with an empty window
    pub fn new(orientation: Orientation) -> Self {
        Self {
            window: MessageWindow::new(),
            orientation,
            last_frame: None,
            pending: None,
            settling: false,
        }
    }

    /// Get the held window
    pub fn window(&self) -> &MessageWindow {
        &self.window
    }

    /// Get the configured orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Record the latest scroll position
    ///
    /// The most recent frame is what a prepend captures as its anchor, so
    /// every scroll update must pass through here.
    pub fn observe_frame(&mut self, frame: ScrollFrame) {
        self.last_frame = Some(frame);
    }

    /// Get the most recently observed scroll position
    pub fn last_frame(&self) -> Option<ScrollFrame> {
        self.last_frame
    }

    /// Check if follow-to-latest behavior is currently suppressed
    ///
    /// True from the moment a pagination mutation is applied until the
    /// surface reports layout settled.
    pub fn autoscroll_suppressed(&self) -> bool {
        self.settling
    }

    /// Insert an older page before the window head
    /// Returns: how many messages were actually inserted
    pub fn prepend_older(&mut self, batch: Vec<Message>) -> usize {
        let anchor = self.last_frame;
        let inserted = self.window.prepend(batch);
        if inserted == 0 {
            return 0;
        }
        self.settling = true;
        if self.orientation == Orientation::Normal {
            if let Some(frame) = anchor {
                self.pending = Some(PendingSettle::RestoreOffset {
                    offset: frame.offset,
                    prior_extent: frame.max_extent,
                });
            }
        }
        inserted
    }

    /// Insert a newer page after the window tail
    /// Returns: how many messages were actually inserted
    pub fn append_newer(&mut self, batch: Vec<Message>) -> usize {
        let inserted = self.window.append(batch);
        if inserted > 0 {
            self.settling = true;
        }
        inserted
    }

    /// Append one live-delivered message without pagination bookkeeping
    /// Returns: whether the message was actually inserted
    pub fn append_live(&mut self, message: Message) -> bool {
        self.window.append(vec![message]) == 1
    }

    /// Swap the entire window, optionally scheduling a scroll to a target
    /// once the new layout has settled
    pub fn replace_all(&mut self, messages: Vec<Message>, scroll_to: Option<MessageId>) {
        self.window.replace_all(messages);
        self.pending = scroll_to.map(PendingSettle::ScrollToMessage);
        self.settling = true;
    }

    /// Accept the surface's layout-settled notification
    ///
    /// `max_extent` is the scrollable extent of the new layout. Returns the
    /// deferred surface instruction, if one was scheduled by the mutation.
    pub fn layout_settled(&mut self, max_extent: f64) -> Option<Effect> {
        self.settling = false;
        if let Some(frame) = &mut self.last_frame {
            frame.max_extent = max_extent;
        }
        match self.pending.take() {
            Some(PendingSettle::RestoreOffset {
                offset,
                prior_extent,
            }) => {
                log::debug!(
                    "restoring scroll offset {offset} after prepend (extent {prior_extent} -> {max_extent})"
                );
                if let Some(frame) = &mut self.last_frame {
                    frame.offset = offset;
                }
                Some(Effect::ScrollToOffset(offset))
            }
            Some(PendingSettle::ScrollToMessage(id)) => Some(Effect::ScrollToMessage(id)),
            None => None,
        }
    }
}
