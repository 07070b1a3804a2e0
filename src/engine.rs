//! Pagination engine
//!
//! [`Paginator`] wires the scroll-trigger detector, the pagination state
//! machine, the continuity filter and the mutation controller into one
//! synchronous core. It never performs I/O itself: scroll updates and manual
//! calls produce request descriptors ([`FetchRequest`], [`jump::JumpRequest`])
//! that the session driver runs against the message store, feeding the
//! results back through the completion methods. This keeps every state
//! transition on the caller's single logical thread; the suspension points
//! live in the driver.

pub mod error;
pub mod jump;
pub mod mutation;
pub mod pagination;
pub mod trigger;

use std::fmt;

use serde::{Deserialize, Serialize};
use thousands::Separable;

use crate::domain::filter::{filter_batch, Direction};
use crate::domain::message::{Message, MessageId};
use crate::domain::window::MessageWindow;
use crate::engine::error::{PaginateError, Result};
use crate::engine::mutation::{Effect, MutationController};
use crate::engine::pagination::{FetchTicket, Pagination};
use crate::engine::trigger::{Orientation, ScrollFrame, ScrollTrigger};
use crate::store::StoreResult;

/// Tunables for the pagination engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Fraction of the scroll range from the away end at which a fetch
    /// fires; zero fires only at the exact edge
    pub threshold: f64,
    /// Page size for older/newer fetches
    pub batch_size: usize,
    /// Messages requested before the target on a jump
    pub around_before: usize,
    /// Messages requested after the target on a jump
    pub around_after: usize,
    /// How the list maps conversation order onto the scroll range
    pub orientation: Orientation,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            batch_size: 20,
            around_before: 20,
            around_after: 20,
            orientation: Orientation::Inverted,
        }
    }
}

/// A dispatched fetch for the driver to run against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    ticket: FetchTicket,
    anchor: Option<MessageId>,
    limit: usize,
}

impl FetchRequest {
    /// Get the ticket to redeem at completion
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    /// Get the fetch direction
    pub fn direction(&self) -> Direction {
        self.ticket.direction()
    }

    /// Get the cursor the store query anchors on
    ///
    /// None only for the anchorless initial older fetch, which returns the
    /// latest page.
    pub fn anchor(&self) -> Option<MessageId> {
        self.anchor
    }

    /// Get the page size to request
    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// What a completed fetch did to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    /// Direction the fetch extended
    pub direction: Direction,
    /// Raw batch size returned by the store
    pub fetched: usize,
    /// Messages actually inserted after filtering
    pub inserted: usize,
    /// Messages dropped as duplicates
    pub dropped: usize,
    /// Whether the direction still has more to fetch
    pub has_more: bool,
    /// Whether the completion was dropped as stale
    pub stale: bool,
}

/// How a live-delivered message was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveDelivery {
    /// Appended to the window; `autoscroll` says whether the view may follow
    /// to the latest message right now
    Appended { autoscroll: bool },
    /// The window does not extend to the present; the message will arrive
    /// through newer-pagination instead
    OutOfWindow,
    /// Already loaded
    Duplicate,
}

/// Snapshot of the engine state for logging and session stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Loaded message count
    pub messages: usize,
    /// Oldest and newest loaded identifiers
    pub span: Option<(MessageId, MessageId)>,
    /// Whether older history remains
    pub has_older: bool,
    /// Whether newer history remains
    pub has_newer: bool,
    /// Whether a fetch is outstanding
    pub loading: bool,
}

impl fmt::Display for WindowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} messages", self.messages.separate_with_commas())?;
        if let Some((oldest, newest)) = self.span {
            write!(f, " {oldest}..{newest}")?;
        }
        write!(
            f,
            " (older: {}, newer: {})",
            if self.has_older { "more" } else { "done" },
            if self.has_newer { "more" } else { "done" },
        )
    }
}

/// The pagination engine core
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
    config: PagingConfig,
    pagination: Pagination,
    trigger: ScrollTrigger,
    controller: MutationController,
}

impl Paginator {
    /// Create a new engine with an empty window
    pub fn new(config: PagingConfig) -> Self {
        Self {
            pagination: Pagination::new(),
            trigger: ScrollTrigger::new(config.orientation, config.threshold),
            controller: MutationController::new(config.orientation),
            config,
        }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    /// Get the held window
    pub fn window(&self) -> &MessageWindow {
        self.controller.window()
    }

    /// Check if more of the conversation remains in a direction
    pub fn has_more(&self, direction: Direction) -> bool {
        self.pagination.has_more(direction)
    }

    /// Check if a fetch is currently outstanding
    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading()
    }

    /// Check if follow-to-latest behavior is currently suppressed
    pub fn autoscroll_suppressed(&self) -> bool {
        self.controller.autoscroll_suppressed()
    }

    /// Get a snapshot of the engine state
    pub fn stats(&self) -> WindowStats {
        WindowStats {
            messages: self.window().len(),
            span: self.window().bounds(),
            has_older: self.has_more(Direction::Older),
            has_newer: self.has_more(Direction::Newer),
            loading: self.is_loading(),
        }
    }

    /// Install the initial window
    ///
    /// `messages` is the seed page (typically the latest batch) and
    /// `extents` is the store's absolute boundary pair, which decides
    /// whether each direction starts exhausted.
    pub fn install_seed(
        &mut self,
        messages: Vec<Message>,
        extents: Option<(MessageId, MessageId)>,
    ) {
        self.controller.replace_all(messages, None);
        self.pagination.seed(self.window().bounds(), extents);
        log::info!("seeded window: {}", self.stats());
    }

    /// Feed one scroll update
    ///
    /// Returns a fetch for the driver to run when an armed direction crossed
    /// its edge threshold and is eligible. Ineligible hits stay armed and
    /// retry on a later frame; nothing queues.
    pub fn on_scroll(&mut self, frame: ScrollFrame) -> Option<FetchRequest> {
        self.controller.observe_frame(frame);
        for direction in self.trigger.observe(&frame) {
            if !self.pagination.can_trigger(direction) {
                continue;
            }
            if let Ok(request) = self.dispatch(direction) {
                return Some(request);
            }
        }
        None
    }

    /// Explicitly request a fetch in a direction
    ///
    /// Returns Ok(None) when the direction is exhausted (nothing to do) and
    /// an error when another fetch is outstanding.
    pub fn request_fetch(&mut self, direction: Direction) -> Result<Option<FetchRequest>> {
        if !self.pagination.has_more(direction) {
            return Ok(None);
        }
        self.dispatch(direction).map(Some)
    }

    /// Apply a fetch result from the store
    ///
    /// A failed fetch clears the in-flight flag and leaves the cursors
    /// untouched so an identical trigger retries. A completion whose
    /// dispatch-time window edge no longer matches the window (a jump
    /// replaced it meanwhile) is dropped silently.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: StoreResult<Vec<Message>>,
    ) -> Result<FetchSummary> {
        let direction = ticket.direction();
        let raw = match result {
            Ok(raw) => raw,
            Err(error) => {
                log::warn!("{direction} fetch failed: {error}");
                self.pagination.fail_fetch(ticket);
                return Err(PaginateError::StoreFetchFailed(error));
            }
        };

        let current_edge = match direction {
            Direction::Older => self.window().oldest_id(),
            Direction::Newer => self.window().newest_id(),
        };
        if current_edge != ticket.window_edge() {
            log::debug!(
                "dropping stale {direction} completion (window edge {:?} is now {:?})",
                ticket.window_edge(),
                current_edge
            );
            self.pagination.discard_stale(ticket);
            return Ok(FetchSummary {
                direction,
                fetched: raw.len(),
                inserted: 0,
                dropped: 0,
                has_more: self.pagination.has_more(direction),
                stale: true,
            });
        }

        let fetched = raw.len();
        let raw_edge = match direction {
            Direction::Older => raw.first().map(Message::id),
            Direction::Newer => raw.last().map(Message::id),
        };
        let outcome = filter_batch(raw, self.controller.window(), direction);
        self.pagination
            .complete_fetch(ticket, raw_edge, outcome.contiguous);

        let dropped = outcome.dropped;
        let inserted = match direction {
            Direction::Older => self.controller.prepend_older(outcome.fresh),
            Direction::Newer => self.controller.append_newer(outcome.fresh),
        };
        let has_more = self.pagination.has_more(direction);
        log::debug!(
            "{direction} fetch complete: fetched {fetched}, inserted {inserted}, dropped {dropped}, has_more {has_more}"
        );
        Ok(FetchSummary {
            direction,
            fetched,
            inserted,
            dropped,
            has_more,
            stale: false,
        })
    }

    /// Accept the surface's layout-settled notification
    ///
    /// Returns the deferred surface instruction scheduled by the settling
    /// mutation, if any (offset restoration after a prepend, or the scroll
    /// to a jump target).
    pub fn layout_settled(&mut self, max_extent: f64) -> Option<Effect> {
        self.controller.layout_settled(max_extent)
    }

    /// Offer a brand-new message delivered outside pagination
    ///
    /// Appended only when the window already extends to the present;
    /// otherwise the message is left for newer-pagination to pick up later.
    /// The returned value tells the host whether following to the latest
    /// message is allowed right now.
    pub fn apply_live(&mut self, message: Message) -> LiveDelivery {
        if self.window().contains(message.id()) {
            return LiveDelivery::Duplicate;
        }
        if self.pagination.has_more(Direction::Newer) {
            return LiveDelivery::OutOfWindow;
        }
        if let Some(newest) = self.window().newest_id() {
            if message.id() <= newest {
                log::warn!(
                    "live message {} is not newer than the loaded tail {newest}",
                    message.id()
                );
                return LiveDelivery::OutOfWindow;
            }
        }
        self.controller.append_live(message);
        LiveDelivery::Appended {
            autoscroll: !self.controller.autoscroll_suppressed(),
        }
    }

    fn dispatch(&mut self, direction: Direction) -> Result<FetchRequest> {
        let window_edge = match direction {
            Direction::Older => self.window().oldest_id(),
            Direction::Newer => self.window().newest_id(),
        };
        let ticket = self.pagination.begin_fetch(direction, window_edge)?;
        self.trigger.disarm(direction);
        let anchor = self.pagination.boundary(direction);
        let request = FetchRequest {
            ticket,
            anchor,
            limit: self.config.batch_size,
        };
        log::debug!(
            "dispatching {direction} fetch (anchor {anchor:?}, limit {})",
            request.limit
        );
        Ok(request)
    }
}
