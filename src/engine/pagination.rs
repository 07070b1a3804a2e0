//! Pagination state machine
//!
//! Tracks, per direction, whether more of the conversation remains and where
//! the next fetch should anchor, plus the single in-flight flag shared by
//! both directions. Fetch dispatch issues a [`FetchTicket`] that the
//! completion handler redeems; a completion whose ticket no longer owns the
//! in-flight flag is ignored, which is what keeps a late completion from
//! corrupting a window that was replaced in the meantime.

use crate::domain::filter::Direction;
use crate::domain::message::MessageId;
use crate::engine::error::{PaginateError, Result};

/// State tracked for one fetch direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirectionState {
    has_more: bool,
    boundary: Option<MessageId>,
}

impl DirectionState {
    fn new(has_more: bool) -> Self {
        Self {
            has_more,
            boundary: None,
        }
    }
}

/// Ticket issued when a fetch is dispatched and redeemed at completion
///
/// `window_edge` is the fetch-side window boundary at dispatch time; the
/// completion handler compares it against the window's current boundary to
/// detect that a jump replaced the window while the fetch was outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    direction: Direction,
    window_edge: Option<MessageId>,
}

impl FetchTicket {
    /// Get the fetch direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Get the fetch-side window boundary captured at dispatch
    pub fn window_edge(&self) -> Option<MessageId> {
        self.window_edge
    }
}

/// Pagination state machine covering both directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    older: DirectionState,
    newer: DirectionState,
    in_flight: Option<FetchTicket>,
}

impl Pagination {
    /// Create a new pagination state for an unseeded window
    ///
    /// Older starts fetchable (the seed page is an anchorless older fetch);
    /// newer starts exhausted because there is no anchor to paginate from
    /// until a seed installs one.
    pub fn new() -> Self {
        Self {
            older: DirectionState::new(true),
            newer: DirectionState::new(false),
            in_flight: None,
        }
    }

    /// Check if more of the conversation remains in a direction
    pub fn has_more(&self, direction: Direction) -> bool {
        self.state(direction).has_more
    }

    /// Get the fetch anchor cursor for a direction
    pub fn boundary(&self, direction: Direction) -> Option<MessageId> {
        self.state(direction).boundary
    }

    /// Check if a fetch is currently outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Get the direction of the outstanding fetch, if any
    pub fn in_flight_direction(&self) -> Option<Direction> {
        self.in_flight.map(|ticket| ticket.direction)
    }

    /// Check if a fetch in a direction is currently allowed
    pub fn can_trigger(&self, direction: Direction) -> bool {
        !self.is_loading() && self.has_more(direction)
    }

    /// Mark a fetch as dispatched
    ///
    /// `window_edge` is the fetch-side window boundary at this moment.
    /// Fails while another fetch is outstanding; requests are rejected, never
    /// queued.
    pub fn begin_fetch(
        &mut self,
        direction: Direction,
        window_edge: Option<MessageId>,
    ) -> Result<FetchTicket> {
        if self.in_flight.is_some() {
            return Err(PaginateError::ConcurrentFetchRejected);
        }
        let ticket = FetchTicket {
            direction,
            window_edge,
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Apply a successful fetch completion
    ///
    /// `raw_edge` is the fetch-direction extreme of the raw batch (None when
    /// the batch was empty) and `contiguous` is the continuity filter's
    /// verdict. An empty or contiguous batch exhausts the direction;
    /// otherwise the cursor advances to the raw extreme (raw, not filtered,
    /// so a batch that was partly duplicate still moves the anchor and the
    /// same page can never be refetched forever).
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        raw_edge: Option<MessageId>,
        contiguous: bool,
    ) {
        if !self.redeem(ticket) {
            return;
        }
        let state = self.state_mut(ticket.direction);
        match raw_edge {
            None => state.has_more = false,
            Some(_) if contiguous => state.has_more = false,
            Some(edge) => state.boundary = Some(edge),
        }
    }

    /// Resolve a failed fetch
    ///
    /// Clears the in-flight flag and nothing else, so an identical later
    /// trigger retries with the same anchors.
    pub fn fail_fetch(&mut self, ticket: FetchTicket) {
        self.redeem(ticket);
    }

    /// Drop a completion that no longer matches the window
    pub fn discard_stale(&mut self, ticket: FetchTicket) {
        self.redeem(ticket);
    }

    /// Re-seed both directions from a freshly installed window
    ///
    /// `bounds` is the window's (oldest, newest) pair and `extents` is the
    /// store's absolute (oldest, newest) pair. A direction has more to fetch
    /// unless its window boundary already sits on the store's absolute
    /// boundary. The in-flight flag is left alone: an outstanding fetch still
    /// owns it and its completion will be discarded as stale.
    pub fn seed(
        &mut self,
        bounds: Option<(MessageId, MessageId)>,
        extents: Option<(MessageId, MessageId)>,
    ) {
        match bounds {
            Some((oldest, newest)) => {
                self.older.boundary = Some(oldest);
                self.newer.boundary = Some(newest);
                self.older.has_more = extents.map_or(true, |(abs_oldest, _)| oldest != abs_oldest);
                self.newer.has_more = extents.map_or(true, |(_, abs_newest)| newest != abs_newest);
            }
            None => {
                self.older.boundary = None;
                self.newer.boundary = None;
                self.older.has_more = extents.is_some();
                self.newer.has_more = false;
            }
        }
    }

    fn state(&self, direction: Direction) -> &DirectionState {
        match direction {
            Direction::Older => &self.older,
            Direction::Newer => &self.newer,
        }
    }

    fn state_mut(&mut self, direction: Direction) -> &mut DirectionState {
        match direction {
            Direction::Older => &mut self.older,
            Direction::Newer => &mut self.newer,
        }
    }

    /// Clears the in-flight flag if `ticket` is the one holding it
    /// Returns: whether the ticket was the live one
    fn redeem(&mut self, ticket: FetchTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            log::debug!(
                "ignoring resolution for a {} fetch that no longer holds the in-flight flag",
                ticket.direction
            );
            false
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}
