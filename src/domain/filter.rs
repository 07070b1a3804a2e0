//! Batch continuity filtering
//!
//! A fetched page can overlap messages that are already loaded (for example
//! after a jump landed nearby, or when a store serves cached pages). The
//! filter removes those duplicates and classifies whether the page connects
//! to the held window without a gap. It makes no store calls and has no side
//! effects; the pagination state machine consumes its output.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::message::Message;
use crate::domain::window::MessageWindow;

/// Which end of the conversation a fetch extends
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Toward the beginning of the conversation (scrollback)
    Older,
    /// Toward the present
    Newer,
}

impl Direction {
    /// The other direction
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Older => Direction::Newer,
            Direction::Newer => Direction::Older,
        }
    }
}

/// Result of filtering a fetched batch against the held window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Batch messages not already loaded, order preserved
    pub fresh: Vec<Message>,
    /// Whether the batch connects to the window without a gap
    ///
    /// Only meaningful knowledge when overlap was observed or the batch was
    /// empty; with no overlap a gap cannot be ruled out and this is false.
    pub contiguous: bool,
    /// How many batch messages were dropped as duplicates
    pub dropped: usize,
}

/// Removes already-loaded messages from a fetched batch and classifies
/// whether the remainder connects contiguously to the window
///
/// Contiguity is decided by numeric id adjacency: for an older-direction
/// batch the newest surviving id must be within distance 1 of the window's
/// oldest id, symmetric for newer-direction batches. An empty batch reports
/// contiguous (exhaustion, not a gap). A batch that overlapped nothing
/// reports non-contiguous because nothing ties it to the window, and so does
/// a fully duplicate batch, which must keep the cursor moving instead of
/// ending pagination.
pub fn filter_batch(
    batch: Vec<Message>,
    window: &MessageWindow,
    direction: Direction,
) -> FilterOutcome {
    let total = batch.len();
    let mut fresh: Vec<Message> = Vec::with_capacity(total);
    for message in batch {
        if !window.contains(message.id()) {
            fresh.push(message);
        }
    }
    let dropped = total - fresh.len();

    let contiguous = if total == 0 {
        true
    } else if dropped == 0 {
        false
    } else {
        match direction {
            Direction::Older => match (fresh.last(), window.oldest_id()) {
                (Some(newest_kept), Some(oldest_held)) => {
                    newest_kept.id().distance(oldest_held) <= 1
                }
                // every message was already loaded; not treated as exhaustion,
                // the cursor must still advance past the duplicates
                _ => false,
            },
            Direction::Newer => match (fresh.first(), window.newest_id()) {
                (Some(oldest_kept), Some(newest_held)) => {
                    oldest_kept.id().distance(newest_held) <= 1
                }
                _ => false,
            },
        }
    };

    FilterOutcome {
        fresh,
        contiguous,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::message::{AuthorId, MessageId};

    fn create_test_message(id: u64) -> Message {
        Message::new(
            MessageId(id),
            AuthorId(1),
            1_700_000_000 + id as i64,
            format!("message {id}"),
        )
    }

    fn create_test_batch(ids: impl IntoIterator<Item = u64>) -> Vec<Message> {
        ids.into_iter().map(create_test_message).collect()
    }

    fn ids_of(messages: &[Message]) -> Vec<u64> {
        messages.iter().map(|m| m.id().0).collect()
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Older.opposite(), Direction::Newer);
        assert_eq!(Direction::Newer.opposite(), Direction::Older);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Older.to_string(), "older");
        assert_eq!(Direction::Newer.to_string(), "newer");
    }

    #[test]
    fn test_overlapping_older_batch_is_contiguous() {
        let window: MessageWindow = create_test_batch(5..=10).into_iter().collect();

        let outcome = filter_batch(create_test_batch(3..=5), &window, Direction::Older);

        assert_eq!(ids_of(&outcome.fresh), vec![3, 4]);
        assert_eq!(outcome.dropped, 1);
        // 境界の距離は 5 - 4 = 1
        assert!(outcome.contiguous);
    }

    #[test]
    fn test_overlapping_older_batch_with_gap_is_not_contiguous() {
        let window: MessageWindow = create_test_batch(5..=10).into_iter().collect();

        // 7 overlaps, but the survivors stop at 2, leaving 3..4 unloaded
        let outcome = filter_batch(create_test_batch([1, 2, 7]), &window, Direction::Older);

        assert_eq!(ids_of(&outcome.fresh), vec![1, 2]);
        assert_eq!(outcome.dropped, 1);
        assert!(!outcome.contiguous);
    }

    #[test]
    fn test_disjoint_older_batch_reports_non_contiguous() {
        let window: MessageWindow = create_test_batch(10..=15).into_iter().collect();

        let outcome = filter_batch(create_test_batch(5..=9), &window, Direction::Older);

        // 重複が無いので連続とは判定できない
        assert_eq!(ids_of(&outcome.fresh), vec![5, 6, 7, 8, 9]);
        assert_eq!(outcome.dropped, 0);
        assert!(!outcome.contiguous);
    }

    #[test]
    fn test_empty_batch_signals_exhaustion() {
        let window: MessageWindow = create_test_batch(5..=10).into_iter().collect();

        let outcome = filter_batch(Vec::new(), &window, Direction::Older);

        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.dropped, 0);
        assert!(outcome.contiguous);
    }

    #[test]
    fn test_fully_duplicate_batch_is_not_contiguous() {
        let window: MessageWindow = create_test_batch(5..=10).into_iter().collect();

        let outcome = filter_batch(create_test_batch(6..=8), &window, Direction::Older);

        // 全件重複でも打ち切りにはしない
        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.dropped, 3);
        assert!(!outcome.contiguous);
    }

    #[test]
    fn test_overlapping_newer_batch_is_contiguous() {
        let window: MessageWindow = create_test_batch(5..=10).into_iter().collect();

        let outcome = filter_batch(create_test_batch(10..=13), &window, Direction::Newer);

        assert_eq!(ids_of(&outcome.fresh), vec![11, 12, 13]);
        assert_eq!(outcome.dropped, 1);
        assert!(outcome.contiguous);
    }

    #[test]
    fn test_overlapping_newer_batch_with_gap_is_not_contiguous() {
        let window: MessageWindow = create_test_batch(5..=10).into_iter().collect();

        let outcome = filter_batch(create_test_batch([8, 14, 15]), &window, Direction::Newer);

        assert_eq!(ids_of(&outcome.fresh), vec![14, 15]);
        assert_eq!(outcome.dropped, 1);
        assert!(!outcome.contiguous);
    }

    #[test]
    fn test_filter_against_empty_window() {
        let window = MessageWindow::new();

        let outcome = filter_batch(create_test_batch(1..=3), &window, Direction::Older);

        assert_eq!(ids_of(&outcome.fresh), vec![1, 2, 3]);
        assert_eq!(outcome.dropped, 0);
        assert!(!outcome.contiguous);
    }
}
