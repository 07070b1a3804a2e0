//! Ordered message window

use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, Index};
use std::slice::Iter;
use std::vec::IntoIter;

use crate::domain::message::{Message, MessageId};

/// The contiguous slice of a conversation currently held in memory
///
/// Messages are ordered oldest-first regardless of display orientation, with
/// O(1) duplicate checking based on MessageId. Growth happens only at the two
/// ends (prepend for older pages, append for newer pages) or by wholesale
/// replacement, so interior order never needs re-sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageWindow {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl MessageWindow {
    /// Creates a new empty window
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Creates a new window with the specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Checks if a MessageId is currently loaded
    pub fn contains(&self, id: MessageId) -> bool {
        self.ids.contains(&id)
    }

    /// Gets the oldest loaded message
    pub fn oldest(&self) -> Option<&Message> {
        self.messages.first()
    }

    /// Gets the newest loaded message
    pub fn newest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Gets the oldest loaded identifier (the older-direction cursor)
    pub fn oldest_id(&self) -> Option<MessageId> {
        self.oldest().map(Message::id)
    }

    /// Gets the newest loaded identifier (the newer-direction cursor)
    pub fn newest_id(&self) -> Option<MessageId> {
        self.newest().map(Message::id)
    }

    /// Gets both boundary identifiers as a pair
    pub fn bounds(&self) -> Option<(MessageId, MessageId)> {
        self.oldest_id().zip(self.newest_id())
    }

    /// Gets the index of a loaded message
    pub fn position_of(&self, id: MessageId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.messages
            .binary_search_by_key(&id, Message::id)
            .ok()
    }

    /// Inserts messages before the current head (ignores duplicates)
    /// Returns: how many messages were actually inserted
    pub fn prepend(&mut self, batch: Vec<Message>) -> usize {
        let mut head: Vec<Message> = Vec::with_capacity(batch.len());
        for message in batch {
            if self.ids.insert(message.id()) {
                head.push(message);
            }
        }
        if let (Some(newest_incoming), Some(oldest_held)) = (head.last(), self.messages.first()) {
            debug_assert!(newest_incoming.id() < oldest_held.id());
        }
        let inserted = head.len();
        self.messages.splice(0..0, head);
        debug_assert_eq!(self.messages.len(), self.ids.len());
        inserted
    }

    /// Inserts messages after the current tail (ignores duplicates)
    /// Returns: how many messages were actually inserted
    pub fn append(&mut self, batch: Vec<Message>) -> usize {
        let mut inserted = 0;
        for message in batch {
            if self.ids.insert(message.id()) {
                if let Some(newest_held) = self.messages.last() {
                    debug_assert!(newest_held.id() < message.id());
                }
                self.messages.push(message);
                inserted += 1;
            }
        }
        debug_assert_eq!(self.messages.len(), self.ids.len());
        inserted
    }

    /// Discards the current contents and installs a new sequence
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.clear();
        self.append(messages);
    }

    /// Clears all messages
    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    /// Returns a reference to the internal Vec (read-only)
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

// === Standard library trait implementations ===

impl Default for MessageWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MessageWindow {
    type Target = [Message];

    fn deref(&self) -> &Self::Target {
        &self.messages
    }
}

impl Index<usize> for MessageWindow {
    type Output = Message;

    fn index(&self, index: usize) -> &Self::Output {
        &self.messages[index]
    }
}

impl IntoIterator for MessageWindow {
    type Item = Message;
    type IntoIter = IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageWindow {
    type Item = &'a Message;
    type IntoIter = Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<Message> for MessageWindow {
    fn from_iter<T: IntoIterator<Item = Message>>(iter: T) -> Self {
        let mut window = Self::new();
        window.append(iter.into_iter().collect());
        window
    }
}

impl fmt::Display for MessageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds() {
            Some((oldest, newest)) => {
                write!(f, "MessageWindow[{} messages, {oldest}..{newest}]", self.len())
            }
            None => write!(f, "MessageWindow[empty]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::message::AuthorId;

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

    #[test]
    fn test_new_window_is_empty() {
        let window = MessageWindow::new();

        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert_eq!(window.bounds(), None);
    }

    #[test]
    fn test_append_keeps_oldest_first_order() {
        let mut window = MessageWindow::new();

        let inserted = window.append(create_test_batch(5..=9));

        assert_eq!(inserted, 5);
        assert_eq!(window.oldest_id(), Some(MessageId(5)));
        assert_eq!(window.newest_id(), Some(MessageId(9)));
    }

    #[test]
    fn test_prepend_inserts_before_head() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(5..=9));

        let inserted = window.prepend(create_test_batch(2..=4));

        assert_eq!(inserted, 3);
        assert_eq!(window.oldest_id(), Some(MessageId(2)));
        assert_eq!(window.newest_id(), Some(MessageId(9)));
        let ids: Vec<u64> = window.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_append_ignores_duplicates() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(1..=3));

        // 重複挿入はサイズを変えない
        let inserted = window.append(create_test_batch(3..=5));

        assert_eq!(inserted, 2);
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_prepend_ignores_duplicates() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(5..=8));

        let inserted = window.prepend(create_test_batch(3..=5));

        assert_eq!(inserted, 2);
        let ids: Vec<u64> = window.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_replace_all_swaps_contents() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(1..=10));

        window.replace_all(create_test_batch(40..=45));

        assert_eq!(window.len(), 6);
        assert_eq!(window.bounds(), Some((MessageId(40), MessageId(45))));
        assert!(!window.contains(MessageId(1)));
    }

    #[test]
    fn test_contains_and_position_of() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(10..=14));

        assert!(window.contains(MessageId(12)));
        assert_eq!(window.position_of(MessageId(12)), Some(2));

        // 未ロードのIDはNone
        assert!(!window.contains(MessageId(9)));
        assert_eq!(window.position_of(MessageId(9)), None);
    }

    #[test]
    fn test_clear() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(1..=3));

        window.clear();

        assert!(window.is_empty());
        assert!(!window.contains(MessageId(1)));
    }

    #[test]
    fn test_standard_traits() {
        let window: MessageWindow = create_test_batch(1..=3).into_iter().collect();

        // Index
        assert_eq!(window[0].id(), MessageId(1));

        // Deref経由でスライスメソッドを使用
        assert_eq!(window.first().map(Message::id), Some(MessageId(1)));

        // Display
        assert_eq!(format!("{window}"), "MessageWindow[3 messages, #1..#3]");

        // into_iter()でのイテレーション
        let ids: Vec<MessageId> = window.into_iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![MessageId(1), MessageId(2), MessageId(3)]);
    }

    #[test]
    fn test_internal_consistency_under_mixed_mutations() {
        let mut window = MessageWindow::new();
        window.append(create_test_batch(20..=29));
        window.prepend(create_test_batch(10..=19));
        window.append(create_test_batch(25..=34));

        assert_eq!(window.len(), 25);
        let ids: Vec<u64> = window.iter().map(|m| m.id().0).collect();
        let expected: Vec<u64> = (10..=34).collect();
        assert_eq!(ids, expected);
    }
}
