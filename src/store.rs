//! Message store interface and in-memory implementation
//!
//! The engine treats the store as an ordered source of truth queried by
//! cursor and direction. All queries return messages oldest-first.
//! [`InMemoryStore`] backs the demo session and the tests; it keeps per-query
//! counters and supports one-shot failure injection and artificial latency so
//! in-flight windows can be exercised deterministically.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use sorted_vec::{FindOrInsert, SortedSet};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::message::{AuthorId, Message, MessageId};

/// Failure surfaced by a message store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing source could not serve the query
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store queries
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Boxed future returned by store queries
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Ordered source of truth for a conversation
///
/// Anchors are exclusive: `fetch_older` returns messages strictly older than
/// the anchor and `fetch_newer` strictly newer ones. An absent older-anchor
/// requests the latest page, which seeds a fresh window.
pub trait MessageStore: Send + Sync {
    /// Fetch up to `limit` messages older than `anchor`, oldest-first
    ///
    /// Empty when the anchor is the absolute oldest or the store is empty.
    fn fetch_older(&self, anchor: Option<MessageId>, limit: usize) -> StoreFuture<'_, Vec<Message>>;

    /// Fetch up to `limit` messages newer than `anchor`, oldest-first
    ///
    /// Empty when the anchor is the absolute newest.
    fn fetch_newer(&self, anchor: MessageId, limit: usize) -> StoreFuture<'_, Vec<Message>>;

    /// Fetch the target plus up to `before`/`after` neighbors, oldest-first
    ///
    /// Empty when the target does not exist.
    fn fetch_around(
        &self,
        target: MessageId,
        before: usize,
        after: usize,
    ) -> StoreFuture<'_, Vec<Message>>;

    /// Get the absolute oldest and newest identifiers, None when empty
    fn extents(&self) -> StoreFuture<'_, Option<(MessageId, MessageId)>>;
}

/// Per-query-kind counters kept by [`InMemoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchCounts {
    pub older: usize,
    pub newer: usize,
    pub around: usize,
}

#[derive(Debug)]
struct StoreInner {
    ids: SortedSet<MessageId>,
    payloads: HashMap<MessageId, Message>,
    counts: FetchCounts,
    fail_next: Option<StoreError>,
}

impl StoreInner {
    fn new() -> Self {
        Self {
            ids: SortedSet::new(),
            payloads: HashMap::new(),
            counts: FetchCounts::default(),
            fail_next: None,
        }
    }

    fn take_failure(&mut self) -> StoreResult<()> {
        match self.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn page_older(&self, anchor: Option<MessageId>, limit: usize) -> Vec<Message> {
        let end = match anchor {
            Some(anchor) => self.ids.binary_search(&anchor).unwrap_or_else(|i| i),
            None => self.ids.len(),
        };
        let start = end.saturating_sub(limit);
        self.collect_range(start, end)
    }

    fn page_newer(&self, anchor: MessageId, limit: usize) -> Vec<Message> {
        let start = match self.ids.binary_search(&anchor) {
            Ok(i) => i + 1,
            Err(i) => i,
        };
        let end = (start + limit).min(self.ids.len());
        self.collect_range(start, end)
    }

    fn page_around(&self, target: MessageId, before: usize, after: usize) -> Vec<Message> {
        let Ok(pos) = self.ids.binary_search(&target) else {
            return Vec::new();
        };
        let start = pos.saturating_sub(before);
        let end = (pos + 1 + after).min(self.ids.len());
        self.collect_range(start, end)
    }

    fn collect_range(&self, start: usize, end: usize) -> Vec<Message> {
        self.ids[start..end]
            .iter()
            .map(|id| {
                self.payloads
                    .get(id)
                    .cloned()
                    .expect("BUG: indexed id has no payload")
            })
            .collect()
    }

    fn extent_pair(&self) -> Option<(MessageId, MessageId)> {
        match (self.ids.first(), self.ids.last()) {
            (Some(oldest), Some(newest)) => Some((*oldest, *newest)),
            _ => None,
        }
    }

    fn insert(&mut self, message: Message) -> bool {
        if let FindOrInsert::Inserted(_) = self.ids.find_or_insert(message.id()) {
            self.payloads.insert(message.id(), message);
            true
        } else {
            false
        }
    }
}

/// In-memory [`MessageStore`] for tests and the demo session
#[derive(Debug)]
pub struct InMemoryStore {
    latency: Duration,
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            inner: Mutex::new(StoreInner::new()),
        }
    }

    /// Create a store holding the given messages
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let mut inner = StoreInner::new();
        for message in messages {
            inner.insert(message);
        }
        Self {
            latency: Duration::ZERO,
            inner: Mutex::new(inner),
        }
    }

    /// Create a store holding a generated conversation of `len` messages
    ///
    /// Identifiers run from 1 to `len` with a handful of rotating authors and
    /// timestamps one minute apart.
    pub fn synthetic_conversation(len: usize) -> Self {
        Self::from_messages((1..=len as u64).map(|id| {
            Message::new(
                MessageId(id),
                AuthorId(1 + id % 4),
                1_700_000_000 + id as i64 * 60,
                format!("message {id}"),
            )
        }))
    }

    /// Delay every query by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Add a message, for example a live arrival; false when the id exists
    pub async fn push(&self, message: Message) -> bool {
        self.inner.lock().await.insert(message)
    }

    /// Make the next fetch fail with `error`
    pub async fn fail_next_fetch(&self, error: StoreError) {
        self.inner.lock().await.fail_next = Some(error);
    }

    /// Get how many queries of each kind have been served
    pub async fn fetch_counts(&self) -> FetchCounts {
        self.inner.lock().await.counts
    }

    /// Get the number of stored messages
    pub async fn len(&self) -> usize {
        self.inner.lock().await.ids.len()
    }

    /// Check whether the store holds no messages
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.ids.is_empty()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore for InMemoryStore {
    fn fetch_older(&self, anchor: Option<MessageId>, limit: usize) -> StoreFuture<'_, Vec<Message>> {
        Box::pin(async move {
            self.delay().await;
            let mut inner = self.inner.lock().await;
            inner.take_failure()?;
            inner.counts.older += 1;
            Ok(inner.page_older(anchor, limit))
        })
    }

    fn fetch_newer(&self, anchor: MessageId, limit: usize) -> StoreFuture<'_, Vec<Message>> {
        Box::pin(async move {
            self.delay().await;
            let mut inner = self.inner.lock().await;
            inner.take_failure()?;
            inner.counts.newer += 1;
            Ok(inner.page_newer(anchor, limit))
        })
    }

    fn fetch_around(
        &self,
        target: MessageId,
        before: usize,
        after: usize,
    ) -> StoreFuture<'_, Vec<Message>> {
        Box::pin(async move {
            self.delay().await;
            let mut inner = self.inner.lock().await;
            inner.take_failure()?;
            inner.counts.around += 1;
            Ok(inner.page_around(target, before, after))
        })
    }

    fn extents(&self) -> StoreFuture<'_, Option<(MessageId, MessageId)>> {
        Box::pin(async move {
            self.delay().await;
            Ok(self.inner.lock().await.extent_pair())
        })
    }
}
