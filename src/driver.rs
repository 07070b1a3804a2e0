//! Session driver
//!
//! Runs the pagination engine against a message store and a render surface.
//! The driver owns the event loop: it pulls session events from a
//! [`ScrollSource`], lets the engine decide what to fetch, performs the store
//! queries the engine asked for, and applies the resulting surface effects.
//! Store failures are logged and leave the engine eligible to retry; nothing
//! the store does can corrupt the engine state.

use std::collections::VecDeque;
use std::sync::Arc;

use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::filter::Direction;
use crate::domain::message::{Message, MessageId};
use crate::engine::jump::JumpPlan;
use crate::engine::mutation::Effect;
use crate::engine::trigger::ScrollFrame;
use crate::engine::{FetchRequest, LiveDelivery, PagingConfig, Paginator};
use crate::store::MessageStore;
use crate::surface::RenderSurface;

/// Input events a session reacts to
///
/// Serializable so scripted sessions can be replayed from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The surface reported a new scroll position
    Scroll(ScrollFrame),
    /// The user asked to jump to a message
    Jump(MessageId),
    /// A brand-new message arrived from the realtime transport
    Live(Message),
    /// End the session
    Quit,
}

/// Where a session's events come from
pub enum ScrollSource {
    /// Live channel fed by the embedding application
    Channel(mpsc::UnboundedReceiver<SessionEvent>),
    /// Fixed sequence, used by tests and scripted demos
    Script(VecDeque<SessionEvent>),
}

impl ScrollSource {
    pub fn channel(receiver: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        ScrollSource::Channel(receiver)
    }

    pub fn script(events: impl IntoIterator<Item = SessionEvent>) -> Self {
        ScrollSource::Script(events.into_iter().collect())
    }

    /// Get the next event; None when the source is exhausted or closed
    pub async fn next(&mut self) -> Option<SessionEvent> {
        match self {
            ScrollSource::Channel(receiver) => receiver.recv().await,
            ScrollSource::Script(queue) => queue.pop_front(),
        }
    }
}

/// Event-driven pagination session
pub struct Driver<S: RenderSurface> {
    paginator: Paginator,
    store: Arc<dyn MessageStore>,
    surface: S,
    source: ScrollSource,
    cancel_token: CancellationToken,
}

pub type NewDriver<S> = (
    mpsc::UnboundedSender<SessionEvent>, // event_tx - session input
    CancellationToken,                   // shutdown signal
    Driver<S>,
);

impl<S: RenderSurface> Driver<S> {
    /// Create a channel-driven session
    pub fn new(config: PagingConfig, store: Arc<dyn MessageStore>, surface: S) -> NewDriver<S> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        (
            event_tx,
            cancel_token.clone(),
            Self {
                paginator: Paginator::new(config),
                store,
                surface,
                source: ScrollSource::channel(event_rx),
                cancel_token,
            },
        )
    }

    /// Create a session that replays a fixed event sequence
    pub fn scripted(
        config: PagingConfig,
        store: Arc<dyn MessageStore>,
        surface: S,
        events: impl IntoIterator<Item = SessionEvent>,
    ) -> Self {
        Self {
            paginator: Paginator::new(config),
            store,
            surface,
            source: ScrollSource::script(events),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get the engine
    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Get the render surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Load the initial window from the store
    pub async fn seed(&mut self) -> Result<()> {
        let batch_size = self.paginator.config().batch_size;
        let page = self.store.fetch_older(None, batch_size).await?;
        let extents = self.store.extents().await?;
        self.paginator.install_seed(page, extents);
        self.settle();
        Ok(())
    }

    /// Run the session until the source closes or the session is cancelled
    ///
    /// Returns the final engine and surface so callers can inspect what the
    /// session ended up with.
    pub async fn run(mut self) -> (Paginator, S) {
        loop {
            tokio::select! {
                event = self.source.next() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => break,
                    }
                }

                _ = self.cancel_token.cancelled() => {
                    log::info!("session driver received cancellation signal");
                    break;
                }
            }
        }

        log::info!("session finished: {}", self.paginator.stats());
        (self.paginator, self.surface)
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Scroll(frame) => {
                if let Some(request) = self.paginator.on_scroll(frame) {
                    self.run_fetch(request).await;
                }
            }
            SessionEvent::Jump(target) => self.run_jump(target).await,
            SessionEvent::Live(message) => self.apply_live(message),
            SessionEvent::Quit => self.cancel_token.cancel(),
        }
    }

    async fn run_fetch(&mut self, request: FetchRequest) {
        let result = match request.direction() {
            Direction::Older => {
                self.store
                    .fetch_older(request.anchor(), request.limit())
                    .await
            }
            Direction::Newer => {
                let anchor = request
                    .anchor()
                    .expect("BUG: newer fetch dispatched without an anchor");
                self.store.fetch_newer(anchor, request.limit()).await
            }
        };

        match self.paginator.complete_fetch(request.ticket(), result) {
            Ok(summary) if summary.stale => {
                log::debug!("discarded stale {} completion", summary.direction);
            }
            Ok(summary) => {
                self.settle();
                log::debug!(
                    "applied {} fetch: {} inserted",
                    summary.direction,
                    summary.inserted
                );
            }
            Err(error) => log::warn!("{} fetch failed: {error}", request.direction()),
        }
    }

    async fn run_jump(&mut self, target: MessageId) {
        match self.paginator.request_jump(target) {
            JumpPlan::Loaded(effect) => self.apply_effect(effect),
            JumpPlan::Fetch(request) => {
                let (result, extents) = futures::future::join(
                    self.store
                        .fetch_around(request.target(), request.before(), request.after()),
                    self.store.extents(),
                )
                .await;
                let extents = match extents {
                    Ok(extents) => extents,
                    Err(error) => {
                        log::warn!("extents query failed during jump: {error}");
                        None
                    }
                };

                match self.paginator.complete_jump(request, result, extents) {
                    Ok(summary) => {
                        self.settle();
                        log::debug!(
                            "jump loaded {} messages around {}",
                            summary.loaded,
                            summary.target
                        );
                    }
                    Err(error) => log::warn!("jump to {target} failed: {error}"),
                }
            }
        }
    }

    fn apply_live(&mut self, message: Message) {
        let id = message.id();
        match self.paginator.apply_live(message) {
            LiveDelivery::Appended { autoscroll } => {
                self.settle();
                if autoscroll {
                    self.surface.scroll_to_message(id);
                }
            }
            LiveDelivery::OutOfWindow => {
                log::debug!("live message {id} is outside the loaded window");
            }
            LiveDelivery::Duplicate => log::debug!("live message {id} is already loaded"),
        }
    }

    /// Push the window to the surface and apply the deferred scroll effect
    /// once the new layout extent is known
    fn settle(&mut self) {
        let extent = self.surface.window_updated(self.paginator.window());
        if let Some(effect) = self.paginator.layout_settled(extent) {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScrollToOffset(offset) => self.surface.scroll_to_offset(offset),
            Effect::ScrollToMessage(id) => self.surface.scroll_to_message(id),
        }
    }
}
