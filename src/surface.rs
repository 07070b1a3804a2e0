//! Render surface abstraction
//!
//! The engine core never talks to a widget toolkit. It emits effects the
//! session driver applies through this trait, and gets told when an applied
//! mutation has settled into a new layout. [`SimSurface`] simulates a list
//! with a fixed per-item extent so offsets can be verified deterministically
//! without a real layout pass.

use crate::domain::message::MessageId;
use crate::domain::window::MessageWindow;

/// Scrollable list view displaying the message window
pub trait RenderSurface: Send {
    /// Move the viewport to an absolute offset
    fn scroll_to_offset(&mut self, offset: f64);

    /// Bring an already-rendered message into view
    fn scroll_to_message(&mut self, id: MessageId);

    /// Accept new window contents; returns the settled max scroll extent
    fn window_updated(&mut self, window: &MessageWindow) -> f64;
}

/// Fixed item-extent [`RenderSurface`] for tests and the demo session
#[derive(Debug, Clone, PartialEq)]
pub struct SimSurface {
    item_extent: f64,
    viewport_extent: f64,
    ids: Vec<MessageId>,
    offset: f64,
    last_target: Option<MessageId>,
}

impl SimSurface {
    /// Create a surface rendering each message `item_extent` tall inside a
    /// viewport of `viewport_extent`
    pub fn new(item_extent: f64, viewport_extent: f64) -> Self {
        Self {
            item_extent,
            viewport_extent,
            ids: Vec::new(),
            offset: 0.0,
            last_target: None,
        }
    }

    /// Get the current scroll offset
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Get the current max scroll extent
    pub fn max_extent(&self) -> f64 {
        (self.ids.len() as f64 * self.item_extent - self.viewport_extent).max(0.0)
    }

    /// Get the most recent scroll-to-message target
    pub fn last_scroll_target(&self) -> Option<MessageId> {
        self.last_target
    }
}

impl Default for SimSurface {
    fn default() -> Self {
        Self::new(100.0, 400.0)
    }
}

impl RenderSurface for SimSurface {
    fn scroll_to_offset(&mut self, offset: f64) {
        self.offset = offset.clamp(0.0, self.max_extent());
    }

    fn scroll_to_message(&mut self, id: MessageId) {
        match self.ids.binary_search(&id) {
            Ok(index) => {
                self.offset = (index as f64 * self.item_extent).clamp(0.0, self.max_extent());
                self.last_target = Some(id);
            }
            Err(_) => log::warn!("scroll target {id} is not in the rendered window"),
        }
    }

    fn window_updated(&mut self, window: &MessageWindow) -> f64 {
        self.ids = window.iter().map(|message| message.id()).collect();
        self.offset = self.offset.min(self.max_extent());
        self.max_extent()
    }
}
