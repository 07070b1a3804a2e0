//! Scroll-trigger detection
//!
//! Watches scroll-position updates and decides when to fire a pagination
//! fetch. A direction only fires while it is armed, and a direction arms
//! when the user's travel heads toward that direction's end of the list.
//! Arming survives rejected attempts; only an actual dispatch disarms, so
//! repeated scroll events while a fetch is in flight retry naturally without
//! queueing anything.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::filter::Direction;

/// Which end of the scroll range a position or travel refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListEnd {
    /// Offset zero
    Start,
    /// The maximum scroll extent
    End,
}

/// How the list maps conversation order onto the scroll range
///
/// The threshold comparison is mirrored between orientations, never the
/// comparison operator, so "how close to the away end" keeps one meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Older content lies toward the maximum scroll extent
    Normal,
    /// Older content lies toward offset zero (flipped chat list)
    Inverted,
}

impl Orientation {
    /// The end of the scroll range holding the given direction's content
    fn end_of(self, direction: Direction) -> ListEnd {
        match (self, direction) {
            (Orientation::Normal, Direction::Older) => ListEnd::End,
            (Orientation::Normal, Direction::Newer) => ListEnd::Start,
            (Orientation::Inverted, Direction::Older) => ListEnd::Start,
            (Orientation::Inverted, Direction::Newer) => ListEnd::End,
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Inverted
    }
}

/// The direction the user is currently dragging or flinging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Travel {
    /// Moving toward offset zero
    TowardStart,
    /// Moving toward the maximum scroll extent
    TowardEnd,
    /// Not moving, or direction unknown
    Idle,
}

impl Travel {
    fn destination(self) -> Option<ListEnd> {
        match self {
            Travel::TowardStart => Some(ListEnd::Start),
            Travel::TowardEnd => Some(ListEnd::End),
            Travel::Idle => None,
        }
    }
}

/// One scroll-position update reported by the render surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollFrame {
    /// Current scroll offset in surface units
    pub offset: f64,
    /// Maximum scrollable extent; zero or negative means the list cannot
    /// scroll (shorter than the viewport, or not yet laid out)
    pub max_extent: f64,
    /// Direction of travel that produced this update
    pub travel: Travel,
}

impl ScrollFrame {
    /// Create a new scroll frame
    pub fn new(offset: f64, max_extent: f64, travel: Travel) -> Self {
        Self {
            offset,
            max_extent,
            travel,
        }
    }

    /// Position as a fraction of the scroll range, None while unscrollable
    pub fn fraction(&self) -> Option<f64> {
        if self.max_extent > 0.0 {
            Some(self.offset / self.max_extent)
        } else {
            None
        }
    }
}

/// Edge detector that turns scroll updates into fetch opportunities
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTrigger {
    orientation: Orientation,
    threshold: f64,
    armed_older: bool,
    armed_newer: bool,
}

impl ScrollTrigger {
    /// Create a new detector
    ///
    /// `threshold` is the fraction of the scroll range from the away end at
    /// which a direction fires, clamped into [0, 1]; zero fires only at the
    /// exact edge.
    pub fn new(orientation: Orientation, threshold: f64) -> Self {
        Self {
            orientation,
            threshold: threshold.clamp(0.0, 1.0),
            armed_older: false,
            armed_newer: false,
        }
    }

    /// Get the configured orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Check if a direction is armed
    pub fn is_armed(&self, direction: Direction) -> bool {
        match direction {
            Direction::Older => self.armed_older,
            Direction::Newer => self.armed_newer,
        }
    }

    /// Clear a direction's armed flag; called when its fetch is dispatched
    pub fn disarm(&mut self, direction: Direction) {
        match direction {
            Direction::Older => self.armed_older = false,
            Direction::Newer => self.armed_newer = false,
        }
    }

    /// Feed one scroll update
    ///
    /// Arms directions whose end the travel heads toward, then returns the
    /// armed directions whose edge condition holds at this position. The
    /// caller decides eligibility and disarms on dispatch.
    pub fn observe(&mut self, frame: &ScrollFrame) -> Vec<Direction> {
        if let Some(destination) = frame.travel.destination() {
            for direction in [Direction::Older, Direction::Newer] {
                if self.orientation.end_of(direction) == destination {
                    self.arm(direction);
                }
            }
        }

        let Some(fraction) = frame.fraction() else {
            return Vec::new();
        };

        [Direction::Older, Direction::Newer]
            .into_iter()
            .filter(|direction| self.is_armed(*direction) && self.edge_reached(*direction, fraction))
            .collect()
    }

    fn arm(&mut self, direction: Direction) {
        match direction {
            Direction::Older => self.armed_older = true,
            Direction::Newer => self.armed_newer = true,
        }
    }

    fn edge_reached(&self, direction: Direction, fraction: f64) -> bool {
        match self.orientation.end_of(direction) {
            ListEnd::Start => fraction <= self.threshold,
            ListEnd::End => fraction >= 1.0 - self.threshold,
        }
    }
}
