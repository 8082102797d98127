//! Scroll-Follow Controller
//!
//! Lets a dragging finger "tow" a long list past the edge of its visible
//! area. While the finger rests inside the top or bottom edge zone of the
//! scroll viewport, the offset advances by a fixed step every interval
//! (clamped to the scrollable range). Each advance shifts every region's
//! absolute rectangle, so the owner re-measures after it.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::Rect;

/// Vertical scroll position of the screen's scroll container
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffset {
    /// Content pixels scrolled past the top of the viewport
    pub y: f32,
}

/// Scroll-follow tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollFollowConfig {
    /// Height of the edge zones at the top and bottom of the viewport
    pub edge_zone: f32,
    /// Offset change per advance
    pub step: f32,
    /// Minimum time between two advances while the finger rests in a zone
    pub interval: Duration,
}

impl Default for ScrollFollowConfig {
    fn default() -> Self {
        Self {
            edge_zone: 80.0,
            step: 60.0,
            interval: Duration::from_millis(120),
        }
    }
}

impl ScrollFollowConfig {
    /// Set the edge zone height
    #[must_use]
    pub fn with_edge_zone(mut self, zone: f32) -> Self {
        self.edge_zone = zone;
        self
    }

    /// Set the step per advance
    #[must_use]
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Set the repeat interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Which way the content is being towed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollDirection {
    /// Towards the start of the content (finger near the top edge)
    Up,
    /// Towards the end of the content (finger near the bottom edge)
    Down,
}

/// Geometry of a scroll container
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollContainer {
    /// Visible area in absolute screen coordinates
    pub viewport: Rect,
    /// Total height of the scrollable content
    pub content_height: f32,
}

impl ScrollContainer {
    /// Largest valid offset
    #[must_use]
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.viewport.h).max(0.0)
    }
}

/// Auto-scroll while the finger rests near a viewport edge
#[derive(Debug)]
pub struct ScrollFollowController {
    config: ScrollFollowConfig,
    container: Option<ScrollContainer>,
    offset: ScrollOffset,
    zone: Option<ScrollDirection>,
    next_advance: Option<Instant>,
}

impl ScrollFollowController {
    /// Create a controller; it stays inert until a container is attached
    #[must_use]
    pub fn new(config: ScrollFollowConfig) -> Self {
        Self {
            config,
            container: None,
            offset: ScrollOffset::default(),
            zone: None,
            next_advance: None,
        }
    }

    /// Attach (or replace) the screen's scroll container
    pub fn set_container(&mut self, container: Option<ScrollContainer>) {
        self.container = container;
        if let Some(c) = container {
            self.offset.y = self.offset.y.clamp(0.0, c.max_offset());
        } else {
            self.offset = ScrollOffset::default();
        }
        self.stop();
    }

    /// Current offset
    #[must_use]
    pub fn offset(&self) -> ScrollOffset {
        self.offset
    }

    /// Pointer moved to vertical position `y`.
    ///
    /// Returns the new offset if this move advanced the scroll.
    pub fn on_pointer_move(&mut self, y: f32, now: Instant) -> Option<ScrollOffset> {
        let container = self.container?;
        let viewport = container.viewport;

        let zone = if y < viewport.y + self.config.edge_zone {
            Some(ScrollDirection::Up)
        } else if y > viewport.bottom() - self.config.edge_zone {
            Some(ScrollDirection::Down)
        } else {
            None
        };

        if zone != self.zone {
            self.zone = zone;
            self.next_advance = zone.map(|_| now);
        }
        self.poll(now)
    }

    /// Advance again if the finger is still resting in an edge zone and the
    /// interval has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<ScrollOffset> {
        let due = self.next_advance?;
        if now < due {
            return None;
        }
        let (container, zone) = (self.container?, self.zone?);

        let delta = match zone {
            ScrollDirection::Up => -self.config.step,
            ScrollDirection::Down => self.config.step,
        };
        let target = (self.offset.y + delta).clamp(0.0, container.max_offset());

        if (target - self.offset.y).abs() < f32::EPSILON {
            // Pinned at the end of the range; nothing more to tow
            self.next_advance = None;
            return None;
        }

        trace!(from = self.offset.y, to = target, "Scroll-follow advance");
        self.offset.y = target;
        self.next_advance = Some(now + self.config.interval);
        Some(self.offset)
    }

    /// When the next advance is due, if the finger rests in a zone
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_advance
    }

    /// Finger lifted or screen torn down
    pub fn stop(&mut self) {
        self.zone = None;
        self.next_advance = None;
    }
}

impl Default for ScrollFollowController {
    fn default() -> Self {
        Self::new(ScrollFollowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_controller() -> ScrollFollowController {
        let mut controller = ScrollFollowController::default();
        controller.set_container(Some(ScrollContainer {
            viewport: Rect::new(0.0, 100.0, 400.0, 600.0),
            content_height: 1000.0,
        }));
        controller
    }

    #[test]
    fn test_middle_of_viewport_does_not_scroll() {
        let mut controller = list_controller();
        assert_eq!(controller.on_pointer_move(400.0, Instant::now()), None);
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_bottom_edge_tows_down_repeatedly() {
        let mut controller = list_controller();
        let t0 = Instant::now();

        let offset = controller.on_pointer_move(690.0, t0).unwrap();
        assert!((offset.y - 60.0).abs() < f32::EPSILON);

        // Resting finger: nothing until the interval elapses
        assert_eq!(controller.on_pointer_move(691.0, t0 + Duration::from_millis(50)), None);
        let offset = controller.poll(t0 + Duration::from_millis(120)).unwrap();
        assert!((offset.y - 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_offset_clamps_to_range() {
        let mut controller = list_controller();
        let mut now = Instant::now();
        controller.on_pointer_move(690.0, now);
        for _ in 0..20 {
            now += Duration::from_millis(120);
            controller.poll(now);
        }
        assert!((controller.offset().y - 400.0).abs() < f32::EPSILON);
        assert_eq!(controller.next_deadline(), None);

        // Top edge tows back
        let offset = controller.on_pointer_move(110.0, now).unwrap();
        assert!((offset.y - 340.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_top_edge_at_zero_is_noop() {
        let mut controller = list_controller();
        assert_eq!(controller.on_pointer_move(110.0, Instant::now()), None);
        assert!((controller.offset().y).abs() < f32::EPSILON);
    }

    #[test]
    fn test_without_container_is_inert() {
        let mut controller = ScrollFollowController::default();
        assert_eq!(controller.on_pointer_move(0.0, Instant::now()), None);
    }

    #[test]
    fn test_stop_disarms() {
        let mut controller = list_controller();
        let t0 = Instant::now();
        controller.on_pointer_move(690.0, t0);
        controller.stop();
        assert_eq!(controller.poll(t0 + Duration::from_secs(1)), None);
    }
}
