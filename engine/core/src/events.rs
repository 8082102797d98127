//! Events into and out of a gesture session
//!
//! Pointer events flow in from the host's touch layer; [`SessionOutput`]
//! values flow out so hosts and tests can observe what a frame did.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::focus::FocusChange;
use crate::geometry::Point;
use crate::navigation::NavigationRequest;
use crate::region::RegionId;
use crate::scroll::ScrollOffset;
use crate::tap::TapGesture;

/// Current time on the runtime clock
///
/// Reads tokio's clock so paused-time tests and the session's timers agree.
#[must_use]
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Phase of a pointer event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    /// Finger down
    Press,
    /// Finger moved while down
    Move,
    /// Finger lifted
    Release,
}

/// A raw touch event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened
    pub phase: PointerPhase,
    /// Where, in absolute screen coordinates
    pub point: Point,
    /// When
    pub at: Instant,
}

impl PointerEvent {
    /// Finger down at `point`
    #[must_use]
    pub fn press(point: Point, at: Instant) -> Self {
        Self {
            phase: PointerPhase::Press,
            point,
            at,
        }
    }

    /// Finger moved to `point`
    #[must_use]
    pub fn moved(point: Point, at: Instant) -> Self {
        Self {
            phase: PointerPhase::Move,
            point,
            at,
        }
    }

    /// Finger lifted at `point`
    #[must_use]
    pub fn release(point: Point, at: Instant) -> Self {
        Self {
            phase: PointerPhase::Release,
            point,
            at,
        }
    }
}

/// Something a session did in response to an event or timer
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutput {
    /// Focus moved (already announced through the feedback channel)
    Focus(FocusChange),
    /// A tap burst was classified and dispatched to the screen
    Gesture {
        /// Double or triple
        gesture: TapGesture,
        /// Region focused when the gesture fired
        target: Option<RegionId>,
    },
    /// The screen asked to navigate
    Navigate(NavigationRequest),
    /// Scroll-follow advanced the container
    Scrolled(ScrollOffset),
}

impl SessionOutput {
    /// The navigation request, if this is one
    #[must_use]
    pub fn as_navigation(&self) -> Option<&NavigationRequest> {
        match self {
            Self::Navigate(request) => Some(request),
            _ => None,
        }
    }
}
