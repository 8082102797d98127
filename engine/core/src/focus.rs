//! Focus Tracker
//!
//! Hit-tests the finger position against the measured regions and reports
//! when the region under the finger changes.
//!
//! # Invariants
//!
//! - Only measured regions (non-degenerate rectangles) can be hit.
//! - The first region in registration order whose padded rectangle contains
//!   the point wins. There is no further overlap resolution.
//! - A [`FocusChange`] is produced only when the hit-tested id differs from
//!   the current [`FocusState`]. Moving around inside the focused region is
//!   silent; sliding off every region is a change ("no focus"), distinct from
//!   "same focus".

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Point;
use crate::region::{Region, RegionId, RegionRegistry};

/// The region currently under the finger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    /// Focused region, if any
    pub focused_region_id: Option<RegionId>,
}

/// A transition of [`FocusState`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusChange {
    /// A region gained focus
    Focused {
        /// The newly focused region
        id: RegionId,
        /// Its label, for announcement
        label: String,
        /// The region that lost focus, if any
        previous: Option<RegionId>,
    },
    /// Focus left every region
    Cleared {
        /// The region that lost focus
        previous: RegionId,
    },
}

impl FocusChange {
    /// Label to announce, if this change warrants an announcement
    #[must_use]
    pub fn announcement(&self) -> Option<&str> {
        match self {
            Self::Focused { label, .. } => Some(label),
            Self::Cleared { .. } => None,
        }
    }

    /// The region focused after this change
    #[must_use]
    pub fn focused(&self) -> Option<&RegionId> {
        match self {
            Self::Focused { id, .. } => Some(id),
            Self::Cleared { .. } => None,
        }
    }
}

/// First measured region (in registration order) containing `point`
#[must_use]
pub fn hit_test<'a>(registry: &'a RegionRegistry, point: Point, padding: f32) -> Option<&'a Region> {
    registry
        .measured()
        .find(|(_, rect)| rect.contains(point, padding))
        .map(|(region, _)| region)
}

/// Tracks which region is under the finger
#[derive(Debug, Default)]
pub struct FocusTracker {
    state: FocusState,
    padding: f32,
}

impl FocusTracker {
    /// Create a tracker with the given hit-box padding
    #[must_use]
    pub fn new(padding: f32) -> Self {
        Self {
            state: FocusState::default(),
            padding: padding.max(0.0),
        }
    }

    /// Current focus
    #[must_use]
    pub fn state(&self) -> &FocusState {
        &self.state
    }

    /// Currently focused region id
    #[must_use]
    pub fn focused(&self) -> Option<&RegionId> {
        self.state.focused_region_id.as_ref()
    }

    /// Hit-box padding applied in every direction
    #[must_use]
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Change the hit-box padding (e.g. widened for a struggling user)
    pub fn set_padding(&mut self, padding: f32) {
        self.padding = padding.max(0.0);
    }

    /// Continuous pointer movement: focus follows the finger, including
    /// onto empty space.
    pub fn on_pointer_move(&mut self, point: Point, registry: &RegionRegistry) -> Option<FocusChange> {
        let hit = hit_test(registry, point, self.padding).map(|r| (r.id.clone(), r.label.clone()));
        self.transition(hit)
    }

    /// Initial touch: a press on a region focuses it, a press on empty
    /// space keeps the current focus so a trailing confirm can still act
    /// on it.
    pub fn on_press(&mut self, point: Point, registry: &RegionRegistry) -> Option<FocusChange> {
        self.press_on(hit_test(registry, point, self.padding))
    }

    /// [`on_press`](Self::on_press) with the hit-test already done
    pub fn press_on(&mut self, hit: Option<&Region>) -> Option<FocusChange> {
        let region = hit?;
        self.transition(Some((region.id.clone(), region.label.clone())))
    }

    /// Drop focus (release policy, screen change)
    pub fn clear(&mut self) -> Option<FocusChange> {
        self.transition(None)
    }

    /// Drop focus if it points at a region that is no longer mounted
    pub fn revalidate(&mut self, registry: &RegionRegistry) -> Option<FocusChange> {
        match self.focused() {
            Some(id) if !registry.contains(id) => self.clear(),
            _ => None,
        }
    }

    fn transition(&mut self, hit: Option<(RegionId, String)>) -> Option<FocusChange> {
        let hit_id = hit.as_ref().map(|(id, _)| id);
        if hit_id == self.state.focused_region_id.as_ref() {
            return None;
        }

        let previous = self.state.focused_region_id.take();
        match hit {
            Some((id, label)) => {
                debug!(region = %id, previous = ?previous, "Focus changed");
                self.state.focused_region_id = Some(id.clone());
                Some(FocusChange::Focused {
                    id,
                    label,
                    previous,
                })
            }
            None => {
                let previous = previous?;
                debug!(previous = %previous, "Focus cleared");
                Some(FocusChange::Cleared { previous })
            }
        }
    }
}
