//! Region Measurement Service
//!
//! Resolves each region's absolute rectangle from the platform's layout
//! pass. Layout may not have settled on the first attempt (the platform
//! reports a zero-size rectangle), so every request becomes a bounded retry
//! task:
//!
//! ```text
//! request ──► Pending{attempts: 0} ──attempt──► Measured
//!                  ▲        │
//!                  └─retry──┤ (degenerate, attempts < max)
//!                           └──► GaveUp (attempts == max)
//! ```
//!
//! Giving up is not an error. The region simply stays out of hit-testing
//! until something requests a fresh measurement (scroll advance, window or
//! orientation change).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::Rect;
use crate::region::{RegionId, RegionRegistry};
use crate::scroll::ScrollOffset;

/// Platform layout access
///
/// Implemented by the host's rendering layer. Calls return immediately
/// with whatever the current layout pass reports.
pub trait LayoutProbe: Send {
    /// Current absolute rectangle of a region, or `None` if it is not in
    /// the render tree
    fn measure(&mut self, id: &RegionId) -> Option<Rect>;

    /// Move the screen's scroll container to `offset`
    fn scroll_to(&mut self, _offset: ScrollOffset) {}
}

/// Retry configuration for measurement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementConfig {
    /// Delay before re-trying a degenerate measurement
    pub retry_delay: Duration,
    /// Attempts before giving up on a region
    pub max_attempts: u32,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(100),
            max_attempts: 10,
        }
    }
}

impl MeasurementConfig {
    /// Set the retry delay
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the attempt bound
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

/// Lifecycle of a single region's measurement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureStatus {
    /// Waiting for the next attempt
    Pending {
        /// Attempts made so far
        attempts: u32,
        /// When the next attempt is due
        next_attempt: Instant,
    },
    /// A usable rectangle is in the registry
    Measured,
    /// Attempts exhausted; region excluded from hit-testing
    GaveUp {
        /// Attempts made
        attempts: u32,
    },
}

/// Answer to "where is this region?"
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measurement {
    /// Measured rectangle
    Ready(Rect),
    /// Not settled yet (or given up on)
    Pending,
}

/// Summary of one [`MeasurementService::poll`] pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeasurePass {
    /// Regions that received a usable rectangle
    pub measured: Vec<RegionId>,
    /// Regions that exhausted their attempts
    pub gave_up: Vec<RegionId>,
}

impl MeasurePass {
    /// Whether the pass changed anything hit-testing depends on
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measured.is_empty() && self.gave_up.is_empty()
    }
}

/// Bounded-retry measurement scheduler
#[derive(Debug, Default)]
pub struct MeasurementService {
    config: MeasurementConfig,
    status: HashMap<RegionId, MeasureStatus>,
}

impl MeasurementService {
    /// Create a service
    #[must_use]
    pub fn new(config: MeasurementConfig) -> Self {
        Self {
            config,
            status: HashMap::new(),
        }
    }

    /// Schedule a measurement attempt for `id`, due immediately
    pub fn request(&mut self, id: RegionId, now: Instant) {
        self.status.insert(
            id,
            MeasureStatus::Pending {
                attempts: 0,
                next_attempt: now,
            },
        );
    }

    /// Schedule re-measurement of every mounted region
    pub fn request_all(&mut self, registry: &RegionRegistry, now: Instant) {
        for id in registry.ids() {
            self.request(id, now);
        }
    }

    /// Stop tracking a region
    pub fn forget(&mut self, id: &RegionId) {
        self.status.remove(id);
    }

    /// Cancel every pending attempt (screen teardown)
    pub fn cancel_all(&mut self) {
        self.status.clear();
    }

    /// Status of a region's measurement
    #[must_use]
    pub fn status(&self, id: &RegionId) -> Option<MeasureStatus> {
        self.status.get(id).copied()
    }

    /// Where a region is, as far as hit-testing is concerned
    #[must_use]
    pub fn measure(&self, id: &RegionId, registry: &RegionRegistry) -> Measurement {
        match registry.get(id).and_then(|r| r.rect) {
            Some(rect) => Measurement::Ready(rect),
            None => Measurement::Pending,
        }
    }

    /// Earliest pending attempt
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.status
            .values()
            .filter_map(|s| match s {
                MeasureStatus::Pending { next_attempt, .. } => Some(*next_attempt),
                _ => None,
            })
            .min()
    }

    /// Run every attempt that is due at `now`
    pub fn poll(
        &mut self,
        now: Instant,
        probe: &mut dyn LayoutProbe,
        registry: &mut RegionRegistry,
    ) -> MeasurePass {
        let mut pass = MeasurePass::default();

        // Registration order keeps passes deterministic
        for id in registry.ids() {
            let Some(MeasureStatus::Pending {
                attempts,
                next_attempt,
            }) = self.status.get(&id).copied()
            else {
                continue;
            };
            if next_attempt > now {
                continue;
            }

            let attempts = attempts + 1;
            let stored = probe
                .measure(&id)
                .is_some_and(|rect| registry.set_rect(&id, rect).unwrap_or(false));

            if stored {
                trace!(region = %id, attempts, "Region measured");
                self.status.insert(id.clone(), MeasureStatus::Measured);
                pass.measured.push(id);
            } else if attempts >= self.config.max_attempts {
                debug!(region = %id, attempts, "Region never settled, excluding from hit-testing");
                registry.clear_rect(&id);
                self.status.insert(id.clone(), MeasureStatus::GaveUp { attempts });
                pass.gave_up.push(id);
            } else {
                trace!(region = %id, attempts, "Layout not settled, retrying");
                self.status.insert(
                    id,
                    MeasureStatus::Pending {
                        attempts,
                        next_attempt: now + self.config.retry_delay,
                    },
                );
            }
        }

        // Requests for regions that were unmounted in the meantime
        self.status.retain(|id, _| registry.contains(id));
        pass
    }
}
