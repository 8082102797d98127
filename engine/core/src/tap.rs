//! Tap Classifier
//!
//! Turns a burst of discrete presses into a double or triple tap.
//!
//! # Algorithm
//!
//! Each press either continues the current burst (it landed within the
//! double-tap delay of the previous press) or starts a new one. Every press
//! re-arms a trailing window; when the window closes with no further press
//! the accumulated count is classified:
//!
//! | count | result                                        |
//! |-------|-----------------------------------------------|
//! | 1     | ignored (focus already announced the region)  |
//! | 2     | [`TapGesture::Double`] (confirm / select)     |
//! | 3     | [`TapGesture::Triple`] (advance / next)       |
//! | 4+    | ignored                                       |
//!
//! The classifier never acts on a press directly under
//! [`TapPolicy::Deferred`], so a third tap is never swallowed by a premature
//! double-tap decision. [`TapPolicy::Immediate`] trades triple taps for
//! latency: a second press on the already-focused region inside the
//! double-tap delay fires a double tap straight away.
//!
//! Time is passed in explicitly; the classifier owns no timers. The owner
//! asks for [`TapClassifier::next_deadline`] and calls
//! [`TapClassifier::poll`] once it has passed.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::region::RegionId;

/// How a screen wants taps classified
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapPolicy {
    /// Wait out the trailing window, then classify 2 or 3 taps
    #[default]
    Deferred,
    /// Fire a double tap as soon as the focused region is pressed twice
    Immediate,
}

/// Timing configuration for tap classification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TapConfig {
    /// Maximum gap between two presses of the same burst
    pub double_tap_delay: Duration,
    /// Silence after the last press before the burst is classified
    pub triple_tap_delay: Duration,
    /// Classification policy
    pub policy: TapPolicy,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            double_tap_delay: Duration::from_millis(400),
            triple_tap_delay: Duration::from_millis(400),
            policy: TapPolicy::Deferred,
        }
    }
}

impl TapConfig {
    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the double-tap delay
    #[must_use]
    pub fn with_double_tap_delay(mut self, delay: Duration) -> Self {
        self.double_tap_delay = delay;
        self
    }

    /// Set the trailing classification window
    #[must_use]
    pub fn with_triple_tap_delay(mut self, delay: Duration) -> Self {
        self.triple_tap_delay = delay;
        self
    }

    /// Set the classification policy
    #[must_use]
    pub fn with_policy(mut self, policy: TapPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A completed multi-tap classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapGesture {
    /// Two taps: confirm / select
    Double,
    /// Three taps: advance / next
    Triple,
}

impl TapGesture {
    /// Classify a tap count; single taps and bursts of four or more are ignored
    #[must_use]
    pub fn from_count(count: u32) -> Option<Self> {
        match count {
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            _ => None,
        }
    }

    /// Number of taps this gesture represents
    #[must_use]
    pub fn taps(self) -> u32 {
        match self {
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// Running count of the current burst
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapRecord {
    /// Presses in the current burst
    pub count: u32,
    /// When the current burst began
    pub window_start: Instant,
}

impl TapRecord {
    fn reset(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }
}

/// Multi-tap classifier
#[derive(Debug)]
pub struct TapClassifier {
    config: TapConfig,
    record: TapRecord,
    last_press: Option<Instant>,
    deadline: Option<Instant>,
}

impl TapClassifier {
    /// Create a classifier
    #[must_use]
    pub fn new(config: TapConfig) -> Self {
        Self {
            config,
            record: TapRecord::reset(Instant::now()),
            last_press: None,
            deadline: None,
        }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Current burst state
    #[must_use]
    pub fn record(&self) -> TapRecord {
        self.record
    }

    /// Register a press.
    ///
    /// `pressed` is the region under the finger, `focused` the region that
    /// was focused before this press was hit-tested. Only
    /// [`TapPolicy::Immediate`] ever returns a gesture from here; deferred
    /// classification is reported by [`poll`](Self::poll).
    pub fn on_press(
        &mut self,
        now: Instant,
        pressed: Option<&RegionId>,
        focused: Option<&RegionId>,
    ) -> Option<TapGesture> {
        let continues_burst = self
            .last_press
            .is_some_and(|last| now.saturating_duration_since(last) < self.config.double_tap_delay);

        if self.config.policy == TapPolicy::Immediate {
            if continues_burst && pressed.is_some() && pressed == focused {
                debug!(region = ?pressed, "Immediate double tap on focused region");
                // This press can pair with the next one too
                self.record = TapRecord::reset(now);
                self.last_press = Some(now);
                self.deadline = None;
                return Some(TapGesture::Double);
            }
            self.record = TapRecord {
                count: 1,
                window_start: now,
            };
            self.last_press = Some(now);
            return None;
        }

        if continues_burst {
            self.record.count += 1;
        } else {
            self.record = TapRecord {
                count: 1,
                window_start: now,
            };
        }
        self.last_press = Some(now);
        self.deadline = Some(now + self.config.triple_tap_delay);
        trace!(count = self.record.count, "Tap registered");
        None
    }

    /// When the trailing window closes, if a burst is pending
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Classify the pending burst if its window has closed
    pub fn poll(&mut self, now: Instant) -> Option<TapGesture> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }

        let count = self.record.count;
        self.reset(now);

        let gesture = TapGesture::from_count(count);
        match gesture {
            Some(g) => debug!(count, gesture = ?g, "Tap burst classified"),
            None => trace!(count, "Tap burst ignored"),
        }
        gesture
    }

    /// Drop any pending burst without classifying it
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.last_press = None;
        self.record.count = 0;
    }

    fn reset(&mut self, now: Instant) {
        self.record = TapRecord::reset(now);
        self.last_press = None;
        self.deadline = None;
    }
}

impl Default for TapClassifier {
    fn default() -> Self {
        Self::new(TapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_three_quick_presses_classify_once_as_triple() {
        let mut classifier = TapClassifier::default();
        let t0 = Instant::now();

        assert_eq!(classifier.on_press(t0, None, None), None);
        assert_eq!(classifier.on_press(t0 + ms(100), None, None), None);
        assert_eq!(classifier.on_press(t0 + ms(200), None, None), None);

        // Window not closed yet
        assert_eq!(classifier.poll(t0 + ms(599)), None);
        assert_eq!(classifier.poll(t0 + ms(600)), Some(TapGesture::Triple));

        // Fired exactly once
        assert_eq!(classifier.poll(t0 + ms(2000)), None);
        assert_eq!(classifier.record().count, 0);

        // Next press starts a fresh burst
        classifier.on_press(t0 + ms(2100), None, None);
        assert_eq!(classifier.record().count, 1);
    }

    #[test]
    fn test_double_tap() {
        let mut classifier = TapClassifier::default();
        let t0 = Instant::now();
        classifier.on_press(t0, None, None);
        classifier.on_press(t0 + ms(250), None, None);
        assert_eq!(classifier.next_deadline(), Some(t0 + ms(650)));
        assert_eq!(classifier.poll(t0 + ms(650)), Some(TapGesture::Double));
    }

    #[test]
    fn test_single_tap_is_ignored() {
        let mut classifier = TapClassifier::default();
        let t0 = Instant::now();
        classifier.on_press(t0, None, None);
        assert_eq!(classifier.poll(t0 + ms(400)), None);
        assert_eq!(classifier.next_deadline(), None);
    }

    #[test]
    fn test_slow_presses_restart_the_count() {
        let mut classifier = TapClassifier::new(
            TapConfig::new()
                .with_double_tap_delay(ms(300))
                .with_triple_tap_delay(ms(1000)),
        );
        let t0 = Instant::now();
        classifier.on_press(t0, None, None);
        classifier.on_press(t0 + ms(350), None, None);
        assert_eq!(classifier.record().count, 1);
        assert_eq!(classifier.record().window_start, t0 + ms(350));
    }

    #[test]
    fn test_four_taps_are_ignored() {
        let mut classifier = TapClassifier::default();
        let t0 = Instant::now();
        for i in 0..4 {
            classifier.on_press(t0 + ms(i * 100), None, None);
        }
        assert_eq!(classifier.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn test_immediate_policy_fires_on_second_press_of_focused_region() {
        let mut classifier =
            TapClassifier::new(TapConfig::new().with_policy(TapPolicy::Immediate));
        let key = RegionId::new("5");
        let t0 = Instant::now();

        assert_eq!(classifier.on_press(t0, Some(&key), None), None);
        assert_eq!(
            classifier.on_press(t0 + ms(200), Some(&key), Some(&key)),
            Some(TapGesture::Double)
        );
        assert_eq!(classifier.next_deadline(), None);

        // A third quick press pairs with the second and fires again
        assert_eq!(
            classifier.on_press(t0 + ms(300), Some(&key), Some(&key)),
            Some(TapGesture::Double)
        );
        assert_eq!(classifier.next_deadline(), None);

        // A slow press after that starts over
        assert_eq!(classifier.on_press(t0 + ms(900), Some(&key), Some(&key)), None);
    }

    #[test]
    fn test_immediate_policy_requires_same_region() {
        let mut classifier =
            TapClassifier::new(TapConfig::new().with_policy(TapPolicy::Immediate));
        let one = RegionId::new("1");
        let two = RegionId::new("2");
        let t0 = Instant::now();

        classifier.on_press(t0, Some(&one), None);
        assert_eq!(classifier.on_press(t0 + ms(100), Some(&two), Some(&one)), None);
    }

    #[test]
    fn test_cancel_drops_pending_burst() {
        let mut classifier = TapClassifier::default();
        let t0 = Instant::now();
        classifier.on_press(t0, None, None);
        classifier.on_press(t0 + ms(100), None, None);
        classifier.cancel();
        assert_eq!(classifier.poll(t0 + ms(5000)), None);
    }
}
