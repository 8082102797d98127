//! Media Scrub Controller
//!
//! Translates a swipe on the lesson player into seek and volume calls on a
//! [`PlaybackSink`]. Horizontal displacement past the threshold seeks by a
//! fixed step; vertical displacement adjusts volume (finger up = louder).
//! Horizontal is checked first, and a per-gesture guard ensures at most one
//! scrub action is applied until the finger lifts.
//!
//! Tap classification (play/pause, restart) runs separately through the
//! session's Tap Classifier; this controller only exposes the operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::geometry::Point;

/// Where a lesson's audio comes from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    /// Bundled asset name
    Asset(String),
    /// Remote or file URI
    Uri(String),
}

/// Playback failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// No asset is mapped for the requested lesson
    #[error("no audio source for {0}")]
    NotFound(String),

    /// The decoder rejected the source
    #[error("failed to load audio: {0}")]
    LoadFailed(String),
}

/// Periodic report from the playback sink
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Current position
    pub position_ms: u64,
    /// Total duration, 0 while unknown
    pub duration_ms: u64,
    /// Whether audio is advancing
    pub is_playing: bool,
}

/// Controller-side view of the player
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Current position
    pub position_ms: u64,
    /// Total duration, 0 while unknown
    pub duration_ms: u64,
    /// Whether audio is advancing
    pub is_playing: bool,
    /// Output volume in [0, 1]
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position_ms: 0,
            duration_ms: 0,
            is_playing: false,
            volume: 1.0,
        }
    }
}

/// Host audio player
///
/// Calls are fire-and-forget; progress comes back through
/// [`MediaScrubController::on_status`].
pub trait PlaybackSink: Send {
    /// Prepare `source` for playback without starting it
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::LoadFailed`] if the source cannot be decoded.
    fn load(&mut self, source: &MediaSource) -> Result<(), PlaybackError>;
    /// Start or resume
    fn play(&mut self);
    /// Pause
    fn pause(&mut self);
    /// Jump to an absolute position
    fn seek_to(&mut self, position_ms: u64);
    /// Set output volume in [0, 1]
    fn set_volume(&mut self, volume: f32);
    /// Release the loaded source
    fn unload(&mut self) {}
}

/// Swipe thresholds and step sizes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrubConfig {
    /// Displacement needed on either axis before a swipe counts
    pub swipe_threshold: f32,
    /// Seek increment per swipe
    pub seek_step: Duration,
    /// Volume increment per swipe
    pub volume_step: f32,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 80.0,
            seek_step: Duration::from_secs(5),
            volume_step: 0.1,
        }
    }
}

impl ScrubConfig {
    /// Set the swipe threshold
    #[must_use]
    pub fn with_swipe_threshold(mut self, threshold: f32) -> Self {
        self.swipe_threshold = threshold;
        self
    }

    /// Set the seek increment
    #[must_use]
    pub fn with_seek_step(mut self, step: Duration) -> Self {
        self.seek_step = step;
        self
    }

    /// Set the volume increment
    #[must_use]
    pub fn with_volume_step(mut self, step: f32) -> Self {
        self.volume_step = step;
        self
    }
}

/// Seek or volume direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Forward / louder
    Forward,
    /// Backward / quieter
    Backward,
}

/// A scrub applied to the sink
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScrubAction {
    /// Position changed
    Seek {
        /// Swipe direction
        direction: Direction,
        /// New position after clamping
        position_ms: u64,
    },
    /// Volume changed
    Volume {
        /// Swipe direction
        direction: Direction,
        /// New volume after clamping
        level: f32,
    },
}

/// Swipe-to-seek / swipe-to-volume translator
#[derive(Debug)]
pub struct MediaScrubController<P> {
    sink: P,
    config: ScrubConfig,
    state: PlaybackState,
    loaded: bool,
    origin: Option<Point>,
    locked: bool,
}

impl<P: PlaybackSink> MediaScrubController<P> {
    /// Wrap a sink; nothing is loaded yet
    pub fn new(sink: P, config: ScrubConfig) -> Self {
        Self {
            sink,
            config,
            state: PlaybackState::default(),
            loaded: false,
            origin: None,
            locked: false,
        }
    }

    /// Load a lesson's audio
    ///
    /// A missing source or a decoder failure leaves the controller unloaded;
    /// every playback operation is then a no-op until a later load succeeds.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NotFound`] when `source` is `None`, or whatever the
    /// sink reports.
    pub fn load(&mut self, name: &str, source: Option<&MediaSource>) -> Result<(), PlaybackError> {
        self.loaded = false;
        let source = source.ok_or_else(|| PlaybackError::NotFound(name.to_string()))?;

        if let Err(e) = self.sink.load(source) {
            warn!(error = %e, lesson = name, "Audio load failed");
            return Err(e);
        }
        self.state = PlaybackState {
            volume: self.state.volume,
            ..PlaybackState::default()
        };
        self.sink.set_volume(self.state.volume);
        self.loaded = true;
        debug!(lesson = name, "Audio loaded");
        Ok(())
    }

    /// Whether a source is loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current player view
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Scrub tuning
    #[must_use]
    pub fn config(&self) -> &ScrubConfig {
        &self.config
    }

    /// The wrapped sink
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Finger down: remember the gesture origin
    pub fn on_press(&mut self, point: Point) {
        self.origin = Some(point);
    }

    /// Finger moved; applies at most one action per gesture
    pub fn on_move(&mut self, point: Point) -> Option<ScrubAction> {
        if !self.loaded || self.locked {
            return None;
        }
        let (dx, dy) = point.delta_from(self.origin?);
        let threshold = self.config.swipe_threshold;

        let action = if dx > threshold {
            self.seek(Direction::Forward)
        } else if dx < -threshold {
            self.seek(Direction::Backward)
        } else if dy < -threshold {
            self.adjust_volume(Direction::Forward)
        } else if dy > threshold {
            self.adjust_volume(Direction::Backward)
        } else {
            return None;
        };

        self.locked = true;
        trace!(?action, dx, dy, "Scrub applied");
        Some(action)
    }

    /// Finger lifted: release the per-gesture guard
    pub fn on_release(&mut self) {
        self.origin = None;
        self.locked = false;
    }

    /// Toggle play/pause; returns whether audio is now playing
    pub fn toggle_play_pause(&mut self) -> Option<bool> {
        if !self.loaded {
            return None;
        }
        if self.state.is_playing {
            self.sink.pause();
        } else {
            self.sink.play();
        }
        self.state.is_playing = !self.state.is_playing;
        Some(self.state.is_playing)
    }

    /// Seek to zero and play; returns whether anything happened
    pub fn restart(&mut self) -> bool {
        if !self.loaded {
            return false;
        }
        self.sink.seek_to(0);
        self.sink.play();
        self.state.position_ms = 0;
        self.state.is_playing = true;
        true
    }

    /// Status callback from the sink
    pub fn on_status(&mut self, status: PlaybackStatus) {
        if !self.loaded {
            return;
        }
        self.state.position_ms = status.position_ms;
        self.state.duration_ms = status.duration_ms;
        self.state.is_playing = status.is_playing;
    }

    /// Release the source (screen teardown)
    pub fn unload(&mut self) {
        if self.loaded {
            self.sink.unload();
        }
        self.loaded = false;
        self.on_release();
    }

    fn seek(&mut self, direction: Direction) -> ScrubAction {
        let step = u64::try_from(self.config.seek_step.as_millis()).unwrap_or(u64::MAX);
        let mut position = match direction {
            Direction::Forward => self.state.position_ms.saturating_add(step),
            Direction::Backward => self.state.position_ms.saturating_sub(step),
        };
        if self.state.duration_ms > 0 {
            position = position.min(self.state.duration_ms);
        }
        self.sink.seek_to(position);
        self.state.position_ms = position;
        ScrubAction::Seek {
            direction,
            position_ms: position,
        }
    }

    fn adjust_volume(&mut self, direction: Direction) -> ScrubAction {
        let delta = match direction {
            Direction::Forward => self.config.volume_step,
            Direction::Backward => -self.config.volume_step,
        };
        // Round to the step grid so repeated swipes land on 0.0 and 1.0 exactly
        let level = ((self.state.volume + delta).clamp(0.0, 1.0) * 100.0).round() / 100.0;
        self.sink.set_volume(level);
        self.state.volume = level;
        ScrubAction::Volume { direction, level }
    }
}

/// Format a position as `m:ss`
#[must_use]
pub fn format_time(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    format!("{minutes}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakePlayback, PlaybackCall};

    fn loaded() -> MediaScrubController<FakePlayback> {
        let mut controller = MediaScrubController::new(FakePlayback::default(), ScrubConfig::default());
        controller
            .load("m_1", Some(&MediaSource::Asset("m_1.mp3".into())))
            .unwrap();
        controller
    }

    #[test]
    fn test_swipe_right_seeks_forward_once_per_gesture() {
        let mut controller = loaded();
        controller.on_press(Point::new(100.0, 300.0));

        let action = controller.on_move(Point::new(220.0, 300.0));
        assert_eq!(
            action,
            Some(ScrubAction::Seek {
                direction: Direction::Forward,
                position_ms: 5000
            })
        );
        // Guard holds until release
        assert_eq!(controller.on_move(Point::new(400.0, 300.0)), None);
        controller.on_release();

        controller.on_press(Point::new(100.0, 300.0));
        controller.on_move(Point::new(220.0, 300.0));
        assert_eq!(controller.state().position_ms, 10_000);
    }

    #[test]
    fn test_backward_seek_clamps_at_zero() {
        let mut controller = loaded();
        controller.on_status(PlaybackStatus {
            position_ms: 2000,
            duration_ms: 60_000,
            is_playing: true,
        });
        controller.on_press(Point::new(300.0, 300.0));
        controller.on_move(Point::new(150.0, 300.0));

        assert_eq!(controller.state().position_ms, 0);
        assert_eq!(controller.sink().calls().last(), Some(&PlaybackCall::SeekTo(0)));
    }

    #[test]
    fn test_forward_seek_clamps_at_duration() {
        let mut controller = loaded();
        controller.on_status(PlaybackStatus {
            position_ms: 58_000,
            duration_ms: 60_000,
            is_playing: true,
        });
        controller.on_press(Point::new(0.0, 0.0));
        controller.on_move(Point::new(100.0, 0.0));
        assert_eq!(controller.state().position_ms, 60_000);
    }

    #[test]
    fn test_swipe_up_raises_volume_clamped() {
        let mut controller = loaded();
        controller.on_press(Point::new(200.0, 400.0));
        let action = controller.on_move(Point::new(200.0, 300.0));
        assert_eq!(
            action,
            Some(ScrubAction::Volume {
                direction: Direction::Forward,
                level: 1.0
            })
        );
        controller.on_release();

        for _ in 0..12 {
            controller.on_press(Point::new(200.0, 300.0));
            controller.on_move(Point::new(200.0, 400.0));
            controller.on_release();
        }
        assert!(controller.state().volume.abs() < f32::EPSILON);
    }

    #[test]
    fn test_horizontal_wins_over_vertical() {
        let mut controller = loaded();
        controller.on_press(Point::new(0.0, 0.0));
        let action = controller.on_move(Point::new(-100.0, -100.0));
        assert!(matches!(
            action,
            Some(ScrubAction::Seek {
                direction: Direction::Backward,
                ..
            })
        ));
    }

    #[test]
    fn test_small_moves_do_nothing() {
        let mut controller = loaded();
        controller.on_press(Point::new(0.0, 0.0));
        assert_eq!(controller.on_move(Point::new(80.0, -80.0)), None);
    }

    #[test]
    fn test_missing_source_blocks_playback() {
        let mut controller = MediaScrubController::new(FakePlayback::default(), ScrubConfig::default());
        assert_eq!(
            controller.load("m_9", None),
            Err(PlaybackError::NotFound("m_9".into()))
        );
        assert_eq!(controller.toggle_play_pause(), None);
        assert!(!controller.restart());
        controller.on_press(Point::new(0.0, 0.0));
        assert_eq!(controller.on_move(Point::new(200.0, 0.0)), None);
        assert!(controller.sink().calls().is_empty());
    }

    #[test]
    fn test_decoder_failure_blocks_playback() {
        let mut controller =
            MediaScrubController::new(FakePlayback::failing(), ScrubConfig::default());
        let err = controller
            .load("m_1", Some(&MediaSource::Uri("file:///broken".into())))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::LoadFailed(_)));
        assert_eq!(controller.toggle_play_pause(), None);
    }

    #[test]
    fn test_toggle_and_restart() {
        let mut controller = loaded();
        assert_eq!(controller.toggle_play_pause(), Some(true));
        assert_eq!(controller.toggle_play_pause(), Some(false));
        assert!(controller.restart());
        assert_eq!(
            &controller.sink().calls()[controller.sink().calls().len() - 2..],
            &[PlaybackCall::SeekTo(0), PlaybackCall::Play]
        );
        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(65_000), "1:05");
        assert_eq!(format_time(600_999), "10:00");
    }
}
