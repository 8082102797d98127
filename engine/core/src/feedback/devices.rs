//! Output Device Traits
//!
//! Black-box sinks for speech, haptics, and short tones. Hosts implement
//! these over the platform's engines; the Feedback Channel task is the only
//! caller.
//!
//! Every call is fire-and-forget from the platform's point of view: an
//! implementation issues the request and returns, it does not wait for the
//! utterance or vibration to finish.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Strength of an impact pulse
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    /// Light tick (focus movement, key hover)
    Light,
    /// Medium bump (focus on a large control, play/pause)
    Medium,
    /// Heavy thud (opening content)
    Heavy,
}

/// Notification pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Action completed
    Success,
    /// Action needs attention
    Warning,
    /// Action failed
    Error,
}

/// A haptic request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticKind {
    /// Single impact pulse
    Impact(ImpactLevel),
    /// Notification pattern
    Notify(NotificationKind),
}

/// Text-to-speech engine
#[async_trait]
pub trait SpeechEngine: Send {
    /// Start speaking `text` at `rate` (1.0 = platform default)
    async fn speak(&mut self, text: &str, rate: f32);

    /// Silence any utterance in progress
    async fn stop(&mut self);
}

/// Vibration motor
#[async_trait]
pub trait HapticMotor: Send {
    /// Single impact pulse
    async fn impact(&mut self, level: ImpactLevel);

    /// Notification pattern
    async fn notify(&mut self, kind: NotificationKind);
}

/// Short audio cue player (ticks, chimes)
#[async_trait]
pub trait TonePlayer: Send {
    /// Play the named cue from the start
    async fn play(&mut self, tone: &str);
}

/// The full set of output devices owned by the feedback task
pub struct OutputDevices {
    /// Speech output
    pub speech: Box<dyn SpeechEngine>,
    /// Haptic output
    pub haptics: Box<dyn HapticMotor>,
    /// Tone output
    pub tones: Box<dyn TonePlayer>,
}

impl OutputDevices {
    /// Bundle device implementations
    pub fn new(
        speech: impl SpeechEngine + 'static,
        haptics: impl HapticMotor + 'static,
        tones: impl TonePlayer + 'static,
    ) -> Self {
        Self {
            speech: Box::new(speech),
            haptics: Box::new(haptics),
            tones: Box::new(tones),
        }
    }
}

impl std::fmt::Debug for OutputDevices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDevices").finish_non_exhaustive()
    }
}
