//! Feedback Channel
//!
//! The single arbiter of speech, haptic, and tone output. Every component
//! that wants the user to hear or feel something sends a
//! [`FeedbackRequest`] through a cloned [`FeedbackChannel`]; one
//! [`FeedbackTask`] owns the output devices and issues the platform calls.
//!
//! # Semantics
//!
//! - `speak` cancels any in-flight utterance before issuing the new one.
//!   Last request wins; there is no speech queue.
//! - Haptic and tone requests are fire-and-forget and never cancel each
//!   other or speech.
//! - Sending never blocks and never fails loudly: a channel whose task has
//!   gone away logs a warning and drops the request. Feedback loss must not
//!   take down a gesture session.
//!
//! # Architecture
//!
//! ```text
//! Session ─┐
//! Screen  ─┼─► FeedbackChannel (mpsc, unbounded) ─► FeedbackTask ─► OutputDevices
//! Media   ─┘
//! ```

mod devices;

pub use devices::{
    HapticKind, HapticMotor, ImpactLevel, NotificationKind, OutputDevices, SpeechEngine,
    TonePlayer,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Default speech rate (platform normal)
pub const DEFAULT_SPEECH_RATE: f32 = 1.0;

/// A single piece of requested feedback
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeedbackRequest {
    /// Cancel current speech, then speak
    Speak {
        /// Text to speak
        text: String,
        /// Rate override; the channel's current rate when `None`
        rate: Option<f32>,
    },
    /// Cancel current speech
    StopSpeech,
    /// Haptic pulse or pattern
    Haptic(HapticKind),
    /// Short audio cue
    Tone(String),
    /// Change the default speech rate for subsequent utterances
    SetSpeechRate(f32),
}

/// Errors from the feedback channel
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    /// The feedback task has shut down
    #[error("feedback channel closed")]
    Closed,
}

/// Cloneable handle for issuing feedback
#[derive(Clone, Debug)]
pub struct FeedbackChannel {
    tx: mpsc::UnboundedSender<FeedbackRequest>,
}

impl FeedbackChannel {
    /// Spawn the feedback task on the current tokio runtime
    pub fn spawn(devices: OutputDevices) -> (Self, JoinHandle<()>) {
        let (channel, rx) = Self::detached();
        let task = FeedbackTask::new(devices, rx);
        let handle = tokio::spawn(task.run());
        (channel, handle)
    }

    /// Create a channel whose requests are drained by the caller
    ///
    /// Used by hosts that run their own dispatch loop, and by tests that
    /// assert on the request stream.
    #[must_use]
    pub fn detached() -> (Self, mpsc::UnboundedReceiver<FeedbackRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send a request
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::Closed`] if the feedback task is gone.
    pub fn try_send(&self, request: FeedbackRequest) -> Result<(), FeedbackError> {
        self.tx.send(request).map_err(|_| FeedbackError::Closed)
    }

    fn send(&self, request: FeedbackRequest) {
        if let Err(e) = self.try_send(request) {
            warn!(error = %e, "Dropping feedback request");
        }
    }

    /// Cancel current speech and speak `text` at the channel's rate
    pub fn speak(&self, text: impl Into<String>) {
        self.send(FeedbackRequest::Speak {
            text: text.into(),
            rate: None,
        });
    }

    /// Cancel current speech and speak `text` at a specific rate
    pub fn speak_with_rate(&self, text: impl Into<String>, rate: f32) {
        self.send(FeedbackRequest::Speak {
            text: text.into(),
            rate: Some(rate),
        });
    }

    /// Cancel current speech
    pub fn stop_speech(&self) {
        self.send(FeedbackRequest::StopSpeech);
    }

    /// Haptic pulse or pattern
    pub fn haptic(&self, kind: HapticKind) {
        self.send(FeedbackRequest::Haptic(kind));
    }

    /// Impact pulse shorthand
    pub fn impact(&self, level: ImpactLevel) {
        self.haptic(HapticKind::Impact(level));
    }

    /// Notification pattern shorthand
    pub fn notify(&self, kind: NotificationKind) {
        self.haptic(HapticKind::Notify(kind));
    }

    /// Short audio cue
    pub fn tone(&self, name: impl Into<String>) {
        self.send(FeedbackRequest::Tone(name.into()));
    }

    /// Change the default speech rate
    pub fn set_speech_rate(&self, rate: f32) {
        self.send(FeedbackRequest::SetSpeechRate(rate));
    }

    /// Whether the feedback task is still accepting requests
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Owns the output devices and serializes requests onto them
pub struct FeedbackTask {
    devices: OutputDevices,
    rx: mpsc::UnboundedReceiver<FeedbackRequest>,
    speech_rate: f32,
}

impl FeedbackTask {
    /// Create a task draining `rx`
    #[must_use]
    pub fn new(devices: OutputDevices, rx: mpsc::UnboundedReceiver<FeedbackRequest>) -> Self {
        Self {
            devices,
            rx,
            speech_rate: DEFAULT_SPEECH_RATE,
        }
    }

    /// Process requests until every channel handle is dropped
    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            self.dispatch(request).await;
        }
        // Nothing may keep talking once the session is gone
        self.devices.speech.stop().await;
        trace!("Feedback task finished");
    }

    /// Process every request already queued, without waiting for more
    pub async fn drain(&mut self) {
        while let Ok(request) = self.rx.try_recv() {
            self.dispatch(request).await;
        }
    }

    /// Apply a single request to the devices
    pub async fn dispatch(&mut self, request: FeedbackRequest) {
        trace!(request = ?request, "Dispatching feedback");
        match request {
            FeedbackRequest::Speak { text, rate } => {
                self.devices.speech.stop().await;
                let rate = rate.unwrap_or(self.speech_rate);
                self.devices.speech.speak(&text, rate).await;
            }
            FeedbackRequest::StopSpeech => self.devices.speech.stop().await,
            FeedbackRequest::Haptic(HapticKind::Impact(level)) => {
                self.devices.haptics.impact(level).await;
            }
            FeedbackRequest::Haptic(HapticKind::Notify(kind)) => {
                self.devices.haptics.notify(kind).await;
            }
            FeedbackRequest::Tone(name) => self.devices.tones.play(&name).await,
            FeedbackRequest::SetSpeechRate(rate) => {
                self.speech_rate = rate.clamp(0.1, 4.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{recording_devices, DeviceEvent};

    #[tokio::test]
    async fn test_speak_cancels_prior_speech() {
        let (devices, recorder) = recording_devices();
        let (channel, rx) = FeedbackChannel::detached();
        let mut task = FeedbackTask::new(devices, rx);

        channel.speak("A");
        channel.speak("B");
        task.drain().await;

        assert_eq!(recorder.audible().as_deref(), Some("B"));
        assert_eq!(
            recorder.events(),
            vec![
                DeviceEvent::Stop,
                DeviceEvent::Speak("A".into(), 1.0),
                DeviceEvent::Stop,
                DeviceEvent::Speak("B".into(), 1.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_haptics_and_tones_do_not_cancel_speech() {
        let (devices, recorder) = recording_devices();
        let (channel, handle) = FeedbackChannel::spawn(devices);

        channel.speak("Lessons");
        channel.impact(ImpactLevel::Medium);
        channel.tone("tick");
        drop(channel);
        handle.await.unwrap();

        let events = recorder.events();
        assert_eq!(
            &events[..4],
            &[
                DeviceEvent::Stop,
                DeviceEvent::Speak("Lessons".into(), 1.0),
                DeviceEvent::Haptic(HapticKind::Impact(ImpactLevel::Medium)),
                DeviceEvent::Tone("tick".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_speech_rate_applies_to_later_utterances() {
        let (devices, recorder) = recording_devices();
        let (channel, handle) = FeedbackChannel::spawn(devices);

        channel.set_speech_rate(0.7);
        channel.speak("slow");
        channel.speak_with_rate("fast", 1.2);
        drop(channel);
        handle.await.unwrap();

        let speeches: Vec<_> = recorder
            .events()
            .into_iter()
            .filter(|e| matches!(e, DeviceEvent::Speak(..)))
            .collect();
        assert_eq!(
            speeches,
            vec![
                DeviceEvent::Speak("slow".into(), 0.7),
                DeviceEvent::Speak("fast".into(), 1.2),
            ]
        );
    }

    #[tokio::test]
    async fn test_speech_stops_when_task_ends() {
        let (devices, recorder) = recording_devices();
        let (channel, handle) = FeedbackChannel::spawn(devices);
        channel.speak("goodbye");
        drop(channel);
        handle.await.unwrap();

        assert_eq!(recorder.events().last(), Some(&DeviceEvent::Stop));
        assert_eq!(recorder.audible(), None);
    }

    #[test]
    fn test_drain_leaves_task_usable() {
        let (devices, recorder) = recording_devices();
        let (channel, rx) = FeedbackChannel::detached();
        let mut task = FeedbackTask::new(devices, rx);

        channel.speak("first");
        tokio_test::block_on(task.drain());
        channel.notify(NotificationKind::Error);
        tokio_test::block_on(task.drain());

        assert_eq!(recorder.spoken(), vec!["first".to_string()]);
        assert_eq!(recorder.haptics(), vec![HapticKind::Notify(NotificationKind::Error)]);
    }

    #[test]
    fn test_closed_channel_reports_error() {
        let (channel, rx) = FeedbackChannel::detached();
        drop(rx);
        assert!(!channel.is_open());
        assert_eq!(channel.try_send(FeedbackRequest::StopSpeech), Err(FeedbackError::Closed));
        // Convenience senders swallow the error
        channel.speak("nobody is listening");
    }
}
