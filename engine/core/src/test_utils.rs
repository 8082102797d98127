//! Test Doubles
//!
//! Recording implementations of every host collaborator so sessions and
//! screens can be exercised without a device:
//!
//! - [`recording_devices`]: speech/haptic/tone devices that log every call
//! - [`RecordingNavigator`]: remembers navigation requests
//! - [`ScriptedLayout`]: a layout probe backed by a table of content rects
//! - [`FakePlayback`]: a playback sink that logs calls
//!
//! Every double is cheaply cloneable and shares its log, so a test can keep
//! one handle while the other is moved into the engine.
//!
//! # Usage
//!
//! ```ignore
//! use engine_core::test_utils::{recording_devices, DeviceEvent};
//!
//! let (devices, recorder) = recording_devices();
//! let (feedback, task) = FeedbackChannel::spawn(devices);
//! feedback.speak("Lessons");
//! drop(feedback);
//! task.await?;
//! assert_eq!(recorder.spoken(), vec!["Lessons"]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::feedback::{
    HapticKind, HapticMotor, ImpactLevel, NotificationKind, OutputDevices, SpeechEngine,
    TonePlayer,
};
use crate::geometry::Rect;
use crate::measurement::LayoutProbe;
use crate::media::{MediaSource, PlaybackError, PlaybackSink};
use crate::navigation::{NavigationRequest, NavigationSink};
use crate::region::RegionId;
use crate::scroll::ScrollOffset;

// ============================================================================
// Output devices
// ============================================================================

/// A call observed on a recording device
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceEvent {
    /// Speech stopped
    Stop,
    /// Utterance started at a rate
    Speak(String, f32),
    /// Haptic fired
    Haptic(HapticKind),
    /// Tone played
    Tone(String),
}

#[derive(Debug, Default)]
struct DeviceLog {
    events: Vec<DeviceEvent>,
    audible: Option<String>,
}

/// Shared view of what the recording devices were asked to do
#[derive(Clone, Debug, Default)]
pub struct DeviceRecorder {
    log: Arc<Mutex<DeviceLog>>,
}

impl DeviceRecorder {
    /// Every device call, in order
    #[must_use]
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.log.lock().events.clone()
    }

    /// The utterance currently being spoken, if any
    #[must_use]
    pub fn audible(&self) -> Option<String> {
        self.log.lock().audible.clone()
    }

    /// Every utterance started, in order
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.log
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Speak(text, _) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every haptic fired, in order
    #[must_use]
    pub fn haptics(&self) -> Vec<HapticKind> {
        self.log
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Haptic(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        let mut log = self.log.lock();
        log.events.clear();
        log.audible = None;
    }

    fn push(&self, event: DeviceEvent) {
        let mut log = self.log.lock();
        match &event {
            DeviceEvent::Stop => log.audible = None,
            DeviceEvent::Speak(text, _) => log.audible = Some(text.clone()),
            _ => {}
        }
        log.events.push(event);
    }
}

struct RecordingSpeech(DeviceRecorder);
struct RecordingHaptics(DeviceRecorder);
struct RecordingTones(DeviceRecorder);

#[async_trait]
impl SpeechEngine for RecordingSpeech {
    async fn speak(&mut self, text: &str, rate: f32) {
        self.0.push(DeviceEvent::Speak(text.to_string(), rate));
    }

    async fn stop(&mut self) {
        self.0.push(DeviceEvent::Stop);
    }
}

#[async_trait]
impl HapticMotor for RecordingHaptics {
    async fn impact(&mut self, level: ImpactLevel) {
        self.0.push(DeviceEvent::Haptic(HapticKind::Impact(level)));
    }

    async fn notify(&mut self, kind: NotificationKind) {
        self.0.push(DeviceEvent::Haptic(HapticKind::Notify(kind)));
    }
}

#[async_trait]
impl TonePlayer for RecordingTones {
    async fn play(&mut self, tone: &str) {
        self.0.push(DeviceEvent::Tone(tone.to_string()));
    }
}

/// Output devices that record into a shared [`DeviceRecorder`]
#[must_use]
pub fn recording_devices() -> (OutputDevices, DeviceRecorder) {
    let recorder = DeviceRecorder::default();
    let devices = OutputDevices::new(
        RecordingSpeech(recorder.clone()),
        RecordingHaptics(recorder.clone()),
        RecordingTones(recorder.clone()),
    );
    (devices, recorder)
}

// ============================================================================
// Navigation
// ============================================================================

/// Navigation sink that remembers every request
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator {
    requests: Arc<Mutex<Vec<NavigationRequest>>>,
}

impl RecordingNavigator {
    /// Create an empty navigator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().clone()
    }

    /// Destination names received, in order
    #[must_use]
    pub fn destinations(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.destination.clone())
            .collect()
    }
}

impl NavigationSink for RecordingNavigator {
    fn navigate(&mut self, request: NavigationRequest) {
        self.requests.lock().push(request);
    }
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Default)]
struct LayoutTable {
    content: HashMap<RegionId, Rect>,
    unsettled: HashMap<RegionId, u32>,
    offset: ScrollOffset,
    measure_calls: u32,
}

/// Layout probe backed by a table of rects in content coordinates
///
/// Reported rects are shifted up by the current scroll offset, the way a
/// scroll container moves its children on screen. A region can be made to
/// report a zero-size rect for its first few attempts to simulate layout
/// that has not settled.
#[derive(Clone, Debug, Default)]
pub struct ScriptedLayout {
    table: Arc<Mutex<LayoutTable>>,
}

impl ScriptedLayout {
    /// Create an empty layout
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a region
    #[must_use]
    pub fn with_rect(self, id: impl Into<String>, rect: Rect) -> Self {
        self.set_rect(id, rect);
        self
    }

    /// Place or move a region
    pub fn set_rect(&self, id: impl Into<String>, rect: Rect) {
        self.table.lock().content.insert(RegionId::new(id), rect);
    }

    /// Report a zero-size rect for the next `attempts` measurements of `id`
    pub fn unsettled_for(&self, id: impl Into<String>, attempts: u32) {
        self.table.lock().unsettled.insert(RegionId::new(id), attempts);
    }

    /// Full-width rows of equal height stacked from `top`
    #[must_use]
    pub fn rows(ids: &[&str], top: f32, width: f32, height: f32) -> Self {
        let layout = Self::new();
        for (i, id) in ids.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let y = top + i as f32 * height;
            layout.set_rect(*id, Rect::new(0.0, y, width, height - 1.0));
        }
        layout
    }

    /// Current scroll offset applied by the host
    #[must_use]
    pub fn offset(&self) -> ScrollOffset {
        self.table.lock().offset
    }

    /// Measurements performed so far
    #[must_use]
    pub fn measure_calls(&self) -> u32 {
        self.table.lock().measure_calls
    }
}

impl LayoutProbe for ScriptedLayout {
    fn measure(&mut self, id: &RegionId) -> Option<Rect> {
        let mut table = self.table.lock();
        table.measure_calls += 1;
        let rect = *table.content.get(id)?;
        let offset = table.offset.y;

        if let Some(remaining) = table.unsettled.get_mut(id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Some(Rect::new(rect.x, rect.y - offset, 0.0, 0.0));
            }
        }
        Some(rect.translated(-offset))
    }

    fn scroll_to(&mut self, offset: ScrollOffset) {
        self.table.lock().offset = offset;
    }
}

// ============================================================================
// Playback
// ============================================================================

/// A call observed on [`FakePlayback`]
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackCall {
    /// Source loaded
    Load(MediaSource),
    /// Started
    Play,
    /// Paused
    Pause,
    /// Position set
    SeekTo(u64),
    /// Volume set
    SetVolume(f32),
    /// Source released
    Unload,
}

/// Playback sink that logs calls
#[derive(Clone, Debug, Default)]
pub struct FakePlayback {
    calls: Arc<Mutex<Vec<PlaybackCall>>>,
    fail_load: bool,
}

impl FakePlayback {
    /// A sink whose every load fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    /// Calls received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<PlaybackCall> {
        self.calls.lock().clone()
    }
}

impl PlaybackSink for FakePlayback {
    fn load(&mut self, source: &MediaSource) -> Result<(), PlaybackError> {
        if self.fail_load {
            return Err(PlaybackError::LoadFailed(format!("{source:?}")));
        }
        self.calls.lock().push(PlaybackCall::Load(source.clone()));
        Ok(())
    }

    fn play(&mut self) {
        self.calls.lock().push(PlaybackCall::Play);
    }

    fn pause(&mut self) {
        self.calls.lock().push(PlaybackCall::Pause);
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.calls.lock().push(PlaybackCall::SeekTo(position_ms));
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.lock().push(PlaybackCall::SetVolume(volume));
    }

    fn unload(&mut self) {
        self.calls.lock().push(PlaybackCall::Unload);
    }
}
