//! Lesson player
//!
//! A screen with no regions: the whole surface is a scrub pad. Swipes go
//! straight to the [`MediaScrubController`] through the raw pointer hook;
//! tap bursts still come through the session's classifier.
//!
//! | gesture              | effect                       |
//! |----------------------|------------------------------|
//! | swipe right / left   | seek forward / back 5 s      |
//! | swipe up / down      | volume up / down             |
//! | double tap           | play / pause                 |
//! | triple tap           | restart from the beginning   |

use engine_core::media::Direction;
use engine_core::{
    format_time, FeedbackChannel, ImpactLevel, MediaScrubController, MediaSource,
    NotificationKind, PlaybackError, PlaybackSink, PlaybackStatus, PointerEvent, PointerPhase,
    Region, ScreenContext, ScreenHandler, ScreenMount, ScrubAction, ScrubConfig, TapGesture,
};
use tracing::{debug, trace};

use crate::content::lesson_audio;

/// Audio lesson screen
#[derive(Debug)]
pub struct LessonPlayerScreen<P> {
    sub_topic_id: String,
    title: String,
    source: Option<MediaSource>,
    scrub: MediaScrubController<P>,
}

impl<P: PlaybackSink> LessonPlayerScreen<P> {
    /// Player for a sub topic; its audio is looked up in the lesson map
    pub fn new(sink: P, config: ScrubConfig, sub_topic_id: &str, title: &str) -> Self {
        Self::with_source(sink, config, sub_topic_id, title, lesson_audio(sub_topic_id))
    }

    /// Player with an explicit source (`None` if the lesson has no audio)
    pub fn with_source(
        sink: P,
        config: ScrubConfig,
        sub_topic_id: &str,
        title: &str,
        source: Option<MediaSource>,
    ) -> Self {
        Self {
            sub_topic_id: sub_topic_id.to_string(),
            title: title.to_string(),
            source,
            scrub: MediaScrubController::new(sink, config),
        }
    }

    /// Lesson title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The scrub controller
    pub fn scrub(&self) -> &MediaScrubController<P> {
        &self.scrub
    }

    /// Position and duration as `m:ss / m:ss`
    #[must_use]
    pub fn status_text(&self) -> String {
        let state = self.scrub.state();
        format!("{} / {}", format_time(state.position_ms), format_time(state.duration_ms))
    }

    fn scrub_message(action: ScrubAction) -> &'static str {
        match action {
            ScrubAction::Seek {
                direction: Direction::Forward,
                ..
            } => "Forward 5 seconds",
            ScrubAction::Seek {
                direction: Direction::Backward,
                ..
            } => "Backward 5 seconds",
            ScrubAction::Volume {
                direction: Direction::Forward,
                ..
            } => "Volume up",
            ScrubAction::Volume {
                direction: Direction::Backward,
                ..
            } => "Volume down",
        }
    }
}

impl<P: PlaybackSink> ScreenHandler for LessonPlayerScreen<P> {
    fn mount(&mut self, feedback: &FeedbackChannel) -> ScreenMount {
        match self.scrub.load(&self.title, self.source.as_ref()) {
            Ok(()) => {
                debug!(topic = %self.sub_topic_id, "Lesson ready");
                feedback.speak(format!("{} loaded. Swipe up or down for volume.", self.title));
            }
            Err(PlaybackError::NotFound(_)) => {
                debug!(topic = %self.sub_topic_id, "No audio for lesson");
                feedback.speak("Audio not found.");
            }
            Err(PlaybackError::LoadFailed(_)) => feedback.speak("Failed to load audio."),
        }
        ScreenMount::default()
    }

    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        _focused: Option<&Region>,
        ctx: &mut ScreenContext<'_>,
    ) {
        match gesture {
            TapGesture::Double => {
                if let Some(playing) = self.scrub.toggle_play_pause() {
                    ctx.speak(if playing { "Playing" } else { "Paused" });
                    ctx.feedback().impact(ImpactLevel::Medium);
                }
            }
            TapGesture::Triple => {
                if self.scrub.restart() {
                    ctx.speak("Restarting lesson");
                    ctx.feedback().notify(NotificationKind::Success);
                }
            }
        }
    }

    fn on_pointer(&mut self, event: &PointerEvent, feedback: &FeedbackChannel) {
        match event.phase {
            PointerPhase::Press => self.scrub.on_press(event.point),
            PointerPhase::Move => {
                if let Some(action) = self.scrub.on_move(event.point) {
                    trace!(?action, status = %self.status_text(), "Scrubbed");
                    feedback.speak(Self::scrub_message(action));
                }
            }
            PointerPhase::Release => self.scrub.on_release(),
        }
    }

    fn on_playback_status(&mut self, status: PlaybackStatus, _feedback: &FeedbackChannel) {
        self.scrub.on_status(status);
    }

    fn unmount(&mut self, feedback: &FeedbackChannel) {
        self.scrub.unload();
        feedback.stop_speech();
    }
}
