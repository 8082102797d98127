//! Vision Bridge Screens
//!
//! The app's screens, each a [`ScreenHandler`] on top of the shared gesture
//! engine. A screen only says which regions it has and what a double or
//! triple tap means; sliding, focus announcements, tap timing and layout
//! measurement all come from `engine-core`.
//!
//! # Flow
//!
//! ```text
//! StudentLogin ──► Home ──┬─► Grades ──► Lessons{grade} ──► Content{lesson} ──► LessonPlayer
//!                         ├─► QuizList{grade} ──► Quiz
//!                         ├─► Marks
//!                         └─► Assessments
//! ```
//!
//! Screens never switch screens themselves. They queue a
//! [`Destination`] as a navigation request; the host parses it back with
//! `Destination::try_from` and builds the next screen with [`Screen::open`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod content;
pub mod destination;
pub mod lesson_player;
pub mod menu;
pub mod pin_login;
pub mod quiz;

pub use destination::{Destination, ScreenError};
pub use lesson_player::LessonPlayerScreen;
pub use menu::{MenuItem, MenuScreen};
pub use pin_login::PinLoginScreen;
pub use quiz::{QuizPhase, QuizScreen};

use engine_core::{
    FeedbackChannel, PlaybackSink, PlaybackStatus, PointerEvent, Region, ScreenContext,
    ScreenHandler, ScreenMount, ScrubConfig, TapGesture,
};

/// Any screen of the app, so one session type can host them all
#[derive(Debug)]
pub enum Screen<P> {
    /// PIN pad
    Login(PinLoginScreen),
    /// List and info screens
    Menu(MenuScreen),
    /// Quiz
    Quiz(QuizScreen),
    /// Audio lesson
    Player(LessonPlayerScreen<P>),
}

impl<P: PlaybackSink> Screen<P> {
    /// Build the screen for a destination
    ///
    /// `sink` is only called for the lesson player.
    ///
    /// # Errors
    ///
    /// [`ScreenError::UnknownLesson`] when a lesson screen names a lesson
    /// its grade does not have.
    pub fn open(
        destination: &Destination,
        sink: impl FnOnce() -> P,
        scrub: &ScrubConfig,
    ) -> Result<Self, ScreenError> {
        Ok(match destination {
            Destination::StudentLogin => Self::Login(PinLoginScreen::new()),
            Destination::Home { grade } => Self::Menu(MenuScreen::home(grade)),
            Destination::Grades => Self::Menu(MenuScreen::grades()),
            Destination::Lessons { grade } => Self::Menu(MenuScreen::lessons(grade)),
            Destination::Content { lesson_id, grade } => {
                Self::Menu(MenuScreen::topics(grade, lesson_id)?)
            }
            Destination::QuizList { grade } => Self::Menu(MenuScreen::quiz_list(grade)),
            Destination::Quiz { grade, lesson_id } => {
                Self::Quiz(QuizScreen::new(grade, lesson_id.as_deref()))
            }
            Destination::Marks => Self::Menu(MenuScreen::info("Marks")),
            Destination::Assessments => Self::Menu(MenuScreen::info("Assessments")),
            Destination::LessonPlayer {
                sub_topic_id,
                title,
            } => Self::Player(LessonPlayerScreen::new(
                sink(),
                scrub.clone(),
                sub_topic_id,
                title,
            )),
        })
    }

    fn handler(&mut self) -> &mut dyn ScreenHandler {
        match self {
            Self::Login(screen) => screen,
            Self::Menu(screen) => screen,
            Self::Quiz(screen) => screen,
            Self::Player(screen) => screen,
        }
    }
}

impl<P: PlaybackSink> ScreenHandler for Screen<P> {
    fn mount(&mut self, feedback: &FeedbackChannel) -> ScreenMount {
        self.handler().mount(feedback)
    }

    fn announce_focus(&mut self, region: &Region, feedback: &FeedbackChannel) {
        self.handler().announce_focus(region, feedback);
    }

    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        focused: Option<&Region>,
        ctx: &mut ScreenContext<'_>,
    ) {
        self.handler().on_gesture(gesture, focused, ctx);
    }

    fn on_pointer(&mut self, event: &PointerEvent, feedback: &FeedbackChannel) {
        self.handler().on_pointer(event, feedback);
    }

    fn on_playback_status(&mut self, status: PlaybackStatus, feedback: &FeedbackChannel) {
        self.handler().on_playback_status(status, feedback);
    }

    fn unmount(&mut self, feedback: &FeedbackChannel) {
        self.handler().unmount(feedback);
    }
}
