//! Menu screens
//!
//! Every list-shaped screen (Home, Grades, a grade's lessons, a lesson's
//! sub topics, the quiz list) is the same policy: slide to hear an item,
//! double tap to open it. Info pages (Marks, Assessments) are menus with
//! no items.

use engine_core::{
    FeedbackChannel, ImpactLevel, NotificationKind, Region, RegionSpec, ScreenContext,
    ScreenHandler, ScreenMount, SessionPolicy, TapGesture,
};
use tracing::{debug, trace, warn};

use crate::content::{self, GRADES};
use crate::destination::{Destination, ScreenError};

/// Tone played when focus lands on a menu item
pub const FOCUS_TONE: &str = "tick";

/// One selectable entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    /// Region id
    pub id: String,
    /// Spoken label
    pub label: String,
    /// Where a double tap goes
    pub destination: Destination,
    /// Spoken when the item is opened
    pub announcement: Option<String>,
}

impl MenuItem {
    /// Item whose id is its label
    #[must_use]
    pub fn new(label: impl Into<String>, destination: Destination) -> Self {
        let label = label.into();
        Self {
            id: label.clone(),
            label,
            destination,
            announcement: None,
        }
    }

    /// Use a different region id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Speak this when the item is opened
    #[must_use]
    pub fn with_announcement(mut self, text: impl Into<String>) -> Self {
        self.announcement = Some(text.into());
        self
    }
}

/// A list of items reached by sliding and opened by double tap
#[derive(Clone, Debug)]
pub struct MenuScreen {
    title: String,
    intro: Option<String>,
    items: Vec<MenuItem>,
    policy: SessionPolicy,
    stop_speech_on_exit: bool,
}

impl MenuScreen {
    /// Menu with the standard spoken introduction
    #[must_use]
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        let title = title.into();
        Self {
            intro: Some(format!("{title}. Slide your finger and double tap to select.")),
            title,
            items,
            policy: SessionPolicy::default(),
            stop_speech_on_exit: false,
        }
    }

    /// Replace the introduction
    #[must_use]
    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = Some(intro.into());
        self
    }

    /// Replace the session policy
    #[must_use]
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Main menu for a student in `grade`
    #[must_use]
    pub fn home(grade: &str) -> Self {
        Self::new(
            "Home",
            vec![
                MenuItem::new("Lessons", Destination::Grades),
                MenuItem::new(
                    "Quizes",
                    Destination::QuizList {
                        grade: grade.to_string(),
                    },
                ),
                MenuItem::new("Marks", Destination::Marks),
                MenuItem::new("Assessments", Destination::Assessments),
            ],
        )
    }

    /// Grade picker
    #[must_use]
    pub fn grades() -> Self {
        let items = GRADES
            .iter()
            .map(|grade| {
                MenuItem::new(
                    *grade,
                    Destination::Lessons {
                        grade: (*grade).to_string(),
                    },
                )
                .with_announcement(format!("Entering {grade}"))
            })
            .collect();
        Self::new("Grades", items)
    }

    /// Syllabus lessons of a grade
    #[must_use]
    pub fn lessons(grade: &str) -> Self {
        let items = content::lessons_for(grade)
            .iter()
            .map(|lesson| {
                MenuItem::new(
                    lesson.label(),
                    Destination::Content {
                        lesson_id: lesson.id.to_string(),
                        grade: grade.to_string(),
                    },
                )
                .with_id(lesson.id)
                .with_announcement(format!("Opening lesson {}", lesson.number))
            })
            .collect();
        Self::new(format!("{grade} lessons"), items)
    }

    /// Sub topics of a lesson; focus drops when the finger lifts
    ///
    /// # Errors
    ///
    /// [`ScreenError::UnknownLesson`] if the grade has no such lesson.
    pub fn topics(grade: &str, lesson_id: &str) -> Result<Self, ScreenError> {
        let lesson = content::lesson(grade, lesson_id).ok_or_else(|| ScreenError::UnknownLesson {
            grade: grade.to_string(),
            lesson_id: lesson_id.to_string(),
        })?;

        let items = lesson
            .topic_entries()
            .map(|(id, title)| {
                MenuItem::new(
                    title,
                    Destination::LessonPlayer {
                        sub_topic_id: id.clone(),
                        title: title.to_string(),
                    },
                )
                .with_id(id)
                .with_announcement(format!("Opening {title}"))
            })
            .collect::<Vec<_>>();

        let intro = format!(
            "Lesson {}. There are {} sub topics. Swipe to explore. Double tap to open lesson.",
            lesson.title,
            items.len()
        );
        Ok(Self::new(lesson.title, items)
            .with_intro(intro)
            .with_policy(SessionPolicy::new().with_clear_focus_on_release(true)))
    }

    /// Quizzes available to a grade
    #[must_use]
    pub fn quiz_list(grade: &str) -> Self {
        let items = content::quizzable_lessons(grade)
            .into_iter()
            .map(|lesson| {
                MenuItem::new(
                    format!("{} quiz", lesson.title),
                    Destination::Quiz {
                        grade: grade.to_string(),
                        lesson_id: Some(lesson.id.to_string()),
                    },
                )
                .with_id(lesson.id)
            })
            .collect();
        Self::new("Quizzes", items)
    }

    /// A page with nothing to select; speech stops when it is left
    #[must_use]
    pub fn info(title: &str) -> Self {
        Self {
            intro: Some(format!("You are now on {title} page")),
            title: title.to_string(),
            items: Vec::new(),
            policy: SessionPolicy::default(),
            stop_speech_on_exit: true,
        }
    }

    /// Screen title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Items in display order
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl ScreenHandler for MenuScreen {
    fn mount(&mut self, feedback: &FeedbackChannel) -> ScreenMount {
        if let Some(intro) = &self.intro {
            feedback.speak(intro.as_str());
        }
        debug!(screen = %self.title, items = self.items.len(), "Menu mounted");
        ScreenMount::regions(
            self.items
                .iter()
                .map(|item| RegionSpec::new(item.id.as_str(), item.label.as_str()))
                .collect(),
        )
        .with_policy(self.policy.clone())
    }

    fn announce_focus(&mut self, region: &Region, feedback: &FeedbackChannel) {
        feedback.tone(FOCUS_TONE);
        feedback.speak(region.label.as_str());
        feedback.impact(ImpactLevel::Medium);
    }

    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        focused: Option<&Region>,
        ctx: &mut ScreenContext<'_>,
    ) {
        if gesture != TapGesture::Double {
            trace!(screen = %self.title, ?gesture, "Gesture has no meaning on a menu");
            return;
        }
        let Some(region) = focused else {
            ctx.hint_select_first();
            return;
        };
        let Some(item) = self.item(region.id.as_str()) else {
            warn!(region = %region.id, "Focused region is not a menu item");
            return;
        };

        ctx.feedback().notify(NotificationKind::Success);
        if let Some(text) = &item.announcement {
            ctx.speak(text.as_str());
        }
        debug!(screen = %self.title, item = %item.id, destination = item.destination.name(), "Opening");
        ctx.navigate(item.destination.to_request());
    }

    fn unmount(&mut self, feedback: &FeedbackChannel) {
        if self.stop_speech_on_exit {
            feedback.stop_speech();
        }
    }
}
