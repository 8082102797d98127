//! Typed navigation destinations
//!
//! Screens ask for navigation with a [`Destination`]; it travels through the
//! engine as a plain [`NavigationRequest`] (a name plus JSON params) and is
//! parsed back on the other side before a screen is built.

use engine_core::NavigationRequest;
use thiserror::Error;

use crate::content::DEFAULT_GRADE;

/// Errors resolving a navigation request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// No screen has this name
    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    /// A required parameter was absent or not a string
    #[error("{destination} requires parameter '{param}'")]
    MissingParam {
        /// Destination name
        destination: String,
        /// Parameter name
        param: &'static str,
    },

    /// The lesson does not exist in that grade
    #[error("no lesson {lesson_id} in {grade}")]
    UnknownLesson {
        /// Grade searched
        grade: String,
        /// Lesson id requested
        lesson_id: String,
    },
}

/// Every screen in the app
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// PIN pad (entry screen)
    StudentLogin,
    /// Main menu
    Home {
        /// Logged-in student's grade
        grade: String,
    },
    /// Grade picker
    Grades,
    /// Syllabus lessons of a grade
    Lessons {
        /// Grade
        grade: String,
    },
    /// Sub topics of one lesson
    Content {
        /// Lesson id
        lesson_id: String,
        /// Grade
        grade: String,
    },
    /// Lessons of a grade that have a quiz
    QuizList {
        /// Grade
        grade: String,
    },
    /// A quiz
    Quiz {
        /// Grade
        grade: String,
        /// Narrow to one lesson's questions
        lesson_id: Option<String>,
    },
    /// Marks page
    Marks,
    /// Assessments page
    Assessments,
    /// Audio lesson
    LessonPlayer {
        /// Sub topic id
        sub_topic_id: String,
        /// Title, spoken on load
        title: String,
    },
}

impl Destination {
    /// Screen name on the wire
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StudentLogin => "StudentLogin",
            Self::Home { .. } => "Home",
            Self::Grades => "Grades",
            Self::Lessons { .. } => "Lessons",
            Self::Content { .. } => "Content",
            Self::QuizList { .. } => "QuizList",
            Self::Quiz { .. } => "Quiz",
            Self::Marks => "Marks",
            Self::Assessments => "Assessments",
            Self::LessonPlayer { .. } => "LessonPlayer",
        }
    }

    /// Encode as a navigation request
    #[must_use]
    pub fn to_request(&self) -> NavigationRequest {
        let request = NavigationRequest::to(self.name());
        match self {
            Self::StudentLogin | Self::Grades | Self::Marks | Self::Assessments => request,
            Self::Home { grade } | Self::Lessons { grade } | Self::QuizList { grade } => {
                request.with_param("grade", grade.as_str())
            }
            Self::Content { lesson_id, grade } => request
                .with_param("lessonId", lesson_id.as_str())
                .with_param("grade", grade.as_str()),
            Self::Quiz { grade, lesson_id } => {
                let request = request.with_param("grade", grade.as_str());
                match lesson_id {
                    Some(id) => request.with_param("lessonId", id.as_str()),
                    None => request,
                }
            }
            Self::LessonPlayer {
                sub_topic_id,
                title,
            } => request
                .with_param("subTopicId", sub_topic_id.as_str())
                .with_param("title", title.as_str()),
        }
    }
}

impl TryFrom<&NavigationRequest> for Destination {
    type Error = ScreenError;

    fn try_from(request: &NavigationRequest) -> Result<Self, Self::Error> {
        let required = |param: &'static str| {
            request
                .param_str(param)
                .map(str::to_string)
                .ok_or_else(|| ScreenError::MissingParam {
                    destination: request.destination.clone(),
                    param,
                })
        };
        // Grade falls back to the default class
        let grade = || {
            request
                .param_str("grade")
                .unwrap_or(DEFAULT_GRADE)
                .to_string()
        };

        Ok(match request.destination.as_str() {
            "StudentLogin" => Self::StudentLogin,
            "Home" => Self::Home { grade: grade() },
            "Grades" => Self::Grades,
            "Lessons" => Self::Lessons { grade: grade() },
            "Content" => Self::Content {
                lesson_id: required("lessonId")?,
                grade: grade(),
            },
            "QuizList" => Self::QuizList { grade: grade() },
            "Quiz" | "Quizes" => Self::Quiz {
                grade: grade(),
                lesson_id: request.param_str("lessonId").map(str::to_string),
            },
            "Marks" => Self::Marks,
            "Assessments" => Self::Assessments,
            "LessonPlayer" => Self::LessonPlayer {
                sub_topic_id: required("subTopicId")?,
                title: required("title")?,
            },
            other => return Err(ScreenError::UnknownDestination(other.to_string())),
        })
    }
}
