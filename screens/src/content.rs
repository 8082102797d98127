//! Content Tables
//!
//! Read-only classroom content: the student roster, the ICT syllabus per
//! grade, quiz questions and the lesson audio map. Everything is `'static`;
//! lookups hand back borrowed rows and never allocate except for derived
//! ids.

use engine_core::MediaSource;
use serde::Serialize;

/// Number of digits in a student PIN
pub const PIN_LENGTH: usize = 5;

/// Grade used when a screen is opened without one
pub const DEFAULT_GRADE: &str = "Grade 10";

/// A student who can log in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Student {
    /// Roster id
    pub id: &'static str,
    /// Display name, spoken on login
    pub name: &'static str,
    /// Login PIN ([`PIN_LENGTH`] digits)
    pub pin: &'static str,
    /// Enrolled grade
    pub grade: &'static str,
}

/// The roster
pub const STUDENTS: &[Student] = &[
    Student {
        id: "S001",
        name: "Kasun Perera",
        pin: "12345",
        grade: "Grade 10",
    },
    Student {
        id: "S002",
        name: "Amara Silva",
        pin: "54321",
        grade: "Grade 11",
    },
    Student {
        id: "S003",
        name: "Nimal Siri",
        pin: "00000",
        grade: "Grade 10",
    },
];

/// Find the student a PIN belongs to
#[must_use]
pub fn student_by_pin(pin: &str) -> Option<&'static Student> {
    STUDENTS.iter().find(|s| s.pin == pin)
}

/// Grades offered
pub const GRADES: &[&str] = &["Grade 10", "Grade 11"];

/// A syllabus lesson
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Stable id, `<grade number>-<lesson number>`
    pub id: &'static str,
    /// Position in the syllabus
    pub number: u32,
    /// Title
    pub title: &'static str,
    /// One-line scope
    pub scope: &'static str,
    /// Sub topics, in teaching order
    pub topics: &'static [&'static str],
}

impl Lesson {
    /// Spoken label in a lesson list
    #[must_use]
    pub fn label(&self) -> String {
        format!("Lesson {}. {}", self.number, self.title)
    }

    /// Sub topics with their ids
    pub fn topic_entries(&self) -> impl Iterator<Item = (String, &'static str)> + '_ {
        self.topics
            .iter()
            .enumerate()
            .map(|(i, title)| (topic_id(self.id, i + 1), *title))
    }
}

/// Id of the `position`th (1-based) sub topic of a lesson
#[must_use]
pub fn topic_id(lesson_id: &str, position: usize) -> String {
    format!("{lesson_id}-{position}")
}

const GRADE_10: &[Lesson] = &[
    Lesson {
        id: "10-1",
        number: 1,
        title: "Information & Communication Technology",
        scope: "The role of ICT in national development and the evolution of computing.",
        topics: &[
            "ICT Applications (E-Gov, Tele-medicine)",
            "Evolution of Computers",
            "Data vs. Information",
        ],
    },
    Lesson {
        id: "10-2",
        number: 2,
        title: "Computer Hardware & Architecture",
        scope: "Identification and classification of computer systems and peripherals.",
        topics: &[
            "Input/Output Devices",
            "Connectivity Ports (HDMI, USB)",
            "Von Neumann Architecture",
        ],
    },
    Lesson {
        id: "10-3",
        number: 3,
        title: "Data Representation",
        scope: "Mathematical foundations of digital data.",
        topics: &[
            "Number Systems (Binary to Hex)",
            "Storage Hierarchy",
            "Coding Standards (ASCII, Unicode)",
        ],
    },
    Lesson {
        id: "10-4",
        number: 4,
        title: "Logic Gates & Digital Circuits",
        scope: "Boolean algebra and digital logic design.",
        topics: &[
            "Fundamental Gates (AND, OR, NOT)",
            "Derived Gates (NAND, NOR)",
            "Truth Tables",
        ],
    },
    Lesson {
        id: "10-5",
        number: 5,
        title: "Operating Systems",
        scope: "System software functions and management.",
        topics: &[
            "Core Functions (Memory, File Mgmt)",
            "OS Classifications",
            "System Utilities",
        ],
    },
    Lesson {
        id: "10-6",
        number: 6,
        title: "Database Management Systems",
        scope: "Theory and application of relational databases.",
        topics: &[
            "Field, Record, Table",
            "Primary & Foreign Keys",
            "Database Integrity",
        ],
    },
];

const GRADE_11: &[Lesson] = &[
    Lesson {
        id: "11-7",
        number: 7,
        title: "Programming (Pascal Focus)",
        scope: "Algorithmic problem solving and structured programming.",
        topics: &[
            "Pascal Syntax",
            "Data Types & Operators",
            "Control Structures (IF, FOR, WHILE)",
        ],
    },
    Lesson {
        id: "11-8",
        number: 8,
        title: "Systems Development Life Cycle (SDLC)",
        scope: "Phases of software engineering and information systems.",
        topics: &["SDLC Stages", "Deployment Strategies"],
    },
    Lesson {
        id: "11-9",
        number: 9,
        title: "Internet & Networking",
        scope: "Network infrastructure and communication protocols.",
        topics: &["IP, URL, DNS", "Client-Server Model", "Email & Web Protocols"],
    },
    Lesson {
        id: "11-10",
        number: 10,
        title: "Web Development",
        scope: "Website structure and authoring.",
        topics: &["HTML Standards", "Static vs Dynamic Pages", "CMS (Joomla)"],
    },
    Lesson {
        id: "11-11",
        number: 11,
        title: "ICT & Society",
        scope: "Legal, ethical, and health implications of technology.",
        topics: &["Computer Crimes Act", "Ergonomics & Health", "Cyber Security"],
    },
];

/// Syllabus lessons for a grade (empty for an unknown grade)
#[must_use]
pub fn lessons_for(grade: &str) -> &'static [Lesson] {
    match grade {
        "Grade 10" => GRADE_10,
        "Grade 11" => GRADE_11,
        _ => &[],
    }
}

/// Look up one lesson
#[must_use]
pub fn lesson(grade: &str, lesson_id: &str) -> Option<&'static Lesson> {
    lessons_for(grade).iter().find(|l| l.id == lesson_id)
}

/// One answer option
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    /// Letter
    pub id: &'static str,
    /// Answer text, spoken on focus
    pub text: &'static str,
    /// Whether this is the right answer
    pub correct: bool,
}

/// A multiple-choice question
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    /// Question id
    pub id: u32,
    /// Grade the question belongs to
    pub grade: &'static str,
    /// Syllabus lesson it tests
    pub lesson_id: &'static str,
    /// Question text
    pub question: &'static str,
    /// Options in display order
    pub options: &'static [QuizOption],
}

impl QuizQuestion {
    /// Look up an option by letter
    #[must_use]
    pub fn option(&self, id: &str) -> Option<&'static QuizOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// The correct option
    #[must_use]
    pub fn answer(&self) -> Option<&'static QuizOption> {
        self.options.iter().find(|o| o.correct)
    }
}

/// Every quiz question
pub const QUIZ_QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        id: 1,
        grade: "Grade 10",
        lesson_id: "10-1",
        question: "Which component is considered the 'brain' of the computer?",
        options: &[
            QuizOption { id: "A", text: "RAM", correct: false },
            QuizOption { id: "B", text: "CPU", correct: true },
            QuizOption { id: "C", text: "Hard Drive", correct: false },
            QuizOption { id: "D", text: "Monitor", correct: false },
        ],
    },
    QuizQuestion {
        id: 2,
        grade: "Grade 10",
        lesson_id: "10-1",
        question: "In computer networking, what does 'LAN' stand for?",
        options: &[
            QuizOption { id: "A", text: "Local Area Network", correct: true },
            QuizOption { id: "B", text: "Large Area Network", correct: false },
            QuizOption { id: "C", text: "Link Access Node", correct: false },
            QuizOption { id: "D", text: "Live Access Network", correct: false },
        ],
    },
    QuizQuestion {
        id: 3,
        grade: "Grade 10",
        lesson_id: "10-1",
        question: "Which type of software is an Operating System?",
        options: &[
            QuizOption { id: "A", text: "Application Software", correct: false },
            QuizOption { id: "B", text: "Utility Software", correct: false },
            QuizOption { id: "C", text: "System Software", correct: true },
            QuizOption { id: "D", text: "Malware", correct: false },
        ],
    },
];

/// Questions for a grade, optionally narrowed to one lesson
#[must_use]
pub fn questions_for(grade: &str, lesson_id: Option<&str>) -> Vec<&'static QuizQuestion> {
    QUIZ_QUESTIONS
        .iter()
        .filter(|q| q.grade == grade)
        .filter(|q| lesson_id.map_or(true, |id| q.lesson_id == id))
        .collect()
}

/// Lessons of a grade that have at least one quiz question
#[must_use]
pub fn quizzable_lessons(grade: &str) -> Vec<&'static Lesson> {
    lessons_for(grade)
        .iter()
        .filter(|l| QUIZ_QUESTIONS.iter().any(|q| q.grade == grade && q.lesson_id == l.id))
        .collect()
}

/// Recorded lessons, keyed by sub topic id
const LESSON_AUDIO: &[(&str, &str)] = &[
    ("10-1-1", "lessons/10-1-1-ict-applications.mp3"),
    ("10-1-2", "lessons/10-1-2-evolution-of-computers.mp3"),
    ("10-1-3", "lessons/10-1-3-data-vs-information.mp3"),
    ("10-2-1", "lessons/10-2-1-input-output-devices.mp3"),
    ("10-3-1", "lessons/10-3-1-number-systems.mp3"),
    ("11-9-1", "lessons/11-9-1-ip-url-dns.mp3"),
];

/// Audio for a sub topic, if it has been recorded
#[must_use]
pub fn lesson_audio(sub_topic_id: &str) -> Option<MediaSource> {
    LESSON_AUDIO
        .iter()
        .find(|(id, _)| *id == sub_topic_id)
        .map(|(_, asset)| MediaSource::Asset((*asset).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_by_pin() {
        assert_eq!(student_by_pin("12345").map(|s| s.name), Some("Kasun Perera"));
        assert_eq!(student_by_pin("00000").map(|s| s.id), Some("S003"));
        assert!(student_by_pin("99999").is_none());
    }

    #[test]
    fn test_every_pin_has_the_pin_length() {
        assert!(STUDENTS.iter().all(|s| s.pin.len() == PIN_LENGTH));
    }

    #[test]
    fn test_every_question_has_one_answer() {
        for q in QUIZ_QUESTIONS {
            assert_eq!(q.options.iter().filter(|o| o.correct).count(), 1, "question {}", q.id);
        }
    }

    #[test]
    fn test_lessons_by_grade() {
        assert_eq!(lessons_for("Grade 10").len(), 6);
        assert_eq!(lessons_for("Grade 11").len(), 5);
        assert!(lessons_for("Grade 12").is_empty());
        assert_eq!(lesson("Grade 11", "11-9").map(|l| l.number), Some(9));
    }

    #[test]
    fn test_topic_ids_are_one_based() {
        let ids: Vec<_> = lesson("Grade 10", "10-1")
            .unwrap()
            .topic_entries()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["10-1-1", "10-1-2", "10-1-3"]);
    }

    #[test]
    fn test_quiz_lookups() {
        assert_eq!(questions_for("Grade 10", None).len(), 3);
        assert_eq!(questions_for("Grade 10", Some("10-2")).len(), 0);
        assert!(questions_for("Grade 11", None).is_empty());
        assert_eq!(quizzable_lessons("Grade 10").len(), 1);
        assert_eq!(QUIZ_QUESTIONS[0].answer().map(|o| o.text), Some("CPU"));
    }

    #[test]
    fn test_lesson_audio() {
        assert!(matches!(lesson_audio("10-1-1"), Some(MediaSource::Asset(_))));
        assert!(lesson_audio("10-6-3").is_none());
    }
}
