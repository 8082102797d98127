//! Quiz screen
//!
//! One question at a time: the question itself plus one region per option.
//! Double tap saves the focused option, triple tap moves on. After the last
//! question the answers are scored and the gestures change meaning: a pass
//! lets a double tap go home, a fail lets a triple tap start over.

use std::collections::HashMap;

use engine_core::{
    FeedbackChannel, ImpactLevel, NotificationKind, Region, RegionSpec, ScreenContext,
    ScreenHandler, ScreenMount, TapGesture,
};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::content::{questions_for, QuizQuestion};
use crate::destination::Destination;

/// Region id of the question text
pub const QUESTION_REGION: &str = "question";

/// Region id of the score shown after finishing
pub const RESULT_REGION: &str = "result";

/// Correct answers needed to pass
pub const DEFAULT_PASS_MARK: usize = 1;

const OPTION_PREFIX: &str = "option-";

/// Where the student is in the quiz
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum QuizPhase {
    /// Answering question `index`
    Answering {
        /// Zero-based question index
        index: usize,
    },
    /// All questions done
    Finished {
        /// Correct answers
        score: usize,
        /// Whether the score reached the pass mark
        passed: bool,
    },
}

/// Quiz over a fixed set of questions
#[derive(Debug)]
pub struct QuizScreen {
    grade: String,
    questions: Vec<&'static QuizQuestion>,
    answers: HashMap<u32, &'static str>,
    phase: QuizPhase,
    pass_mark: usize,
}

impl QuizScreen {
    /// Quiz for a grade, optionally one lesson's questions
    #[must_use]
    pub fn new(grade: &str, lesson_id: Option<&str>) -> Self {
        Self::with_questions(grade, questions_for(grade, lesson_id))
    }

    /// Quiz over explicit questions
    #[must_use]
    pub fn with_questions(grade: &str, questions: Vec<&'static QuizQuestion>) -> Self {
        Self {
            grade: grade.to_string(),
            questions,
            answers: HashMap::new(),
            phase: QuizPhase::Answering { index: 0 },
            pass_mark: DEFAULT_PASS_MARK,
        }
    }

    /// Change the pass mark
    #[must_use]
    pub fn with_pass_mark(mut self, pass_mark: usize) -> Self {
        self.pass_mark = pass_mark;
        self
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// Saved answer (option letter) for a question
    #[must_use]
    pub fn answer(&self, question_id: u32) -> Option<&'static str> {
        self.answers.get(&question_id).copied()
    }

    /// Number of questions
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether there are no questions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn current(&self) -> Option<&'static QuizQuestion> {
        match self.phase {
            QuizPhase::Answering { index } => self.questions.get(index).copied(),
            QuizPhase::Finished { .. } => None,
        }
    }

    fn question_regions(question: &QuizQuestion) -> Vec<RegionSpec> {
        std::iter::once(RegionSpec::new(QUESTION_REGION, question.question))
            .chain(
                question
                    .options
                    .iter()
                    .map(|o| RegionSpec::new(format!("{OPTION_PREFIX}{}", o.id), o.text)),
            )
            .collect()
    }

    fn question_intro(&self, index: usize, question: &QuizQuestion) -> String {
        format!(
            "Question {} of {}. {}. Swipe to hear answers.",
            index + 1,
            self.questions.len(),
            question.question
        )
    }

    fn save_answer(&mut self, focused: Option<&Region>, ctx: &mut ScreenContext<'_>) {
        let Some(question) = self.current() else {
            return;
        };
        let option = focused
            .and_then(|r| r.id.as_str().strip_prefix(OPTION_PREFIX))
            .and_then(|letter| question.option(letter));

        match option {
            Some(option) => {
                debug!(question = question.id, answer = option.id, "Answer saved");
                self.answers.insert(question.id, option.id);
                ctx.feedback().notify(NotificationKind::Success);
                ctx.speak("Your answer is saved. Triple tap to answer next question.");
            }
            None => ctx.hint_select_first(),
        }
    }

    fn advance(&mut self, ctx: &mut ScreenContext<'_>) {
        let QuizPhase::Answering { index } = self.phase else {
            return;
        };
        let next = index + 1;
        match self.questions.get(next) {
            Some(question) => {
                self.phase = QuizPhase::Answering { index: next };
                ctx.replace_regions(Self::question_regions(question));
                ctx.speak(self.question_intro(next, question));
            }
            None => self.finish(ctx),
        }
    }

    fn finish(&mut self, ctx: &mut ScreenContext<'_>) {
        let score = self
            .questions
            .iter()
            .filter(|q| {
                let answer = q.answer().map(|o| o.id);
                answer.is_some() && self.answers.get(&q.id).copied() == answer
            })
            .count();
        let passed = score >= self.pass_mark;
        let total = self.questions.len();
        self.phase = QuizPhase::Finished { score, passed };
        info!(grade = %self.grade, score, total, passed, "Quiz finished");

        ctx.replace_regions(vec![RegionSpec::new(
            RESULT_REGION,
            format!("Your score: {score} out of {total}"),
        )]);
        if passed {
            ctx.speak(format!(
                "You have passed the quiz with {score} out of {total}. Double tap to go home."
            ));
        } else {
            ctx.speak(format!(
                "You have got {score} out of {total}. You need to retry. Triple tap to face the quiz again."
            ));
        }
    }

    fn restart(&mut self, ctx: &mut ScreenContext<'_>) {
        self.answers.clear();
        self.phase = QuizPhase::Answering { index: 0 };
        if let Some(first) = self.questions.first() {
            ctx.replace_regions(Self::question_regions(first));
        }
        ctx.speak("Quiz restarted. Question 1.");
    }
}

impl ScreenHandler for QuizScreen {
    fn mount(&mut self, feedback: &FeedbackChannel) -> ScreenMount {
        let Some(question) = self.current() else {
            feedback.speak(format!("There is no quiz for {} yet.", self.grade));
            return ScreenMount::default();
        };
        if let QuizPhase::Answering { index } = self.phase {
            feedback.speak(self.question_intro(index, question));
        }
        ScreenMount::regions(Self::question_regions(question))
    }

    fn announce_focus(&mut self, region: &Region, feedback: &FeedbackChannel) {
        feedback.impact(ImpactLevel::Medium);
        feedback.speak(region.label.as_str());
    }

    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        focused: Option<&Region>,
        ctx: &mut ScreenContext<'_>,
    ) {
        match (self.phase, gesture) {
            (QuizPhase::Answering { .. }, TapGesture::Double) => self.save_answer(focused, ctx),
            (QuizPhase::Answering { .. }, TapGesture::Triple) => self.advance(ctx),
            (QuizPhase::Finished { passed: true, .. }, TapGesture::Double) => {
                ctx.speak("Going back to home");
                ctx.navigate(
                    Destination::Home {
                        grade: self.grade.clone(),
                    }
                    .to_request(),
                );
            }
            (QuizPhase::Finished { passed: false, .. }, TapGesture::Triple) => self.restart(ctx),
            (phase, gesture) => trace!(?phase, ?gesture, "Gesture ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{RegionId, ScreenCommand};

    fn option(letter: &str) -> Region {
        Region {
            id: RegionId::new(format!("{OPTION_PREFIX}{letter}")),
            label: letter.into(),
            rect: None,
        }
    }

    fn gesture(screen: &mut QuizScreen, gesture: TapGesture, focused: Option<&Region>) -> Vec<ScreenCommand> {
        let (feedback, _rx) = FeedbackChannel::detached();
        let mut ctx = ScreenContext::new(&feedback);
        screen.on_gesture(gesture, focused, &mut ctx);
        ctx.into_commands()
    }

    #[test]
    fn test_mount_lists_question_and_options() {
        let (feedback, _rx) = FeedbackChannel::detached();
        let mount = QuizScreen::new("Grade 10", None).mount(&feedback);
        let ids: Vec<_> = mount.regions.iter().map(|r| r.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["question", "option-A", "option-B", "option-C", "option-D"]);
    }

    #[test]
    fn test_double_tap_on_question_does_not_save() {
        let mut quiz = QuizScreen::new("Grade 10", None);
        let question = Region {
            id: RegionId::new(QUESTION_REGION),
            label: "q".into(),
            rect: None,
        };
        gesture(&mut quiz, TapGesture::Double, Some(&question));
        assert_eq!(quiz.answer(1), None);
    }

    #[test]
    fn test_triple_tap_advances_and_replaces_regions() {
        let mut quiz = QuizScreen::new("Grade 10", None);
        gesture(&mut quiz, TapGesture::Double, Some(&option("B")));
        assert_eq!(quiz.answer(1), Some("B"));

        let commands = gesture(&mut quiz, TapGesture::Triple, None);
        assert_eq!(quiz.phase(), QuizPhase::Answering { index: 1 });
        assert!(matches!(&commands[..], [ScreenCommand::ReplaceRegions(regions)] if regions.len() == 5));
    }

    #[test]
    fn test_pass_then_home() {
        let mut quiz = QuizScreen::new("Grade 10", None);
        gesture(&mut quiz, TapGesture::Double, Some(&option("B")));
        for _ in 0..3 {
            gesture(&mut quiz, TapGesture::Triple, None);
        }
        assert_eq!(quiz.phase(), QuizPhase::Finished { score: 1, passed: true });

        // Triple does nothing once passed
        assert!(gesture(&mut quiz, TapGesture::Triple, None).is_empty());
        let commands = gesture(&mut quiz, TapGesture::Double, None);
        assert!(matches!(&commands[..], [ScreenCommand::Navigate(r)] if r.destination == "Home"));
    }

    #[test]
    fn test_fail_then_restart() {
        let mut quiz = QuizScreen::new("Grade 10", None).with_pass_mark(3);
        gesture(&mut quiz, TapGesture::Double, Some(&option("A")));
        for _ in 0..3 {
            gesture(&mut quiz, TapGesture::Triple, None);
        }
        assert_eq!(quiz.phase(), QuizPhase::Finished { score: 0, passed: false });
        assert!(gesture(&mut quiz, TapGesture::Double, None).is_empty());

        gesture(&mut quiz, TapGesture::Triple, None);
        assert_eq!(quiz.phase(), QuizPhase::Answering { index: 0 });
        assert_eq!(quiz.answer(1), None);
    }

    #[test]
    fn test_empty_quiz_mounts_nothing() {
        let (feedback, _rx) = FeedbackChannel::detached();
        let mut quiz = QuizScreen::new("Grade 11", None);
        assert!(quiz.is_empty());
        assert!(quiz.mount(&feedback).regions.is_empty());
    }
}
