//! PIN login
//!
//! A 12-key pad (1-9, Clear, 0, OK). Keys activate on a quick second press
//! of the focused key, so the pad uses [`TapPolicy::Immediate`] and never
//! waits for a triple tap. The entered PIN lives only in this screen and is
//! dropped with it.

use engine_core::{
    FeedbackChannel, NotificationKind, Region, RegionSpec, ScreenContext, ScreenHandler,
    ScreenMount, SessionPolicy, TapGesture, TapPolicy,
};
use tracing::{debug, info, trace};

use crate::content::{student_by_pin, Student, PIN_LENGTH};
use crate::destination::Destination;

/// Pad keys in layout order
pub const PAD_KEYS: [&str; 12] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "Clear", "0", "OK"];

/// Clear key id
pub const CLEAR_KEY: &str = "Clear";

/// Submit key id
pub const OK_KEY: &str = "OK";

const WELCOME: &str = "Hi. Welcome to vision Bridge. Enter your student pin to login. \
                       Swipe through the screen to type numbers. Double tap to enter the number.";

/// PIN entry screen
#[derive(Debug, Default)]
pub struct PinLoginScreen {
    pin: String,
    student: Option<&'static Student>,
}

impl PinLoginScreen {
    /// Empty pad
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Digits entered so far
    #[must_use]
    pub fn digits_entered(&self) -> usize {
        self.pin.len()
    }

    /// The student who logged in, once OK matched
    #[must_use]
    pub fn student(&self) -> Option<&'static Student> {
        self.student
    }

    /// Apply one activated key
    pub fn press_key(&mut self, key: &str, ctx: &mut ScreenContext<'_>) {
        match key {
            CLEAR_KEY => {
                self.pin.clear();
                ctx.speak("Cleared");
            }
            OK_KEY => self.submit(ctx),
            digit if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) => {
                self.push_digit(digit, ctx);
            }
            other => trace!(key = other, "Not a pad key"),
        }
    }

    fn push_digit(&mut self, digit: &str, ctx: &mut ScreenContext<'_>) {
        if self.pin.len() >= PIN_LENGTH {
            ctx.speak("PIN is full. Select OK.");
            return;
        }
        self.pin.push_str(digit);
        if self.pin.len() == PIN_LENGTH {
            ctx.speak(format!("{digit}. PIN complete. Select OK to login"));
        } else {
            ctx.speak(digit);
        }
    }

    fn submit(&mut self, ctx: &mut ScreenContext<'_>) {
        if self.pin.len() < PIN_LENGTH {
            ctx.speak(format!(
                "PIN incomplete. You have entered {} digits.",
                self.pin.len()
            ));
            return;
        }

        match student_by_pin(&self.pin) {
            Some(student) => {
                info!(student = student.id, "Student logged in");
                self.student = Some(student);
                ctx.feedback().notify(NotificationKind::Success);
                ctx.speak(format!("Welcome {}", student.name));
                ctx.navigate(
                    Destination::Home {
                        grade: student.grade.to_string(),
                    }
                    .to_request(),
                );
            }
            None => {
                debug!("PIN rejected");
                ctx.feedback().notify(NotificationKind::Error);
                ctx.speak("Incorrect PIN. Cleared.");
            }
        }
        self.pin.clear();
    }
}

impl ScreenHandler for PinLoginScreen {
    fn mount(&mut self, feedback: &FeedbackChannel) -> ScreenMount {
        feedback.speak(WELCOME);
        ScreenMount::regions(PAD_KEYS.iter().map(|key| RegionSpec::labelled(*key)).collect())
            .with_policy(SessionPolicy::new().with_tap_policy(TapPolicy::Immediate))
    }

    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        focused: Option<&Region>,
        ctx: &mut ScreenContext<'_>,
    ) {
        match (gesture, focused) {
            (TapGesture::Double, Some(key)) => self.press_key(key.id.as_str(), ctx),
            (TapGesture::Double, None) => ctx.hint_select_first(),
            (TapGesture::Triple, _) => trace!("Triple tap ignored on the pad"),
        }
    }

    fn unmount(&mut self, _feedback: &FeedbackChannel) {
        self.pin.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{FeedbackRequest, ScreenCommand};
    use pretty_assertions::assert_eq;

    fn press(screen: &mut PinLoginScreen, keys: &[&str]) -> (Vec<String>, Vec<ScreenCommand>) {
        let (feedback, mut rx) = FeedbackChannel::detached();
        let mut ctx = ScreenContext::new(&feedback);
        for key in keys {
            screen.press_key(key, &mut ctx);
        }
        let commands = ctx.into_commands();
        let mut spoken = Vec::new();
        while let Ok(request) = rx.try_recv() {
            if let FeedbackRequest::Speak { text, .. } = request {
                spoken.push(text);
            }
        }
        (spoken, commands)
    }

    #[test]
    fn test_digits_are_spoken_until_complete() {
        let mut screen = PinLoginScreen::new();
        let (spoken, _) = press(&mut screen, &["5", "4", "3", "2", "1"]);
        assert_eq!(
            spoken,
            vec!["5", "4", "3", "2", "1. PIN complete. Select OK to login"]
        );
        assert_eq!(screen.digits_entered(), 5);

        let (spoken, _) = press(&mut screen, &["9"]);
        assert_eq!(spoken, vec!["PIN is full. Select OK."]);
        assert_eq!(screen.digits_entered(), 5);
    }

    #[test]
    fn test_ok_with_incomplete_pin() {
        let mut screen = PinLoginScreen::new();
        let (spoken, commands) = press(&mut screen, &["1", "2", OK_KEY]);
        assert_eq!(spoken.last().map(String::as_str), Some("PIN incomplete. You have entered 2 digits."));
        assert!(commands.is_empty());
        assert_eq!(screen.digits_entered(), 2);
    }

    #[test]
    fn test_matching_pin_logs_in() {
        let mut screen = PinLoginScreen::new();
        let (spoken, commands) = press(&mut screen, &["5", "4", "3", "2", "1", OK_KEY]);

        assert_eq!(spoken.last().map(String::as_str), Some("Welcome Amara Silva"));
        assert_eq!(screen.student().map(|s| s.id), Some("S002"));
        assert_eq!(
            commands,
            vec![ScreenCommand::Navigate(
                Destination::Home {
                    grade: "Grade 11".into()
                }
                .to_request()
            )]
        );
    }

    #[test]
    fn test_wrong_pin_clears() {
        let mut screen = PinLoginScreen::new();
        let (spoken, commands) = press(&mut screen, &["1", "1", "1", "1", "1", OK_KEY]);
        assert_eq!(spoken.last().map(String::as_str), Some("Incorrect PIN. Cleared."));
        assert!(commands.is_empty());
        assert_eq!(screen.digits_entered(), 0);
        assert!(screen.student().is_none());
    }

    #[test]
    fn test_clear_key() {
        let mut screen = PinLoginScreen::new();
        let (spoken, _) = press(&mut screen, &["7", CLEAR_KEY]);
        assert_eq!(spoken, vec!["7", "Cleared"]);
        assert_eq!(screen.digits_entered(), 0);
    }

    #[test]
    fn test_pad_uses_immediate_taps() {
        let (feedback, _rx) = FeedbackChannel::detached();
        let mount = PinLoginScreen::new().mount(&feedback);
        assert_eq!(mount.regions.len(), 12);
        assert_eq!(mount.policy.tap_policy, Some(TapPolicy::Immediate));
    }
}
