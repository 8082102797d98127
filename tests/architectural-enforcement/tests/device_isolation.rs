//! Integration Test: Output Device Isolation
//!
//! **Policy**: Only the feedback layer may drive the speech, haptic and tone
//! devices. Everything else (sessions, screens, the media controller) goes
//! through `FeedbackChannel`, which is what guarantees a new utterance
//! always stops the previous one first.
//!
//! **Allowed**: `engine/core/src/feedback/`, `engine/core/src/test_utils.rs`
//! (recording devices) and the crate root's re-exports.

use std::path::Path;

use architectural_enforcement::{all_production_lines, SourceLine};

const DEVICE_TYPES: &[&str] = &["SpeechEngine", "HapticMotor", "TonePlayer", "OutputDevices"];

/// Test that nothing outside the feedback layer names an output device
#[test]
fn test_devices_only_used_by_feedback_layer() {
    let violations: Vec<String> = all_production_lines()
        .iter()
        .filter(|line| !is_allowed(&line.path))
        .filter(|line| names_device(line))
        .map(ToString::to_string)
        .collect();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Output devices used outside the feedback layer!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use FeedbackChannel::speak / haptic / tone instead.");

        panic!(
            "\nFound {} device isolation violation(s).\nFix these before merging!",
            violations.len()
        );
    }
}

fn is_allowed(path: &Path) -> bool {
    let path = path.to_string_lossy().replace('\\', "/");
    path.contains("engine/core/src/feedback/")
        || path.ends_with("engine/core/src/test_utils.rs")
        || path.ends_with("engine/core/src/lib.rs")
}

fn names_device(line: &SourceLine) -> bool {
    DEVICE_TYPES.iter().any(|ty| line.code.contains(ty))
}

#[test]
fn test_allow_list() {
    assert!(is_allowed(Path::new("/w/engine/core/src/feedback/devices.rs")));
    assert!(is_allowed(Path::new("/w/engine/core/src/test_utils.rs")));
    assert!(!is_allowed(Path::new("/w/engine/core/src/session.rs")));
    assert!(!is_allowed(Path::new("/w/screens/src/menu.rs")));
}
