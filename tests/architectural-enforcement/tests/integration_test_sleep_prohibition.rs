//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Tap windows,
//! measurement retries and scroll-follow repeats are deadlines reported by
//! `next_deadline()`; the runtime waits on its input channel and
//! `sleep_until(deadline)` together in one `select!`.
//!
//! **Exceptions**: test code (`#[cfg(test)]` modules and `tests/`).

use architectural_enforcement::{all_production_lines, SourceLine};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations(&all_production_lines());

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE waits:");
        eprintln!("  - tokio::time::sleep_until(deadline) inside the runtime's select!");
        eprintln!("  - Test code (#[cfg(test)] modules, tests/ directories)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleeping out a tap window or a measurement retry");
        eprintln!("  - Sleep as poor man's synchronization with the feedback task");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_sleep_violations(lines: &[SourceLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| is_sleep_call(&line.code))
        .map(ToString::to_string)
        .collect()
}

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(") || code.contains(" sleep(")
}

#[test]
fn test_sleep_violation_detection() {
    assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("    std::thread::sleep(delay);"));
    assert!(!is_sleep_call(
        "        Some(deadline) => tokio::time::sleep_until(deadline).await,"
    ));
}
