//! Assertions over a finished nvolt process.

use std::process::Output;

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "nvolt exited with {}:\n{}",
        output.status,
        stderr(output)
    );
}

pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "nvolt should have failed, stdout:\n{}",
        stdout(output)
    );
}

fn expect_in(stream: &str, text: &str, needle: &str) {
    assert!(text.contains(needle), "{} missing '{}':\n{}", stream, needle, text);
}

pub fn assert_stdout_contains(output: &Output, needle: &str) {
    expect_in("stdout", &stdout(output), needle);
}

pub fn assert_stderr_contains(output: &Output, needle: &str) {
    expect_in("stderr", &stderr(output), needle);
}

pub fn assert_stdout_excludes(output: &Output, needle: &str) {
    let out = stdout(output);
    assert!(!out.contains(needle), "stdout has '{}':\n{}", needle, out);
}

/// The follow-up command printed after an error.
pub fn assert_hint(output: &Output, command: &str) {
    expect_in("stderr", &stderr(output), &format!("run: {}", command));
}
