//! Tests for error reporting.

use crate::support::*;

#[test]
fn test_whoami_before_init() {
    let t = Test::new();

    let output = t.whoami();
    assert_failure(&output);
    assert_stderr_contains(&output, "not initialized");
    assert_hint(&output, "nvolt init");
}

#[test]
fn test_push_before_init() {
    let t = Test::new();

    let output = t.run(&["push", "--org", "o1", "-p", "app", "A=1"]);
    assert_failure(&output);
    assert_hint(&output, "nvolt init");
}

#[test]
fn test_push_rejects_malformed_pair() {
    let t = Test::init();

    let output = t.run(&["push", "--org", "o1", "-p", "app", "NOT_A_PAIR"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "KEY=VALUE");
}

#[test]
fn test_half_initialized_identity() {
    let t = Test::init();
    std::fs::remove_file(t.config_dir().join("private_key.pem")).unwrap();

    let output = t.whoami();
    assert_failure(&output);
    assert_stderr_contains(&output, "private_key.pem");
}

#[test]
fn test_enrol_flags_go_together() {
    let t = Test::init();

    let output = t.run(&["enrol", "--org", "o1", "--machine-id", "m-x"]);
    assert_failure(&output);
}
