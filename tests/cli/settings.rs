//! Tests for `nvolt config` and `nvolt org`.

use crate::support::*;

#[test]
fn test_config_shows_settings() {
    let t = Test::init();

    let output = t.run(&["config"]);
    assert_success(&output);
    assert_stdout_contains(&output, "http://127.0.0.1:9");
    assert_stdout_contains(&output, "default");
}

#[test]
fn test_config_default_environment() {
    let t = Test::init();

    assert_success(&t.run(&["config", "env", "staging"]));

    let output = t.whoami();
    assert_stdout_contains(&output, "staging");
}

#[test]
fn test_config_server_url() {
    let t = Test::init();

    let output = t.run(&["config", "server", "https://other.example.test/"]);
    assert_success(&output);

    let output = t.whoami();
    assert_stdout_contains(&output, "https://other.example.test");
}

#[test]
fn test_org_clear_without_org() {
    let t = Test::init();

    let output = t.run(&["org", "clear"]);
    assert_success(&output);
    assert_stdout_contains(&output, "cleared");
}
