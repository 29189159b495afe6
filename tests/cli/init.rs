//! Tests for `nvolt init` and `nvolt whoami`.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_init_creates_identity_files() {
    let t = Test::new();

    let output = t.init_cmd();
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");

    assert!(t.config_dir().join("private_key.pem").exists());
    assert!(t.config_dir().join("config.json").exists());
    assert!(t.machine_id().starts_with("m-"));
}

#[cfg(unix)]
#[test]
fn test_init_files_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::init();
    for file in ["private_key.pem", "config.json"] {
        let mode = std::fs::metadata(t.config_dir().join(file))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600, "{} should be 0600", file);
    }
}

#[test]
fn test_init_records_server_url() {
    let t = Test::init_with_server("https://secrets.example.test/");

    let output = t.whoami();
    assert_success(&output);
    assert_stdout_contains(&output, "https://secrets.example.test");
}

#[test]
fn test_second_init_keeps_identity() {
    let t = Test::init();
    let machine_id = t.machine_id();

    let output = t.init_cmd();
    assert_success(&output);
    assert_stderr_contains(&output, "already initialized");
    assert_eq!(t.machine_id(), machine_id);
}

#[test]
fn test_whoami_shows_identity() {
    let t = Test::init();

    let output = t.whoami();
    assert_success(&output);
    assert_stdout_contains(&output, &t.machine_id());
    assert_stdout_contains(&output, "logged out");
    assert_stdout_contains(&output, "default");
}

#[test]
fn test_whoami_public_key() {
    let t = Test::init();

    let output = t.run(&["whoami", "--public-key"]);
    assert_success(&output);
    assert_stdout_contains(&output, "-----BEGIN PUBLIC KEY-----");
    assert_stdout_excludes(&output, "PRIVATE");
}

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn test_pull_output_conflicts_with_json() {
    let t = Test::init();

    t.cmd()
        .args(["pull", "--json", "--output", ".env"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
