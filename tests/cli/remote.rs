//! Commands that reach the server, against a mock.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::*;

/// Run `args` off the async runtime so the mock keeps serving.
async fn run(t: &Test, args: &[&str]) -> std::process::Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let mut cmd = t.cmd();
    tokio::task::spawn_blocking(move || cmd.args(&args).output().expect("failed to run nvolt"))
        .await
        .expect("command thread panicked")
}

#[tokio::test]
async fn test_orgs_lists_memberships() {
    let server = MockServer::start().await;
    let t = Test::init_with_server(&server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/user/orgs"))
        .and(header("X-Machine-ID", t.machine_id().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orgs": [
                {"org_id": "o1", "org_name": "Acme", "role": "admin"},
                {"org_id": "o2", "org_name": "", "role": "member"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&t, &["orgs"]).await;
    assert_success(&output);
    assert_stdout_contains(&output, "Acme (o1)");
    assert_stdout_contains(&output, "o2");
}

#[tokio::test]
async fn test_push_when_not_enrolled() {
    let server = MockServer::start().await;
    let t = Test::init_with_server(&server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/o1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "machines": [
                {"machine_key_id": "k1", "machine_id": "m-someoneelse", "public_key": "p"}
            ]
        })))
        .mount(&server)
        .await;

    let output = run(&t, &["push", "--org", "o1", "-p", "app", "A=1"]).await;
    assert_failure(&output);
    assert_stderr_contains(&output, "not enrolled");
    assert_hint(&output, "nvolt enrol");
}

#[tokio::test]
async fn test_expired_session_hints_login() {
    let server = MockServer::start().await;
    let t = Test::init_with_server(&server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/user/orgs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let output = run(&t, &["orgs"]).await;
    assert_failure(&output);
    assert_stderr_contains(&output, "401");
    assert_hint(&output, "nvolt login");
}

/// Serve `DB=value` for `o1/app/prod`, sealed for the test machine's key.
async fn serve_single_secret(server: &MockServer, t: &Test, value: &str) {
    use nvolt::core::cipher::{self, MasterKey};

    let private_pem = std::fs::read_to_string(t.config_dir().join("private_key.pem")).unwrap();
    let public_pem = cipher::extract_public_key(&private_pem).unwrap();
    let master = MasterKey::generate();
    let ciphertext = master.encrypt(value.as_bytes()).unwrap();
    let wrapped = cipher::wrap_master_key(&public_pem, &master).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/o1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"machine_key_id": "k1", "machine_id": t.machine_id(), "public_key": public_pem}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/o1/projects/app/environments/prod/secrets/DB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "variables": {"DB": ciphertext},
            "wrapped_key": wrapped
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pull_single_key_to_file() {
    let server = MockServer::start().await;
    let t = Test::init_with_server(&server.uri());
    serve_single_secret(&server, &t, "s3cr3t-value").await;

    let target = t.dir.path().join("out.env");
    let target_arg = target.to_string_lossy().into_owned();
    let output = run(
        &t,
        &["pull", "DB", "--org", "o1", "-p", "app", "-e", "prod", "-o", &target_arg],
    )
    .await;

    assert_success(&output);
    assert_stdout_excludes(&output, "s3cr3t-value");
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "DB=s3cr3t-value\n"
    );
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test]
async fn test_pull_single_key_as_json() {
    let server = MockServer::start().await;
    let t = Test::init_with_server(&server.uri());
    serve_single_secret(&server, &t, "s3cr3t-value").await;

    let output = run(
        &t,
        &["pull", "DB", "--org", "o1", "-p", "app", "-e", "prod", "--json"],
    )
    .await;

    assert_success(&output);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed, json!({"DB": "s3cr3t-value"}));
}
