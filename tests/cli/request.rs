use predicates::prelude::*;

use crate::{TestServer, closed_port, sisense, write_config};

#[test]
fn unsupported_method_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), closed_port());

    sisense(dir.path())
        .args(["request", "OPTIONS", "/api/v1/users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported HTTP method: OPTIONS"));

    let log = std::fs::read_to_string(dir.path().join("client.log")).unwrap_or_default();
    assert!(!log.contains("Making"), "{log}");
}

#[test]
fn connection_refused_fails() {
    let dir = tempfile::tempdir().unwrap();
    let port = closed_port();
    write_config(dir.path(), port);

    sisense(dir.path())
        .args(["request", "GET", "/api/v1/users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!(
            "GET request to http://127.0.0.1:{port}/api/v1/users failed"
        )));

    let log = std::fs::read_to_string(dir.path().join("client.log")).unwrap();
    assert!(log.contains("ERROR"), "{log}");
}

#[test]
fn get_with_query() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![(200, r#"[{"name": "Sales"}, {"name": "Ops"}]"#)]);
    write_config(dir.path(), server.port());

    sisense(dir.path())
        .args(["-O", "json", "request", "get", "/api/v1/groups"])
        .args(["-q", "fields=name", "-q", "fields=_id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"[{"name":"Sales"},{"name":"Ops"}]"#));

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, "GET");
    assert_eq!(received[0].uri.path(), "/api/v1/groups");
    assert_eq!(received[0].uri.query(), Some("fields=name&fields=_id"));
    assert_eq!(received[0].headers["authorization"], "Bearer cli-secret");
    assert!(received[0].body.is_empty());

    let log = std::fs::read_to_string(dir.path().join("client.log")).unwrap();
    assert!(log.contains("succeeded with status code 200"), "{log}");
    assert!(!log.contains("cli-secret"));
}

#[test]
fn post_sends_payload() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![(201, r#"{"_id": "g9", "name": "Finance"}"#)]);
    write_config(dir.path(), server.port());

    sisense(dir.path())
        .args(["request", "POST", "/api/v1/groups", "-d", r#"{"name": "Finance"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Finance"));

    let received = server.received();
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].uri, "/api/v1/groups");
    assert_eq!(received[0].headers["content-type"], "application/json");
    assert_eq!(received[0].body, r#"{"name":"Finance"}"#);

    let log = std::fs::read_to_string(dir.path().join("client.log")).unwrap();
    assert!(log.contains("(Created)"), "{log}");
}

#[test]
fn auth_error_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![(401, r#"{"error": "invalid token"}"#)]);
    write_config(dir.path(), server.port());

    sisense(dir.path())
        .args(["request", "GET", "/api/v1/users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Request failed with status 401"));
    assert_eq!(server.received().len(), 1);

    let log = std::fs::read_to_string(dir.path().join("client.log")).unwrap();
    assert!(log.contains("failed with status code 401: invalid token"), "{log}");
}

#[test]
fn invalid_payload_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), closed_port());

    sisense(dir.path())
        .args(["request", "POST", "/api/v1/groups", "-d", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON payload"));
}
