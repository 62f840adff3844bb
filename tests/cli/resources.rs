use predicates::prelude::*;

use crate::{TestServer, sisense, write_config};

const USERS: &str = r#"[
    {"_id": "u1", "userName": "ann", "firstName": "Ann", "lastName": "Lee",
     "email": "ann@example.com", "active": true,
     "role": {"_id": "r1", "name": "consumer"},
     "groups": [{"_id": "g0", "name": "Everyone"}, {"_id": "g1", "name": "Sales"}]},
    {"_id": "u2", "userName": "bob", "firstName": "Bob",
     "email": "bob@example.com", "active": false,
     "role": {"_id": "r2", "name": "super"}, "groups": []}
]"#;

#[test]
fn user_ls_as_table() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![(200, USERS)]);
    write_config(dir.path(), server.port());

    sisense(dir.path())
        .args(["user", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("USER_NAME"))
        .stdout(predicate::str::contains("ann@example.com"))
        .stdout(predicate::str::contains("sysAdmin"));

    let received = server.received();
    assert_eq!(received[0].uri, "/api/v1/users?expand=groups%2Crole");
}

#[test]
fn user_ls_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![(200, USERS)]);
    write_config(dir.path(), server.port());
    let csv = dir.path().join("users.csv");

    sisense(dir.path())
        .args(["user", "ls", "--csv"])
        .arg(&csv)
        .assert()
        .success();
    assert_eq!(server.received().len(), 1);

    let contents = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "USER_ID,USER_NAME,FIRST_NAME,LAST_NAME,EMAIL,IS_ACTIVE,ROLE_ID,ROLE_NAME,GROUPS"
    );
    assert_eq!(
        lines[1],
        r#"u1,ann,Ann,Lee,ann@example.com,true,r1,viewer,"[""Sales""]""#
    );
    assert_eq!(lines.len(), 3);

    let log = std::fs::read_to_string(dir.path().join("client.log")).unwrap();
    assert!(log.contains("Data successfully exported to"), "{log}");
}

#[test]
fn unknown_user_fails() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![(200, USERS)]);
    write_config(dir.path(), server.port());

    sisense(dir.path())
        .args(["user", "get", "nobody@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User 'nobody@example.com' not found"));
    assert_eq!(server.received().len(), 1);
}

#[test]
fn schedule_rejects_bad_hour() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), crate::closed_port());

    sisense(dir.path())
        .args(["datamodel", "schedule", "Sales", "--day", "MON", "--hour", "24", "--minute", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hour must be between 0 and 23"));
}

const EXPORT: &str = r#"[{
    "title": "Revenue",
    "filters": [{"jaql": {"table": "regions", "column": "code"}}],
    "widgets": [{"oid": "w1", "metadata": {"panels": [{"items": [
        {"jaql": {"table": "orders", "column": "total"}},
        {"jaql": {"table": "regions", "column": "code"}}
    ]}]}}]
}]"#;

#[test]
fn dashboard_columns_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![
        (200, r#"{"items": [{"oid": "d1", "title": "Revenue"}]}"#),
        (200, EXPORT),
    ]);
    write_config(dir.path(), server.port());

    let out = sisense(dir.path())
        .args(["-O", "json", "dashboard", "columns", "Revenue"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let columns: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(columns.as_array().unwrap().len(), 2);
    assert_eq!(columns[0]["source"], "filter");
    assert_eq!(columns[1]["widget_id"], "w1");
    assert_eq!(columns[1]["column"], "total");

    let received = server.received();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].uri, "/api/v1/dashboards/searches");
    assert_eq!(received[0].json()["queryParams"]["search"], "Revenue");
    assert_eq!(
        received[1].uri,
        "/api/v1/dashboards/export?dashboardIds=d1&adminAccess=true"
    );
}

#[test]
fn folder_chown_folders_only() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(vec![
        (
            200,
            r#"{"folders": [{"oid": "f1", "name": "Finance",
                "folders": [{"oid": "f2", "name": "Reports"}]}]}"#,
        ),
        (200, USERS),
        (200, r#"{"owner": "u2"}"#),
        (200, r#"{"owner": "u2"}"#),
    ]);
    write_config(dir.path(), server.port());

    sisense(dir.path())
        .args(["-O", "json", "folder", "chown", "Reports"])
        .args(["--owner", "bob@example.com", "--as", "ann@example.com", "--folders-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"folders_changed":2,"dashboards_changed":0}"#,
        ))
        .stderr(predicate::str::contains(
            "Changed owner of 2 folders and 0 dashboards to bob@example.com",
        ));

    let received = server.received();
    assert_eq!(received.len(), 4);
    assert_eq!(received[2].method, "PATCH");
    assert_eq!(received[2].uri, "/api/v1/folders/f1");
    assert_eq!(received[3].uri, "/api/v1/folders/f2");
    assert_eq!(received[3].json()["owner"], "u2");
}
