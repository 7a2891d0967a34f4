//! Transaction slot: nested commands in one scope.

use crate::common::*;

#[test]
fn test_commands_commit_together() {
    let db = TestDb::new();
    let result = db
        .invoke_json(
            "sqlite.transaction",
            json!({
                "connection": "main",
                "commands": [
                    { "sqlite.create": {
                        "connection": "main",
                        "table": "users",
                        "values": { "name": "Ada", "age": 36 }
                    }},
                    { "sqlite.create": {
                        "connection": "main",
                        "table": "orders",
                        "values": { "user_id": 1, "total": 12.5 }
                    }}
                ]
            }),
        )
        .unwrap();

    assert_eq!(
        result["commands"],
        json!([
            { "sqlite.create": { "affected": 1, "id": 1 } },
            { "sqlite.create": { "affected": 1, "id": 1 } }
        ])
    );
    assert_eq!(db.count("main", "users"), 1);
    assert_eq!(db.count("main", "orders"), 1);
}

#[test]
fn test_failing_command_rolls_back_earlier_ones() {
    let db = TestDb::new();
    let err = db
        .invoke(
            "sqlite.transaction",
            json!({
                "connection": "main",
                "commands": [
                    { "sqlite.create": {
                        "connection": "main",
                        "table": "users",
                        "values": { "name": "Ada" }
                    }},
                    { "sqlite.create": {
                        "connection": "main",
                        "table": "orders",
                        "values": { "total": 1.0 }
                    }}
                ]
            }),
        )
        .unwrap_err();

    assert!(matches!(err, Error::ExecutionFailed { .. }));
    assert_eq!(db.count("main", "users"), 0);
    assert_eq!(db.count("main", "orders"), 0);
}

#[test]
fn test_nested_reads_see_uncommitted_writes() {
    let db = TestDb::new();
    let result = db
        .invoke_json(
            "sqlite.transaction",
            json!({
                "connection": "main",
                "commands": [
                    { "sqlite.create": {
                        "connection": "main",
                        "table": "users",
                        "values": { "name": "Ada" }
                    }},
                    { "sqlite.read": {
                        "connection": "main",
                        "table": "users",
                        "columns": ["name"]
                    }}
                ]
            }),
        )
        .unwrap();
    assert_eq!(result["commands"][1]["sqlite.read"], json!([{ "name": "Ada" }]));
}

#[test]
fn test_other_alias_commits_independently() {
    let db = TestDb::new();
    db.invoke(
        "sqlite.transaction",
        json!({
            "connection": "main",
            "commands": [
                { "sqlite.create": {
                    "connection": "main",
                    "table": "users",
                    "values": { "name": "Ada" }
                }},
                { "sqlite.create": {
                    "connection": "audit",
                    "table": "users",
                    "values": { "name": "audit-entry" }
                }}
            ]
        }),
    )
    .unwrap();
    assert_eq!(db.count("main", "users"), 1);
    assert_eq!(db.count("audit", "users"), 1);
}

#[test]
fn test_session_is_clean_after_transaction() {
    let db = TestDb::new();
    let session = db.session();
    let mut tree = node_from_json(
        "sqlite.transaction",
        &json!({
            "connection": "main",
            "commands": [
                { "sqlite.delete": { "connection": "main", "table": "users" } },
                { "sqlite.delete": { "connection": "main", "table": "orders" } }
            ]
        }),
    )
    .unwrap();
    session.invoke("sqlite.transaction", &mut tree).unwrap();

    assert!(session.scopes().is_empty());
    assert_eq!(session.scopes().opened(), 1);
}
