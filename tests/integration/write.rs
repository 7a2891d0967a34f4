//! Create, update and delete slots against SQLite.

use crate::common::*;

#[test]
fn test_create_returns_generated_id() {
    let db = TestDb::new();
    db.seed_user("Ada", 36, None);

    let result = db
        .invoke_json(
            "sqlite.create",
            json!({
                "connection": "main",
                "table": "users",
                "values": { "name": "Grace", "age": 30, "email": null }
            }),
        )
        .unwrap();
    assert_eq!(result, json!({ "affected": 1, "id": 2 }));
    assert_eq!(
        db.column("main", "SELECT name FROM users WHERE id = 2"),
        vec![Value::from("Grace")]
    );
}

#[test]
fn test_create_without_return_id() {
    let db = TestDb::new();
    let result = db
        .invoke_json(
            "sqlite.create",
            json!({
                "connection": "main",
                "table": "users",
                "values": { "name": "Grace" },
                "return-id": false
            }),
        )
        .unwrap();
    assert_eq!(result, json!({ "affected": 1 }));
}

#[test]
fn test_create_binds_datetime_and_bytes() {
    let db = TestDb::new();
    db.invoke(
        "sqlite.create",
        json!({
            "connection": "main",
            "table": "users",
            "values": {
                "name": { "$bytes": "QWRh" },
                "created": { "$datetime": "2024-05-01T12:00:00+00:00" }
            }
        }),
    )
    .unwrap();
    assert_eq!(
        db.column("main", "SELECT created FROM users"),
        vec![Value::from("2024-05-01T12:00:00+00:00")]
    );
    assert_eq!(
        db.column("main", "SELECT name FROM users"),
        vec![Value::Bytes(b"Ada".to_vec())]
    );
}

#[test]
fn test_constraint_violation_propagates_native_text() {
    let db = TestDb::new();
    let err = db
        .invoke(
            "sqlite.create",
            json!({ "connection": "main", "table": "users", "values": { "age": 3 } }),
        )
        .unwrap_err();
    assert!(matches!(err, Error::ExecutionFailed { ref reason } if reason.contains("NOT NULL")));
    assert_eq!(db.count("main", "users"), 0);
}

#[test]
fn test_update_reports_affected_rows() {
    let db = TestDb::new();
    db.seed_user("Ada", 36, None);
    db.seed_user("Grace", 30, None);
    db.seed_user("Linus", 30, None);

    let result = db
        .invoke_json(
            "sqlite.update",
            json!({
                "connection": "main",
                "table": "users",
                "values": { "email": "team@example.com" },
                "where": { "eq": { "column": "age", "value": 30 } }
            }),
        )
        .unwrap();
    assert_eq!(result, json!({ "affected": 2 }));
    assert_eq!(
        db.column("main", "SELECT count(*) FROM users WHERE email IS NOT NULL"),
        vec![Value::Int(2)]
    );
}

#[test]
fn test_update_with_empty_values_rejected() {
    let db = TestDb::new();
    let err = db
        .invoke(
            "sqlite.update",
            json!({ "connection": "main", "table": "users", "values": {} }),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgumentShape { ref key, .. } if key == "values"));
}

#[test]
fn test_delete_with_filter() {
    let db = TestDb::new();
    db.seed_user("Ada", 36, None);
    db.seed_user("Grace", 30, None);

    let result = db
        .invoke_json(
            "sqlite.delete",
            json!({
                "connection": "main",
                "table": "users",
                "where": { "lt": { "column": "age", "value": 35 } }
            }),
        )
        .unwrap();
    assert_eq!(result, json!({ "affected": 1 }));
    assert_eq!(db.count("main", "users"), 1);
}

#[test]
fn test_unknown_connection_alias() {
    let db = TestDb::new();
    let err = db
        .invoke("sqlite.delete", json!({ "connection": "replica", "table": "users" }))
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnknownConnection {
            dialect: "sqlite".into(),
            alias: "replica".into()
        }
    );
}

#[test]
fn test_dialect_without_connector() {
    let db = TestDb::new();
    let err = db
        .invoke("pgsql.delete", json!({ "connection": "main", "table": "users" }))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownConnection { .. } | Error::NoConnector { .. }));
    assert!(err.is_pre_execution());
}
