//! Read slot against SQLite.

use crate::common::*;

fn seeded() -> TestDb {
    let db = TestDb::new();
    db.seed_user("Ada", 36, Some("ada@example.com"));
    db.seed_user("Grace", 30, None);
    db.seed_user("Linus", 30, Some("linus@example.com"));
    db
}

#[test]
fn test_read_by_id_with_columns() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["id", "name"],
                "where": { "eq": { "column": "id", "value": 2 } },
                "limit": 10
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "id": 2, "name": "Grace" }]));
}

#[test]
fn test_and_group_with_null_test() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["name"],
                "where": { "and": [
                    { "eq": { "column": "age", "value": 30 } },
                    { "is-null": { "column": "email" } }
                ]}
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "name": "Grace" }]));
}

#[test]
fn test_order_and_paging() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["name"],
                "order": [{ "column": "name", "direction": "desc" }],
                "limit": 2,
                "offset": 1
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "name": "Grace" }, { "name": "Ada" }]));
}

#[test]
fn test_offset_without_limit() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["id"],
                "order": [{ "column": "id" }],
                "offset": 2
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "id": 3 }]));
}

#[test]
fn test_in_list_and_or() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["name"],
                "where": { "or": [
                    { "in": { "column": "name", "value": ["Ada", "Nobody"] } },
                    { "gt": { "column": "id", "value": 2 } }
                ]},
                "order": [{ "column": "id" }]
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "name": "Ada" }, { "name": "Linus" }]));
}

#[test]
fn test_like_and_not() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["name"],
                "where": [
                    { "like": { "column": "email", "value": "%@example.com" } },
                    { "not": [{ "eq": { "column": "name", "value": "Ada" } }] }
                ]
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "name": "Linus" }]));
}

#[test]
fn test_join_orders_to_users() {
    let db = seeded();
    db.raw("main", "INSERT INTO orders (user_id, total) VALUES (1, 9.5), (3, 20.0)");

    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": {
                    "$value": "orders",
                    "join": {
                        "$value": "users",
                        "on": { "eq": { "column": "orders.user_id", "to": "users.id" } }
                    }
                },
                "columns": ["users.name", "orders.total"],
                "where": { "gte": { "column": "orders.total", "value": 10 } }
            }),
        )
        .unwrap();
    assert_eq!(rows, json!([{ "name": "Linus", "total": 20.0 }]));
}

#[test]
fn test_literal_is_never_interpreted_as_sql() {
    let db = seeded();
    let rows = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "where": { "eq": { "column": "name", "value": "x' OR '1'='1" } }
            }),
        )
        .unwrap();
    assert_eq!(rows, JsonValue::Null);
    assert_eq!(db.count("main", "users"), 3);
}

#[test]
fn test_unknown_table_is_execution_failure() {
    let db = seeded();
    let err = db
        .invoke("sqlite.read", json!({ "connection": "main", "table": "ghosts" }))
        .unwrap_err();
    assert!(matches!(err, Error::ExecutionFailed { ref reason } if reason.contains("ghosts")));
}

#[test]
fn test_invalid_identifier_rejected_before_execution() {
    let db = seeded();
    let err = db
        .invoke(
            "sqlite.read",
            json!({ "connection": "main", "table": "users; DROP TABLE users" }),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier { .. }));
    assert_eq!(db.count("main", "users"), 3);
}
