//! Build-only mode: SQL is returned and nothing runs.

use crate::common::*;

#[test]
fn test_build_only_read_returns_sql_and_parameters() {
    let db = TestDb::new();
    let result = db
        .invoke_json(
            "sqlite.read",
            json!({
                "connection": "main",
                "table": "users",
                "columns": ["id", "name"],
                "where": { "eq": { "column": "id", "value": 42 } },
                "limit": 10,
                "generate-only": true
            }),
        )
        .unwrap();
    assert_eq!(
        result,
        json!({
            "$value": "SELECT \"id\", \"name\" FROM \"users\" WHERE \"id\" = ?1 LIMIT 10",
            "?1": 42
        })
    );
}

#[test]
fn test_build_only_delete_leaves_rows() {
    let db = TestDb::new();
    db.seed_user("Ada", 36, None);

    db.invoke(
        "sqlite.delete",
        json!({ "connection": "main", "table": "users", "generate-only": true }),
    )
    .unwrap();
    assert_eq!(db.count("main", "users"), 1);
}

#[test]
fn test_build_only_needs_no_configured_alias() {
    let db = TestDb::new();
    let tree = db
        .invoke(
            "mssql.update",
            json!({
                "connection": "nowhere",
                "table": "dbo.users",
                "values": { "name": "Ada" },
                "where": { "eq": { "column": "id", "value": 1 } },
                "generate-only": true
            }),
        )
        .unwrap();
    assert_eq!(
        tree.value_str(),
        Some("UPDATE [dbo].[users] SET [name] = @p1 WHERE [id] = @p2")
    );
    assert_eq!(
        tree.children,
        vec![Node::with_value("@p1", "Ada"), Node::with_value("@p2", 1i64)]
    );
}

#[test]
fn test_mysql_placeholders_repeat() {
    let db = TestDb::new();
    let tree = db
        .invoke(
            "mysql.create",
            json!({
                "connection": "main",
                "table": "users",
                "values": { "name": "Ada", "age": 36 },
                "generate-only": true
            }),
        )
        .unwrap();
    assert_eq!(
        tree.value_str(),
        Some("INSERT INTO `users` (`name`, `age`) VALUES (?, ?)")
    );
    // Placeholder names repeat, so the JSON form keeps them as a list.
    assert_eq!(
        node_to_json(&tree),
        json!({
            "$value": "INSERT INTO `users` (`name`, `age`) VALUES (?, ?)",
            "$children": [{ "?": "Ada" }, { "?": 36 }]
        })
    );
}
