//! Sessions on several threads sharing one registry.

use std::sync::Arc;
use std::thread;

use sluice::{dialect, ScopeOutcome};

use crate::common::*;

#[test]
fn test_sessions_share_pools_across_threads() {
    let db = Arc::new(TestDb::new());
    db.seed_user("Ada", 36, None);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                (0..10)
                    .map(|_| {
                        db.invoke_json(
                            "sqlite.read",
                            json!({ "connection": "main", "table": "users", "columns": ["name"] }),
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .collect();

    for handle in handles {
        for rows in handle.join().unwrap().unwrap() {
            assert_eq!(rows, json!([{ "name": "Ada" }]));
        }
    }
    let pool = db.registry.pool("sqlite", "main").unwrap();
    assert!(pool.open_connections() <= 4);
}

#[test]
fn test_exhausted_pool_reports_alias() {
    let db = TestDb::with_pool(1, 50);
    let holder = db.session();
    let sqlite = dialect::lookup("sqlite").unwrap();
    let mut held = holder.scopes().acquire(sqlite, "main").unwrap();

    let err = db
        .invoke("sqlite.read", json!({ "connection": "main", "table": "users" }))
        .unwrap_err();
    assert!(matches!(err, Error::PoolExhausted { ref alias, .. } if alias == "main"));

    held.release(ScopeOutcome::Success).unwrap();
    assert!(db
        .invoke("sqlite.read", json!({ "connection": "main", "table": "users" }))
        .is_ok());
}
