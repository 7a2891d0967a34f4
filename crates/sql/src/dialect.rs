//! SQL dialects.
//!
//! A [`Dialect`] decides everything that differs between database engines:
//! identifier quoting, placeholder syntax, paging, the default-values insert
//! form, and how to read back the last generated key. Builders never emit
//! engine-specific text themselves.
//!
//! | Dialect | Quoting | Placeholders | Paging |
//! |---------|---------|--------------|--------|
//! | `sqlite` | `"x"` | `?1`, `?2` | `LIMIT n OFFSET m` |
//! | `mysql` | `` `x` `` | `?` | `LIMIT n OFFSET m` |
//! | `pgsql` | `"x"` | `$1`, `$2` | `LIMIT n OFFSET m` |
//! | `mssql` | `[x]` | `@p1`, `@p2` | `TOP n` / `OFFSET m ROWS FETCH NEXT n ROWS ONLY` |

use std::fmt;

/// Row window requested by a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

/// Engine-specific SQL rendering.
///
/// Implementations must only append text derived from validated input:
/// quoted identifier segments, placeholders, and integer literals.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Operation-name prefix selecting this dialect (`"sqlite"` in `"sqlite.read"`).
    fn name(&self) -> &'static str;

    /// Append one quoted identifier segment.
    fn quote(&self, segment: &str, out: &mut String);

    /// Placeholder for the parameter at 1-based `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Text placed right after `SELECT` (MSSQL `TOP n`).
    fn select_prefix(&self, _paging: Paging) -> Option<String> {
        None
    }

    /// Append the paging clause. `ordered` tells whether an `ORDER BY` was emitted.
    fn write_paging(&self, out: &mut String, paging: Paging, ordered: bool);

    /// What follows `INSERT INTO <table> ` when no columns are given.
    fn default_values(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    /// Query returning the key generated by the last insert on the connection.
    fn last_insert_id(&self) -> &'static str;

    /// Text appended to an insert so the same batch selects the generated
    /// key. `None` when [`last_insert_id`](Self::last_insert_id) can run as
    /// a separate statement on the connection.
    fn insert_id_in_batch(&self) -> Option<&'static str> {
        None
    }
}

fn write_limit_offset(out: &mut String, paging: Paging, unbounded: Option<&str>) {
    match (paging.limit, paging.offset) {
        (Some(limit), _) => {
            out.push_str(" LIMIT ");
            out.push_str(&limit.to_string());
        }
        (None, Some(_)) => {
            if let Some(all) = unbounded {
                out.push_str(" LIMIT ");
                out.push_str(all);
            }
        }
        (None, None) => {}
    }
    if let Some(offset) = paging.offset {
        out.push_str(" OFFSET ");
        out.push_str(&offset.to_string());
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote(&self, segment: &str, out: &mut String) {
        out.push('"');
        out.push_str(segment);
        out.push('"');
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }

    fn write_paging(&self, out: &mut String, paging: Paging, _ordered: bool) {
        // OFFSET is only valid after a LIMIT; -1 means no limit.
        write_limit_offset(out, paging, Some("-1"));
    }

    fn last_insert_id(&self) -> &'static str {
        "SELECT last_insert_rowid()"
    }
}

/// MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, segment: &str, out: &mut String) {
        out.push('`');
        out.push_str(segment);
        out.push('`');
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn write_paging(&self, out: &mut String, paging: Paging, _ordered: bool) {
        write_limit_offset(out, paging, Some("18446744073709551615"));
    }

    fn default_values(&self) -> &'static str {
        "() VALUES ()"
    }

    fn last_insert_id(&self) -> &'static str {
        "SELECT LAST_INSERT_ID()"
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "pgsql"
    }

    fn quote(&self, segment: &str, out: &mut String) {
        out.push('"');
        out.push_str(segment);
        out.push('"');
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn write_paging(&self, out: &mut String, paging: Paging, _ordered: bool) {
        write_limit_offset(out, paging, None);
    }

    fn last_insert_id(&self) -> &'static str {
        "SELECT lastval()"
    }
}

/// Microsoft SQL Server.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSql;

impl Dialect for MsSql {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn quote(&self, segment: &str, out: &mut String) {
        out.push('[');
        out.push_str(segment);
        out.push(']');
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{}", index)
    }

    fn select_prefix(&self, paging: Paging) -> Option<String> {
        match paging {
            Paging {
                limit: Some(limit),
                offset: None,
            } => Some(format!("TOP {}", limit)),
            _ => None,
        }
    }

    fn write_paging(&self, out: &mut String, paging: Paging, ordered: bool) {
        let Some(offset) = paging.offset else {
            return;
        };
        // OFFSET/FETCH requires an ORDER BY clause.
        if !ordered {
            out.push_str(" ORDER BY (SELECT NULL)");
        }
        out.push_str(" OFFSET ");
        out.push_str(&offset.to_string());
        out.push_str(" ROWS");
        if let Some(limit) = paging.limit {
            out.push_str(" FETCH NEXT ");
            out.push_str(&limit.to_string());
            out.push_str(" ROWS ONLY");
        }
    }

    fn last_insert_id(&self) -> &'static str {
        "SELECT SCOPE_IDENTITY()"
    }

    // SCOPE_IDENTITY() only sees the batch it runs in, and a parametrized
    // insert is its own batch.
    fn insert_id_in_batch(&self) -> Option<&'static str> {
        Some("; SELECT SCOPE_IDENTITY()")
    }
}

static DIALECTS: [&dyn Dialect; 4] = [&Sqlite, &MySql, &Postgres, &MsSql];

/// All built-in dialects.
pub fn all() -> &'static [&'static dyn Dialect] {
    &DIALECTS
}

/// Find a built-in dialect by operation-name prefix.
pub fn lookup(name: &str) -> Option<&'static dyn Dialect> {
    DIALECTS.iter().copied().find(|d| d.name() == name)
}
