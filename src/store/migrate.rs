//! Versioned schema migrations, tracked through SQLite's `user_version`
//! pragma. Stores run their migration list once when they open, so a
//! database created by any older build upgrades in place before the first
//! query. Column additions go through [`add_column`], which consults
//! `pragma table_info` instead of guessing from driver errors.

use rusqlite::Connection;

use crate::error::Result;

pub struct Migration {
    pub version: i64,
    pub apply: fn(&Connection) -> Result<()>,
}

pub fn run(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    for migration in migrations {
        if migration.version <= current {
            continue;
        }
        (migration.apply)(conn)?;
        conn.pragma_update(None, "user_version", migration.version)?;
        tracing::debug!("applied schema migration v{}", migration.version);
    }
    Ok(())
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn add_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    if !has_column(conn, table, column)? {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"), [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_is_idempotent() {
        fn v1(conn: &Connection) -> Result<()> {
            conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", [])?;
            Ok(())
        }
        fn v2(conn: &Connection) -> Result<()> {
            add_column(conn, "t", "extra", "TEXT")
        }

        let migrations = [
            Migration { version: 1, apply: v1 },
            Migration { version: 2, apply: v2 },
        ];

        let conn = Connection::open_in_memory().unwrap();
        run(&conn, &migrations).unwrap();
        run(&conn, &migrations).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
        assert!(has_column(&conn, "t", "extra").unwrap());
    }

    #[test]
    fn test_add_column_tolerates_existing() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, extra TEXT)", [])
            .unwrap();
        add_column(&conn, "t", "extra", "TEXT").unwrap();
        assert!(has_column(&conn, "t", "extra").unwrap());
    }
}
