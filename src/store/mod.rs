//! SQLite-backed repositories. Each store owns one table family in its own
//! database file and serializes access through a connection mutex; SQLite's
//! WAL mode handles write locking across handles.

mod cart;
mod content;
mod migrate;
mod orders;
mod products;
mod users;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ToSql};

pub use cart::CartStore;
pub use content::ContentStore;
pub use orders::{ItemOrderStore, NewItemOrder, OrderStore};
pub use products::ProductStore;
pub use users::UserStore;

use crate::error::{Error, Result};

pub(crate) fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(conn)
}

pub(crate) fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's CURRENT_TIMESTAMP format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Collected column assignments for an admin PATCH. Handlers decide which
/// fields were actually present in the request; this type turns them into one
/// parameterized UPDATE.
#[derive(Default)]
pub struct SqlPatch {
    sets: Vec<(&'static str, Box<dyn ToSql + Send>)>,
}

impl SqlPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: ToSql + Send + 'static>(&mut self, column: &'static str, value: T) -> &mut Self {
        self.sets.push((column, Box::new(value)));
        self
    }

    pub fn set_if<T: ToSql + Send + 'static>(
        &mut self,
        column: &'static str,
        value: Option<T>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub(crate) fn apply(&self, conn: &Connection, table: &str, id: i64) -> Result<()> {
        if self.sets.is_empty() {
            return Ok(());
        }
        let clause = self
            .sets
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {table} SET {clause} WHERE id = ?");

        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(self.sets.len() + 1);
        for (_, value) in &self.sets {
            params.push(value.as_ref());
        }
        params.push(&id);

        let rows = conn.execute(&sql, rusqlite::params_from_iter(params))?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
