use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::{SqlPatch, lock, open_connection};
use crate::error::{Error, Result};
use crate::types::ContentEntry;

/// News and articles share one shape and one store implementation; only the
/// backing file and table name differ.
pub struct ContentStore {
    conn: Mutex<Connection>,
    table: &'static str,
}

impl ContentStore {
    pub fn open_news<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, "news")
    }

    pub fn open_articles<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, "articles")
    }

    fn open<P: AsRef<Path>>(path: P, table: &'static str) -> Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                short_text TEXT NOT NULL,
                full_text TEXT NOT NULL,
                published_at TEXT NOT NULL,
                image_url TEXT
            );"
        ))?;
        Ok(Self {
            conn: Mutex::new(conn),
            table,
        })
    }

    pub(crate) fn table(&self) -> &'static str {
        self.table
    }

    /// Newest first; `year` filters on the year of `published_at`.
    pub fn list(&self, year: Option<&str>) -> Result<Vec<ContentEntry>> {
        let conn = lock(&self.conn);
        let base = format!(
            "SELECT id, title, short_text, full_text, published_at, ifnull(image_url,'')
             FROM {} ",
            self.table
        );
        let order = "ORDER BY published_at DESC, id DESC";
        let mut out = Vec::new();
        match year.filter(|y| !y.trim().is_empty()) {
            Some(year) => {
                let mut stmt = conn.prepare(&format!(
                    "{base} WHERE strftime('%Y', published_at) = ?1 {order}"
                ))?;
                let rows = stmt.query_map(params![year.trim()], map_entry)?;
                for row in rows {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!("{base} {order}"))?;
                let rows = stmt.query_map([], map_entry)?;
                for row in rows {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    pub fn get(&self, id: i64) -> Result<Option<ContentEntry>> {
        let conn = lock(&self.conn);
        conn.query_row(
            &format!(
                "SELECT id, title, short_text, full_text, published_at, ifnull(image_url,'')
                 FROM {} WHERE id = ?1",
                self.table
            ),
            params![id],
            map_entry,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn create(&self, entry: &ContentEntry) -> Result<i64> {
        let conn = lock(&self.conn);
        conn.execute(
            &format!(
                "INSERT INTO {} (title, short_text, full_text, published_at, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                self.table
            ),
            params![
                entry.title,
                entry.short_text,
                entry.full_text,
                entry.published_at,
                entry.image_url,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, patch: &SqlPatch) -> Result<()> {
        patch.apply(&lock(&self.conn), self.table, id)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows = lock(&self.conn).execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            params![id],
        )?;
        Ok(rows > 0)
    }
}

fn map_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContentEntry> {
    Ok(ContentEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        short_text: row.get(2)?,
        full_text: row.get(3)?,
        published_at: row.get(4)?,
        image_url: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(title: &str, date: &str) -> ContentEntry {
        ContentEntry {
            title: title.to_string(),
            short_text: "кратко".to_string(),
            full_text: "полный текст".to_string(),
            published_at: date.to_string(),
            ..ContentEntry::default()
        }
    }

    #[test]
    fn test_list_order_and_year_filter() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::open_news(temp.path().join("news.db")).unwrap();

        store.create(&entry("старая", "2023-05-01")).unwrap();
        store.create(&entry("свежая", "2024-11-02")).unwrap();
        store.create(&entry("новее", "2024-12-01")).unwrap();

        let all = store.list(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "новее");

        let filtered = store.list(Some("2024")).unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(store.list(Some("2019")).unwrap().is_empty());
    }

    #[test]
    fn test_get_update_delete() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::open_articles(temp.path().join("articles.db")).unwrap();

        let id = store.create(&entry("статья", "2024-01-01")).unwrap();
        assert!(store.get(id).unwrap().is_some());

        let mut patch = SqlPatch::new();
        patch.set("title", "переименована".to_string());
        store.update(id, &patch).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().title, "переименована");

        assert!(store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_news_and_articles_are_separate_tables() {
        let temp = TempDir::new().unwrap();
        let news = ContentStore::open_news(temp.path().join("news.db")).unwrap();
        let articles = ContentStore::open_articles(temp.path().join("articles.db")).unwrap();
        assert_eq!(news.table(), "news");
        assert_eq!(articles.table(), "articles");

        news.create(&entry("новость", "2024-01-01")).unwrap();
        assert!(articles.list(None).unwrap().is_empty());
    }
}
