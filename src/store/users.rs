use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::{SqlPatch, lock, open_connection};
use crate::auth::hash_password;
use crate::error::{Error, Result};
use crate::types::{SocialLinks, User};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    login TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    is_admin INTEGER NOT NULL DEFAULT 0
);

-- Footer social links live here too; a single fixed row
CREATE TABLE IF NOT EXISTS social_links (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    telegram_link TEXT,
    vk_link TEXT,
    wp_link TEXT
);
INSERT OR IGNORE INTO social_links (id, telegram_link, vk_link, wp_link) VALUES (1, '', '', '');
"#;

/// Credential store backing both admin and public sessions.
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        seed_admin(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn create(
        &self,
        login: &str,
        password_hash: &str,
        email: &str,
        phone: &str,
        is_admin: bool,
    ) -> Result<i64> {
        let conn = lock(&self.conn);
        let result = conn.execute(
            "INSERT INTO users (login, password_hash, email, phone, is_admin)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![login, password_hash, email, phone, is_admin as i64],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    pub fn get_by_login(&self, login: &str) -> Result<Option<User>> {
        let conn = lock(&self.conn);
        conn.query_row(
            "SELECT id, login, password_hash, ifnull(email,''), ifnull(phone,''), is_admin
             FROM users WHERE login = ?1",
            params![login],
            map_user,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Session check: is this login still an admin? Unknown logins are not.
    pub fn is_admin(&self, login: &str) -> Result<bool> {
        let conn = lock(&self.conn);
        let is_admin: Option<i64> = conn
            .query_row(
                "SELECT is_admin FROM users WHERE login = ?1",
                params![login],
                |row| row.get(0),
            )
            .optional()?;
        Ok(is_admin == Some(1))
    }

    pub fn phone_of(&self, login: &str) -> Result<Option<String>> {
        let conn = lock(&self.conn);
        conn.query_row(
            "SELECT ifnull(phone,'') FROM users WHERE login = ?1",
            params![login],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn list(&self) -> Result<Vec<User>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, login, password_hash, ifnull(email,''), ifnull(phone,''), is_admin
             FROM users ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], map_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn update(&self, id: i64, patch: &SqlPatch) -> Result<()> {
        patch.apply(&lock(&self.conn), "users", id)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows = lock(&self.conn).execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn social_links(&self) -> Result<SocialLinks> {
        let conn = lock(&self.conn);
        conn.query_row(
            "SELECT ifnull(telegram_link,''), ifnull(vk_link,''), ifnull(wp_link,'')
             FROM social_links WHERE id = 1",
            [],
            |row| {
                Ok(SocialLinks {
                    telegram_link: row.get(0)?,
                    vk_link: row.get(1)?,
                    wp_link: row.get(2)?,
                })
            },
        )
        .optional()
        .map(Option::unwrap_or_default)
        .map_err(Error::from)
    }

    pub fn update_social_links(&self, links: &SocialLinks) -> Result<()> {
        lock(&self.conn).execute(
            "UPDATE social_links SET telegram_link = ?1, vk_link = ?2, wp_link = ?3 WHERE id = 1",
            params![links.telegram_link, links.vk_link, links.wp_link],
        )?;
        Ok(())
    }
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        login: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        is_admin: row.get::<_, i64>(5)? == 1,
    })
}

fn seed_admin(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(1) FROM users WHERE login = 'admin'",
        [],
        |row| row.get(0),
    )?;
    if count == 0 {
        let hash = hash_password("admin")?;
        conn.execute(
            "INSERT INTO users (login, password_hash, email, phone, is_admin)
             VALUES ('admin', ?1, 'admin@example.com', '+70000000000', 1)",
            params![hash],
        )?;
        tracing::info!("seeded default admin user: admin/admin");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, UserStore) {
        let temp = TempDir::new().unwrap();
        let store = UserStore::open(temp.path().join("users.db")).unwrap();
        (temp, store)
    }

    #[test]
    fn test_bootstrap_admin_seeded_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("users.db");
        {
            let store = UserStore::open(&path).unwrap();
            assert!(store.is_admin("admin").unwrap());
        }
        // Reopening must not duplicate the seed row
        let store = UserStore::open(&path).unwrap();
        assert_eq!(
            store
                .list()
                .unwrap()
                .iter()
                .filter(|u| u.login == "admin")
                .count(),
            1
        );
        let admin = store.get_by_login("admin").unwrap().unwrap();
        assert!(verify_password("admin", &admin.password_hash));
    }

    #[test]
    fn test_duplicate_login_rejected() {
        let (_temp, store) = open_store();
        store.create("user@example.com", "h", "user@example.com", "", false).unwrap();
        let err = store.create("user@example.com", "h", "", "", false);
        assert!(matches!(err, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_is_admin_false_for_unknown_and_plain_users() {
        let (_temp, store) = open_store();
        store.create("user@example.com", "h", "", "+7111", false).unwrap();
        assert!(!store.is_admin("user@example.com").unwrap());
        assert!(!store.is_admin("ghost").unwrap());
        assert_eq!(
            store.phone_of("user@example.com").unwrap().as_deref(),
            Some("+7111")
        );
    }

    #[test]
    fn test_patch_and_delete() {
        let (_temp, store) = open_store();
        let id = store.create("u", "h", "old@example.com", "", false).unwrap();

        let mut patch = SqlPatch::new();
        patch.set("email", "new@example.com".to_string());
        patch.set("is_admin", 1i64);
        store.update(id, &patch).unwrap();

        let user = store.get_by_login("u").unwrap().unwrap();
        assert_eq!(user.email, "new@example.com");
        assert!(user.is_admin);

        assert!(store.delete(id).unwrap());
        assert!(store.get_by_login("u").unwrap().is_none());
    }

    #[test]
    fn test_social_links_roundtrip() {
        let (_temp, store) = open_store();
        assert_eq!(store.social_links().unwrap().telegram_link, "");
        store
            .update_social_links(&SocialLinks {
                telegram_link: "https://t.me/x".to_string(),
                vk_link: "https://vk.com/x".to_string(),
                wp_link: "".to_string(),
            })
            .unwrap();
        assert_eq!(store.social_links().unwrap().vk_link, "https://vk.com/x");
    }
}
