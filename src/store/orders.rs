use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};

use super::{lock, open_connection, parse_datetime};
use crate::error::{Error, Result};
use crate::types::{ItemOrder, Order};

const ORDERS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service TEXT NOT NULL,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

/// Service requests submitted from the services page.
pub struct OrderStore {
    conn: Mutex<Connection>,
}

impl OrderStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(ORDERS_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn create(&self, service: &str, name: &str, phone: &str, email: &str) -> Result<i64> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO orders (service, name, phone, email, status)
             VALUES (?1, ?2, ?3, ?4, 'active')",
            params![service, name, phone, email],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list(&self) -> Result<Vec<Order>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, service, name, phone, ifnull(email,''), status, created_at
             FROM orders ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Order {
                id: row.get(0)?,
                service: row.get(1)?,
                name: row.get(2)?,
                phone: row.get(3)?,
                email: row.get(4)?,
                status: row.get(5)?,
                created_at: parse_datetime(&row.get::<_, String>(6)?),
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn update_status(&self, id: i64, status: &str) -> Result<()> {
        let rows = lock(&self.conn).execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

const ITEM_ORDERS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS item_orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL,
    title TEXT NOT NULL,
    qty INTEGER NOT NULL,
    price REAL NOT NULL,
    total REAL NOT NULL,
    phone TEXT,
    user_login TEXT,
    status TEXT NOT NULL DEFAULT 'new',
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

/// Row to be inserted; `total` is fixed by the caller at write time.
pub struct NewItemOrder {
    pub item_id: String,
    pub title: String,
    pub qty: i64,
    pub price: f64,
    pub total: f64,
    pub phone: String,
    pub user_login: String,
}

/// One-click and cart checkout orders.
pub struct ItemOrderStore {
    conn: Mutex<Connection>,
}

impl ItemOrderStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(ITEM_ORDERS_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn create(&self, order: &NewItemOrder) -> Result<i64> {
        let conn = lock(&self.conn);
        insert_item_order(&conn, order)?;
        Ok(conn.last_insert_rowid())
    }

    /// Inserts a whole checkout atomically; either every line lands or none.
    pub fn create_batch(&self, orders: &[NewItemOrder]) -> Result<()> {
        let mut conn = lock(&self.conn);
        let tx = conn.transaction()?;
        for order in orders {
            insert_item_order(&tx, order)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<ItemOrder>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, item_id, title, qty, price, total, ifnull(phone,''),
                    ifnull(user_login,''), status, created_at
             FROM item_orders ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ItemOrder {
                id: row.get(0)?,
                item_id: row.get(1)?,
                title: row.get(2)?,
                qty: row.get(3)?,
                price: row.get(4)?,
                total: row.get(5)?,
                phone: row.get(6)?,
                user_login: row.get(7)?,
                status: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn update_status(&self, id: i64, status: &str) -> Result<()> {
        let rows = lock(&self.conn).execute(
            "UPDATE item_orders SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

fn insert_item_order(conn: &Connection, order: &NewItemOrder) -> Result<()> {
    conn.execute(
        "INSERT INTO item_orders (item_id, title, qty, price, total, phone, user_login)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            order.item_id,
            order.title,
            order.qty,
            order.price,
            order.total,
            order.phone,
            order.user_login,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_order_lifecycle() {
        let temp = TempDir::new().unwrap();
        let store = OrderStore::open(temp.path().join("orders.db")).unwrap();

        let id = store
            .create("Резка металла", "Иван", "+7999", "ivan@example.com")
            .unwrap();
        let orders = store.list().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, "active");

        store.update_status(id, "closed").unwrap();
        assert_eq!(store.list().unwrap()[0].status, "closed");
        assert!(matches!(
            store.update_status(999, "closed"),
            Err(Error::NotFound)
        ));
    }

    fn line(item_id: &str, qty: i64, price: f64) -> NewItemOrder {
        NewItemOrder {
            item_id: item_id.to_string(),
            title: format!("Товар {item_id}"),
            qty,
            price,
            total: qty as f64 * price,
            phone: String::new(),
            user_login: String::new(),
        }
    }

    #[test]
    fn test_batch_insert_totals() {
        let temp = TempDir::new().unwrap();
        let store = ItemOrderStore::open(temp.path().join("item_orders.db")).unwrap();

        store
            .create_batch(&[line("a", 2, 100.0), line("b", 1, 50.0), line("c", 3, 10.0)])
            .unwrap();

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.total, row.qty as f64 * row.price);
            assert_eq!(row.status, "new");
        }
    }

    #[test]
    fn test_single_item_order() {
        let temp = TempDir::new().unwrap();
        let store = ItemOrderStore::open(temp.path().join("item_orders.db")).unwrap();

        let id = store.create(&line("x", 4, 25.0)).unwrap();
        store.update_status(id, "в обработке").unwrap();
        let rows = store.list().unwrap();
        assert_eq!(rows[0].status, "в обработке");
        assert_eq!(rows[0].total, 100.0);
    }
}
