use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::{lock, open_connection};
use crate::error::{Error, Result};
use crate::types::CartItem;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cart_items (
    cart_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    title TEXT,
    price REAL,
    image TEXT,
    qty INTEGER NOT NULL,
    PRIMARY KEY (cart_id, item_id)
);";

/// Carts for anonymous cookie-identified visitors; no account required.
pub struct CartStore {
    conn: Mutex<Connection>,
}

impl CartStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn items(&self, cart_id: &str) -> Result<Vec<CartItem>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT item_id, ifnull(title,''), ifnull(price,0), ifnull(image,''), qty
             FROM cart_items WHERE cart_id = ?1",
        )?;
        let rows = stmt.query_map(params![cart_id], |row| {
            Ok(CartItem {
                id: row.get(0)?,
                title: row.get(1)?,
                price: row.get(2)?,
                image: row.get(3)?,
                qty: row.get(4)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Upsert: an existing line accumulates quantity, a new one is inserted.
    /// Read-then-write runs inside one transaction.
    pub fn add(&self, cart_id: &str, item: &CartItem) -> Result<()> {
        let mut conn = lock(&self.conn);
        let tx = conn.transaction()?;

        let current: Option<i64> = tx
            .query_row(
                "SELECT qty FROM cart_items WHERE cart_id = ?1 AND item_id = ?2",
                params![cart_id, item.id],
                |row| row.get(0),
            )
            .optional()?;

        match current {
            Some(_) => {
                tx.execute(
                    "UPDATE cart_items SET qty = qty + ?1 WHERE cart_id = ?2 AND item_id = ?3",
                    params![item.qty, cart_id, item.id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO cart_items (cart_id, item_id, title, price, image, qty)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![cart_id, item.id, item.title, item.price, item.image, item.qty],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Sets the quantity exactly, no accumulation.
    pub fn set_qty(&self, cart_id: &str, item_id: &str, qty: i64) -> Result<()> {
        let rows = lock(&self.conn).execute(
            "UPDATE cart_items SET qty = ?1 WHERE cart_id = ?2 AND item_id = ?3",
            params![qty, cart_id, item_id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub fn remove(&self, cart_id: &str, item_id: &str) -> Result<bool> {
        let rows = lock(&self.conn).execute(
            "DELETE FROM cart_items WHERE cart_id = ?1 AND item_id = ?2",
            params![cart_id, item_id],
        )?;
        Ok(rows > 0)
    }

    pub fn clear(&self, cart_id: &str) -> Result<usize> {
        lock(&self.conn)
            .execute("DELETE FROM cart_items WHERE cart_id = ?1", params![cart_id])
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(id: &str, qty: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            title: format!("Товар {id}"),
            price: 100.0,
            image: String::new(),
            qty,
        }
    }

    #[test]
    fn test_add_accumulates_qty() {
        let temp = TempDir::new().unwrap();
        let store = CartStore::open(temp.path().join("cart.db")).unwrap();

        store.add("cart-1", &item("a", 2)).unwrap();
        store.add("cart-1", &item("a", 3)).unwrap();

        let items = store.items("cart-1").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].qty, 5);
    }

    #[test]
    fn test_set_qty_is_exact() {
        let temp = TempDir::new().unwrap();
        let store = CartStore::open(temp.path().join("cart.db")).unwrap();

        store.add("cart-1", &item("a", 5)).unwrap();
        store.set_qty("cart-1", "a", 1).unwrap();
        assert_eq!(store.items("cart-1").unwrap()[0].qty, 1);
        assert!(matches!(
            store.set_qty("cart-1", "ghost", 1),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_clear_scoped_to_cart() {
        let temp = TempDir::new().unwrap();
        let store = CartStore::open(temp.path().join("cart.db")).unwrap();

        store.add("cart-1", &item("a", 1)).unwrap();
        store.add("cart-1", &item("b", 1)).unwrap();
        store.add("cart-2", &item("a", 1)).unwrap();

        assert_eq!(store.clear("cart-1").unwrap(), 2);
        assert!(store.items("cart-1").unwrap().is_empty());
        assert_eq!(store.items("cart-2").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_single_line() {
        let temp = TempDir::new().unwrap();
        let store = CartStore::open(temp.path().join("cart.db")).unwrap();

        store.add("cart-1", &item("a", 1)).unwrap();
        assert!(store.remove("cart-1", "a").unwrap());
        assert!(!store.remove("cart-1", "a").unwrap());
    }
}
