use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::migrate::{self, Migration, add_column};
use super::{SqlPatch, lock, open_connection};
use crate::error::{Error, Result};
use crate::types::{ProductRow, TypeDescription};

// The products table predates most of its columns; every step past v1
// mirrors one column-add that happened in production. New databases run the
// whole list at open, old ones only the missing tail.
const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, apply: base_tables },
    Migration { version: 2, apply: |c| add_column(c, "products", "subtype", "TEXT") },
    Migration {
        version: 3,
        apply: |c| add_column(c, "products", "in_stock", "INTEGER NOT NULL DEFAULT 1"),
    },
    Migration { version: 4, apply: measurement_columns },
    Migration { version: 5, apply: merch_columns },
];

fn base_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            name TEXT NOT NULL,
            size TEXT,
            img TEXT,
            price REAL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS product_descriptions (
            type TEXT PRIMARY KEY,
            description TEXT
        );",
    )?;
    Ok(())
}

fn measurement_columns(conn: &Connection) -> Result<()> {
    add_column(conn, "products", "price_per_ton", "REAL")?;
    add_column(conn, "products", "thickness_mm", "REAL")?;
    add_column(conn, "products", "weight_kg", "REAL")?;
    add_column(conn, "products", "length_m", "REAL")?;
    Ok(())
}

fn merch_columns(conn: &Connection) -> Result<()> {
    add_column(conn, "products", "featured", "INTEGER NOT NULL DEFAULT 0")?;
    add_column(conn, "products", "sku", "TEXT")?;
    Ok(())
}

const SELECT_COLUMNS: &str = "id, ifnull(type,''), ifnull(name,''), ifnull(size,''), \
     ifnull(subtype,''), ifnull(img,''), ifnull(price,0), ifnull(price_per_ton,0), \
     ifnull(thickness_mm,0), ifnull(weight_kg,0), ifnull(length_m,0), ifnull(in_stock,1), \
     ifnull(featured,0), ifnull(sku,''), ifnull(created_at,'')";

/// Product catalog repository. Rows written before a column existed read
/// back zero-valued defaults through the `ifnull` projection.
pub struct ProductStore {
    conn: Mutex<Connection>,
}

impl ProductStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = open_connection(path.as_ref())?;
        migrate::run(&conn, MIGRATIONS)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All rows, optionally filtered by stored type slug (case-insensitive).
    pub fn list(&self, product_type: &str) -> Result<Vec<ProductRow>> {
        let conn = lock(&self.conn);
        let base = format!("SELECT {SELECT_COLUMNS} FROM products");
        let mut rows = Vec::new();
        if product_type.trim().is_empty() {
            let mut stmt = conn.prepare(&base)?;
            let mapped = stmt.query_map([], map_product)?;
            for row in mapped {
                rows.push(row?);
            }
        } else {
            let mut stmt = conn.prepare(&format!("{base} WHERE lower(type) = lower(?1)"))?;
            let mapped = stmt.query_map(params![product_type.trim()], map_product)?;
            for row in mapped {
                rows.push(row?);
            }
        }
        Ok(rows)
    }

    pub fn count(&self) -> Result<i64> {
        lock(&self.conn)
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .map_err(Error::from)
    }

    pub fn insert(&self, row: &ProductRow) -> Result<i64> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO products (type, name, size, subtype, img, price, price_per_ton,
                                   thickness_mm, weight_kg, length_m, in_stock, featured, sku)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                row.kind,
                row.name,
                row.size,
                row.subtype,
                row.img,
                row.price,
                row.price_per_ton,
                row.thickness_mm,
                row.weight_kg,
                row.length_m,
                row.in_stock as i64,
                row.featured as i64,
                row.sku,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, patch: &SqlPatch) -> Result<()> {
        patch.apply(&lock(&self.conn), "products", id)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows = lock(&self.conn).execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn featured_ids(&self) -> Result<Vec<i64>> {
        let conn = lock(&self.conn);
        let mut stmt =
            conn.prepare("SELECT id FROM products WHERE featured = 1 ORDER BY id DESC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn set_featured(&self, id: i64, featured: bool) -> Result<()> {
        let rows = lock(&self.conn).execute(
            "UPDATE products SET featured = ?1 WHERE id = ?2",
            params![featured as i64, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Per-type description texts

    pub fn description(&self, kind: &str) -> Result<String> {
        let conn = lock(&self.conn);
        conn.query_row(
            "SELECT ifnull(description,'') FROM product_descriptions WHERE type = ?1",
            params![kind],
            |row| row.get(0),
        )
        .optional()
        .map(Option::unwrap_or_default)
        .map_err(Error::from)
    }

    pub fn descriptions(&self) -> Result<Vec<TypeDescription>> {
        let conn = lock(&self.conn);
        let mut stmt =
            conn.prepare("SELECT type, ifnull(description,'') FROM product_descriptions")?;
        let rows = stmt.query_map([], |row| {
            Ok(TypeDescription {
                kind: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn upsert_description(&self, kind: &str, description: &str) -> Result<()> {
        lock(&self.conn).execute(
            "INSERT OR REPLACE INTO product_descriptions (type, description) VALUES (?1, ?2)",
            params![kind, description],
        )?;
        Ok(())
    }

    pub fn delete_description(&self, kind: &str) -> Result<bool> {
        let rows = lock(&self.conn).execute(
            "DELETE FROM product_descriptions WHERE type = ?1",
            params![kind],
        )?;
        Ok(rows > 0)
    }
}

fn map_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        name: row.get(2)?,
        size: row.get(3)?,
        subtype: row.get(4)?,
        img: row.get(5)?,
        price: row.get(6)?,
        price_per_ton: row.get(7)?,
        thickness_mm: row.get(8)?,
        weight_kg: row.get(9)?,
        length_m: row.get(10)?,
        in_stock: row.get::<_, i64>(11)? == 1,
        featured: row.get::<_, i64>(12)? == 1,
        sku: row.get(13)?,
        created_at: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(kind: &str, name: &str) -> ProductRow {
        ProductRow {
            kind: kind.to_string(),
            name: name.to_string(),
            price: 100.0,
            in_stock: true,
            ..ProductRow::default()
        }
    }

    #[test]
    fn test_crud_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = ProductStore::open(temp.path().join("products.db")).unwrap();

        let id = store.insert(&sample("armatura", "Арматура А500С 12мм")).unwrap();
        store.insert(&sample("profnastil", "Профнастил С8")).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.list("armatura").unwrap().len(), 1);
        assert_eq!(store.list("ARMATURA").unwrap().len(), 1);
        assert_eq!(store.list("").unwrap().len(), 2);

        let mut patch = SqlPatch::new();
        patch.set("price", 250.5f64);
        store.update(id, &patch).unwrap();
        let rows = store.list("armatura").unwrap();
        assert_eq!(rows[0].price, 250.5);

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
    }

    #[test]
    fn test_legacy_table_upgraded_in_place() {
        // A database from before the featured/sku/price_per_ton era must
        // open cleanly and read zero defaults for the new columns.
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    type TEXT NOT NULL,
                    name TEXT NOT NULL,
                    size TEXT,
                    img TEXT,
                    price REAL,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO products (type, name, size, img, price)
                VALUES ('armatura', 'Арматура А400 10мм', '10мм', '', 120.0);",
            )
            .unwrap();
        }

        let store = ProductStore::open(&path).unwrap();
        let rows = store.list("").unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Арматура А400 10мм");
        assert_eq!(row.price_per_ton, 0.0);
        assert_eq!(row.sku, "");
        assert!(!row.featured);
        assert!(row.in_stock);
        assert_eq!(row.subtype, "");

        // And the columns now physically exist for writes
        let mut patch = SqlPatch::new();
        patch.set("featured", 1i64);
        patch.set("sku", "ARM-400".to_string());
        store.update(row.id, &patch).unwrap();
        assert_eq!(store.featured_ids().unwrap(), vec![row.id]);
    }

    #[test]
    fn test_featured_toggle() {
        let temp = TempDir::new().unwrap();
        let store = ProductStore::open(temp.path().join("products.db")).unwrap();
        let id = store.insert(&sample("armatura", "x")).unwrap();

        store.set_featured(id, true).unwrap();
        assert_eq!(store.featured_ids().unwrap(), vec![id]);
        store.set_featured(id, false).unwrap();
        assert!(store.featured_ids().unwrap().is_empty());
        assert!(matches!(store.set_featured(999, true), Err(Error::NotFound)));
    }

    #[test]
    fn test_descriptions_upsert() {
        let temp = TempDir::new().unwrap();
        let store = ProductStore::open(temp.path().join("products.db")).unwrap();

        assert_eq!(store.description("armatura").unwrap(), "");
        store.upsert_description("armatura", "Прутки для армирования").unwrap();
        store.upsert_description("armatura", "Обновлённый текст").unwrap();
        assert_eq!(store.description("armatura").unwrap(), "Обновлённый текст");
        assert_eq!(store.descriptions().unwrap().len(), 1);
        assert!(store.delete_description("armatura").unwrap());
        assert!(!store.delete_description("armatura").unwrap());
    }
}
