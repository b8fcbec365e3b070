use chrono::{DateTime, Utc};
use keywarden_core::ApiKey;
use rusqlite::{params, Row};

use crate::{Db, DbError};

fn row_to_api_key(row: &Row) -> rusqlite::Result<ApiKey> {
    Ok(ApiKey {
        id: row.get("id")?,
        name: row.get("name")?,
        secret: row.get("secret")?,
        model: row.get("model")?,
        created_at: row.get::<_, DateTime<Utc>>("created_at")?,
    })
}

impl Db {
    pub fn insert_api_key(&self, name: &str, secret: &str, model: &str) -> Result<ApiKey, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO api_keys (id, name, secret, model, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, name, secret, model, now],
            )?;
            conn.query_row(
                "SELECT * FROM api_keys WHERE id = ?1",
                params![id],
                row_to_api_key,
            )
            .map_err(DbError::from)
        })
    }

    /// All keys, newest first. Ties on created_at fall back to insertion order.
    pub fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM api_keys ORDER BY created_at DESC, rowid DESC")?;
            let keys = stmt
                .query_map([], row_to_api_key)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(keys)
        })
    }

    pub fn find_api_key_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, DbError> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM api_keys WHERE secret = ?1",
                params![secret],
                row_to_api_key,
            );
            match result {
                Ok(key) => Ok(Some(key)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(DbError::Sqlite(e)),
            }
        })
    }

    pub fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM api_keys WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("api_key {id}")));
            }
            Ok(())
        })
    }
}
