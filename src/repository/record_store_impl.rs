// ==========================================
// 内容管理系统 - 记录存储 Repository 实现
// ==========================================
// 职责: 基于 rusqlite 的 RecordStore 参考实现
// 存储: cms_record 表（记录体为 JSON）
// 红线: 持锁期间不跨 await
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::record::MappedRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 打开数据库文件并初始化 schema
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存数据库（测试 / 演练）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（会确保 schema 存在）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(
        &self,
        collection: &str,
        data: &MappedRecord,
        locale: Option<&str>,
    ) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let data_json = serde_json::to_string(&data.to_json())?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO cms_record (id, collection, locale, data_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![id, collection, locale, data_json, now],
        )?;

        debug!(collection = %collection, id = %id, "记录已创建");
        Ok(id)
    }

    async fn count_by_slug(
        &self,
        collection: &str,
        slug_field: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<u64> {
        let json_path = format!("$.\"{}\"", slug_field.replace('"', ""));

        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM cms_record
            WHERE collection = ?1
              AND json_extract(data_json, ?2) = ?3
              AND (?4 IS NULL OR id <> ?4)
            "#,
            params![collection, json_path, slug, exclude_id],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }

    async fn find_all(&self, collection: &str) -> RepositoryResult<Vec<serde_json::Value>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, data_json, created_at, updated_at
            FROM cms_record
            WHERE collection = ?1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, data_json, created_at, updated_at) = row?;
            let data: serde_json::Value = serde_json::from_str(&data_json)?;

            let mut object = serde_json::Map::new();
            object.insert("id".to_string(), serde_json::Value::String(id));
            if let serde_json::Value::Object(fields) = data {
                object.extend(fields);
            }
            object.insert("createdAt".to_string(), serde_json::Value::String(created_at));
            object.insert("updatedAt".to_string(), serde_json::Value::String(updated_at));
            records.push(serde_json::Value::Object(object));
        }

        Ok(records)
    }
}
