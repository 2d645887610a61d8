// ==========================================
// 内容管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{BulkIoConfigReader, FallbackPolicy};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 配置键
pub mod config_keys {
    pub const SLUG_MAX_ATTEMPTS: &str = "slug_max_attempts";
    pub const ENUM_FALLBACK_POLICY: &str = "enum_fallback_policy";
    pub const DATE_FALLBACK_POLICY: &str = "date_fallback_policy";
    pub const EXPORT_INTERNAL_PREFIX: &str = "export_internal_prefix";
}

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager（schema 需已初始化）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;

        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_policy(&self, key: &str) -> RepositoryResult<FallbackPolicy> {
        let value = self.get_config_or_default(key, FallbackPolicy::Lenient.as_str())?;
        Ok(FallbackPolicy::parse(&value).unwrap_or_else(|| {
            warn!(config_key = key, raw_value = %value, "回退策略配置无效，使用 lenient");
            FallbackPolicy::Lenient
        }))
    }
}

// ==========================================
// BulkIoConfigReader Trait 实现
// ==========================================
#[async_trait]
impl BulkIoConfigReader for ConfigManager {
    async fn get_slug_max_attempts(&self) -> RepositoryResult<u32> {
        let value = self.get_config_or_default(config_keys::SLUG_MAX_ATTEMPTS, "1000")?;
        Ok(value.trim().parse::<u32>().unwrap_or_else(|_| {
            warn!(raw_value = %value, "slug_max_attempts 配置格式错误，使用默认值 1000");
            1000
        }))
    }

    async fn get_enum_fallback_policy(&self) -> RepositoryResult<FallbackPolicy> {
        self.get_policy(config_keys::ENUM_FALLBACK_POLICY)
    }

    async fn get_date_fallback_policy(&self) -> RepositoryResult<FallbackPolicy> {
        self.get_policy(config_keys::DATE_FALLBACK_POLICY)
    }

    async fn get_export_internal_prefix(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::EXPORT_INTERNAL_PREFIX, "_")
    }
}
