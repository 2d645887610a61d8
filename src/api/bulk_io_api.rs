// ==========================================
// 内容管理系统 - 批量导入/导出 API
// ==========================================
// 职责: 按集合标识封装导入、导出、模板、集合列表
// 存储: 每次调用打开一个 SQLite 连接，存储与配置共享该连接
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{BulkIoConfigReader, ConfigManager};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::collection::CollectionSchema;
use crate::domain::import::{ImportOptions, ImportProgress, ImportReport};
use crate::domain::presets::CollectionRegistry;
use crate::exporter::{build_template, CsvFormatter};
use crate::importer::{BulkImporter, BulkImporterImpl};
use crate::repository::SqliteRecordStore;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument};

/// 集合概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub slug: String,
    pub label: String,
    /// 可导入字段数
    pub importable_fields: usize,
}

/// 批量导入/导出 API
pub struct BulkIoApi {
    db_path: String,
    registry: CollectionRegistry,
    progress: Option<UnboundedSender<ImportProgress>>,
}

impl BulkIoApi {
    /// 创建新的 BulkIoApi 实例（内置集合）
    pub fn new(db_path: impl Into<String>) -> Self {
        Self::with_registry(db_path, CollectionRegistry::builtin())
    }

    pub fn with_registry(db_path: impl Into<String>, registry: CollectionRegistry) -> Self {
        Self {
            db_path: db_path.into(),
            registry,
            progress: None,
        }
    }

    /// 订阅逐行导入进度
    pub fn with_progress(mut self, sender: UnboundedSender<ImportProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// 注册（或替换）集合声明
    pub fn register_collection(&mut self, schema: CollectionSchema) {
        self.registry.register(schema);
    }

    /// 列出已注册集合
    pub fn list_collections(&self) -> Vec<CollectionSummary> {
        self.registry
            .slugs()
            .into_iter()
            .filter_map(|slug| self.registry.get(slug))
            .map(|schema| CollectionSummary {
                slug: schema.slug.clone(),
                label: schema.label.clone().unwrap_or_else(|| schema.slug.clone()),
                importable_fields: schema.field_mappings().len(),
            })
            .collect()
    }

    /// 按标识查找集合
    pub fn schema(&self, collection: &str) -> ApiResult<&CollectionSchema> {
        let collection = collection.trim();
        if collection.is_empty() {
            return Err(ApiError::InvalidInput("collection must not be empty".to_string()));
        }
        self.registry
            .get(collection)
            .ok_or_else(|| ApiError::NotFound(format!("collection '{}'", collection)))
    }

    fn open(&self) -> ApiResult<Arc<Mutex<Connection>>> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Arc::new(Mutex::new(conn)))
    }

    fn create_importer(&self) -> ApiResult<BulkImporterImpl<SqliteRecordStore, ConfigManager>> {
        let conn = self.open()?;
        let store = SqliteRecordStore::from_connection(conn.clone())?;
        let config = ConfigManager::from_connection(conn);

        let importer = BulkImporterImpl::with_defaults(store, config);
        Ok(match &self.progress {
            Some(tx) => importer.with_progress(tx.clone()),
            None => importer,
        })
    }

    /// 导入 CSV 文本
    ///
    /// # 返回
    /// - Ok(ImportReport): 行级错误体现在 report.result 中
    /// - Err(ApiError): 集合不存在、数据库不可用
    #[instrument(skip(self, csv_text, options), fields(bytes = csv_text.len()))]
    pub async fn import_csv(
        &self,
        collection: &str,
        csv_text: &str,
        options: &ImportOptions,
    ) -> ApiResult<ImportReport> {
        let schema = self.schema(collection)?;
        let importer = self.create_importer()?;
        Ok(importer.import_csv(csv_text, schema, options).await)
    }

    /// 导入文件（.csv / .xlsx / .xls / .ods）
    #[instrument(skip(self, options))]
    pub async fn import_file(
        &self,
        collection: &str,
        file_path: &str,
        options: &ImportOptions,
    ) -> ApiResult<ImportReport> {
        let schema = self.schema(collection)?;
        let importer = self.create_importer()?;
        let report = importer
            .import_file(Path::new(file_path), schema, options)
            .await?;
        Ok(report)
    }

    /// 导出集合为 CSV
    ///
    /// # 参数
    /// - fields: 字段白名单（None 表示集合全部可导入字段）
    /// - include_headers: 是否输出表头
    #[instrument(skip(self))]
    pub async fn export_csv(
        &self,
        collection: &str,
        fields: Option<Vec<String>>,
        include_headers: bool,
    ) -> ApiResult<String> {
        let schema = self.schema(collection)?;
        let conn = self.open()?;
        let store = SqliteRecordStore::from_connection(conn.clone())?;
        let config = ConfigManager::from_connection(conn);

        let prefix = config.get_export_internal_prefix().await?;
        let csv = CsvFormatter::new(prefix)
            .export_collection(&store, schema, fields.as_deref(), include_headers)
            .await?;

        info!(collection = %schema.slug, bytes = csv.len(), "导出完成");
        Ok(csv)
    }

    /// 生成导入模板
    pub fn template(&self, collection: &str, include_example: bool) -> ApiResult<String> {
        let schema = self.schema(collection)?;
        Ok(build_template(schema, include_example)?)
    }
}
