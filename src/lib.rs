// ==========================================
// 内容管理系统 - CSV 批量导入/导出核心库
// ==========================================
// 技术栈: Rust + Tokio + SQLite
// 系统定位: 无头 CMS 的集合数据批量导入/导出引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 集合声明、记录、导入结果
pub mod domain;

// 数据仓储层 - 记录存储
pub mod repository;

// 导入层 - 切分、映射、类型转换、校验、slug、编排
pub mod importer;

// 导出层 - CSV 格式化、导入模板
pub mod exporter;

// 配置层 - 导入/导出配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 按集合标识调用
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{ApiError, BulkIoApi};
pub use config::{BulkIoConfigReader, ConfigManager, FallbackPolicy, ImportSettings};
pub use domain::{
    CollectionRegistry, CollectionSchema, FieldMapping, ImportOptions, ImportReport, ImportResult,
    MappedRecord,
};
pub use exporter::{build_template, CsvFormatter};
pub use importer::{BulkImporter, BulkImporterImpl};
pub use repository::{RecordStore, SqliteRecordStore};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
