// ==========================================
// 内容管理系统 - API 层
// ==========================================
// 职责: 提供按集合标识调用的导入/导出接口，供 CLI 或宿主服务调用
// ==========================================

pub mod bulk_io_api;
pub mod error;

// 重导出核心类型
pub use bulk_io_api::{BulkIoApi, CollectionSummary};
pub use error::{ApiError, ApiResult};
