// ==========================================
// 内容管理系统 - 记录存储 Repository Trait
// ==========================================
// 职责: 定义导入/导出所需的存储能力（create / slug 查询 / 全量读取）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::record::MappedRecord;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RecordStore Trait
// ==========================================
// 用途: 外部持久化存储的最小接口
// 实现者: SqliteRecordStore（使用 rusqlite）
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 新建记录
    ///
    /// # 参数
    /// - collection: 集合标识
    /// - data: 已校验的记录
    /// - locale: 本地化字段所属语言（可选）
    ///
    /// # 返回
    /// - Ok(String): 新记录 ID
    /// - Err: 约束冲突、连接错误等
    async fn create(
        &self,
        collection: &str,
        data: &MappedRecord,
        locale: Option<&str>,
    ) -> RepositoryResult<String>;

    /// 统计 slug 字段等于给定值的记录数
    ///
    /// # 参数
    /// - exclude_id: 排除的记录 ID（预留给更新场景）
    async fn count_by_slug(
        &self,
        collection: &str,
        slug_field: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<u64>;

    /// 读取集合内全部记录（JSON 对象，含 id/createdAt/updatedAt）
    async fn find_all(&self, collection: &str) -> RepositoryResult<Vec<serde_json::Value>>;
}
