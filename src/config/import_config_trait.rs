// ==========================================
// 内容管理系统 - 导入/导出配置读取 Trait
// ==========================================
// 职责: 定义导入导出模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ==========================================
// FallbackPolicy - 类型转换回退策略
// ==========================================
// - Lenient: 回退为默认值，仅记录诊断
// - Strict: 回退升级为行级校验错误
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    #[default]
    Lenient,
    Strict,
}

impl FallbackPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lenient" => Some(FallbackPolicy::Lenient),
            "strict" => Some(FallbackPolicy::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackPolicy::Lenient => "lenient",
            FallbackPolicy::Strict => "strict",
        }
    }
}

// ==========================================
// BulkIoConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、ImportSettings（内存值）
#[async_trait]
pub trait BulkIoConfigReader: Send + Sync {
    /// slug 最大探测次数
    ///
    /// # 默认值
    /// - 1000
    async fn get_slug_max_attempts(&self) -> RepositoryResult<u32>;

    /// 枚举回退策略
    ///
    /// # 默认值
    /// - lenient
    async fn get_enum_fallback_policy(&self) -> RepositoryResult<FallbackPolicy>;

    /// 日期回退策略
    ///
    /// # 默认值
    /// - lenient
    async fn get_date_fallback_policy(&self) -> RepositoryResult<FallbackPolicy>;

    /// 导出时过滤的内部字段前缀
    ///
    /// # 默认值
    /// - "_"
    async fn get_export_internal_prefix(&self) -> RepositoryResult<String>;
}

// ==========================================
// ImportSettings - 单次调用使用的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub slug_max_attempts: u32,
    pub enum_fallback: FallbackPolicy,
    pub date_fallback: FallbackPolicy,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            slug_max_attempts: crate::importer::slug::DEFAULT_MAX_ATTEMPTS,
            enum_fallback: FallbackPolicy::Lenient,
            date_fallback: FallbackPolicy::Lenient,
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载；单项读取失败时使用默认值
    pub async fn load<C>(reader: &C) -> Self
    where
        C: BulkIoConfigReader + ?Sized,
    {
        let defaults = Self::default();

        let slug_max_attempts = reader.get_slug_max_attempts().await.unwrap_or_else(|e| {
            warn!(error = %e, "读取 slug_max_attempts 失败，使用默认值");
            defaults.slug_max_attempts
        });
        let enum_fallback = reader.get_enum_fallback_policy().await.unwrap_or_else(|e| {
            warn!(error = %e, "读取 enum_fallback_policy 失败，使用默认值");
            defaults.enum_fallback
        });
        let date_fallback = reader.get_date_fallback_policy().await.unwrap_or_else(|e| {
            warn!(error = %e, "读取 date_fallback_policy 失败，使用默认值");
            defaults.date_fallback
        });

        Self {
            slug_max_attempts,
            enum_fallback,
            date_fallback,
        }
    }
}

#[async_trait]
impl BulkIoConfigReader for ImportSettings {
    async fn get_slug_max_attempts(&self) -> RepositoryResult<u32> {
        Ok(self.slug_max_attempts)
    }

    async fn get_enum_fallback_policy(&self) -> RepositoryResult<FallbackPolicy> {
        Ok(self.enum_fallback)
    }

    async fn get_date_fallback_policy(&self) -> RepositoryResult<FallbackPolicy> {
        Ok(self.date_fallback)
    }

    // 导入快照不含导出配置
    async fn get_export_internal_prefix(&self) -> RepositoryResult<String> {
        Ok(crate::domain::collection::INTERNAL_FIELD_PREFIX.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_policy_parse() {
        assert_eq!(FallbackPolicy::parse(" STRICT "), Some(FallbackPolicy::Strict));
        assert_eq!(FallbackPolicy::parse("lenient"), Some(FallbackPolicy::Lenient));
        assert_eq!(FallbackPolicy::parse("loose"), None);
    }

    #[tokio::test]
    async fn test_settings_roundtrip_through_reader() {
        let settings = ImportSettings {
            slug_max_attempts: 5,
            enum_fallback: FallbackPolicy::Strict,
            ..ImportSettings::default()
        };

        let loaded = ImportSettings::load(&settings).await;
        assert_eq!(loaded, settings);
        assert_eq!(loaded.date_fallback, FallbackPolicy::Lenient);
        assert_eq!(settings.get_export_internal_prefix().await.unwrap(), "_");
    }
}
