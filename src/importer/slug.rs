// ==========================================
// 内容管理系统 - Slug 生成器
// ==========================================
// 职责: 标题/名称 → URL 安全且在集合内唯一的 slug
// 流程: 归一化 → 探测 → 追加 -1/-2/... → 超限后时间戳后缀
// 红线: 永不报错；探测与落库非原子（依赖编排器顺序执行）
// ==========================================

use crate::repository::record_store::RecordStore;
use chrono::Utc;
use tracing::{debug, warn};

/// 默认最大探测次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// 空 slug 的替代值
pub const UNTITLED_SLUG: &str = "untitled";

/// 归一化
///
/// 小写 → 空白转 `-` → 去除 `[a-z0-9-]` 以外字符 → 合并连续 `-` → 去首尾 `-`
pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut last_hyphen = false;

    for ch in source.to_lowercase().chars() {
        let mapped = if ch.is_whitespace() || ch == '-' {
            '-'
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            ch
        } else {
            continue;
        };

        if mapped == '-' {
            if last_hyphen {
                continue;
            }
            last_hyphen = true;
        } else {
            last_hyphen = false;
        }
        slug.push(mapped);
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// 时间戳后缀（base36 毫秒）
fn timestamp_suffix() -> String {
    let mut millis = Utc::now().timestamp_millis().unsigned_abs();
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(millis % 36) as usize]);
        millis /= 36;
        if millis == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// ==========================================
// SlugOutcome - 生成结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugOutcome {
    pub slug: String,
    /// 是否退化为时间戳后缀（探测超限或查询失败）
    pub degraded: bool,
}

// ==========================================
// SlugGenerator
// ==========================================
pub struct SlugGenerator {
    max_attempts: u32,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl SlugGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// 生成唯一 slug
    ///
    /// # 参数
    /// - source: 标题/名称
    /// - collection: 集合标识
    /// - slug_field: slug 字段名
    /// - store: 存储查询能力
    /// - exclude_id: 排除的记录 ID（更新场景预留）
    pub async fn generate_unique<S>(
        &self,
        source: &str,
        collection: &str,
        slug_field: &str,
        store: &S,
        exclude_id: Option<&str>,
    ) -> SlugOutcome
    where
        S: RecordStore + ?Sized,
    {
        let base = slugify(source);
        let mut candidate = base.clone();
        let mut counter: u32 = 0;

        loop {
            match store
                .count_by_slug(collection, slug_field, &candidate, exclude_id)
                .await
            {
                Ok(0) => {
                    debug!(collection = %collection, slug = %candidate, attempts = counter + 1, "slug 可用");
                    return SlugOutcome {
                        slug: candidate,
                        degraded: false,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(collection = %collection, slug = %candidate, error = %e, "slug 探测失败，使用时间戳后缀");
                    break;
                }
            }

            counter += 1;
            if counter >= self.max_attempts {
                warn!(collection = %collection, base = %base, max_attempts = self.max_attempts, "slug 探测超限，使用时间戳后缀");
                break;
            }
            candidate = format!("{}-{}", base, counter);
        }

        SlugOutcome {
            slug: format!("{}-{}", base, timestamp_suffix()),
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{FieldValue, MappedRecord};
    use crate::repository::record_store_impl::SqliteRecordStore;

    async fn persist(store: &SqliteRecordStore, slug: &str) {
        let mut record = MappedRecord::new();
        record.insert("slug", FieldValue::Text(slug.to_string()));
        store.create("posts", &record, None).await.unwrap();
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust   2024 -- Edition "), "rust-2024-edition");
        assert_eq!(slugify("Café déjà vu"), "caf-dj-vu");
    }

    #[test]
    fn test_slugify_empty_is_untitled() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!! ???"), "untitled");
        assert_eq!(slugify("日本語"), "untitled");
    }

    #[test]
    fn test_timestamp_suffix_is_base36() {
        let suffix = timestamp_suffix();
        assert!(!suffix.is_empty());
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn test_sequential_slugs_are_distinct() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let generator = SlugGenerator::default();

        let mut slugs = Vec::new();
        for _ in 0..3 {
            let outcome = generator
                .generate_unique("Hello, World!", "posts", "slug", &store, None)
                .await;
            assert!(!outcome.degraded);
            persist(&store, &outcome.slug).await;
            slugs.push(outcome.slug);
        }

        assert_eq!(slugs, vec!["hello-world", "hello-world-1", "hello-world-2"]);
    }

    #[tokio::test]
    async fn test_exhaustion_degrades_to_timestamp_suffix() {
        let store = SqliteRecordStore::in_memory().unwrap();
        persist(&store, "news").await;
        persist(&store, "news-1").await;

        let outcome = SlugGenerator::new(2)
            .generate_unique("News", "posts", "slug", &store, None)
            .await;

        assert!(outcome.degraded);
        assert!(outcome.slug.starts_with("news-"));
        assert_ne!(outcome.slug, "news-1");
        assert_ne!(outcome.slug, "news-2");
    }
}
