// ==========================================
// 内容管理系统 - 类型转换引擎
// ==========================================
// 职责: 原始单元格 → 类型化值（数字/布尔/日期/枚举/富文本/文本）
// 红线: 不报错，必要时回退（0 / 当前时间 / 默认枚举值）并返回回退信息
// ==========================================

use crate::domain::field::{FieldMapping, SelectSpec, ValueType};
use crate::domain::record::FieldValue;
use crate::importer::bulk_importer_trait::ValueCoercer;
use crate::importer::rich_text::to_rich_text;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 布尔真值集合（小写）
pub const TRUTHY_VALUES: [&str; 6] = ["true", "1", "yes", "on", "active", "published"];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ==========================================
// CoercionFallback - 回退信息
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackKind {
    Number,
    Date,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionFallback {
    pub field: String,
    pub kind: FallbackKind,
    pub raw: String,
    pub substituted: String,
}

impl CoercionFallback {
    pub fn message(&self) -> String {
        format!(
            "Unrecognized {} value '{}' for {}; using '{}'",
            match self.kind {
                FallbackKind::Number => "number",
                FallbackKind::Date => "date",
                FallbackKind::Select => "option",
            },
            self.raw,
            self.field,
            self.substituted
        )
    }
}

// ==========================================
// TypeCoercer 实现
// ==========================================
pub struct TypeCoercer;

impl ValueCoercer for TypeCoercer {
    fn coerce(&self, raw: &str, mapping: &FieldMapping) -> (FieldValue, Option<CoercionFallback>) {
        coerce_value(raw, mapping, Utc::now())
    }
}

/// 按字段类型转换（`now` 用于日期回退）
pub fn coerce_value(
    raw: &str,
    mapping: &FieldMapping,
    now: DateTime<Utc>,
) -> (FieldValue, Option<CoercionFallback>) {
    let fallback = |kind: FallbackKind, substituted: String| CoercionFallback {
        field: mapping.canonical_field.clone(),
        kind,
        raw: raw.trim().to_string(),
        substituted,
    };

    match &mapping.value_type {
        ValueType::Text => (FieldValue::Text(raw.trim().to_string()), None),
        ValueType::Boolean => (FieldValue::Boolean(coerce_boolean(raw)), None),
        ValueType::RichText => (FieldValue::RichText(to_rich_text(raw)), None),
        ValueType::Number => match coerce_number(raw) {
            Some(n) => (FieldValue::Number(n), None),
            None => (
                FieldValue::Number(0.0),
                Some(fallback(FallbackKind::Number, "0".to_string())),
            ),
        },
        ValueType::Date => match coerce_date(raw) {
            Some(iso) => (FieldValue::Date(iso), None),
            None => {
                let iso = format_iso(now);
                (FieldValue::Date(iso.clone()), Some(fallback(FallbackKind::Date, iso)))
            }
        },
        ValueType::Select(spec) => match normalize_enum(raw, spec) {
            EnumMatch::Matched(value) => (FieldValue::Text(value), None),
            EnumMatch::Fallback(value) => (
                FieldValue::Text(value.clone()),
                Some(fallback(FallbackKind::Select, value)),
            ),
            EnumMatch::Unconstrained => (FieldValue::Text(raw.trim().to_string()), None),
        },
    }
}

/// 数字：非数字（含 NaN/inf）→ None
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 布尔：大小写不敏感的真值集合
pub fn coerce_boolean(raw: &str) -> bool {
    let normalized = raw.trim().to_lowercase();
    TRUTHY_VALUES.contains(&normalized.as_str())
}

/// 日期 → ISO-8601（UTC，毫秒精度）
pub fn coerce_date(raw: &str) -> Option<String> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(format_iso(dt.with_timezone(&Utc)));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(format_iso(naive.and_utc()));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| format_iso(naive.and_utc()));
        }
    }
    None
}

fn format_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ==========================================
// 枚举归一化
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMatch {
    Matched(String),
    Fallback(String),
    /// 无选项可约束（原样透传）
    Unconstrained,
}

/// 归一化顺序: 值/标签精确匹配 → 同义词 → 默认值
pub fn normalize_enum(raw: &str, spec: &SelectSpec) -> EnumMatch {
    let needle = raw.trim().to_lowercase();

    if let Some(option) = spec
        .options
        .iter()
        .find(|o| o.value.to_lowercase() == needle || o.label.trim().to_lowercase() == needle)
    {
        return EnumMatch::Matched(option.value.clone());
    }

    if let Some(synonym) = spec
        .synonyms
        .iter()
        .find(|s| s.variant.trim().to_lowercase() == needle)
    {
        return EnumMatch::Matched(synonym.value.clone());
    }

    match spec.fallback_value() {
        Some(value) => EnumMatch::Fallback(value.to_string()),
        None => EnumMatch::Unconstrained,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::{EnumOption, EnumSynonym};
    use chrono::TimeZone;

    fn status_spec() -> SelectSpec {
        SelectSpec {
            options: vec![
                EnumOption::new("Draft", "draft"),
                EnumOption::new("In Review", "review"),
                EnumOption::new("Published", "published"),
            ],
            synonyms: vec![EnumSynonym {
                variant: "live".to_string(),
                value: "published".to_string(),
            }],
            default_value: Some("draft".to_string()),
        }
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(" 19.99 "), Some(19.99));
        assert_eq!(coerce_number("-3"), Some(-3.0));
        assert_eq!(coerce_number("abc"), None);
        assert_eq!(coerce_number("NaN"), None);
    }

    #[test]
    fn test_number_fallback_is_zero() {
        let mapping = FieldMapping::new("price", ValueType::Number);
        let (value, fallback) = TypeCoercer.coerce("twelve", &mapping);
        assert_eq!(value, FieldValue::Number(0.0));
        assert_eq!(fallback.unwrap().kind, FallbackKind::Number);
    }

    #[test]
    fn test_coerce_boolean() {
        for v in ["TRUE", "1", "Yes", "on", "Active", "published"] {
            assert!(coerce_boolean(v), "{} should be true", v);
        }
        for v in ["false", "0", "no", "", "maybe"] {
            assert!(!coerce_boolean(v), "{} should be false", v);
        }
    }

    #[test]
    fn test_coerce_date_formats() {
        assert_eq!(coerce_date("2024-03-01").as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(coerce_date("2024/03/01").as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(coerce_date("20240301").as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(coerce_date("01.03.2024").as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(
            coerce_date("2024-03-01T10:30:00+02:00").as_deref(),
            Some("2024-03-01T08:30:00.000Z")
        );
        assert_eq!(coerce_date("2024-03-01 10:30:00").as_deref(), Some("2024-03-01T10:30:00.000Z"));
        assert_eq!(coerce_date("next tuesday"), None);
    }

    #[test]
    fn test_date_fallback_uses_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let mapping = FieldMapping::new("publishedAt", ValueType::Date);
        let (value, fallback) = coerce_value("not a date", &mapping, now);

        assert_eq!(value, FieldValue::Date("2025-06-01T12:00:00.000Z".to_string()));
        let fallback = fallback.unwrap();
        assert_eq!(fallback.kind, FallbackKind::Date);
        assert_eq!(fallback.raw, "not a date");
    }

    #[test]
    fn test_normalize_enum() {
        let spec = status_spec();
        assert_eq!(normalize_enum(" PUBLISHED ", &spec), EnumMatch::Matched("published".into()));
        assert_eq!(normalize_enum("in review", &spec), EnumMatch::Matched("review".into()));
        assert_eq!(normalize_enum("Live", &spec), EnumMatch::Matched("published".into()));
        assert_eq!(normalize_enum("whenever", &spec), EnumMatch::Fallback("draft".into()));
    }

    #[test]
    fn test_enum_fallback_reports_diagnostic() {
        let mapping = FieldMapping::new("status", ValueType::Select(status_spec()));
        let (value, fallback) = TypeCoercer.coerce("whenever", &mapping);

        assert_eq!(value, FieldValue::Text("draft".to_string()));
        let fallback = fallback.unwrap();
        assert_eq!(fallback.kind, FallbackKind::Select);
        assert_eq!(fallback.message(), "Unrecognized option value 'whenever' for status; using 'draft'");
    }

    #[test]
    fn test_select_without_options_passthrough() {
        let spec = SelectSpec {
            options: vec![],
            synonyms: vec![],
            default_value: None,
        };
        assert_eq!(normalize_enum("anything", &spec), EnumMatch::Unconstrained);
    }

    #[test]
    fn test_text_and_rich_text() {
        let text = FieldMapping::new("title", ValueType::Text);
        assert_eq!(TypeCoercer.coerce("  Hi  ", &text).0, FieldValue::Text("Hi".into()));

        let body = FieldMapping::new("body", ValueType::RichText);
        match TypeCoercer.coerce("<p>One</p><p>Two</p>", &body).0 {
            FieldValue::RichText(doc) => assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["One", "Two"]),
            other => panic!("unexpected value: {:?}", other),
        }
    }
}
