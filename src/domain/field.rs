// ==========================================
// 内容管理系统 - 字段映射模型
// ==========================================
// 职责: 描述 CSV 列与集合字段之间的映射关系
// 用途: 导入/导出/模板共用同一张映射表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// EnumOption - 枚举选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub label: String,
    pub value: String,
}

impl EnumOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

// ==========================================
// EnumSynonym - 枚举同义词（集合级配置）
// ==========================================
// 例: "live" → "published"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSynonym {
    pub variant: String,
    pub value: String,
}

// ==========================================
// SelectSpec - 下拉字段定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectSpec {
    pub options: Vec<EnumOption>, // 有序，第一个为隐式默认值
    #[serde(default)]
    pub synonyms: Vec<EnumSynonym>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl SelectSpec {
    /// 回退值：显式默认值优先，否则取第一个选项
    pub fn fallback_value(&self) -> Option<&str> {
        self.default_value
            .as_deref()
            .or_else(|| self.options.first().map(|o| o.value.as_str()))
    }

    /// 所有合法取值（按声明顺序）
    pub fn values(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.value.as_str()).collect()
    }
}

// ==========================================
// ValueType - 字段值类型（带标签的变体）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueType {
    Text,
    Number,
    Boolean,
    Date,
    Select(SelectSpec),
    RichText,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Select(_) => "select",
            ValueType::RichText => "richText",
        }
    }
}

// ==========================================
// FieldMapping - 字段映射描述符
// ==========================================
// 红线: 同一映射表内 canonical_field 唯一
// 生命周期: 每次导入/导出调用内不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub csv_header: String,      // 可读表头（模板使用）
    pub canonical_field: String, // 集合内部字段名
    pub required: bool,
    pub value_type: ValueType,
    pub localized: bool,
    #[serde(default)]
    pub aliases: Vec<String>, // 额外的表头别名
}

impl FieldMapping {
    pub fn new(canonical_field: impl Into<String>, value_type: ValueType) -> Self {
        let canonical_field = canonical_field.into();
        Self {
            csv_header: humanize_field_name(&canonical_field),
            canonical_field,
            required: false,
            value_type,
            localized: false,
            aliases: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn localized(mut self) -> Self {
        self.localized = true;
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.csv_header = header.into();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// 表头匹配关键词（已小写、去空白，去重，保持顺序）
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        let candidates = std::iter::once(&self.canonical_field)
            .chain(std::iter::once(&self.csv_header))
            .chain(self.aliases.iter());

        for candidate in candidates {
            let key = candidate.trim().to_lowercase();
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// 字段名 → 可读表头
///
/// `publishedAt` → `Published At`，`reading_time` → `Reading Time`
pub fn humanize_field_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
