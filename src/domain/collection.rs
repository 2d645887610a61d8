// ==========================================
// 内容管理系统 - 集合 Schema 与字段声明
// ==========================================
// 职责: 集合字段声明 → FieldMapping 映射表（Schema Introspector）
// 红线: 映射表每次调用只构建一次，调用期间不可变
// ==========================================

use crate::domain::field::{EnumOption, EnumSynonym, FieldMapping, SelectSpec, ValueType};
use crate::domain::record::{FieldValue, MappedRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 系统保留字段（身份/时间戳）
pub const RESERVED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// 内部字段前缀
pub const INTERNAL_FIELD_PREFIX: &str = "_";

// ==========================================
// FieldKind - 集合字段类型（框架侧）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Number,
    Checkbox,
    Date,
    Select,
    RichText,
    Relationship,
    Upload,
    Json,
}

// ==========================================
// FieldDeclaration - 字段声明
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDeclaration {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub localized: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub options: Vec<EnumOption>,
    #[serde(default)]
    pub synonyms: Vec<EnumSynonym>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            required: false,
            localized: false,
            aliases: Vec::new(),
            options: Vec::new(),
            synonyms: Vec::new(),
            default_value: None,
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

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// 选项按 (label, value) 声明
    pub fn options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(label, value)| EnumOption::new(*label, *value))
            .collect();
        self
    }

    /// 同义词按 (variant, value) 声明
    pub fn synonyms(mut self, synonyms: &[(&str, &str)]) -> Self {
        self.synonyms = synonyms
            .iter()
            .map(|(variant, value)| EnumSynonym {
                variant: variant.to_string(),
                value: value.to_string(),
            })
            .collect();
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// 字段类型 → 值类型；不可导入的类型返回 None
    fn value_type(&self) -> Option<ValueType> {
        match self.kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Email => Some(ValueType::Text),
            FieldKind::Number => Some(ValueType::Number),
            FieldKind::Checkbox => Some(ValueType::Boolean),
            FieldKind::Date => Some(ValueType::Date),
            FieldKind::Select => Some(ValueType::Select(SelectSpec {
                options: self.options.clone(),
                synonyms: self.synonyms.clone(),
                default_value: self.default_value.clone(),
            })),
            FieldKind::RichText => Some(ValueType::RichText),
            FieldKind::Relationship | FieldKind::Upload | FieldKind::Json => None,
        }
    }
}

// ==========================================
// SlugSpec - 自动 slug 配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugSpec {
    pub field: String,  // 写入的目标字段
    pub source: String, // 来源字段（标题/名称）
}

// ==========================================
// RowRule - 集合级行规则
// ==========================================
// 按声明顺序求值，首个失败的规则决定该行错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRule {
    pub name: String,
    pub message: String,
    pub check: RuleCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "camelCase")]
pub enum RuleCheck {
    /// 字段必须存在
    Present(String),
    /// 字段存在且文本/富文本非空白
    NonEmpty(String),
    /// 字段为正数
    PositiveNumber(String),
}

impl RowRule {
    pub fn new(name: impl Into<String>, check: RuleCheck, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            check,
        }
    }

    pub fn passes(&self, record: &MappedRecord) -> bool {
        match &self.check {
            RuleCheck::Present(field) => record.contains(field),
            RuleCheck::NonEmpty(field) => match record.get(field) {
                Some(FieldValue::RichText(doc)) => !doc.is_blank(),
                Some(FieldValue::Text(s)) | Some(FieldValue::Date(s)) => !s.trim().is_empty(),
                Some(_) => true,
                None => false,
            },
            RuleCheck::PositiveNumber(field) => record
                .get(field)
                .and_then(FieldValue::as_number)
                .map(|n| n > 0.0)
                .unwrap_or(false),
        }
    }
}

// ==========================================
// CollectionSchema - 集合 Schema
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    pub slug: String, // 集合标识
    #[serde(default)]
    pub label: Option<String>,
    pub fields: Vec<FieldDeclaration>,
    #[serde(default)]
    pub slug_spec: Option<SlugSpec>,
    #[serde(default)]
    pub rules: Vec<RowRule>,
}

impl CollectionSchema {
    pub fn new(slug: impl Into<String>, fields: Vec<FieldDeclaration>) -> Self {
        Self {
            slug: slug.into(),
            label: None,
            fields,
            slug_spec: None,
            rules: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_slug(mut self, field: impl Into<String>, source: impl Into<String>) -> Self {
        self.slug_spec = Some(SlugSpec {
            field: field.into(),
            source: source.into(),
        });
        self
    }

    pub fn with_rule(mut self, rule: RowRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// 从 JSON 描述加载 Schema
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 生成字段映射表
    ///
    /// # 规则
    /// - 关系/上传/JSON 字段不可导入，跳过
    /// - 保留字段（id/createdAt/updatedAt）与内部字段（`_` 前缀）跳过
    /// - 同名字段仅保留第一个
    pub fn field_mappings(&self) -> Vec<FieldMapping> {
        let mut mappings: Vec<FieldMapping> = Vec::with_capacity(self.fields.len());

        for decl in &self.fields {
            if RESERVED_FIELDS.contains(&decl.name.as_str())
                || decl.name.starts_with(INTERNAL_FIELD_PREFIX)
            {
                debug!(collection = %self.slug, field = %decl.name, "跳过保留字段");
                continue;
            }
            if mappings.iter().any(|m| m.canonical_field == decl.name) {
                debug!(collection = %self.slug, field = %decl.name, "跳过重复字段声明");
                continue;
            }
            let Some(value_type) = decl.value_type() else {
                debug!(collection = %self.slug, field = %decl.name, kind = ?decl.kind, "字段类型不支持导入");
                continue;
            };

            let mut mapping =
                FieldMapping::new(decl.name.as_str(), value_type).with_aliases(decl.aliases.iter().cloned());
            if let Some(label) = &decl.label {
                mapping = mapping.with_header(label.as_str());
            }
            if decl.required {
                mapping = mapping.required();
            }
            if decl.localized {
                mapping = mapping.localized();
            }
            mappings.push(mapping);
        }

        mappings
    }

    /// 该集合是否自动生成 slug
    pub fn slug_field(&self) -> Option<&str> {
        self.slug_spec.as_ref().map(|s| s.field.as_str())
    }
}
