// ==========================================
// 内容管理系统 - 记录领域模型
// ==========================================
// 职责: 映射后的类型化记录 + 富文本文档树
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// RichTextDocument - 富文本文档
// ==========================================
// 红线: 至少包含一个段落（空输入 → 空文本叶子）
// 序列化: root → paragraph → text 三层结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextDocument {
    pub root: RichTextRoot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextRoot {
    #[serde(rename = "type")]
    pub node_type: String,
    pub children: Vec<ParagraphNode>,
    pub direction: Option<String>,
    pub format: String,
    pub indent: u32,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub children: Vec<TextNode>,
    pub direction: Option<String>,
    pub format: String,
    pub indent: u32,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub text: String,
    pub detail: u32,
    pub format: u32,
    pub mode: String,
    pub style: String,
    pub version: u32,
}

impl RichTextDocument {
    /// 由段落文本构建文档；空列表时补一个空段落
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut children: Vec<ParagraphNode> =
            paragraphs.into_iter().map(|p| ParagraphNode::new(p)).collect();
        if children.is_empty() {
            children.push(ParagraphNode::new(""));
        }

        Self {
            root: RichTextRoot {
                node_type: "root".to_string(),
                children,
                direction: Some("ltr".to_string()),
                format: String::new(),
                indent: 0,
                version: 1,
            },
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.root.children.iter().map(|p| p.text())
    }

    /// 全部段落是否都为空白
    pub fn is_blank(&self) -> bool {
        self.paragraphs().all(|p| p.trim().is_empty())
    }

    /// 纯文本（段落以空行分隔）
    pub fn plain_text(&self) -> String {
        self.paragraphs().collect::<Vec<_>>().join("\n\n")
    }
}

impl ParagraphNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            node_type: "paragraph".to_string(),
            children: vec![TextNode {
                node_type: "text".to_string(),
                text: text.into(),
                detail: 0,
                format: 0,
                mode: "normal".to_string(),
                style: String::new(),
                version: 1,
            }],
            direction: Some("ltr".to_string()),
            format: String::new(),
            indent: 0,
            version: 1,
        }
    }

    pub fn text(&self) -> &str {
        self.children.first().map(|t| t.text.as_str()).unwrap_or("")
    }
}

// ==========================================
// FieldValue - 类型化字段值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(String), // ISO-8601
    RichText(RichTextDocument),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => serde_json::Value::String(s.clone()),
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::RichText(doc) => {
                serde_json::to_value(doc).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// 整数值落库为 JSON 整数，导出时不带 `.0`
fn number_to_json(n: f64) -> serde_json::Value {
    // f64 可精确表示的整数上限 (2^53)
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

// ==========================================
// MappedRecord - 映射后的记录
// ==========================================
// 用途: 每行新建，落库前无身份
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl MappedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// 转为 JSON 对象（落库载荷）
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}
