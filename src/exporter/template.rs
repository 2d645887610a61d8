// ==========================================
// 内容管理系统 - 导入模板生成
// ==========================================
// 职责: 集合声明 → CSV 骨架（表头 + 可选示例行）
// 示例: [Required: draft, review, published, or archived]
// ==========================================

use crate::domain::collection::CollectionSchema;
use crate::domain::field::{FieldMapping, ValueType};
use crate::exporter::error::ExportResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// 生成导入模板
///
/// # 参数
/// - schema: 集合声明
/// - include_example: 是否附带占位示例行
pub fn build_template(schema: &CollectionSchema, include_example: bool) -> ExportResult<String> {
    let mappings = schema.field_mappings();

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(mappings.iter().map(|m| m.csv_header.as_str()))?;
    if include_example {
        wtr.write_record(mappings.iter().map(placeholder))?;
    }

    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

/// 单字段占位符
pub fn placeholder(mapping: &FieldMapping) -> String {
    let requirement = if mapping.required { "Required" } else { "Optional" };
    format!("[{}: {}]", requirement, value_hint(&mapping.value_type))
}

fn value_hint(value_type: &ValueType) -> String {
    match value_type {
        ValueType::Text => "text".to_string(),
        ValueType::Number => "number".to_string(),
        ValueType::Boolean => "true or false".to_string(),
        ValueType::Date => "date (YYYY-MM-DD)".to_string(),
        ValueType::RichText => "text or <p>paragraphs</p>".to_string(),
        ValueType::Select(spec) => {
            let values = spec.values();
            if values.is_empty() {
                "text".to_string()
            } else {
                join_choices(&values)
            }
        }
    }
}

/// a / a or b / a, b, or c
fn join_choices(values: &[&str]) -> String {
    match values {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} or {}", first, second),
        [head @ .., last] => format!("{}, or {}", head.join(", "), last),
    }
}
