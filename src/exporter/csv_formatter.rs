// ==========================================
// 内容管理系统 - CSV 导出格式化器
// ==========================================
// 职责: 记录(JSON 对象) + 字段白名单 → 全引号 CSV 文本
// 红线: 内部字段（前缀 `_`）永不导出；id/createdAt/updatedAt 仅在显式指定时导出
// 红线: 零条记录 → 空字符串（无论是否输出表头）
// ==========================================

use crate::domain::collection::{CollectionSchema, INTERNAL_FIELD_PREFIX, RESERVED_FIELDS};
use crate::exporter::error::ExportResult;
use crate::repository::record_store::RecordStore;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use tracing::{debug, info};

// ==========================================
// CsvFormatter
// ==========================================
pub struct CsvFormatter {
    internal_prefix: String,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new(INTERNAL_FIELD_PREFIX)
    }
}

impl CsvFormatter {
    pub fn new(internal_prefix: impl Into<String>) -> Self {
        Self {
            internal_prefix: internal_prefix.into(),
        }
    }

    fn is_internal(&self, field: &str) -> bool {
        !self.internal_prefix.is_empty() && field.starts_with(&self.internal_prefix)
    }

    /// 计算导出列
    ///
    /// - 显式白名单：去掉内部字段，保留顺序
    /// - 未指定：取第一条记录的键（插入顺序），再去掉内部字段和隐式字段
    pub fn resolve_fields(&self, records: &[Value], fields: Option<&[String]>) -> Vec<String> {
        match fields {
            Some(explicit) => explicit
                .iter()
                .filter(|f| !self.is_internal(f))
                .cloned()
                .collect(),
            None => records
                .first()
                .and_then(Value::as_object)
                .map(|obj| {
                    obj.keys()
                        .filter(|k| !self.is_internal(k))
                        .filter(|k| !RESERVED_FIELDS.contains(&k.as_str()))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// 记录 → CSV 文本
    ///
    /// # 参数
    /// - records: 记录（JSON 对象）
    /// - fields: 字段白名单（None 表示按第一条记录推断）
    /// - include_headers: 是否输出表头行
    pub fn format(
        &self,
        records: &[Value],
        fields: Option<&[String]>,
        include_headers: bool,
    ) -> ExportResult<String> {
        if records.is_empty() {
            return Ok(String::new());
        }

        let columns = self.resolve_fields(records, fields);
        debug!(records = records.len(), columns = columns.len(), "开始格式化 CSV");

        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        if include_headers {
            wtr.write_record(&columns)?;
        }

        for record in records {
            let row: Vec<String> = columns
                .iter()
                .map(|field| stringify_value(record.get(field.as_str())))
                .collect();
            wtr.write_record(&row)?;
        }

        let bytes = wtr.into_inner()?;
        Ok(String::from_utf8(bytes)?)
    }

    /// 导出整个集合（以集合字段为白名单）
    pub async fn export_collection<S>(
        &self,
        store: &S,
        schema: &CollectionSchema,
        fields: Option<&[String]>,
        include_headers: bool,
    ) -> ExportResult<String>
    where
        S: RecordStore + ?Sized,
    {
        let records = store.find_all(&schema.slug).await?;
        let columns: Vec<String> = match fields {
            Some(explicit) => explicit.to_vec(),
            None => schema
                .field_mappings()
                .into_iter()
                .map(|m| m.canonical_field)
                .collect(),
        };

        let csv = self.format(&records, Some(&columns), include_headers)?;
        info!(collection = %schema.slug, records = records.len(), "集合导出完成");
        Ok(csv)
    }
}

/// 单元格值 → 文本（对象/数组输出 JSON，null/缺失输出空串）
fn stringify_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            // 浮点存储的整数（如 20.0）按整数输出
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}
