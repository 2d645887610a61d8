// ==========================================
// 内容管理系统 - 批量导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 切分 → 表头映射 → 类型转换 → 校验 → [slug] → 落库
// ==========================================

use crate::domain::collection::CollectionSchema;
use crate::domain::field::FieldMapping;
use crate::domain::import::{ImportOptions, ImportReport, RowOutcome};
use crate::domain::record::{FieldValue, MappedRecord};
use crate::importer::coercion::CoercionFallback;
use crate::importer::error::BulkIoResult;
use crate::importer::field_mapper::{HeaderResolution, MappedCell};
use crate::importer::file_parser::RawTable;
use crate::importer::tokenizer::RawRow;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// BulkImporter Trait
// ==========================================
// 用途: 批量导入主接口
// 实现者: BulkImporterImpl
#[async_trait]
pub trait BulkImporter: Send + Sync {
    /// 从 CSV 文本导入
    ///
    /// # 返回
    /// - ImportReport: 始终返回（行级错误和结构错误都体现在 result 中）
    async fn import_csv(
        &self,
        csv_text: &str,
        schema: &CollectionSchema,
        options: &ImportOptions,
    ) -> ImportReport;

    /// 从文件导入（.csv / .xlsx / .xls / .ods）
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入报告
    /// - Err: 文件不存在、格式不支持、读取失败
    async fn import_file(
        &self,
        file_path: &Path,
        schema: &CollectionSchema,
        options: &ImportOptions,
    ) -> BulkIoResult<ImportReport>;

    /// 从已切分的表导入
    async fn import_table(
        &self,
        table: RawTable,
        schema: &CollectionSchema,
        options: &ImportOptions,
    ) -> ImportReport;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件 → RawTable
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    fn parse_to_table(&self, file_path: &Path) -> BulkIoResult<RawTable>;
}

// ==========================================
// RowTokenizer Trait
// ==========================================
// 用途: 单行文本 → 单元格
// 实现者: DelimiterTokenizer
pub trait RowTokenizer: Send + Sync {
    fn tokenize(&self, line: &str) -> RawRow;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 表头 → 规范字段，数据行 → 原始字段值
// 实现者: HeaderFieldMapper
pub trait FieldMapper: Send + Sync {
    /// 解析表头（每次导入执行一次）
    fn resolve_headers(&self, header: &RawRow, mappings: &[FieldMapping]) -> HeaderResolution;

    /// 映射单行；空单元格视为字段缺失
    fn map_row<'m>(
        &self,
        resolution: &HeaderResolution,
        row: &RawRow,
        mappings: &'m [FieldMapping],
    ) -> Vec<MappedCell<'m>>;
}

// ==========================================
// ValueCoercer Trait
// ==========================================
// 用途: 原始字符串 → 类型化值（不报错，必要时回退）
// 实现者: TypeCoercer
pub trait ValueCoercer: Send + Sync {
    /// # 返回
    /// - (值, 回退信息)：回退信息仅在发生兜底替换时存在
    fn coerce(&self, raw: &str, mapping: &FieldMapping) -> (FieldValue, Option<CoercionFallback>);
}

// ==========================================
// RecordValidator Trait
// ==========================================
// 用途: 必填校验 + 集合级规则
// 实现者: SchemaValidator
pub trait RecordValidator: Send + Sync {
    fn validate(
        &self,
        record: MappedRecord,
        mappings: &[FieldMapping],
        schema: &CollectionSchema,
    ) -> RowOutcome;
}
