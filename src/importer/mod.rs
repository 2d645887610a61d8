// ==========================================
// 内容管理系统 - 导入层
// ==========================================
// 职责: 表格数据 → 类型化、已校验的集合记录
// 支持: CSV 文本, CSV 文件, Excel/ODS 工作簿
// ==========================================

// 模块声明
pub mod bulk_importer_impl;
pub mod bulk_importer_trait;
pub mod coercion;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod rich_text;
pub mod slug;
pub mod tokenizer;
pub mod validator;

// 重导出核心类型
pub use bulk_importer_impl::BulkImporterImpl;
pub use coercion::{CoercionFallback, FallbackKind, TypeCoercer};
pub use error::{BulkIoResult, ImportError};
pub use field_mapper::{HeaderFieldMapper, HeaderResolution, MappedCell};
pub use file_parser::{CsvParser, ExcelParser, RawTable, UniversalFileParser};
pub use slug::{slugify, SlugGenerator, SlugOutcome};
pub use tokenizer::{DelimiterTokenizer, RawRow};
pub use validator::SchemaValidator;

// 重导出 Trait 接口
pub use bulk_importer_trait::{
    BulkImporter, FieldMapper, FileParser, RecordValidator, RowTokenizer, ValueCoercer,
};
