// ==========================================
// 内容管理系统 - 领域模型层
// ==========================================
// 职责: 定义集合声明、字段映射、记录、导入结果等领域类型
// 红线: 不含数据访问逻辑，不含导入管道逻辑
// ==========================================

pub mod collection;
pub mod field;
pub mod import;
pub mod presets;
pub mod record;

// 重导出核心类型
pub use collection::{
    CollectionSchema, FieldDeclaration, FieldKind, RowRule, RuleCheck, SlugSpec,
    INTERNAL_FIELD_PREFIX, RESERVED_FIELDS,
};
pub use field::{humanize_field_name, EnumOption, EnumSynonym, FieldMapping, SelectSpec, ValueType};
pub use import::{
    Diagnostic, DiagnosticLevel, ImportOptions, ImportProgress, ImportReport, ImportResult,
    RowOutcome, RowStatus,
};
pub use presets::CollectionRegistry;
pub use record::{FieldValue, MappedRecord, ParagraphNode, RichTextDocument, TextNode};
