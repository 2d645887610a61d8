// ==========================================
// 内容管理系统 - 导出层
// ==========================================
// 职责: 记录 → CSV 文本；集合声明 → 导入模板
// ==========================================

pub mod csv_formatter;
pub mod error;
pub mod template;

// 重导出核心类型
pub use csv_formatter::CsvFormatter;
pub use error::{ExportError, ExportResult};
pub use template::build_template;
