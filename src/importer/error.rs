// ==========================================
// 内容管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级错误在编排器内被捕获并写入 ImportResult.errors，
//       只有结构性错误（文件/格式）通过 Err 返回
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0} (expected .csv/.xlsx/.xls/.ods)")]
    UnsupportedFormat(String),

    #[error("Failed to read file: {0}")]
    FileReadError(String),

    #[error("Failed to parse workbook: {0}")]
    ExcelParseError(String),

    #[error("Failed to parse CSV: {0}")]
    CsvParseError(String),

    // ===== 结构错误 =====
    #[error("CSV must contain a header row and at least one data row")]
    MissingDataRows,

    // ===== 行级错误 =====
    #[error("Row {row}: {message}")]
    Validation { row: usize, message: String },

    #[error("Row {row}: {message}")]
    Persistence { row: usize, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    /// 行号（仅行级错误）
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::Validation { row, .. } | ImportError::Persistence { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// 去掉行号前缀的错误描述
    pub fn detail(&self) -> String {
        match self {
            ImportError::Validation { message, .. } | ImportError::Persistence { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type BulkIoResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_scoped_messages() {
        let err = ImportError::Validation {
            row: 3,
            message: "Missing required field: Title".to_string(),
        };
        assert_eq!(err.to_string(), "Row 3: Missing required field: Title");
        assert_eq!(err.row(), Some(3));
        assert_eq!(err.detail(), "Missing required field: Title");
        assert_eq!(ImportError::MissingDataRows.row(), None);
    }
}
