// ==========================================
// 内容管理系统 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    CsvWriteError(String),

    #[error("Failed to flush CSV output: {0}")]
    FlushError(String),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8Error(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvWriteError(err.to_string())
    }
}

// 实现 From<csv::IntoInnerError>
impl<W> From<csv::IntoInnerError<W>> for ExportError {
    fn from(err: csv::IntoInnerError<W>) -> Self {
        ExportError::FlushError(err.error().to_string())
    }
}

// 实现 From<FromUtf8Error>
impl From<std::string::FromUtf8Error> for ExportError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ExportError::Utf8Error(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
