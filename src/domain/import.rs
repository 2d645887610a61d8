// ==========================================
// 内容管理系统 - 导入领域模型
// ==========================================
// 职责: 导入选项 / 行结果 / 汇总结果 / 诊断 / 进度
// ==========================================

use crate::domain::record::MappedRecord;
use serde::{Deserialize, Serialize};

// ==========================================
// ImportOptions - 导入选项
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub skip_errors: bool,
    /// 暂未实现：始终新建记录
    #[serde(default)]
    pub update_existing: bool,
    /// 透传给存储层的 locale
    #[serde(default)]
    pub locale: Option<String>,
}

// ==========================================
// RowOutcome - 单行结果
// ==========================================
// 红线: 不存在部分接受
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub accepted: bool,
    pub record: Option<MappedRecord>,
    pub errors: Vec<String>,
}

impl RowOutcome {
    pub fn accepted(record: MappedRecord) -> Self {
        Self {
            accepted: true,
            record: Some(record),
            errors: Vec::new(),
        }
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            accepted: false,
            record: None,
            errors,
        }
    }

    /// 错误合并为单条消息
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

// ==========================================
// ImportResult - 导入汇总结果
// ==========================================
// 用途: 导入入口返回值（计数单调递增，结束时定稿）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ImportResult {
    /// 结构性失败（无需处理任何行）
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            errors: vec![message.clone()],
            message,
            ..Self::default()
        }
    }
}

// ==========================================
// Diagnostic - 诊断信息
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticLevel {
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub row: Option<usize>,
    pub field: Option<String>,
    pub level: DiagnosticLevel,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: None,
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

// ==========================================
// ImportProgress - 逐行进度事件
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowStatus {
    Imported,
    DryRun,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub batch_id: String,
    pub row_number: usize,
    pub processed: usize,
    pub total: usize,
    pub status: RowStatus,
}

// ==========================================
// ImportReport - 导入报告（结果 + 诊断）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub result: ImportResult,
    pub diagnostics: Vec<Diagnostic>,
    pub elapsed_ms: u64,
}
