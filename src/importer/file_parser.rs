// ==========================================
// 内容管理系统 - 文件解析器实现
// ==========================================
// 职责: CSV 文本 / CSV 文件 / Excel 工作簿 → RawTable
// 支持: .csv / .xlsx / .xls / .ods
// ==========================================

use crate::importer::bulk_importer_trait::{FileParser, RowTokenizer};
use crate::importer::error::{BulkIoResult, ImportError};
use crate::importer::tokenizer::{DelimiterTokenizer, RawRow};
use calamine::{open_workbook_auto, Reader};
use std::path::Path;

// ==========================================
// RawTable - 表头 + 数据行（带物理行号）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: RawRow,
    pub rows: Vec<(usize, RawRow)>, // (1 起始的物理行号, 单元格)
}

impl RawTable {
    /// CSV 文本 → RawTable（逐行切分，跳过空白行）
    ///
    /// 首个非空行为表头；文本为空时返回空表
    pub fn from_csv_text(text: &str, tokenizer: &dyn RowTokenizer) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text
            .split('\n')
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.strip_suffix('\r').unwrap_or(line)))
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((_, header_line)) = lines.next() else {
            return Self::default();
        };

        Self {
            header: tokenizer.tokenize(header_line),
            rows: lines
                .map(|(line_no, line)| (line_no, tokenizer.tokenize(line)))
                .collect(),
        }
    }

    /// 表头 + 数据行总数
    pub fn line_count(&self) -> usize {
        if self.header.is_empty() {
            0
        } else {
            self.rows.len() + 1
        }
    }
}

fn ensure_exists(path: &Path) -> BulkIoResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CsvParser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_table(&self, file_path: &Path) -> BulkIoResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" && ext != "txt" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ImportError::CsvParseError(format!("file is not valid UTF-8: {}", e)))?;

        Ok(RawTable::from_csv_text(&text, &DelimiterTokenizer))
    }
}

// ==========================================
// ExcelParser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_table(&self, file_path: &Path) -> BulkIoResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xls" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;
        // 区域可能不从 A1 开始，行号按工作表物理行计算
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let mut rows = range.rows().enumerate().filter_map(|(idx, row)| {
            let cells: RawRow = row.iter().map(|cell| cell.to_string().trim().to_string()).collect();
            // 跳过完全空白的行
            if cells.iter().all(|c| c.is_empty()) {
                None
            } else {
                Some((first_row + idx + 1, cells))
            }
        });

        let Some((_, header)) = rows.next() else {
            return Ok(RawTable::default());
        };

        Ok(RawTable {
            header,
            rows: rows.collect(),
        })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_table(&self, file_path: &Path) -> BulkIoResult<RawTable> {
        match extension_of(file_path).as_str() {
            "csv" | "txt" => CsvParser.parse_to_table(file_path),
            "xlsx" | "xls" | "ods" => ExcelParser.parse_to_table(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_from_csv_text_line_numbers() {
        let table = RawTable::from_csv_text("\u{feff}Title,Body\r\n\r\nA,x\nB,y\n", &DelimiterTokenizer);

        assert_eq!(table.header, vec!["Title", "Body"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].0, 3);
        assert_eq!(table.rows[1], (4, vec!["B".to_string(), "y".to_string()]));
        assert_eq!(table.line_count(), 3);
    }

    #[test]
    fn test_from_csv_text_empty() {
        let table = RawTable::from_csv_text("  \n", &DelimiterTokenizer);
        assert_eq!(table.line_count(), 0);
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Title;Status").unwrap();
        writeln!(temp_file, "Hello;draft").unwrap();

        let table = CsvParser.parse_to_table(temp_file.path()).unwrap();
        assert_eq!(table.header, vec!["Title", "Status"]);
        assert_eq!(table.rows[0].1, vec!["Hello", "draft"]);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_table(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_unsupported() {
        let temp_file = Builder::new().suffix(".pdf").tempfile().unwrap();
        let result = UniversalFileParser.parse_to_table(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }
}
