// ==========================================
// 内容管理系统 - 分隔符感知的行切分器
// ==========================================
// 职责: 单行文本 → 单元格列表（逗号/分号自动判定）
// 红线: 分隔符按行独立判定，不做整文件嗅探
// ==========================================

use crate::importer::bulk_importer_trait::RowTokenizer;

/// 单行原始单元格
pub type RawRow = Vec<String>;

// ==========================================
// DelimiterTokenizer 实现
// ==========================================
pub struct DelimiterTokenizer;

impl RowTokenizer for DelimiterTokenizer {
    fn tokenize(&self, line: &str) -> RawRow {
        tokenize_line(line)
    }
}

/// 判定分隔符：引号外出现分号则使用分号，否则使用逗号
///
/// 引号内的分号不参与判定：导出的 `"a;b","c"` 仍按逗号切分
pub fn detect_separator(line: &str) -> char {
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return ';',
            _ => {}
        }
    }
    ','
}

/// 切分单行
///
/// # 规则
/// - 引号外的分隔符结束当前单元格（去首尾空白）
/// - 引号内的分隔符作为普通字符
/// - 引号本身被剥离；引号内的 `""` 还原为一个 `"`
/// - 最后一个单元格无条件追加（至少返回一个单元格）
pub fn tokenize_line(line: &str) -> RawRow {
    let separator = detect_separator(line);
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == separator && !in_quotes {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    cells.push(current.trim().to_string());

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated() {
        assert_eq!(tokenize_line("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_semicolon_wins_over_comma() {
        assert_eq!(tokenize_line("1,5;2,5;x"), vec!["1,5", "2,5", "x"]);
    }

    #[test]
    fn test_quoted_separator_single_cell() {
        assert_eq!(tokenize_line(r#""Hello, World",x"#), vec!["Hello, World", "x"]);
        assert_eq!(tokenize_line(r#""a;b";c"#), vec!["a;b", "c"]);
    }

    #[test]
    fn test_quoted_semicolon_does_not_flip_comma_line() {
        assert_eq!(tokenize_line(r#""a;b","c""#), vec!["a;b", "c"]);
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(
            tokenize_line(r#""He said ""hi""","""""#),
            vec![r#"He said "hi""#, "\""]
        );
        assert_eq!(tokenize_line(r#""","x""#), vec!["", "x"]);
    }

    #[test]
    fn test_always_at_least_one_cell() {
        assert_eq!(tokenize_line(""), vec![""]);
        assert_eq!(tokenize_line("a,"), vec!["a", ""]);
    }

    #[test]
    fn test_rows_decide_separator_independently() {
        let rows: Vec<RawRow> = "a;b\nc,d".lines().map(tokenize_line).collect();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }
}
