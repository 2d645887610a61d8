// ==========================================
// 内容管理系统 - 富文本转换器
// ==========================================
// 职责: 纯文本 / `<p>` 分段文本 → RichTextDocument
// 红线: 输出至少一个段落；单向转换，不要求可逆
// ==========================================

use crate::domain::record::RichTextDocument;

/// 文本 → 富文本文档
///
/// # 规则
/// - 按 `<p>` / `<p ...>` / `</p>` 切分（不区分大小写），丢弃空白片段
/// - 无可用片段 → 单段落，内容为去首尾空白的原文
/// - 否则每个片段一个段落，保持顺序
pub fn to_rich_text(input: &str) -> RichTextDocument {
    let segments: Vec<String> = split_paragraph_tags(input)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        return RichTextDocument::from_paragraphs([input.trim()]);
    }
    RichTextDocument::from_paragraphs(segments)
}

/// 在段落标签处切分，返回标签之间的片段
fn split_paragraph_tags(input: &str) -> Vec<&str> {
    // ASCII 小写不改变字节偏移
    let lower = input.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut segments = Vec::new();
    let mut segment_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        let tag_len = if rest.starts_with(b"</p>") {
            Some(4)
        } else if rest.starts_with(b"<p>") {
            Some(3)
        } else if rest.starts_with(b"<p ") {
            rest.iter().position(|b| *b == b'>').map(|end| end + 1)
        } else {
            None
        };

        match tag_len {
            Some(len) => {
                segments.push(&input[segment_start..i]);
                i += len;
                segment_start = i;
            }
            None => i += 1,
        }
    }
    segments.push(&input[segment_start..]);

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(doc: &RichTextDocument) -> Vec<&str> {
        doc.paragraphs().collect()
    }

    #[test]
    fn test_plain_text_single_paragraph() {
        let doc = to_rich_text("  Just some text  ");
        assert_eq!(paragraphs(&doc), vec!["Just some text"]);
    }

    #[test]
    fn test_empty_input_keeps_one_paragraph() {
        assert_eq!(paragraphs(&to_rich_text("")), vec![""]);
        assert_eq!(paragraphs(&to_rich_text("<p> </p><p></p>")), vec!["<p> </p><p></p>"]);
    }

    #[test]
    fn test_paragraph_segments_in_order() {
        let doc = to_rich_text("<p>First</p>\n<P class=\"lead\"> Second </P>trailing");
        assert_eq!(paragraphs(&doc), vec!["First", "Second", "trailing"]);
    }

    #[test]
    fn test_non_ascii_content_preserved() {
        let doc = to_rich_text("<p>Grüße</p><p>日本語</p>");
        assert_eq!(paragraphs(&doc), vec!["Grüße", "日本語"]);
    }
}
