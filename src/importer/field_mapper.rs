// ==========================================
// 内容管理系统 - 表头解析 / 字段映射器实现
// ==========================================
// 职责: CSV 表头 → 规范字段名（精确匹配优先，其次子串匹配）
// 红线: 未匹配表头静默丢弃，不报错
// ==========================================

use crate::domain::field::FieldMapping;
use crate::importer::bulk_importer_trait::FieldMapper as FieldMapperTrait;
use crate::importer::tokenizer::RawRow;
use tracing::debug;

// ==========================================
// HeaderResolution - 表头解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderResolution {
    pub columns: Vec<Option<usize>>, // 列号 → 映射表下标
    pub unmatched: Vec<String>,
}

impl HeaderResolution {
    pub fn matched_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}

/// 单元格映射结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCell<'m> {
    pub mapping: &'m FieldMapping,
    pub raw: String,
}

pub struct HeaderFieldMapper;

impl FieldMapperTrait for HeaderFieldMapper {
    fn resolve_headers(&self, header: &RawRow, mappings: &[FieldMapping]) -> HeaderResolution {
        let keys: Vec<Vec<String>> = mappings.iter().map(FieldMapping::lookup_keys).collect();
        let mut resolution = HeaderResolution::default();

        for cell in header {
            let resolved = resolve_header_with_keys(cell, &keys);
            if resolved.is_none() && !cell.trim().is_empty() {
                debug!(header = %cell, "表头未匹配任何字段，忽略该列");
                resolution.unmatched.push(cell.clone());
            }
            resolution.columns.push(resolved);
        }

        resolution
    }

    fn map_row<'m>(
        &self,
        resolution: &HeaderResolution,
        row: &RawRow,
        mappings: &'m [FieldMapping],
    ) -> Vec<MappedCell<'m>> {
        let mut cells: Vec<MappedCell<'m>> = Vec::new();

        for (idx, value) in row.iter().enumerate() {
            let Some(Some(mapping_idx)) = resolution.columns.get(idx) else {
                continue;
            };
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mapping = &mappings[*mapping_idx];
            // 同一字段多列命中时，第一个非空值生效
            if cells.iter().any(|c| c.mapping.canonical_field == mapping.canonical_field) {
                continue;
            }
            cells.push(MappedCell {
                mapping,
                raw: trimmed.to_string(),
            });
        }

        cells
    }
}

/// 单个表头 → 映射表下标
pub fn resolve_header(header: &str, mappings: &[FieldMapping]) -> Option<usize> {
    let keys: Vec<Vec<String>> = mappings.iter().map(FieldMapping::lookup_keys).collect();
    resolve_header_with_keys(header, &keys)
}

fn resolve_header_with_keys(header: &str, keys: &[Vec<String>]) -> Option<usize> {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return None;
    }

    // (a) 精确匹配
    if let Some(idx) = keys.iter().position(|ks| ks.iter().any(|k| *k == header)) {
        return Some(idx);
    }

    // (b) 子串匹配（双向），按声明顺序取第一个
    keys.iter().position(|ks| {
        ks.iter()
            .any(|k| header.contains(k.as_str()) || k.contains(header.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::ValueType;

    fn mappings() -> Vec<FieldMapping> {
        vec![
            FieldMapping::new("title", ValueType::Text).with_aliases(["headline"]),
            FieldMapping::new("publishedAt", ValueType::Date),
            FieldMapping::new("status", ValueType::Text),
            FieldMapping::new("subtitle", ValueType::Text),
        ]
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let m = mappings();
        assert_eq!(resolve_header("  TITLE ", &m), Some(0));
        assert_eq!(resolve_header("Published At", &m), Some(1));
        assert_eq!(resolve_header("publishedat", &m), Some(1));
        assert_eq!(resolve_header("Headline", &m), Some(0));
    }

    #[test]
    fn test_exact_beats_earlier_substring() {
        // "subtitle" 包含 "title"，但精确匹配优先
        let m = mappings();
        assert_eq!(resolve_header("Subtitle", &m), Some(3));
    }

    #[test]
    fn test_substring_match_declaration_order() {
        let m = mappings();
        assert_eq!(resolve_header("Post Title", &m), Some(0));
        assert_eq!(resolve_header("stat", &m), Some(2));
    }

    #[test]
    fn test_unmatched_and_empty_headers() {
        let m = mappings();
        assert_eq!(resolve_header("Color", &m), None);
        assert_eq!(resolve_header("   ", &m), None);

        let header: RawRow = vec!["Title".into(), "Color".into(), "".into()];
        let resolution = HeaderFieldMapper.resolve_headers(&header, &m);
        assert_eq!(resolution.columns, vec![Some(0), None, None]);
        assert_eq!(resolution.unmatched, vec!["Color"]);
        assert_eq!(resolution.matched_count(), 1);
    }

    #[test]
    fn test_map_row_skips_empty_and_duplicates() {
        let m = mappings();
        let header: RawRow = vec!["Title".into(), "Status".into(), "Headline".into(), "Extra".into()];
        let resolution = HeaderFieldMapper.resolve_headers(&header, &m);

        let row: RawRow = vec!["  Hello ".into(), "   ".into(), "Other".into(), "x".into(), "overflow".into()];
        let cells = HeaderFieldMapper.map_row(&resolution, &row, &m);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].mapping.canonical_field, "title");
        assert_eq!(cells[0].raw, "Hello");
    }
}
