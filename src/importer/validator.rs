// ==========================================
// 内容管理系统 - 记录校验器实现
// ==========================================
// 职责: 必填字段校验 + 集合级行规则
// 红线: 必填按"是否存在"判定（0/false 视为存在）
// 红线: 行规则按声明顺序求值，首个失败即为该行错误
// ==========================================

use crate::domain::collection::CollectionSchema;
use crate::domain::field::FieldMapping;
use crate::domain::import::RowOutcome;
use crate::domain::record::MappedRecord;
use crate::importer::bulk_importer_trait::RecordValidator;

pub struct SchemaValidator;

impl RecordValidator for SchemaValidator {
    fn validate(
        &self,
        record: MappedRecord,
        mappings: &[FieldMapping],
        schema: &CollectionSchema,
    ) -> RowOutcome {
        let missing = missing_required_fields(&record, mappings, schema);
        if !missing.is_empty() {
            return RowOutcome::rejected(
                missing
                    .into_iter()
                    .map(|label| format!("Missing required field: {}", label))
                    .collect(),
            );
        }

        if let Some(rule) = schema.rules.iter().find(|rule| !rule.passes(&record)) {
            return RowOutcome::rejected(vec![rule.message.clone()]);
        }

        RowOutcome::accepted(record)
    }
}

/// 缺失的必填字段（返回表头标签，按映射表顺序）
///
/// 自动生成 slug 的目标字段不参与必填校验
pub fn missing_required_fields<'m>(
    record: &MappedRecord,
    mappings: &'m [FieldMapping],
    schema: &CollectionSchema,
) -> Vec<&'m str> {
    let slug_field = schema.slug_field();

    mappings
        .iter()
        .filter(|m| m.required)
        .filter(|m| Some(m.canonical_field.as_str()) != slug_field)
        .filter(|m| !record.contains(&m.canonical_field))
        .map(|m| m.csv_header.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::{FieldDeclaration, FieldKind, RowRule, RuleCheck};
    use crate::domain::record::{FieldValue, RichTextDocument};

    fn schema() -> CollectionSchema {
        CollectionSchema::new(
            "posts",
            vec![
                FieldDeclaration::new("title", FieldKind::Text).required(),
                FieldDeclaration::new("slug", FieldKind::Text).required(),
                FieldDeclaration::new("views", FieldKind::Number).required(),
                FieldDeclaration::new("category", FieldKind::Text),
                FieldDeclaration::new("body", FieldKind::RichText),
            ],
        )
        .with_slug("slug", "title")
        .with_rule(RowRule::new(
            "category",
            RuleCheck::Present("category".into()),
            "Blog posts require a category",
        ))
        .with_rule(RowRule::new(
            "body",
            RuleCheck::NonEmpty("body".into()),
            "Blog posts require a non-empty body",
        ))
    }

    fn valid_record() -> MappedRecord {
        let mut record = MappedRecord::new();
        record.insert("title", FieldValue::Text("Hello".into()));
        record.insert("views", FieldValue::Number(0.0));
        record.insert("category", FieldValue::Text("news".into()));
        record.insert("body", FieldValue::RichText(RichTextDocument::from_paragraphs(["Hi"])));
        record
    }

    #[test]
    fn test_valid_record_accepted() {
        let schema = schema();
        let outcome = SchemaValidator.validate(valid_record(), &schema.field_mappings(), &schema);
        assert!(outcome.accepted);
        assert!(outcome.errors.is_empty());
        assert!(outcome.record.is_some());
    }

    #[test]
    fn test_missing_required_field_cited() {
        let schema = schema();
        let mut record = MappedRecord::new();
        record.insert("category", FieldValue::Text("news".into()));

        let outcome = SchemaValidator.validate(record, &schema.field_mappings(), &schema);
        assert!(!outcome.accepted);
        assert!(outcome.record.is_none());
        assert_eq!(
            outcome.errors,
            vec!["Missing required field: Title", "Missing required field: Views"]
        );
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let schema = schema();
        let mut record = MappedRecord::new();
        record.insert("title", FieldValue::Text("Hello".into()));
        record.insert("views", FieldValue::Number(3.0));
        record.insert("body", FieldValue::RichText(RichTextDocument::from_paragraphs([""])));

        let outcome = SchemaValidator.validate(record, &schema.field_mappings(), &schema);
        assert_eq!(outcome.errors, vec!["Blog posts require a category"]);
    }

    #[test]
    fn test_blank_body_rejected() {
        let schema = schema();
        let mut record = valid_record();
        record.insert("body", FieldValue::RichText(RichTextDocument::from_paragraphs(["  "])));

        let outcome = SchemaValidator.validate(record, &schema.field_mappings(), &schema);
        assert_eq!(outcome.error_message(), "Blog posts require a non-empty body");
    }
}
