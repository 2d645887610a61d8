// ==========================================
// BulkImporter 集成测试
// ==========================================
// 测试目标: 验证导入编排（dry run / skip errors / 中止 / 回退 / slug）
// ==========================================


use cms_bulk_io::config::{FallbackPolicy, ImportSettings};
use cms_bulk_io::domain::import::{DiagnosticLevel, ImportOptions};
use cms_bulk_io::domain::presets;
use cms_bulk_io::domain::record::FieldValue;
use cms_bulk_io::importer::{BulkImporter, BulkImporterImpl};
use cms_bulk_io::logging;
use test_helpers::{mock_importer, MockRecordStore};

const MIXED_ROWS: &str = "Title,Body,Category\nFirst,Hello,news\n,Missing title,news\nThird,Bye,news\n";

fn skip_errors() -> ImportOptions {
    ImportOptions {
        skip_errors: true,
        ..ImportOptions::default()
    }
}

#[tokio::test]
async fn test_dry_run_never_creates() {
    logging::init_test();

    let importer = mock_importer(MockRecordStore::new());
    let csv = "Title,Body,Category\nA,x,news\nB,y,tutorial\nC,z,press\n";
    let options = ImportOptions {
        dry_run: true,
        ..ImportOptions::default()
    };

    let report = importer.import_csv(csv, &presets::posts(), &options).await;

    assert!(report.result.success);
    assert_eq!(report.result.imported, 3);
    assert_eq!(
        report.result.message,
        "Dry run completed: 3 rows validated, 0 skipped, 0 errors"
    );
    assert_eq!(importer.store().create_calls(), 0);
}

#[tokio::test]
async fn test_skip_errors_continues_past_invalid_row() {
    let importer = mock_importer(MockRecordStore::new());
    let report = importer
        .import_csv(MIXED_ROWS, &presets::posts(), &skip_errors())
        .await;

    assert!(report.result.success);
    assert_eq!(report.result.imported, 2);
    assert_eq!(report.result.skipped, 1);
    assert_eq!(
        report.result.errors,
        vec!["Row 3: Missing required field: Title".to_string()]
    );
    assert_eq!(
        report.result.message,
        "Import completed: 2 imported, 0 updated, 1 skipped, 1 errors"
    );
    assert_eq!(importer.store().records().len(), 2);
}

#[tokio::test]
async fn test_abort_on_first_invalid_row() {
    let importer = mock_importer(MockRecordStore::new());
    let report = importer
        .import_csv(MIXED_ROWS, &presets::posts(), &ImportOptions::default())
        .await;

    assert!(!report.result.success);
    assert_eq!(report.result.imported, 1);
    assert_eq!(report.result.errors.len(), 1);
    assert_eq!(
        report.result.message,
        "Import aborted at row 3: Missing required field: Title"
    );
    // 已写入的记录不回滚
    assert_eq!(importer.store().create_calls(), 1);
}

#[tokio::test]
async fn test_all_missing_required_fields_are_listed() {
    let importer = mock_importer(MockRecordStore::new());
    let report = importer
        .import_csv("Category,Excerpt\nnews,Short\n", &presets::posts(), &ImportOptions::default())
        .await;

    assert_eq!(
        report.result.errors,
        vec!["Row 2: Missing required field: Title; Missing required field: Body".to_string()]
    );
}

#[tokio::test]
async fn test_collection_rules_run_in_order() {
    let importer = mock_importer(MockRecordStore::new());
    let report = importer
        .import_csv("Title,Body\nA,Text\n", &presets::posts(), &ImportOptions::default())
        .await;
    assert_eq!(
        report.result.errors,
        vec!["Row 2: Blog posts require a category".to_string()]
    );

    let report = importer
        .import_csv("Name,SKU,Price\nWidget,W-1,0\n", &presets::products(), &ImportOptions::default())
        .await;
    assert_eq!(
        report.result.errors,
        vec!["Row 2: Product price must be greater than zero".to_string()]
    );
}

#[tokio::test]
async fn test_enum_fallback_uses_declared_default() {
    let importer = mock_importer(MockRecordStore::new());
    let csv = "Title,Body,Category,Status\nA,Text,news,whenever\nB,Text,news,Live\n";
    let report = importer
        .import_csv(csv, &presets::posts(), &ImportOptions::default())
        .await;

    assert!(report.result.success);
    let records = importer.store().records();
    assert_eq!(records[0].data.get("status"), Some(&FieldValue::Text("draft".into())));
    assert_eq!(records[1].data.get("status"), Some(&FieldValue::Text("published".into())));

    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.level, DiagnosticLevel::Warning);
    assert_eq!(diagnostic.row, Some(2));
    assert_eq!(diagnostic.field.as_deref(), Some("status"));
    assert_eq!(
        diagnostic.message,
        "Unrecognized option value 'whenever' for status; using 'draft'"
    );
}

#[tokio::test]
async fn test_strict_date_policy_rejects_unparseable_date() {
    let importer = BulkImporterImpl::with_defaults(
        MockRecordStore::new(),
        ImportSettings {
            date_fallback: FallbackPolicy::Strict,
            ..ImportSettings::default()
        },
    );
    let csv = "Title,Body,Category,Published At\nA,x,news,2024-03-01\nB,y,news,someday\n";
    let report = importer.import_csv(csv, &presets::posts(), &skip_errors()).await;

    assert_eq!(report.result.imported, 1);
    assert_eq!(
        report.result.errors,
        vec!["Row 3: Invalid value for Published At: someday".to_string()]
    );
    assert_eq!(
        importer.store().records()[0].data.get("publishedAt"),
        Some(&FieldValue::Date("2024-03-01T00:00:00.000Z".into()))
    );
}

#[tokio::test]
async fn test_semicolon_rows_and_rich_text_paragraphs() {
    let importer = mock_importer(MockRecordStore::new());
    let csv = "Title;Body;Category;Featured;Reading Time\nHello;<p>One, two</p><P class=x>Three</p>;news;yes;7\n";
    let report = importer
        .import_csv(csv, &presets::posts(), &ImportOptions::default())
        .await;

    assert!(report.result.success, "{:?}", report.result);
    let record = &importer.store().records()[0].data;

    match record.get("body") {
        Some(FieldValue::RichText(doc)) => {
            assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["One, two", "Three"]);
        }
        other => panic!("expected rich text body, got {:?}", other),
    }
    assert_eq!(record.get("featured"), Some(&FieldValue::Boolean(true)));
    assert_eq!(record.get("readingTime"), Some(&FieldValue::Number(7.0)));
}

#[tokio::test]
async fn test_fuzzy_headers_and_unmatched_columns() {
    let importer = mock_importer(MockRecordStore::new());
    let csv = "Headline Text,Content,Category,Color\nHi,There,news,blue\n";
    let report = importer
        .import_csv(csv, &presets::posts(), &ImportOptions::default())
        .await;

    assert!(report.result.success, "{:?}", report.result);
    assert!(report.result.errors.is_empty());
    let record = &importer.store().records()[0].data;
    assert_eq!(record.get("title"), Some(&FieldValue::Text("Hi".into())));
    assert!(!record.contains("color"));
}

#[tokio::test]
async fn test_slugs_unique_across_rows() {
    let importer = mock_importer(MockRecordStore::new());
    let csv = "Title,Body,Category\n\"Hello, World!\",a,news\n\"Hello, World!\",b,news\nHello World,c,news\n";
    let report = importer
        .import_csv(csv, &presets::posts(), &ImportOptions::default())
        .await;

    assert!(report.result.success);
    let slugs: Vec<String> = importer
        .store()
        .records()
        .iter()
        .filter_map(|r| r.data.get("slug").and_then(|v| v.as_text()).map(str::to_string))
        .collect();
    assert_eq!(slugs, vec!["hello-world", "hello-world-1", "hello-world-2"]);
}

#[tokio::test]
async fn test_slug_lookup_failure_falls_back_to_timestamp() {
    let importer = mock_importer(MockRecordStore::failing_slug_lookup());
    let csv = "Title,Body,Category\nHello World,x,news\n";
    let report = importer
        .import_csv(csv, &presets::posts(), &ImportOptions::default())
        .await;

    assert!(report.result.success, "{:?}", report.result);
    assert_eq!(report.result.imported, 1);
    assert!(report.result.errors.is_empty());

    let records = importer.store().records();
    assert_eq!(records.len(), 1);
    let slug = records[0].data.get("slug").and_then(|v| v.as_text()).unwrap();
    let suffix = slug.strip_prefix("hello-world-").unwrap();
    assert!(!suffix.is_empty());
    assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.level, DiagnosticLevel::Warning);
    assert_eq!(diagnostic.row, Some(2));
    assert_eq!(diagnostic.field.as_deref(), Some("slug"));
    assert_eq!(
        diagnostic.message,
        format!("Could not find a free numbered slug; using '{}'", slug)
    );
}

#[tokio::test]
async fn test_explicit_slug_cell_is_normalized() {
    let importer = mock_importer(MockRecordStore::new());
    let csv = "Title,Slug,Body,Category\nA,My Custom  Slug!,x,news\n";
    importer
        .import_csv(csv, &presets::posts(), &ImportOptions::default())
        .await;

    assert_eq!(
        importer.store().records()[0].data.get("slug"),
        Some(&FieldValue::Text("my-custom-slug".into()))
    );
}

#[tokio::test]
async fn test_persistence_failure_is_row_scoped() {
    let importer = mock_importer(MockRecordStore::failing_on(2));
    let csv = "Title,Body,Category\nA,x,news\nB,y,news\nC,z,news\n";
    let report = importer.import_csv(csv, &presets::posts(), &skip_errors()).await;

    assert!(report.result.success);
    assert_eq!(report.result.imported, 2);
    assert_eq!(report.result.skipped, 1);
    assert_eq!(
        report.result.errors,
        vec!["Row 3: Failed to create record: Unique constraint violated: cms_record.slug".to_string()]
    );
}

#[tokio::test]
async fn test_update_existing_warns_and_creates() {
    let importer = mock_importer(MockRecordStore::new());
    let options = ImportOptions {
        update_existing: true,
        locale: Some("de".to_string()),
        ..ImportOptions::default()
    };
    let report = importer
        .import_csv("Title,Body,Category\nA,x,news\n", &presets::posts(), &options)
        .await;

    assert!(report.result.success);
    assert_eq!(report.result.updated, 0);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.message.contains("updateExisting is not supported")));

    let records = importer.store().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].locale.as_deref(), Some("de"));
}

#[tokio::test]
async fn test_missing_data_rows_is_parse_error() {
    let importer = mock_importer(MockRecordStore::new());
    for csv in ["", "Title,Body\n", "\n\n  \n"] {
        let report = importer
            .import_csv(csv, &presets::posts(), &ImportOptions::default())
            .await;
        assert!(!report.result.success);
        assert_eq!(
            report.result.message,
            "CSV must contain a header row and at least one data row"
        );
    }
    assert_eq!(importer.store().create_calls(), 0);
}
