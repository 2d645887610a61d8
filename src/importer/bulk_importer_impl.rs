// ==========================================
// 内容管理系统 - 批量导入编排器实现
// ==========================================
// 职责: 整合导入流程，从 CSV 文本/文件到存储
// 流程: 切分 → 表头解析 → (逐行) 映射 → 类型转换 → 校验 → [slug] → 落库
// 红线: 逐行顺序处理（slug 唯一性依赖读己之写）
// 红线: 行级问题不向调用方抛错，统一汇总到 ImportResult
// ==========================================

use crate::config::{BulkIoConfigReader, FallbackPolicy, ImportSettings};
use crate::domain::collection::CollectionSchema;
use crate::domain::field::FieldMapping;
use crate::domain::import::{
    Diagnostic, ImportOptions, ImportProgress, ImportReport, ImportResult, RowStatus,
};
use crate::domain::record::{FieldValue, MappedRecord};
use crate::importer::bulk_importer_trait::{
    BulkImporter, FieldMapper, FileParser, RecordValidator, RowTokenizer, ValueCoercer,
};
use crate::importer::coercion::{FallbackKind, TypeCoercer};
use crate::importer::error::{BulkIoResult, ImportError};
use crate::importer::field_mapper::{HeaderFieldMapper, HeaderResolution};
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use crate::importer::slug::SlugGenerator;
use crate::importer::tokenizer::{DelimiterTokenizer, RawRow};
use crate::importer::validator::SchemaValidator;
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 单次导入的只读上下文
struct RowContext<'a> {
    schema: &'a CollectionSchema,
    mappings: &'a [FieldMapping],
    resolution: &'a HeaderResolution,
    options: &'a ImportOptions,
    settings: &'a ImportSettings,
    slugs: &'a SlugGenerator,
}

// ==========================================
// BulkImporterImpl - 批量导入编排器
// ==========================================
pub struct BulkImporterImpl<S, C>
where
    S: RecordStore,
    C: BulkIoConfigReader,
{
    // 存储
    store: S,

    // 配置读取器
    config: C,

    // 管道组件
    tokenizer: Box<dyn RowTokenizer>,
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    coercer: Box<dyn ValueCoercer>,
    validator: Box<dyn RecordValidator>,

    // 逐行进度
    progress: Option<UnboundedSender<ImportProgress>>,
}

impl<S, C> BulkImporterImpl<S, C>
where
    S: RecordStore,
    C: BulkIoConfigReader,
{
    /// 创建新的 BulkImporter 实例
    ///
    /// # 参数
    /// - store: 记录存储
    /// - config: 配置读取器
    /// - tokenizer: 行切分器
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - coercer: 类型转换器
    /// - validator: 记录校验器
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: S,
        config: C,
        tokenizer: Box<dyn RowTokenizer>,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        coercer: Box<dyn ValueCoercer>,
        validator: Box<dyn RecordValidator>,
    ) -> Self {
        Self {
            store,
            config,
            tokenizer,
            file_parser,
            field_mapper,
            coercer,
            validator,
            progress: None,
        }
    }

    /// 使用默认管道组件
    pub fn with_defaults(store: S, config: C) -> Self {
        Self::new(
            store,
            config,
            Box::new(DelimiterTokenizer),
            Box::new(UniversalFileParser),
            Box::new(HeaderFieldMapper),
            Box::new(TypeCoercer),
            Box::new(SchemaValidator),
        )
    }

    /// 订阅逐行进度
    pub fn with_progress(mut self, sender: UnboundedSender<ImportProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn emit_progress(&self, event: ImportProgress) {
        if let Some(tx) = &self.progress {
            if tx.send(event).is_err() {
                debug!("进度接收端已关闭");
            }
        }
    }

    /// 单行处理：映射 → 类型转换 → 校验 → [slug] → [落库]
    async fn process_row(
        &self,
        ctx: &RowContext<'_>,
        row_number: usize,
        row: &RawRow,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<RowStatus, ImportError> {
        // === 步骤 1: 映射 + 类型转换 ===
        let cells = self.field_mapper.map_row(ctx.resolution, row, ctx.mappings);
        let mut record = MappedRecord::new();
        let mut invalid_values = Vec::new();

        for cell in cells {
            let (value, fallback) = self.coercer.coerce(&cell.raw, cell.mapping);
            if let Some(fallback) = fallback {
                let policy = match fallback.kind {
                    FallbackKind::Select => ctx.settings.enum_fallback,
                    FallbackKind::Date => ctx.settings.date_fallback,
                    FallbackKind::Number => FallbackPolicy::Lenient,
                };
                match policy {
                    FallbackPolicy::Strict => invalid_values.push(format!(
                        "Invalid value for {}: {}",
                        cell.mapping.csv_header, fallback.raw
                    )),
                    FallbackPolicy::Lenient => {
                        debug!(row = row_number, field = %fallback.field, raw = %fallback.raw, "类型转换回退");
                        diagnostics.push(
                            Diagnostic::warning(fallback.message())
                                .at_row(row_number)
                                .for_field(fallback.field.clone()),
                        );
                    }
                }
            }
            record.insert(cell.mapping.canonical_field.clone(), value);
        }

        if !invalid_values.is_empty() {
            return Err(ImportError::Validation {
                row: row_number,
                message: invalid_values.join("; "),
            });
        }

        // === 步骤 2: 校验 ===
        let outcome = self.validator.validate(record, ctx.mappings, ctx.schema);
        let mut record = match outcome.record {
            Some(record) if outcome.accepted => record,
            _ => {
                return Err(ImportError::Validation {
                    row: row_number,
                    message: outcome.errors.join("; "),
                })
            }
        };

        // === 步骤 3: slug ===
        if let Some(spec) = &ctx.schema.slug_spec {
            let source = record
                .get(&spec.field)
                .or_else(|| record.get(&spec.source))
                .map(slug_source_text)
                .unwrap_or_default();

            let generated = ctx
                .slugs
                .generate_unique(&source, &ctx.schema.slug, &spec.field, &self.store, None)
                .await;
            if generated.degraded {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "Could not find a free numbered slug; using '{}'",
                        generated.slug
                    ))
                    .at_row(row_number)
                    .for_field(spec.field.clone()),
                );
            }
            record.insert(spec.field.clone(), FieldValue::Text(generated.slug));
        }

        // === 步骤 4: 落库 ===
        if ctx.options.dry_run {
            return Ok(RowStatus::DryRun);
        }

        self.store
            .create(&ctx.schema.slug, &record, ctx.options.locale.as_deref())
            .await
            .map_err(|e| ImportError::Persistence {
                row: row_number,
                message: format!("Failed to create record: {}", e),
            })?;

        Ok(RowStatus::Imported)
    }
}

/// slug 来源值 → 文本
fn slug_source_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) | FieldValue::Date(s) => s.clone(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::RichText(doc) => doc.plain_text(),
    }
}

fn completion_message(result: &ImportResult, dry_run: bool) -> String {
    if dry_run {
        format!(
            "Dry run completed: {} rows validated, {} skipped, {} errors",
            result.imported,
            result.skipped,
            result.errors.len()
        )
    } else {
        format!(
            "Import completed: {} imported, {} updated, {} skipped, {} errors",
            result.imported,
            result.updated,
            result.skipped,
            result.errors.len()
        )
    }
}

#[async_trait]
impl<S, C> BulkImporter for BulkImporterImpl<S, C>
where
    S: RecordStore,
    C: BulkIoConfigReader,
{
    async fn import_csv(
        &self,
        csv_text: &str,
        schema: &CollectionSchema,
        options: &ImportOptions,
    ) -> ImportReport {
        let table = RawTable::from_csv_text(csv_text, self.tokenizer.as_ref());
        self.import_table(table, schema, options).await
    }

    async fn import_file(
        &self,
        file_path: &Path,
        schema: &CollectionSchema,
        options: &ImportOptions,
    ) -> BulkIoResult<ImportReport> {
        info!(file_path = %file_path.display(), collection = %schema.slug, "开始解析导入文件");
        let table = self.file_parser.parse_to_table(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        Ok(self.import_table(table, schema, options).await)
    }

    #[instrument(skip_all, fields(collection = %schema.slug, batch_id))]
    async fn import_table(
        &self,
        table: RawTable,
        schema: &CollectionSchema,
        options: &ImportOptions,
    ) -> ImportReport {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let finish = |result: ImportResult, diagnostics: Vec<Diagnostic>| ImportReport {
            batch_id: batch_id.clone(),
            result,
            diagnostics,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        // === 结构检查 ===
        if table.header.is_empty() || table.rows.is_empty() {
            warn!(lines = table.line_count(), "CSV 缺少表头或数据行");
            return finish(
                ImportResult::failed(ImportError::MissingDataRows.to_string()),
                Vec::new(),
            );
        }

        let settings = ImportSettings::load(&self.config).await;
        let mut diagnostics = Vec::new();
        if options.update_existing {
            warn!("updateExisting 暂不支持，所有行按新建处理");
            diagnostics.push(Diagnostic::warning(
                "updateExisting is not supported; every row is created as a new record",
            ));
        }

        // === 表头解析（每次导入一次）===
        let mappings = schema.field_mappings();
        let resolution = self.field_mapper.resolve_headers(&table.header, &mappings);
        let total = table.rows.len();
        info!(
            total_rows = total,
            matched_columns = resolution.matched_count(),
            unmatched_columns = resolution.unmatched.len(),
            dry_run = options.dry_run,
            skip_errors = options.skip_errors,
            "开始批量导入"
        );

        let slugs = SlugGenerator::new(settings.slug_max_attempts);
        let ctx = RowContext {
            schema,
            mappings: &mappings,
            resolution: &resolution,
            options,
            settings: &settings,
            slugs: &slugs,
        };

        // === 逐行处理 ===
        let mut result = ImportResult::default();
        for (idx, (row_number, row)) in table.rows.iter().enumerate() {
            let status = match self
                .process_row(&ctx, *row_number, row, &mut diagnostics)
                .await
            {
                Ok(status) => {
                    result.imported += 1;
                    status
                }
                Err(err) => {
                    let status = match err {
                        ImportError::Persistence { .. } => RowStatus::Failed,
                        _ => RowStatus::Rejected,
                    };
                    warn!(row = *row_number, error = %err, "行处理失败");
                    result.errors.push(err.to_string());

                    if !options.skip_errors {
                        self.emit_progress(ImportProgress {
                            batch_id: batch_id.clone(),
                            row_number: *row_number,
                            processed: idx + 1,
                            total,
                            status,
                        });
                        result.success = false;
                        result.message =
                            format!("Import aborted at row {}: {}", row_number, err.detail());
                        error!(
                            row = *row_number,
                            imported = result.imported,
                            "导入中止（已写入的记录不回滚）"
                        );
                        return finish(result, diagnostics);
                    }

                    result.skipped += 1;
                    status
                }
            };

            self.emit_progress(ImportProgress {
                batch_id: batch_id.clone(),
                row_number: *row_number,
                processed: idx + 1,
                total,
                status,
            });
        }

        result.success = true;
        result.message = completion_message(&result, options.dry_run);
        info!(
            imported = result.imported,
            skipped = result.skipped,
            errors = result.errors.len(),
            diagnostics = diagnostics.len(),
            "批量导入完成"
        );

        finish(result, diagnostics)
    }
}
