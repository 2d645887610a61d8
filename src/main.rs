// ==========================================
// 内容管理系统 - 批量导入/导出命令行入口
// ==========================================
// 命令: import / export / template / collections
// 输出: CSV 与报告写 stdout，日志写 stderr
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use cms_bulk_io::api::BulkIoApi;
use cms_bulk_io::domain::import::{DiagnosticLevel, ImportOptions};
use cms_bulk_io::logging;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_PATH: &str = "cms_bulk_io.db";

#[derive(Debug, Parser)]
#[command(name = "cms-bulk-io", version, about = "Bulk CSV import/export for CMS collections")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a CSV or spreadsheet file into a collection
    Import {
        collection: String,
        file: PathBuf,
        #[arg(long, env = "CMS_BULK_IO_DB", default_value = DEFAULT_DB_PATH)]
        db: String,
        /// Validate every row without creating records
        #[arg(long)]
        dry_run: bool,
        /// Skip invalid rows instead of aborting
        #[arg(long)]
        skip_errors: bool,
        #[arg(long)]
        locale: Option<String>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a collection as CSV
    Export {
        collection: String,
        #[arg(long, env = "CMS_BULK_IO_DB", default_value = DEFAULT_DB_PATH)]
        db: String,
        #[arg(long)]
        no_headers: bool,
        /// Comma-separated field allowlist
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print an import template for a collection
    Template {
        collection: String,
        /// Add a placeholder example row
        #[arg(long)]
        example: bool,
    },
    /// List the built-in collections
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    tracing::info!(version = cms_bulk_io::VERSION, "cms-bulk-io 启动");

    match cli.command {
        Command::Import {
            collection,
            file,
            db,
            dry_run,
            skip_errors,
            locale,
            json,
        } => {
            let api = BulkIoApi::new(db);
            let options = ImportOptions {
                dry_run,
                skip_errors,
                update_existing: false,
                locale,
            };
            let file_path = file.to_string_lossy();
            let report = api
                .import_file(&collection, &file_path, &options)
                .await
                .with_context(|| format!("failed to import {}", file.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.result.message);
                for error in &report.result.errors {
                    println!("  error: {}", error);
                }
                for diagnostic in &report.diagnostics {
                    let level = match diagnostic.level {
                        DiagnosticLevel::Warning => "warning",
                    };
                    match diagnostic.row {
                        Some(row) => println!("  {} (row {}): {}", level, row, diagnostic.message),
                        None => println!("  {}: {}", level, diagnostic.message),
                    }
                }
            }

            Ok(if report.result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Export {
            collection,
            db,
            no_headers,
            fields,
            output,
        } => {
            let api = BulkIoApi::new(db);
            let csv = api.export_csv(&collection, fields, !no_headers).await?;

            match output {
                Some(path) => std::fs::write(&path, csv)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{}", csv),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Template {
            collection,
            example,
        } => {
            let api = BulkIoApi::new(DEFAULT_DB_PATH);
            print!("{}", api.template(&collection, example)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Collections => {
            let api = BulkIoApi::new(DEFAULT_DB_PATH);
            for summary in api.list_collections() {
                println!(
                    "{}\t{}\t{} fields",
                    summary.slug, summary.label, summary.importable_fields
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
