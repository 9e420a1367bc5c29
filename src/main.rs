use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hts_duty::config::Command;
use hts_duty::core::format::render_quote;
use hts_duty::core::{ConfigProvider, OutputFormat};
use hts_duty::utils::error::{DutyError, ErrorSeverity};
use hts_duty::utils::{logger, validation::Validate};
use hts_duty::{app, CliConfig, DutyEngine, LocalDirectory, ShipmentQuery, TariffTable, TomlConfig};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 載入配置，命令列優先
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path).with_context(|| format!("Failed to load config file '{}'", path))?
        }
        None => TomlConfig::default(),
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    // 啟動時一次載入關稅表，之後唯讀
    let source = LocalDirectory::from_config(&config);
    let table = match TariffTable::load(&source) {
        Ok(table) => table,
        Err(e) => exit_with(&e),
    };
    let engine = DutyEngine::new(Arc::new(table));

    if let Err(e) = run(&cli.command, &engine, config.output_format()) {
        exit_with(&e);
    }

    Ok(())
}

fn run(command: &Command, engine: &DutyEngine, format: OutputFormat) -> hts_duty::Result<()> {
    match command {
        Command::Calculate {
            hts_code,
            cost,
            freight,
            insurance,
            weight_kg,
            quantity,
        } => {
            hts_duty::utils::validation::validate_non_empty_string("hts_code", hts_code)?;
            let shipment = ShipmentQuery {
                hts_code: hts_code.clone(),
                cost: *cost,
                freight: *freight,
                insurance: *insurance,
                weight_kg: *weight_kg,
                quantity: *quantity,
            };
            let quote = engine.quote(&shipment)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&quote)?),
                OutputFormat::Text => println!("{}", render_quote(&quote)),
            }
        }
        Command::Query { text } => {
            let text = text.join(" ");
            match format {
                OutputFormat::Text => println!("{}", engine.calculate_from_query(&text)),
                OutputFormat::Json => {
                    let quote = engine.quote_from_query(&text)?;
                    println!("{}", serde_json::to_string_pretty(&quote)?);
                }
            }
        }
        Command::Lookup { hts_code } => {
            let matches: Vec<_> = engine.table().lookup_all(hts_code).collect();
            if matches.is_empty() {
                return Err(DutyError::not_found(hts_code.as_str()));
            }
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
                OutputFormat::Text => {
                    let schema = engine.table().schema();
                    for (i, record) in matches.iter().enumerate() {
                        let marker = if i == 0 { "*" } else { " " };
                        println!("{} {} ({})", marker, record.code, record.source);
                        println!("    {}: {}", schema.duty_column, record.rate_expression);
                        for extra in &record.extra_rates {
                            println!("    {}: {}", extra.column, extra.expression);
                        }
                    }
                }
            }
        }
        Command::Info => {
            let summary = engine.table().summary();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Text => {
                    println!("📋 Tariff Table Summary:");
                    println!("  Sources: {}", summary.sources.join(", "));
                    println!("  Rows: {} ({} distinct codes)", summary.rows, summary.distinct_codes);
                    println!("  Code column: {}", summary.schema.code_column);
                    println!("  Duty column: {}", summary.schema.duty_column);
                    if !summary.schema.extra_rate_columns.is_empty() {
                        println!("  Other rate columns: {}", summary.schema.extra_rate_columns.join(", "));
                    }
                    println!("  Loaded at: {}", summary.loaded_at.to_rfc3339());
                }
            }
        }
        Command::Interactive => {
            let stdin = std::io::stdin();
            let answered = app::run_session(engine, stdin.lock(), std::io::stdout())?;
            tracing::info!("Interactive session answered {} queries", answered);
        }
    }

    Ok(())
}

fn exit_with(e: &DutyError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
