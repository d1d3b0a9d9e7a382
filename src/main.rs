use anyhow::Context;
use clap::Parser;
use voucher_copy::core::engine::find_spreadsheet;
use voucher_copy::utils::{log_export, logger, monitor::ConsoleMonitor, validation::Validate};
use voucher_copy::{BatchEngine, CliConfig, ConfigProvider, TomlConfig};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.json_log);

    tracing::info!("Starting voucher-copy");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📄 Loading config file {}", path.display());
            TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?
                .with_cli_overrides(&cli)
        }
        None => TomlConfig::default().with_cli_overrides(&cli),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let engine = BatchEngine::new(config);

    if cli.dry_run {
        dry_run(&engine);
        return Ok(());
    }

    let mut monitor = ConsoleMonitor::new(!cli.json_report);
    let report = engine.run(&mut monitor).context("batch run failed")?;
    monitor.log_final_stats(&report);

    if cli.json_report {
        println!(
            "{}",
            report.to_json_pretty().context("failed to serialize run report")?
        );
    }

    if let Some(target) = engine.config().log_file() {
        match log_export::export_log(&report.lines, target) {
            Ok(Some(path)) => eprintln!("💾 日志已保存到 {}", path.display()),
            Ok(None) => eprintln!("当前没有日志可保存。"),
            Err(e) => {
                tracing::error!("❌ Log export failed: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        }
    }

    if monitor.problems() > 0 {
        tracing::warn!("⚠️ Finished with {} problem lines", monitor.problems());
    } else {
        tracing::info!("✅ All projects processed");
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    for root in config.project_roots() {
        tracing::info!("  📂 Project root: {}", root.display());
    }
    for (index, root) in config.source_roots().iter().enumerate() {
        tracing::info!("  🗄️ Source root #{}: {}", index + 1, root.display());
    }
    tracing::info!("  🔖 Identifier marker: {}", config.identifier_marker());
    tracing::info!("  📁 Destination folder: {}", config.destination_dir_name());
    tracing::info!(
        "  📑 Spreadsheet extensions: {}",
        config.spreadsheet_extensions().join(", ")
    );
    if let Some(log_file) = config.log_file() {
        tracing::info!("  💾 Log export: {}", log_file.display());
    }
}

/// 只解析與比對，不建立任何目錄
fn dry_run(engine: &BatchEngine<TomlConfig>) {
    tracing::info!("🧪 Dry run, nothing will be copied");
    let config = engine.config();
    let destination_dir = config.destination_dir_name();

    for project in engine.discover_projects() {
        let Some(spreadsheet) = find_spreadsheet(&project.root, config.spreadsheet_extensions())
        else {
            println!("[失败] {} - 未找到 Excel 文件", project.name);
            continue;
        };

        let identifiers = match engine.extractor().extract(&spreadsheet) {
            Ok(identifiers) => identifiers,
            Err(e) => {
                println!("[失败] {} - {}", project.name, e);
                continue;
            }
        };

        let destination = project.destination(destination_dir);
        for identifier in identifiers {
            if std::fs::symlink_metadata(destination.join(&identifier)).is_ok() {
                println!("[跳过] {} - {} 已存在", project.name, identifier);
                continue;
            }
            match engine.sources().locate(&identifier) {
                Some(source) => println!(
                    "[计划] {} - {} ← {}",
                    project.name,
                    identifier,
                    source.display()
                ),
                None => println!(
                    "[失败] {} - {} 未在任一源目录中找到",
                    project.name, identifier
                ),
            }
        }
    }
}
