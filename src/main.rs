use clap::Parser;
use sales_etl::utils::error::ErrorSeverity;
use sales_etl::utils::{logger, validation::Validate};
use sales_etl::{build_sources, CliConfig, EtlEngine, LocalStorage, SalesConfig, SalesPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting sales-etl");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match SalesConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.sources.is_empty() {
        eprintln!("❌ No record sources configured");
        eprintln!("💡 Add [[sources]] to the config file or pass --csv / --json");
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    tracing::debug!("Rules: {:?}", config.rules);

    let source = build_sources(&config.sources, LocalStorage::new(".".to_string()));
    let storage = LocalStorage::new(config.output_path());
    let pipeline = SalesPipeline::new(source, storage, &config);
    let engine = EtlEngine::new(pipeline).with_dry_run(args.dry_run);

    match engine.run().await {
        Ok(report) => {
            println!("{}", report);
            for path in &report.written_files {
                println!("📁 Output saved to: {}", path);
            }
            println!("Processing completed");
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
