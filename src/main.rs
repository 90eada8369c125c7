use clap::Parser;
use prtimes_aggregator::core::Storage;
use prtimes_aggregator::utils::error::{ErrorSeverity, FeedError};
use prtimes_aggregator::utils::{logger, validation::Validate};
use prtimes_aggregator::{Aggregator, CliConfig, LocalStorage, PrTimesClient};
use std::path::Path;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting prtimes-aggregator CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Aggregation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,      // 輸入錯誤
            ErrorSeverity::Medium => 2,   // 上游錯誤，可重試
            ErrorSeverity::High => 1,     // 設定或資料錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: &CliConfig) -> Result<(), FeedError> {
    // 驗證配置與查詢，任何上游請求之前
    config.validate()?;
    let query = config.search_query()?;

    let client = PrTimesClient::from_config(config)?;
    let aggregator = Aggregator::from_config(client, config)?;

    let items = aggregator.run(&query).await?;

    let json = if config.pretty {
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string(&items)?
    };

    match &config.output {
        Some(output) => {
            let path = Path::new(output);
            let dir = path
                .parent()
                .and_then(|p| p.to_str())
                .filter(|p| !p.is_empty())
                .unwrap_or(".");
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .ok_or_else(|| FeedError::InvalidConfigValueError {
                    field: "output".to_string(),
                    value: output.clone(),
                    reason: "Output must name a file".to_string(),
                })?;

            LocalStorage::new(dir.to_string())
                .write_file(file_name, json.as_bytes())
                .await?;
            tracing::info!("📁 {} releases saved to: {}", items.len(), output);
        }
        None => println!("{}", json),
    }

    Ok(())
}
