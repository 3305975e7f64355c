use clap::Parser;
use farm_acreage::utils::error::{ErrorSeverity, FarmError};
use farm_acreage::utils::logger::{self, LogFormat};
use farm_acreage::utils::validation::Validate;
use farm_acreage::{
    CalculationReport, CalculationRequest, CalculatorEngine, CliConfig, LocalStorage,
    PredictionClient, PredictionResult, TomlConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(LogFormat::from_flag(config.json_logs), config.verbose);

    tracing::info!("Starting farm-acreage CLI");
    tracing::debug!(
        "CLI config: unit={:?}, output_path={:?}, config={:?}",
        config.unit,
        config.output_path,
        config.config
    );

    match run(config).await {
        Ok(report) => print_report(&report),
        Err(e) => {
            tracing::error!(
                "❌ Calculation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: CliConfig) -> Result<CalculationReport, FarmError> {
    config.validate()?;

    // 載入 TOML 配置（選用）
    let file_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let file_config = TomlConfig::from_file(path)?;
            file_config.validate()?;
            file_config
        }
        None => TomlConfig::default(),
    };

    let unit = config.unit.unwrap_or_else(|| file_config.default_unit());
    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| file_config.output_path().to_string());

    let storage = LocalStorage::new(output_path.clone());
    let mut engine = CalculatorEngine::new(storage);

    if config.wants_inference() {
        let settings = file_config.inference_settings(config.api_token.as_deref())?;
        tracing::debug!("Inference settings: {:?}", settings);
        engine = engine.with_predictions(Box::new(PredictionClient::new(settings)));
    }

    let request = CalculationRequest {
        boundary: config.boundary()?,
        unit,
        name: config.name.clone(),
        description: config.description.clone(),
        save: config.save,
        archive: config.archive || file_config.archive_enabled(),
        analyze_soil: config.analyze_soil,
        predict_yield: config.predict_yield,
        crop: config.crop.clone(),
    };

    let report = engine.run(request).await?;
    tracing::info!("✅ Output saved to: {}", output_path);
    Ok(report)
}

fn print_report(report: &CalculationReport) {
    println!("📐 Area: {:.2} {} ({} points)", report.area, report.unit, report.points);

    if let Some(profile) = &report.saved {
        println!("💾 Saved farm '{}' as {}", profile.name, profile.id);
    }

    for file in &report.exported {
        println!("📁 Exported: {}", file);
    }

    print_prediction("🧪 Soil analysis", report.soil_analysis.as_ref());
    print_prediction("🌾 Yield prediction", report.yield_prediction.as_ref());
}

fn print_prediction(label: &str, result: Option<&PredictionResult>) {
    let Some(result) = result else {
        return;
    };

    if result.success {
        println!("{}:\n{}", label, result.data.as_deref().unwrap_or_default());
    } else {
        eprintln!(
            "{} unavailable: {}",
            label,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}
