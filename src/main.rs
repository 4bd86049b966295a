use clap::Parser;
use nutrition_filter::core::presentation::{self, Tone};
use nutrition_filter::utils::error::ErrorSeverity;
use nutrition_filter::utils::{logger, validation::Validate};
use nutrition_filter::{
    BatchPipeline, BatchResult, CancellationToken, CliConfig, EvaluationOutcome,
    ExpiringRecordCache, FileStore, FilterEngine, HttpMarkupSource, NutritionError,
    PreferenceStore, RunSettings, TomlConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting nutrition-filter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Nutrition check failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

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

    Ok(())
}

async fn run(cli: CliConfig) -> Result<(), NutritionError> {
    cli.validate()?;

    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("📋 Loading configuration from {}", path);
            let config = TomlConfig::from_file(path)?;
            config.validate()?;
            config
        }
        None => TomlConfig::default(),
    };

    let cache_dir = cli
        .cache_dir
        .clone()
        .unwrap_or_else(|| file_config.cache.directory.clone());
    let store = FileStore::new(&cache_dir);
    let cache = Arc::new(ExpiringRecordCache::open(store.clone()));

    if cli.clear_cache {
        cache.clear();
        println!("🗑️ Кеш очищено");
        return Ok(());
    }

    let preference_store = PreferenceStore::new(store);
    let settings = RunSettings::resolve(&cli, &file_config, &preference_store.load())?;
    if cli.save_preferences {
        preference_store.save(&settings.preferences())?;
        tracing::info!("💾 Filter preferences saved");
    }

    tracing::info!(
        "📦 {} cached products, pacing {:?}",
        cache.len(),
        settings.pacing
    );

    let source = HttpMarkupSource::new(settings.user_agent.as_deref(), settings.timeout)?;
    let pipeline = BatchPipeline::new(cache, source)?.with_pacing(settings.pacing);
    let engine = FilterEngine::new(pipeline)?;

    // Ctrl-C 只停止後續商品，已完成的結果保留
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("⛔ Stop requested, finishing current product");
            signal_token.cancel();
        }
    });

    let mut hidden = 0usize;
    let mut observer = |source_id: &str, outcome: &EvaluationOutcome, progress: &BatchResult| {
        let shown = presentation::present(
            outcome,
            &settings.display,
            settings.filter.protein_dominant_only,
        );
        if shown.hidden {
            hidden += 1;
            return;
        }
        let marker = match shown.tone {
            Tone::Green => "🟢",
            Tone::Red => "🔴",
            Tone::Yellow => "🟡",
        };
        println!(
            "{} [{}] {}\n   {}",
            marker,
            progress.processed,
            source_id,
            presentation::badge_text(outcome)
        );
    };

    let result = engine
        .run(&settings.items, &settings.filter, &cancel, &mut observer)
        .await?;

    println!("{}", presentation::status_line(&result, hidden, &settings.display));
    Ok(())
}
