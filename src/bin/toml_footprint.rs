use anyhow::Context;
use clap::Parser;
use survey_footprint::core::{ConfigProvider, MissionSource};
use survey_footprint::utils::error::ErrorSeverity;
use survey_footprint::utils::validation::{self, Validate};
use survey_footprint::utils::logger;
use survey_footprint::{FileMissionSource, FootprintEngine, FootprintPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-footprint")]
#[command(about = "Mission footprint tool with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "footprint-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the mission from config
    #[arg(long)]
    mission_id: Option<i64>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logging() {
        let level = config.monitoring.as_ref().and_then(|m| m.log_level.clone());
        logger::init_json_logger(level.as_deref());
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based footprint tool");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(mission_id) = args.mission_id {
        config.source.mission_id = Some(mission_id);
        tracing::info!("🔧 Mission overridden to: {}", mission_id);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mission_id = *validation::validate_required_field("source.mission_id", &config.source.mission_id)
        .context("No mission selected: set source.mission_id or pass --mission-id")?;

    display_config_summary(&config, &args, mission_id);

    let source = FileMissionSource::open(config.points_path(), config.missions_path())
        .with_context(|| {
            format!(
                "Failed to read mission data from {} and {}",
                config.points_path(),
                config.missions_path()
            )
        })?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&source, &config, mission_id)?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = FootprintPipeline::new(storage, config, source, mission_id);
    let engine = FootprintEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Footprint completed successfully!");
            println!("✅ Shapefile saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Footprint process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

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

fn display_config_summary(config: &TomlConfig, args: &Args, mission_id: i64) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Points: {}", config.points_path());
    println!("  Missions: {}", config.missions_path());
    println!("  Mission: {}", mission_id);
    println!("  Engine: {:?}", config.engine());
    println!("  Empty intersection: {:?}", config.empty_intersection_policy());
    println!("  Output: {}/{}.shp", config.output_path(), config.output_stem(mission_id));

    if config.archive_output() {
        println!("  Archive: enabled");
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
}

fn perform_dry_run(
    source: &FileMissionSource,
    config: &TomlConfig,
    mission_id: i64,
) -> anyhow::Result<()> {
    let missions = source.list_missions()?;
    let mission = missions
        .iter()
        .find(|m| m.id == mission_id)
        .with_context(|| format!("Mission {} is not in the catalog", mission_id))?;

    let points = source.mission_points(mission_id)?;
    let reference = source.reference_area(mission_id)?;

    println!("🔍 Dry run for mission {} ({}):", mission.id, mission.local);
    println!("  Photo positions: {}", points.len());
    println!("  Reference area vertices: {}", reference.vertices().len());
    println!(
        "  Would write: {}/{}.{{shp,shx,dbf,prj}}",
        config.output_path(),
        config.output_stem(mission_id)
    );

    Ok(())
}
