use clap::Parser;
use std::io::{BufRead, Write};
use survey_footprint::core::{ConfigProvider, MissionSource};
use survey_footprint::domain::model::Mission;
use survey_footprint::utils::error::{ErrorSeverity, FootprintError};
use survey_footprint::utils::{logger, validation::Validate};
use survey_footprint::{CliConfig, FileMissionSource, FootprintEngine, FootprintPipeline, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting survey-footprint CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    // 讀取任務清單與照片座標
    let source = match FileMissionSource::open(config.points_path(), config.missions_path()) {
        Ok(source) => source,
        Err(e) => fail(&e),
    };

    let missions = match source.list_missions() {
        Ok(missions) => missions,
        Err(e) => fail(&e),
    };

    if config.list {
        print_missions(&missions);
        return Ok(());
    }

    let mission_id = match config.mission_id {
        Some(id) => id,
        None => match prompt_mission_id(&missions) {
            Ok(id) => id,
            Err(e) => fail(&e),
        },
    };

    if !missions.iter().any(|m| m.id == mission_id) {
        fail(&FootprintError::MissionNotFound { mission_id });
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = FootprintPipeline::new(storage, config, source, mission_id);

    let engine = FootprintEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Footprint completed successfully!");
            println!("✅ Shapefile saved to: {}", output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn print_missions(missions: &[Mission]) {
    println!("📋 Missions:");
    for mission in missions {
        println!("  {:>6}  {}", mission.id, mission.local);
    }
}

/// 互動式選擇任務編號
fn prompt_mission_id(missions: &[Mission]) -> Result<i64, FootprintError> {
    print_missions(missions);
    print!("Mission id: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();

    answer
        .parse::<i64>()
        .map_err(|_| FootprintError::InvalidConfigValueError {
            field: "mission_id".to_string(),
            value: answer.to_string(),
            reason: "Mission id must be an integer".to_string(),
        })
}

fn fail(e: &FootprintError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Footprint process failed: {} (Category: {:?}, Severity: {:?})",
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
    std::process::exit(exit_code)
}
