use anyhow::{Context, Result};
use roadwatch_database::{Database, DatabaseConfig, SqlFileExecutor};
use roadwatch_observability::{info, init_tracing_from_env};
use roadwatch_reports::ViolationService;
use serde::Serialize;
use std::env;

const DEFAULT_DRIVER: &str = "K123456";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing_from_env("roadwatch").context("Failed to initialize tracing")?;

    info!("Starting roadwatch reports");

    let config = DatabaseConfig::from_env();
    let db = Database::new(&config)
        .await
        .context("Failed to connect to the database")?;

    let scripts = SqlFileExecutor::new(db.clone());
    for key in ["ROADWATCH_SCHEMA_FILE", "ROADWATCH_SEED_FILE"] {
        if let Some(path) = non_empty_var(key) {
            let count = scripts
                .execute_sql_file(&path)
                .await
                .with_context(|| format!("Failed to execute {}", path))?;
            info!(path = %path, statements = count, "SQL file applied");
        }
    }

    let driver = non_empty_var("ROADWATCH_DRIVER").unwrap_or_else(|| DEFAULT_DRIVER.to_string());
    let service = ViolationService::new(db.repositories().violations());

    print_report(
        &format!("Offenses of driver {}", driver),
        &service.get_offenses_by_driver(&driver).await?,
    )?;
    print_report("Top drivers by points", &service.get_top_drivers_by_points().await?)?;
    print_report("Speed camera statistic", &service.get_speed_camera_statistic().await?)?;
    print_report("Summary statistics", &service.get_summary_statistics().await?)?;

    db.close().await;
    Ok(())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn print_report<T: Serialize>(title: &str, rows: &[T]) -> Result<()> {
    println!("== {} ==", title);
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}
