use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use prize_wheel_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
    utils::{ReferenceDay, SystemClock},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 参考日（全局唯一的"今天"定义）
    let reference_day =
        ReferenceDay::new(config.campaign.utc_offset_minutes, Arc::new(SystemClock))
            .map_err(|e| std::io::Error::other(e.to_string()))?;

    // 创建服务
    let inventory = PrizeInventory::new(reference_day.clone(), config.campaign.rng_seed);
    let quota = QuotaTracker::new(config.campaign.base_daily_spins);
    let campaign_service = CampaignService::new(
        pool.clone(),
        inventory,
        quota,
        reference_day.clone(),
        &config.campaign,
    );
    let participant_service = ParticipantService::new(
        pool.clone(),
        reference_day.clone(),
        config.campaign.base_daily_spins,
    );
    let redemption_service = RedemptionService::new(pool.clone(), reference_day.clone());

    // 奖池播种（仅空表时）
    campaign_service
        .seed_prize_slots(&config.prize_slots)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to seed prize slots: {e}")))?;

    log::info!(
        "Campaign reference day {} (UTC offset {} min)",
        reference_day.today(),
        config.campaign.utc_offset_minutes
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let admin_secret = config.admin.secret.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(participant_service.clone()))
            .app_data(web::Data::new(redemption_service.clone()))
            .configure(swagger_config)
            .configure(handlers::admin_config(admin_secret.clone()))
            .service(
                web::scope("/api/v1")
                    .configure(handlers::participant_config)
                    .configure(handlers::campaign_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
