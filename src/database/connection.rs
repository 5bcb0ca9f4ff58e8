use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

/// 内存 SQLite，已执行迁移
///
/// 内存库只存在于单个连接中，因此连接池固定为 1
#[cfg(test)]
pub async fn create_test_pool() -> DbPool {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .min_connections(1)
        .max_connections(1)
        .sqlx_logging(false);
    let pool = Database::connect(options).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// 临时文件 SQLite，多连接，用于真实的并发事务测试
#[cfg(test)]
pub async fn create_file_test_pool(max_connections: u32) -> DbPool {
    let path = std::env::temp_dir().join(format!(
        "prize-wheel-test-{}.db",
        uuid::Uuid::new_v4().simple()
    ));
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .min_connections(1)
        .max_connections(max_connections)
        .sqlx_logging(false);
    let pool = Database::connect(options).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
