use crate::entities::PrizeKind;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub campaign: CampaignConfig,
    pub admin: AdminConfig,
    #[serde(default = "default_prize_slots")]
    pub prize_slots: Vec<PrizeSlotSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// 参考时区 (相对 UTC 的分钟数)，默认 UTC+07:00
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// 每日基础抽奖次数
    #[serde(default = "default_base_daily_spins")]
    pub base_daily_spins: i32,
    /// 库存竞争失败后的重试次数
    #[serde(default = "default_stock_race_retries")]
    pub stock_race_retries: u32,
    #[serde(default = "default_code_prefix")]
    pub code_prefix: String,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// 固定随机种子 (仅用于演练/复现)
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            base_daily_spins: default_base_daily_spins(),
            stock_race_retries: default_stock_race_retries(),
            code_prefix: default_code_prefix(),
            code_length: default_code_length(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub secret: String,
}

/// 奖池播种配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrizeSlotSeed {
    pub slot_index: i32,
    pub kind: PrizeKind,
    pub title: String,
    /// None = 无限库存
    #[serde(default)]
    pub total_stock: Option<i32>,
    pub weight: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_utc_offset_minutes() -> i32 {
    7 * 60
}

fn default_base_daily_spins() -> i32 {
    1
}

fn default_stock_race_retries() -> u32 {
    1
}

fn default_code_prefix() -> String {
    "GIFT-".to_string()
}

fn default_code_length() -> usize {
    8
}

fn default_enabled() -> bool {
    true
}

fn seed(
    slot_index: i32,
    kind: PrizeKind,
    title: &str,
    total_stock: Option<i32>,
    weight: i32,
) -> PrizeSlotSeed {
    PrizeSlotSeed {
        slot_index,
        kind,
        title: title.to_string(),
        total_stock,
        weight,
        enabled: true,
    }
}

/// 默认奖池配置
/// - 头奖权重为 0，只能通过后台调整后才会被抽中
/// - 两个"谢谢参与"槽位对应转盘上的两个格子，其中一个权重为 0
pub fn default_prize_slots() -> Vec<PrizeSlotSeed> {
    vec![
        seed(0, PrizeKind::First, "Aspire Paddle (Grand Prize)", Some(1), 0),
        seed(1, PrizeKind::Second, "Aspire Pickleball Shoes", Some(2), 3),
        seed(2, PrizeKind::Third, "Pickleball Backpack", Some(5), 8),
        seed(3, PrizeKind::Fourth, "Pickleball Balls", Some(10), 15),
        seed(4, PrizeKind::Voucher15, "Voucher 15%", Some(30), 100),
        seed(5, PrizeKind::Voucher10, "Voucher 10%", Some(50), 150),
        seed(6, PrizeKind::Lose, "Better luck next time", None, 0),
        seed(7, PrizeKind::Lose, "Better luck next time", None, 30),
    ]
}

/// 校验活动参数，启动时调用
pub fn validate_campaign(campaign: &CampaignConfig) -> AppResult<()> {
    // FixedOffset 只接受 (-24h, 24h)
    if campaign.utc_offset_minutes.abs() >= 24 * 60 {
        return Err(AppError::ConfigError(format!(
            "campaign.utc_offset_minutes out of range: {}",
            campaign.utc_offset_minutes
        )));
    }
    if campaign.base_daily_spins < 0 {
        return Err(AppError::ConfigError(
            "campaign.base_daily_spins must not be negative".into(),
        ));
    }
    if campaign.code_length == 0 {
        return Err(AppError::ConfigError(
            "campaign.code_length must be greater than 0".into(),
        ));
    }
    Ok(())
}

/// 校验奖池配置，启动时调用
pub fn validate_prize_slots(slots: &[PrizeSlotSeed]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for slot in slots {
        if !seen.insert(slot.slot_index) {
            return Err(AppError::ConfigError(format!(
                "Duplicate prize slot index {}",
                slot.slot_index
            )));
        }
        if slot.weight < 0 {
            return Err(AppError::ConfigError(format!(
                "Prize slot {} has negative weight",
                slot.slot_index
            )));
        }
        if let Some(total) = slot.total_stock
            && total < 0
        {
            return Err(AppError::ConfigError(format!(
                "Prize slot {} has negative stock",
                slot.slot_index
            )));
        }
    }

    if !slots.iter().any(|s| s.enabled && s.weight > 0) {
        return Err(AppError::ConfigError(
            "At least one enabled prize slot must have a positive weight".into(),
        ));
    }

    Ok(())
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 4000u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    campaign: CampaignConfig::default(),
                    admin: AdminConfig {
                        secret: get_env("ADMIN_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                    },
                    prize_slots: default_prize_slots(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("CAMPAIGN_UTC_OFFSET_MINUTES")
            && let Ok(n) = v.parse()
        {
            config.campaign.utc_offset_minutes = n;
        }
        if let Ok(v) = env::var("CAMPAIGN_BASE_DAILY_SPINS")
            && let Ok(n) = v.parse()
        {
            config.campaign.base_daily_spins = n;
        }
        if let Ok(v) = env::var("CAMPAIGN_STOCK_RACE_RETRIES")
            && let Ok(n) = v.parse()
        {
            config.campaign.stock_race_retries = n;
        }
        if let Ok(v) = env::var("CAMPAIGN_RNG_SEED")
            && let Ok(n) = v.parse()
        {
            config.campaign.rng_seed = Some(n);
        }
        if let Ok(v) = env::var("ADMIN_SECRET") {
            config.admin.secret = v;
        }

        validate_campaign(&config.campaign)?;
        validate_prize_slots(&config.prize_slots)?;

        Ok(config)
    }
}
