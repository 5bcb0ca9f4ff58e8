use crate::config::{CampaignConfig, PrizeSlotSeed};
use crate::database::{create_file_test_pool, create_test_pool};
use crate::entities::{PrizeKind, participant_entity as participants};
use crate::models::RegisterRequest;
use crate::services::*;
use crate::utils::{ManualClock, ReferenceDay};
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;

pub fn seed_slot(
    slot_index: i32,
    kind: PrizeKind,
    total_stock: Option<i32>,
    weight: i32,
) -> PrizeSlotSeed {
    PrizeSlotSeed {
        slot_index,
        kind,
        title: format!("{kind} #{slot_index}"),
        total_stock,
        weight,
        enabled: true,
    }
}

pub fn default_test_slots() -> Vec<PrizeSlotSeed> {
    vec![
        seed_slot(0, PrizeKind::Second, Some(2), 3),
        seed_slot(1, PrizeKind::Voucher10, Some(50), 150),
        seed_slot(2, PrizeKind::Lose, None, 30),
    ]
}

/// 测试数据库 + 手动时钟 + 固定随机种子
pub struct TestContext {
    pub pool: DatabaseConnection,
    pub clock: Arc<ManualClock>,
    pub reference_day: ReferenceDay,
    pub inventory: PrizeInventory,
    pub quota: QuotaTracker,
    pub campaign: CampaignService,
    pub participants: ParticipantService,
    pub redemption: RedemptionService,
}

impl TestContext {
    pub async fn new(seeds: Vec<PrizeSlotSeed>) -> Self {
        Self::with_pool(create_test_pool().await, seeds).await
    }

    /// 多连接的文件库，事务之间真正并发
    pub async fn on_file(seeds: Vec<PrizeSlotSeed>) -> Self {
        Self::with_pool(create_file_test_pool(8).await, seeds).await
    }

    async fn with_pool(pool: DatabaseConnection, seeds: Vec<PrizeSlotSeed>) -> Self {
        let config = CampaignConfig {
            rng_seed: Some(7),
            ..CampaignConfig::default()
        };
        // 2026-01-10 10:00 (UTC+7)
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 10, 3, 0, 0).unwrap(),
        ));
        let reference_day = ReferenceDay::new(config.utc_offset_minutes, clock.clone()).unwrap();
        let inventory = PrizeInventory::new(reference_day.clone(), config.rng_seed);
        let quota = QuotaTracker::new(config.base_daily_spins);
        let campaign = CampaignService::new(
            pool.clone(),
            inventory.clone(),
            quota.clone(),
            reference_day.clone(),
            &config,
        );
        campaign.seed_prize_slots(&seeds).await.unwrap();

        Self {
            participants: ParticipantService::new(
                pool.clone(),
                reference_day.clone(),
                config.base_daily_spins,
            ),
            redemption: RedemptionService::new(pool.clone(), reference_day.clone()),
            pool,
            clock,
            reference_day,
            inventory,
            quota,
            campaign,
        }
    }

    pub async fn register(&self, phone: &str) -> String {
        self.participants
            .register_or_touch(RegisterRequest {
                name: format!("Player {phone}"),
                phone: phone.to_string(),
                sex: None,
                job: None,
            })
            .await
            .unwrap()
            .participant_id
    }

    pub async fn load_participant(&self, id: &str) -> participants::Model {
        participants::Entity::find_by_id(id)
            .one(&self.pool)
            .await
            .unwrap()
            .unwrap()
    }
}
