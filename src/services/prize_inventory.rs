use crate::config::PrizeSlotSeed;
use crate::entities::prize_slot_entity as slots;
use crate::error::{AppError, AppResult};
use crate::utils::ReferenceDay;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, UpdateResult,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 奖池：按权重抽取槽位并扣减库存
#[derive(Clone)]
pub struct PrizeInventory {
    rng: Arc<Mutex<StdRng>>,
    reference_day: ReferenceDay,
}

impl PrizeInventory {
    /// seed 为 None 时使用系统熵初始化随机数
    pub fn new(reference_day: ReferenceDay, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Arc::new(Mutex::new(rng)),
            reference_day,
        }
    }

    /// 全部槽位（按 slot_index 排序）
    pub async fn list_slots<C: ConnectionTrait>(&self, conn: &C) -> AppResult<Vec<slots::Model>> {
        let list = slots::Entity::find()
            .order_by_asc(slots::Column::SlotIndex)
            .all(conn)
            .await?;
        Ok(list)
    }

    /// 奖池为空时按配置播种，已有数据则不做任何修改
    pub async fn seed<C: ConnectionTrait>(
        &self,
        conn: &C,
        seeds: &[PrizeSlotSeed],
    ) -> AppResult<usize> {
        let existing = slots::Entity::find().count(conn).await?;
        if existing > 0 {
            log::info!("Prize pool already seeded with {existing} slots");
            return Ok(0);
        }
        if seeds.is_empty() {
            return Ok(0);
        }

        let now = self.reference_day.now();
        let models = seeds.iter().map(|s| slots::ActiveModel {
            slot_index: Set(s.slot_index),
            kind: Set(s.kind),
            title: Set(s.title.clone()),
            total_stock: Set(s.total_stock),
            remaining_stock: Set(s.total_stock),
            weight: Set(s.weight),
            enabled: Set(s.enabled),
            created_at: Set(now),
            updated_at: Set(now),
        });
        slots::Entity::insert_many(models)
            .exec_without_returning(conn)
            .await?;

        log::info!("Seeded prize pool with {} slots", seeds.len());
        Ok(seeds.len())
    }

    /// 按权重抽取一个槽位并预留：
    /// 1. 读取启用且仍有库存的槽位
    /// 2. 在 [0, 总权重) 内取随机数，按 slot_index 顺序轮盘选择
    /// 3. 限量槽位使用条件更新扣减库存 (where remaining_stock > 0)
    ///
    /// 条件更新未命中时返回 StockRace，由调用方回滚并重试
    pub async fn select_and_reserve<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> AppResult<slots::Model> {
        let mut eligible = slots::Entity::find()
            .filter(slots::Column::Enabled.eq(true))
            .order_by_asc(slots::Column::SlotIndex)
            .all(conn)
            .await?;
        eligible.retain(|s| s.is_eligible());

        let total = total_weight(&eligible);
        if total == 0 {
            log::error!(
                "CRITICAL: prize pool has no eligible weight ({} eligible slots)",
                eligible.len()
            );
            return Err(AppError::NoEligiblePrizes);
        }

        let roll = self.rng.lock().await.gen_range(0..total);
        let chosen = pick_weighted(&eligible, roll)
            .ok_or(AppError::NoEligiblePrizes)?
            .clone();

        if !chosen.is_limited() {
            return Ok(chosen);
        }

        self.reserve(conn, &chosen).await
    }

    /// 限量槽位原子扣减一个库存，返回扣减后的槽位
    pub async fn reserve<C: ConnectionTrait>(
        &self,
        conn: &C,
        slot: &slots::Model,
    ) -> AppResult<slots::Model> {
        let update_result: UpdateResult = slots::Entity::update_many()
            .col_expr(
                slots::Column::RemainingStock,
                Expr::col(slots::Column::RemainingStock).sub(1),
            )
            .col_expr(
                slots::Column::UpdatedAt,
                Expr::value(self.reference_day.now()),
            )
            .filter(slots::Column::SlotIndex.eq(slot.slot_index))
            .filter(
                Condition::all()
                    .add(slots::Column::RemainingStock.is_not_null())
                    .add(slots::Column::RemainingStock.gt(0)),
            )
            .exec(conn)
            .await?;

        if update_result.rows_affected != 1 {
            log::warn!(
                "Stock race on prize slot {} ({}), nothing left to reserve",
                slot.slot_index,
                slot.title
            );
            return Err(AppError::StockRace {
                slot_index: slot.slot_index,
            });
        }

        slots::Entity::find_by_id(slot.slot_index)
            .one(conn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Prize slot {} disappeared after reservation",
                    slot.slot_index
                ))
            })
    }
}

/// 参与抽取的总权重，负权重按 0 计
pub fn total_weight(eligible: &[slots::Model]) -> u64 {
    eligible.iter().map(|s| s.weight.max(0) as u64).sum()
}

/// 轮盘选择：roll 取值 [0, total_weight)，权重为 0 的槽位永远不会被选中
pub fn pick_weighted(eligible: &[slots::Model], mut roll: u64) -> Option<&slots::Model> {
    for slot in eligible {
        let weight = slot.weight.max(0) as u64;
        if roll < weight {
            return Some(slot);
        }
        roll -= weight;
    }
    None
}
