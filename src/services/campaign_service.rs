use crate::config::{CampaignConfig, PrizeSlotSeed};
use crate::entities::{
    claim_entity as claims, participant_entity as participants, prize_slot_entity as slots,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    BonusSpinResponse, ClaimResponse, PrizeSlotResponse, SpinAvailabilityResponse, SpinResponse,
};
use crate::services::{PrizeInventory, QuotaTracker};
use crate::utils::{ReferenceDay, generate_claim_code};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sqlx::sqlite::SqliteError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, RuntimeErr, Set, SqlErr, TransactionTrait,
};
use std::future::Future;

/// 兑换码碰撞时的最大生成次数
const MAX_CODE_ATTEMPTS: usize = 5;

/// 抽奖与领奖协调器
///
/// - spin: 消耗次数 + 预留奖品 + 记录待领取奖品，在同一个事务中提交
/// - claim: 为最近一次中奖发放兑换码，同一参考日内幂等
#[derive(Clone)]
pub struct CampaignService {
    pool: DatabaseConnection,
    inventory: PrizeInventory,
    quota: QuotaTracker,
    reference_day: ReferenceDay,
    stock_race_retries: u32,
    code_prefix: String,
    code_length: usize,
}

impl CampaignService {
    pub fn new(
        pool: DatabaseConnection,
        inventory: PrizeInventory,
        quota: QuotaTracker,
        reference_day: ReferenceDay,
        campaign: &CampaignConfig,
    ) -> Self {
        Self {
            pool,
            inventory,
            quota,
            reference_day,
            stock_race_retries: campaign.stock_race_retries,
            code_prefix: campaign.code_prefix.clone(),
            code_length: campaign.code_length,
        }
    }

    /// 启动时播种奖池
    pub async fn seed_prize_slots(&self, seeds: &[PrizeSlotSeed]) -> AppResult<usize> {
        self.inventory.seed(&self.pool, seeds).await
    }

    /// 获取奖品列表（仅启用的）
    pub async fn list_prizes(&self) -> AppResult<Vec<PrizeSlotResponse>> {
        let list = self.inventory.list_slots(&self.pool).await?;
        Ok(list
            .into_iter()
            .filter(|s| s.enabled)
            .map(Into::into)
            .collect())
    }

    /// 抽奖 (Spin)
    ///
    /// 库存竞争或存储锁冲突时整笔事务回滚（次数不消耗），按配置重试；
    /// 重试仍失败返回 AllocationRace
    pub async fn spin(&self, participant_id: &str) -> AppResult<SpinResponse> {
        with_stock_race_retry(self.stock_race_retries, || self.try_spin(participant_id)).await
    }

    async fn try_spin(&self, participant_id: &str) -> AppResult<SpinResponse> {
        let today = self.reference_day.today();
        let now = self.reference_day.now();
        let txn = self.pool.begin().await?;

        lock_participant(&txn, participant_id, now).await?;
        let participant = find_participant(&txn, participant_id).await?;

        let spins_remaining = self
            .quota
            .check_and_consume_spin(&txn, &participant, today, now)
            .await?;

        let slot = match self.inventory.select_and_reserve(&txn).await {
            Ok(slot) => slot,
            Err(err) => {
                txn.rollback().await?;
                return Err(err);
            }
        };

        // 记录待领取奖品
        participants::Entity::update_many()
            .col_expr(
                participants::Column::LastPendingSlotIndex,
                Expr::value(slot.slot_index),
            )
            .col_expr(participants::Column::LastSpinAt, Expr::value(now))
            .col_expr(participants::Column::UpdatedAt, Expr::value(now))
            .filter(participants::Column::Id.eq(participant_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        if slot.kind.is_win() {
            log::info!(
                "Participant {} won slot {} ({}), remaining stock {:?}",
                participant_id,
                slot.slot_index,
                slot.title,
                slot.remaining_stock
            );
        }

        Ok(SpinResponse::new(&slot, spins_remaining))
    }

    /// 发放每日一次的额外抽奖次数
    pub async fn grant_bonus_spin(&self, participant_id: &str) -> AppResult<BonusSpinResponse> {
        let today = self.reference_day.today();
        let now = self.reference_day.now();
        let txn = self.pool.begin().await?;

        lock_participant(&txn, participant_id, now).await?;
        let participant = find_participant(&txn, participant_id).await?;
        let spins_remaining = self
            .quota
            .grant_bonus_spin(&txn, &participant, today, now)
            .await?;

        txn.commit().await?;

        Ok(BonusSpinResponse {
            granted: true,
            spins_remaining,
        })
    }

    /// 查询今日剩余次数与是否可领取额外次数（只读）
    pub async fn peek_spin_availability(
        &self,
        participant_id: &str,
    ) -> AppResult<SpinAvailabilityResponse> {
        let participant = find_participant(&self.pool, participant_id).await?;
        Ok(self
            .quota
            .peek_spin_availability(&participant, self.reference_day.today()))
    }

    /// 领取兑换码
    ///
    /// 逻辑:
    /// 1. 参与者必须有待领取奖品
    /// 2. 今天已领取过：返回当天的兑换码
    /// 3. 最近一次中奖已发过码（码的创建时间晚于最近一次抽奖）：返回该兑换码
    /// 4. 未中奖不发码
    /// 5. 生成新兑换码，(participant_id, claim_day) 唯一约束兜底并发重复提交
    pub async fn claim(&self, participant_id: &str) -> AppResult<ClaimResponse> {
        let today = self.reference_day.today();
        let now = self.reference_day.now();
        let txn = self.pool.begin().await?;

        lock_participant(&txn, participant_id, now).await?;
        let participant = find_participant(&txn, participant_id).await?;
        let slot_index = participant
            .last_pending_slot_index
            .ok_or(AppError::NoPendingPrize)?;

        if participant.last_claim_date == Some(today) {
            if let Some(existing) = find_claim_for_day(&txn, participant_id, today).await? {
                txn.commit().await?;
                return Ok(existing.into());
            }
            log::warn!(
                "Participant {participant_id} marked as claimed on {today} but no claim found"
            );
        }

        if let Some(latest) = find_latest_claim(&txn, participant_id).await?
            && participant
                .last_spin_at
                .is_some_and(|spin_at| latest.created_at >= spin_at)
        {
            txn.commit().await?;
            return Ok(latest.into());
        }

        let slot = slots::Entity::find_by_id(slot_index)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!("Pending prize slot {slot_index} not found"))
            })?;

        if !slot.kind.is_win() {
            return Err(AppError::NotAWin);
        }

        let code = self.generate_unique_code(&txn).await?;

        let inserted = claims::ActiveModel {
            code: Set(code),
            participant_id: Set(participant_id.to_string()),
            slot_index: Set(slot.slot_index),
            prize_kind: Set(slot.kind),
            prize_title: Set(slot.title.clone()),
            claim_day: Set(today),
            created_at: Set(now),
            redeemed_at: Set(None),
            redeemed_by: Set(None),
        }
        .insert(&txn)
        .await;

        let claim = match inserted {
            Ok(claim) => claim,
            Err(err) if is_unique_violation(&err) => {
                // 并发领取：另一请求已写入当天的兑换码
                txn.rollback().await?;
                log::warn!("Concurrent claim for participant {participant_id} on {today}");
                return match find_claim_for_day(&self.pool, participant_id, today).await? {
                    Some(existing) => Ok(existing.into()),
                    None => Err(err.into()),
                };
            }
            Err(err) => return Err(err.into()),
        };

        participants::Entity::update_many()
            .col_expr(participants::Column::LastClaimDate, Expr::value(today))
            .col_expr(participants::Column::UpdatedAt, Expr::value(now))
            .filter(participants::Column::Id.eq(participant_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!(
            "Issued claim code {} to participant {} for slot {}",
            claim.code,
            participant_id,
            claim.slot_index
        );

        Ok(claim.into())
    }

    async fn generate_unique_code<C: ConnectionTrait>(&self, conn: &C) -> AppResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_claim_code(&self.code_prefix, self.code_length);
            let exists = claims::Entity::find_by_id(code.clone()).one(conn).await?;
            if exists.is_none() {
                return Ok(code);
            }
        }
        Err(AppError::InternalError(
            "Failed to generate a unique claim code".into(),
        ))
    }
}

/// 库存竞争重试：StockRace 与存储锁冲突最多重试 retries 次，之后转为 AllocationRace
pub async fn with_stock_race_retry<T, F, Fut>(retries: u32, mut attempt: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut retried = 0;
    loop {
        let reason = match attempt().await {
            Err(AppError::StockRace { slot_index }) => format!("stock race on slot {slot_index}"),
            Err(AppError::DatabaseError(err)) if is_lock_contention(&err) => {
                format!("store contention ({err})")
            }
            other => return other,
        };
        if retried >= retries {
            log::warn!("Giving up after {reason}");
            return Err(AppError::AllocationRace);
        }
        retried += 1;
        log::warn!("Retry {retried}/{retries} after {reason}");
    }
}

/// 事务的第一条语句先写参与者行，提前拿到写锁
///
/// SQLite 下相当于 BEGIN IMMEDIATE（等待 busy_timeout 而不是提交时冲突），
/// PostgreSQL 下是行锁，同一参与者的并发请求按顺序执行
async fn lock_participant<C: ConnectionTrait>(
    conn: &C,
    participant_id: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let result = participants::Entity::update_many()
        .col_expr(participants::Column::UpdatedAt, Expr::value(now))
        .filter(participants::Column::Id.eq(participant_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::ParticipantNotFound(participant_id.to_string()));
    }
    Ok(())
}

pub(crate) async fn find_participant<C: ConnectionTrait>(
    conn: &C,
    participant_id: &str,
) -> AppResult<participants::Model> {
    participants::Entity::find_by_id(participant_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::ParticipantNotFound(participant_id.to_string()))
}

async fn find_claim_for_day<C: ConnectionTrait>(
    conn: &C,
    participant_id: &str,
    day: NaiveDate,
) -> Result<Option<claims::Model>, DbErr> {
    claims::Entity::find()
        .filter(claims::Column::ParticipantId.eq(participant_id))
        .filter(claims::Column::ClaimDay.eq(day))
        .one(conn)
        .await
}

async fn find_latest_claim<C: ConnectionTrait>(
    conn: &C,
    participant_id: &str,
) -> Result<Option<claims::Model>, DbErr> {
    claims::Entity::find()
        .filter(claims::Column::ParticipantId.eq(participant_id))
        .order_by_desc(claims::Column::CreatedAt)
        .one(conn)
        .await
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 锁冲突：SQLite BUSY/LOCKED（含扩展码），PostgreSQL serialization_failure/deadlock_detected
pub(crate) fn is_lock_contention(err: &DbErr) -> bool {
    let (DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
    | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db)))) = err
    else {
        return false;
    };
    let Some(code) = db.code() else {
        return false;
    };
    if db.try_downcast_ref::<SqliteError>().is_some() {
        code.parse::<i32>()
            .is_ok_and(|code| matches!(code & 0xff, 5 | 6))
    } else {
        matches!(code.as_ref(), "40001" | "40P01")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PrizeKind;
    use crate::services::test_support::*;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn always_win() -> Vec<PrizeSlotSeed> {
        vec![seed_slot(0, PrizeKind::Voucher15, Some(100), 1)]
    }

    fn always_lose() -> Vec<PrizeSlotSeed> {
        vec![seed_slot(0, PrizeKind::Lose, None, 1)]
    }

    async fn claim_count(ctx: &TestContext) -> u64 {
        claims::Entity::find().count(&ctx.pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_spin_unknown_participant() {
        let ctx = TestContext::new(default_test_slots()).await;
        let err = ctx.campaign.spin("missing").await.unwrap_err();
        assert!(matches!(err, AppError::ParticipantNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_prizes_hides_weights() {
        let mut seeds = default_test_slots();
        seeds[2].enabled = false;
        let ctx = TestContext::new(seeds).await;

        let prizes = ctx.campaign.list_prizes().await.unwrap();
        assert_eq!(prizes.len(), 2);
        let json = serde_json::to_value(&prizes).unwrap();
        assert!(json[0].get("weight").is_none());
        assert_eq!(json[0]["remaining_stock"], 2);
    }

    #[tokio::test]
    async fn test_spin_quota_and_bonus_scenario() {
        let ctx = TestContext::new(default_test_slots()).await;
        let id = ctx.register("0911000001").await;

        let first = ctx.campaign.spin(&id).await.unwrap();
        assert_eq!(first.spins_remaining, 0);

        let err = ctx.campaign.spin(&id).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExhausted));

        let bonus = ctx.campaign.grant_bonus_spin(&id).await.unwrap();
        assert!(bonus.granted);
        assert_eq!(bonus.spins_remaining, 1);

        let err = ctx.campaign.grant_bonus_spin(&id).await.unwrap_err();
        assert!(matches!(err, AppError::BonusAlreadyGranted));

        ctx.campaign.spin(&id).await.unwrap();
        let err = ctx.campaign.spin(&id).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExhausted));

        let availability = ctx.campaign.peek_spin_availability(&id).await.unwrap();
        assert_eq!(availability.spins_remaining, 0);
        assert!(!availability.can_claim_bonus);
    }

    #[tokio::test]
    async fn test_quota_resets_on_next_reference_day() {
        let ctx = TestContext::new(default_test_slots()).await;
        let id = ctx.register("0911000002").await;

        ctx.campaign.spin(&id).await.unwrap();
        assert!(ctx.campaign.spin(&id).await.is_err());

        ctx.clock.advance(Duration::days(1));
        let availability = ctx.campaign.peek_spin_availability(&id).await.unwrap();
        assert_eq!(availability.spins_remaining, 1);
        assert!(availability.can_claim_bonus);

        // peek 不落库
        let p = ctx.load_participant(&id).await;
        assert_eq!(p.free_spins_remaining, 0);

        ctx.campaign.spin(&id).await.unwrap();
        assert!(matches!(
            ctx.campaign.spin(&id).await.unwrap_err(),
            AppError::QuotaExhausted
        ));
    }

    #[tokio::test]
    async fn test_spin_records_pending_prize() {
        let ctx = TestContext::new(always_win()).await;
        let id = ctx.register("0911000003").await;

        let result = ctx.campaign.spin(&id).await.unwrap();
        assert!(result.is_win);
        assert_eq!(result.prize_kind, PrizeKind::Voucher15);
        assert_eq!(result.slot_index, 0);

        let p = ctx.load_participant(&id).await;
        assert_eq!(p.last_pending_slot_index, Some(0));
        assert!(p.last_spin_at.is_some());

        let slots = ctx.inventory.list_slots(&ctx.pool).await.unwrap();
        assert_eq!(slots[0].remaining_stock, Some(99));
    }

    #[tokio::test]
    async fn test_failed_allocation_does_not_consume_quota() {
        let ctx = TestContext::new(vec![seed_slot(0, PrizeKind::Lose, None, 0)]).await;
        let id = ctx.register("0911000004").await;

        let err = ctx.campaign.spin(&id).await.unwrap_err();
        assert!(matches!(err, AppError::NoEligiblePrizes));

        let p = ctx.load_participant(&id).await;
        assert_eq!(p.spin_day, None);
        assert_eq!(p.last_pending_slot_index, None);
        let availability = ctx.campaign.peek_spin_availability(&id).await.unwrap();
        assert_eq!(availability.spins_remaining, 1);
    }

    #[tokio::test]
    async fn test_claim_is_idempotent_within_day() {
        let ctx = TestContext::new(always_win()).await;
        let id = ctx.register("0911000005").await;
        ctx.campaign.spin(&id).await.unwrap();

        let first = ctx.campaign.claim(&id).await.unwrap();
        assert!(first.code.starts_with("GIFT-"));
        assert_eq!(first.prize_kind, PrizeKind::Voucher15);

        let second = ctx.campaign.claim(&id).await.unwrap();
        assert_eq!(first.code, second.code);
        assert_eq!(claim_count(&ctx).await, 1);

        let p = ctx.load_participant(&id).await;
        assert_eq!(p.last_claim_date, Some(ctx.reference_day.today()));
    }

    #[tokio::test]
    async fn test_claim_after_loss_is_not_a_win() {
        let ctx = TestContext::new(always_lose()).await;
        let id = ctx.register("0911000006").await;

        let result = ctx.campaign.spin(&id).await.unwrap();
        assert!(!result.is_win);

        let err = ctx.campaign.claim(&id).await.unwrap_err();
        assert!(matches!(err, AppError::NotAWin));
        assert_eq!(claim_count(&ctx).await, 0);
    }

    #[tokio::test]
    async fn test_claim_without_spin() {
        let ctx = TestContext::new(always_win()).await;
        let id = ctx.register("0911000007").await;

        let err = ctx.campaign.claim(&id).await.unwrap_err();
        assert!(matches!(err, AppError::NoPendingPrize));

        let err = ctx.campaign.claim("missing").await.unwrap_err();
        assert!(matches!(err, AppError::ParticipantNotFound(_)));
    }

    #[tokio::test]
    async fn test_new_day_win_gets_new_code() {
        let ctx = TestContext::new(always_win()).await;
        let id = ctx.register("0911000008").await;

        ctx.campaign.spin(&id).await.unwrap();
        let first = ctx.campaign.claim(&id).await.unwrap();

        // 次日未再抽奖，同一次中奖不会发第二个码
        ctx.clock.advance(Duration::days(1));
        let again = ctx.campaign.claim(&id).await.unwrap();
        assert_eq!(again.code, first.code);
        assert_eq!(claim_count(&ctx).await, 1);

        ctx.clock.advance(Duration::minutes(5));
        ctx.campaign.spin(&id).await.unwrap();
        let second = ctx.campaign.claim(&id).await.unwrap();
        assert_ne!(second.code, first.code);
        assert_eq!(claim_count(&ctx).await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_spins_for_last_unit() {
        let ctx = TestContext::on_file(vec![
            seed_slot(0, PrizeKind::First, Some(1), 100),
            seed_slot(1, PrizeKind::Lose, None, 1),
        ])
        .await;

        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(ctx.register(&format!("09120000{i:02}")).await);
        }

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let campaign = ctx.campaign.clone();
                tokio::spawn(async move { campaign.spin(&id).await })
            })
            .collect();

        let mut last_unit_wins = 0;
        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            if result.slot_index == 0 {
                last_unit_wins += 1;
            }
        }

        let slots = ctx.inventory.list_slots(&ctx.pool).await.unwrap();
        assert_eq!(last_unit_wins, 1);
        assert_eq!(slots[0].remaining_stock, Some(0));

        // 每人恰好消耗一次
        let today = ctx.reference_day.today();
        for id in &ids {
            let p = ctx.load_participant(id).await;
            assert_eq!(p.spin_day, Some(today));
            assert_eq!(p.free_spins_remaining, 0);
            assert!(p.last_pending_slot_index.is_some());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_spins_same_participant() {
        let ctx = TestContext::on_file(default_test_slots()).await;
        let id = ctx.register("0913000001").await;

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let campaign = ctx.campaign.clone();
                let id = id.clone();
                tokio::spawn(async move { campaign.spin(&id).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::QuotaExhausted) => {}
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(ctx.load_participant(&id).await.free_spins_remaining, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_share_one_code() {
        let ctx = TestContext::on_file(always_win()).await;
        let id = ctx.register("0913000002").await;
        ctx.campaign.spin(&id).await.unwrap();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let campaign = ctx.campaign.clone();
                let id = id.clone();
                tokio::spawn(async move { campaign.claim(&id).await })
            })
            .collect();

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().unwrap().code);
        }
        codes.dedup();
        assert_eq!(codes.len(), 1);
        assert_eq!(claim_count(&ctx).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bonus_granted_once() {
        let ctx = TestContext::on_file(default_test_slots()).await;
        let id = ctx.register("0913000003").await;

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let campaign = ctx.campaign.clone();
                let id = id.clone();
                tokio::spawn(async move { campaign.grant_bonus_spin(&id).await })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => granted += 1,
                Err(AppError::BonusAlreadyGranted) => {}
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(granted, 1);
        assert_eq!(ctx.load_participant(&id).await.free_spins_remaining, 2);
    }

    #[test]
    fn test_lock_contention_ignores_other_errors() {
        assert!(!is_lock_contention(&DbErr::Custom("boom".into())));
        assert!(!is_lock_contention(&DbErr::RecordNotFound("x".into())));
    }

    #[tokio::test]
    async fn test_stock_race_retry_is_bounded() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_stock_race_retry(1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::StockRace { slot_index: 2 }) }
        })
        .await;
        assert!(matches!(result, Err(AppError::AllocationRace)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stock_race_retry_recovers() {
        let calls = AtomicU32::new(0);
        let result = with_stock_race_retry(1, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AppError::StockRace { slot_index: 2 })
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_stock_race_retry(1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::QuotaExhausted) }
        })
        .await;
        assert!(matches!(result, Err(AppError::QuotaExhausted)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
