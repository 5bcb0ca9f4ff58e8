use crate::entities::participant_entity as participants;
use crate::error::{AppError, AppResult};
use crate::models::SpinAvailabilityResponse;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};

/// 每日抽奖次数
///
/// 说明:
/// - spin_day 不是今天时，free_spins_remaining 视为基础次数 (惰性重置，没有后台任务)
/// - 所有写操作都是带条件的 UPDATE，rows_affected 即比较交换的结果
#[derive(Clone, Debug)]
pub struct QuotaTracker {
    base_daily_spins: i32,
}

impl QuotaTracker {
    pub fn new(base_daily_spins: i32) -> Self {
        Self { base_daily_spins }
    }

    /// 今日有效剩余次数（不落库）
    pub fn effective_spins(&self, participant: &participants::Model, today: NaiveDate) -> i32 {
        if participant.spin_day == Some(today) {
            participant.free_spins_remaining
        } else {
            self.base_daily_spins
        }
    }

    /// 只读查询，不持久化跨日重置
    pub fn peek_spin_availability(
        &self,
        participant: &participants::Model,
        today: NaiveDate,
    ) -> SpinAvailabilityResponse {
        SpinAvailabilityResponse {
            spins_remaining: self.effective_spins(participant, today).max(0),
            can_claim_bonus: participant.bonus_day != Some(today),
        }
    }

    /// 检查并消耗一次抽奖次数，返回消耗后的剩余次数
    ///
    /// 必须在抽奖事务内调用：奖品预留失败时随事务一起回滚
    pub async fn check_and_consume_spin<C: ConnectionTrait>(
        &self,
        conn: &C,
        participant: &participants::Model,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<i32> {
        if self.effective_spins(participant, today) <= 0 {
            return Err(AppError::QuotaExhausted);
        }

        if participant.spin_day != Some(today) {
            self.roll_over(conn, &participant.id, today, now).await?;
        }

        let update_result = participants::Entity::update_many()
            .col_expr(
                participants::Column::FreeSpinsRemaining,
                Expr::col(participants::Column::FreeSpinsRemaining).sub(1),
            )
            .col_expr(participants::Column::UpdatedAt, Expr::value(now))
            .filter(participants::Column::Id.eq(participant.id.as_str()))
            .filter(participants::Column::SpinDay.eq(today))
            .filter(participants::Column::FreeSpinsRemaining.gt(0))
            .exec(conn)
            .await?;

        if update_result.rows_affected == 0 {
            // 并发请求已用掉最后一次
            return Err(AppError::QuotaExhausted);
        }

        self.current_spins(conn, &participant.id).await
    }

    /// 发放每日一次的额外抽奖次数，返回发放后的剩余次数
    pub async fn grant_bonus_spin<C: ConnectionTrait>(
        &self,
        conn: &C,
        participant: &participants::Model,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<i32> {
        if participant.bonus_day == Some(today) {
            return Err(AppError::BonusAlreadyGranted);
        }

        if participant.spin_day != Some(today) {
            self.roll_over(conn, &participant.id, today, now).await?;
        }

        let update_result = participants::Entity::update_many()
            .col_expr(
                participants::Column::FreeSpinsRemaining,
                Expr::col(participants::Column::FreeSpinsRemaining).add(1),
            )
            .col_expr(participants::Column::BonusDay, Expr::value(today))
            .col_expr(participants::Column::UpdatedAt, Expr::value(now))
            .filter(participants::Column::Id.eq(participant.id.as_str()))
            .filter(not_on_day(participants::Column::BonusDay, today))
            .exec(conn)
            .await?;

        if update_result.rows_affected == 0 {
            return Err(AppError::BonusAlreadyGranted);
        }

        self.current_spins(conn, &participant.id).await
    }

    /// 跨日重置为基础次数；已被其它请求重置过则不做修改
    async fn roll_over<C: ConnectionTrait>(
        &self,
        conn: &C,
        participant_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let update_result = participants::Entity::update_many()
            .col_expr(
                participants::Column::FreeSpinsRemaining,
                Expr::value(self.base_daily_spins),
            )
            .col_expr(participants::Column::SpinDay, Expr::value(today))
            .col_expr(participants::Column::UpdatedAt, Expr::value(now))
            .filter(participants::Column::Id.eq(participant_id))
            .filter(not_on_day(participants::Column::SpinDay, today))
            .exec(conn)
            .await?;

        if update_result.rows_affected > 0 {
            log::debug!("Reset daily spins for participant {participant_id} on {today}");
        }
        Ok(())
    }

    async fn current_spins<C: ConnectionTrait>(
        &self,
        conn: &C,
        participant_id: &str,
    ) -> AppResult<i32> {
        let participant = participants::Entity::find_by_id(participant_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::ParticipantNotFound(participant_id.to_string()))?;
        Ok(participant.free_spins_remaining)
    }
}

/// column IS NULL OR column <> day
fn not_on_day(column: participants::Column, day: NaiveDate) -> Condition {
    Condition::any()
        .add(column.is_null())
        .add(column.ne(day))
}
