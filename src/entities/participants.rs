use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 参与者实体
/// 说明:
/// - free_spins_remaining 只在 spin_day 当天有效，跨日后惰性重置
/// - bonus_day: 最近一次领取额外抽奖次数的参考日
/// - last_claim_date: 最近一次成功领取兑换码的参考日
/// - last_pending_slot_index: 最近一次抽中的槽位 (等待领取)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub sex: String,
    pub job: String,
    pub free_spins_remaining: i32,
    pub spin_day: Option<NaiveDate>,
    pub bonus_day: Option<NaiveDate>,
    pub last_claim_date: Option<NaiveDate>,
    pub last_pending_slot_index: Option<i32>,
    pub last_spin_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::claims::Entity")]
    Claims,
}

impl Related<super::claims::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Claims.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
