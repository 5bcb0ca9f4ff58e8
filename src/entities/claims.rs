use super::prize_slots::PrizeKind;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 兑换码实体
/// 说明:
/// - code 全局唯一且不可变
/// - prize_kind / prize_title 为发放时的快照 (即使奖池配置后续修改仍可回溯)
/// - (participant_id, claim_day) 唯一，同一参考日重复领取返回同一条记录
/// - redeemed_at / redeemed_by 仅能被核销一次
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub participant_id: String,
    pub slot_index: i32,
    pub prize_kind: PrizeKind,
    pub prize_title: String,
    pub claim_day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemed_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ParticipantId",
        to = "super::participants::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Participant,
    #[sea_orm(
        belongs_to = "super::prize_slots::Entity",
        from = "Column::SlotIndex",
        to = "super::prize_slots::Column::SlotIndex",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    PrizeSlot,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl Related<super::prize_slots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrizeSlot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
