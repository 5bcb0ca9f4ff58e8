use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖品类别，LOSE 为"未中奖"类别
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrizeKind {
    #[sea_orm(string_value = "FIRST")]
    First,
    #[sea_orm(string_value = "SECOND")]
    Second,
    #[sea_orm(string_value = "THIRD")]
    Third,
    #[sea_orm(string_value = "FOURTH")]
    Fourth,
    #[sea_orm(string_value = "VOUCHER_15")]
    #[serde(rename = "VOUCHER_15")]
    Voucher15,
    #[sea_orm(string_value = "VOUCHER_10")]
    #[serde(rename = "VOUCHER_10")]
    Voucher10,
    #[sea_orm(string_value = "LOSE")]
    Lose,
}

impl PrizeKind {
    pub fn is_win(&self) -> bool {
        !matches!(self, PrizeKind::Lose)
    }
}

impl std::fmt::Display for PrizeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrizeKind::First => write!(f, "FIRST"),
            PrizeKind::Second => write!(f, "SECOND"),
            PrizeKind::Third => write!(f, "THIRD"),
            PrizeKind::Fourth => write!(f, "FOURTH"),
            PrizeKind::Voucher15 => write!(f, "VOUCHER_15"),
            PrizeKind::Voucher10 => write!(f, "VOUCHER_10"),
            PrizeKind::Lose => write!(f, "LOSE"),
        }
    }
}

/// 奖池槽位实体
/// 概念说明:
/// - slot_index: 转盘上的固定位置，播种后不变
/// - weight: 相对权重 (非负)，只在启用且有库存的槽位间归一化
/// - total_stock / remaining_stock: 同时为 NULL 表示无限 (例如"谢谢参与")
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prize_slots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slot_index: i32,
    pub kind: PrizeKind,
    pub title: String,
    /// 总库存 (NULL=无限)
    pub total_stock: Option<i32>,
    /// 剩余库存 (NULL=无限)
    pub remaining_stock: Option<i32>,
    pub weight: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 是否还有库存 (无限库存或剩余 > 0)
    pub fn is_available(&self) -> bool {
        match self.remaining_stock {
            None => true,
            Some(remain) => remain > 0,
        }
    }

    /// 是否参与本次抽奖
    pub fn is_eligible(&self) -> bool {
        self.enabled && self.is_available()
    }

    pub fn is_limited(&self) -> bool {
        self.total_stock.is_some()
    }
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
