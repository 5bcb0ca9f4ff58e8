use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PrizeKind, claim_entity, prize_slot_entity};

/// 以参与者ID发起的请求 (抽奖 / 额外次数 / 领取)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ParticipantRequest {
    pub participant_id: String,
}

/// 奖品基础信息（用于展示转盘）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeSlotResponse {
    pub slot_index: i32,
    pub kind: PrizeKind,
    pub title: String,
    /// 总库存 (None = 无限)
    pub total_stock: Option<i32>,
    /// 剩余库存 (None = 无限)
    pub remaining_stock: Option<i32>,
    pub enabled: bool,
}

impl From<prize_slot_entity::Model> for PrizeSlotResponse {
    fn from(m: prize_slot_entity::Model) -> Self {
        PrizeSlotResponse {
            slot_index: m.slot_index,
            kind: m.kind,
            title: m.title,
            total_stock: m.total_stock,
            remaining_stock: m.remaining_stock,
            enabled: m.enabled,
        }
    }
}

/// 抽奖（Spin）结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinResponse {
    pub prize_kind: PrizeKind,
    pub title: String,
    pub slot_index: i32,
    pub is_win: bool,
    /// 今日剩余抽奖次数
    pub spins_remaining: i32,
}

impl SpinResponse {
    pub fn new(slot: &prize_slot_entity::Model, spins_remaining: i32) -> Self {
        SpinResponse {
            prize_kind: slot.kind,
            title: slot.title.clone(),
            slot_index: slot.slot_index,
            is_win: slot.kind.is_win(),
            spins_remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BonusSpinResponse {
    pub granted: bool,
    pub spins_remaining: i32,
}

/// 抽奖次数状态（只读，不落库）
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct SpinAvailabilityResponse {
    pub spins_remaining: i32,
    pub can_claim_bonus: bool,
}

/// 领取兑换码结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub code: String,
    pub title: String,
    pub prize_kind: PrizeKind,
}

impl From<claim_entity::Model> for ClaimResponse {
    fn from(m: claim_entity::Model) -> Self {
        ClaimResponse {
            code: m.code,
            title: m.prize_title,
            prize_kind: m.prize_kind,
        }
    }
}
