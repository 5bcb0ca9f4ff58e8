use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PrizeKind, claim_entity, participant_entity};

/// 后台查询兑换码详情
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaimDetailResponse {
    pub code: String,
    pub participant_id: String,
    pub name: String,
    pub phone: String,
    pub slot_index: i32,
    pub prize_kind: PrizeKind,
    pub prize_title: String,
    pub claim_day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemed_by: Option<String>,
}

impl ClaimDetailResponse {
    pub fn new(claim: claim_entity::Model, participant: participant_entity::Model) -> Self {
        ClaimDetailResponse {
            code: claim.code,
            participant_id: claim.participant_id,
            name: participant.name,
            phone: participant.phone,
            slot_index: claim.slot_index,
            prize_kind: claim.prize_kind,
            prize_title: claim.prize_title,
            claim_day: claim.claim_day,
            created_at: claim.created_at,
            redeemed_at: claim.redeemed_at,
            redeemed_by: claim.redeemed_by,
        }
    }
}

/// 核销请求，redeemed_by 缺省为 ADMIN
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RedeemClaimRequest {
    pub redeemed_by: Option<String>,
}
