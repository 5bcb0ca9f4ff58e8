use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 报名请求，按手机号去重
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub sex: Option<String>,
    pub job: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub participant_id: String,
    /// 是否为新报名
    pub created: bool,
}

/// 后台玩家列表行（参与者 left join 兑换码）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerRow {
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub code: Option<String>,
    pub redeemed_at: Option<DateTime<Utc>>,
}
