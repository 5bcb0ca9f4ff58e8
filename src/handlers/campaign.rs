use crate::models::*;
use crate::services::CampaignService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/prizes",
    tag = "campaign",
    responses(
        (status = 200, description = "获取奖品列表成功", body = [PrizeSlotResponse])
    )
)]
/// 获取当前启用的奖池槽位（转盘展示）
pub async fn get_prizes(service: web::Data<CampaignService>) -> Result<HttpResponse> {
    match service.list_prizes().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/spin",
    tag = "campaign",
    request_body = ParticipantRequest,
    responses(
        (status = 200, description = "抽奖成功", body = SpinResponse),
        (status = 404, description = "参与者不存在"),
        (status = 409, description = "今日次数已用完"),
        (status = 503, description = "库存竞争，请重试")
    )
)]
/// 进行一次抽奖:
/// 1. 检查并消耗今日次数
/// 2. 按权重选择奖品（过滤无库存奖品）
/// 3. 限量奖品条件扣减库存，失败回滚重试一次
/// 4. 记录待领取奖品并返回结果
pub async fn spin(
    service: web::Data<CampaignService>,
    payload: web::Json<ParticipantRequest>,
) -> Result<HttpResponse> {
    match service.spin(&payload.participant_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/bonus-spin",
    tag = "campaign",
    request_body = ParticipantRequest,
    responses(
        (status = 200, description = "额外次数发放成功", body = BonusSpinResponse),
        (status = 404, description = "参与者不存在"),
        (status = 409, description = "今日已领取过额外次数")
    )
)]
pub async fn bonus_spin(
    service: web::Data<CampaignService>,
    payload: web::Json<ParticipantRequest>,
) -> Result<HttpResponse> {
    match service.grant_bonus_spin(&payload.participant_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/participants/{participant_id}/availability",
    tag = "campaign",
    params(
        ("participant_id" = String, Path, description = "参与者ID")
    ),
    responses(
        (status = 200, description = "查询成功", body = SpinAvailabilityResponse),
        (status = 404, description = "参与者不存在")
    )
)]
/// 今日剩余次数（只读）
pub async fn get_availability(
    service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.peek_spin_availability(&path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/claim",
    tag = "campaign",
    request_body = ParticipantRequest,
    responses(
        (status = 200, description = "领取成功（同一天重复调用返回同一兑换码）", body = ClaimResponse),
        (status = 400, description = "没有待领取奖品或未中奖"),
        (status = 404, description = "参与者不存在")
    )
)]
pub async fn claim(
    service: web::Data<CampaignService>,
    payload: web::Json<ParticipantRequest>,
) -> Result<HttpResponse> {
    match service.claim(&payload.participant_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn campaign_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/prizes", web::get().to(get_prizes))
        .route("/spin", web::post().to(spin))
        .route("/bonus-spin", web::post().to(bonus_spin))
        .route(
            "/participants/{participant_id}/availability",
            web::get().to(get_availability),
        )
        .route("/claim", web::post().to(claim));
}
