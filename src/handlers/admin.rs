use crate::middlewares::AdminKeyMiddleware;
use crate::models::*;
use crate::services::RedemptionService;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/api/claims/{code}",
    tag = "admin",
    params(
        ("code" = String, Path, description = "兑换码（大小写不敏感）")
    ),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "查询成功", body = ClaimDetailResponse),
        (status = 401, description = "后台密钥无效"),
        (status = 404, description = "兑换码不存在")
    )
)]
pub async fn check_claim(
    service: web::Data<RedemptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.check_claim(&path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": detail }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/api/claims/{code}/redeem",
    tag = "admin",
    params(
        ("code" = String, Path, description = "兑换码（大小写不敏感）")
    ),
    request_body = RedeemClaimRequest,
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "核销成功", body = ClaimDetailResponse),
        (status = 401, description = "后台密钥无效"),
        (status = 404, description = "兑换码不存在"),
        (status = 409, description = "兑换码已核销")
    )
)]
pub async fn redeem_claim(
    service: web::Data<RedemptionService>,
    path: web::Path<String>,
    payload: Option<web::Json<RedeemClaimRequest>>,
) -> Result<HttpResponse> {
    let redeemed_by = payload.and_then(|p| p.into_inner().redeemed_by);
    match service.redeem_claim(&path.into_inner(), redeemed_by).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": detail }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/api/players",
    tag = "admin",
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "玩家列表", body = [PlayerRow]),
        (status = 401, description = "后台密钥无效")
    )
)]
pub async fn list_players(service: web::Data<RedemptionService>) -> Result<HttpResponse> {
    match service.list_players().await {
        Ok(rows) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": rows }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/api/export",
    tag = "admin",
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "CSV 导出", body = String, content_type = "text/csv"),
        (status = 401, description = "后台密钥无效")
    )
)]
pub async fn export_players(service: web::Data<RedemptionService>) -> Result<HttpResponse> {
    match service.export_players_csv().await {
        Ok(csv) => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename("players.csv".to_string())],
            })
            .body(csv)),
        Err(e) => Ok(e.error_response()),
    }
}

/// 后台路由，整个 scope 由后台密钥保护
pub fn admin_config(secret: String) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("/admin/api")
                .wrap(AdminKeyMiddleware::new(secret))
                .route("/claims/{code}", web::get().to(check_claim))
                .route("/claims/{code}/redeem", web::post().to(redeem_claim))
                .route("/players", web::get().to(list_players))
                .route("/export", web::get().to(export_players)),
        );
    }
}
