use crate::models::*;
use crate::services::ParticipantService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/register",
    tag = "participant",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "报名成功（手机号已存在则返回原参与者）", body = RegisterResponse),
        (status = 400, description = "姓名或手机号无效")
    )
)]
pub async fn register(
    service: web::Data<ParticipantService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match service.register_or_touch(payload.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn participant_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register));
}
