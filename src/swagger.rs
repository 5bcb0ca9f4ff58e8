use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::PrizeKind;
use crate::handlers;
use crate::middlewares::ADMIN_KEY_HEADER;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_KEY_HEADER))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::participant::register,
        handlers::campaign::get_prizes,
        handlers::campaign::spin,
        handlers::campaign::bonus_spin,
        handlers::campaign::get_availability,
        handlers::campaign::claim,
        handlers::admin::check_claim,
        handlers::admin::redeem_claim,
        handlers::admin::list_players,
        handlers::admin::export_players,
    ),
    components(
        schemas(
            PrizeKind,
            ParticipantRequest,
            PrizeSlotResponse,
            SpinResponse,
            BonusSpinResponse,
            SpinAvailabilityResponse,
            ClaimResponse,
            RegisterRequest,
            RegisterResponse,
            PlayerRow,
            ClaimDetailResponse,
            RedeemClaimRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "participant", description = "报名"),
        (name = "campaign", description = "抽奖与领奖"),
        (name = "admin", description = "后台核销与导出"),
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
