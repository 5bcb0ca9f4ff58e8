use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("No pending prize to claim")]
    NoPendingPrize,

    #[error("The pending prize is not a win")]
    NotAWin,

    #[error("No spins remaining today")]
    QuotaExhausted,

    #[error("Bonus spin already granted today")]
    BonusAlreadyGranted,

    /// 限量奖品的条件扣减未命中任何行，由协调器重试
    #[error("Stock race on prize slot {slot_index}")]
    StockRace { slot_index: i32 },

    #[error("Prize allocation kept racing, please retry")]
    AllocationRace,

    #[error("No eligible prizes configured")]
    NoEligiblePrizes,

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Claim already redeemed: {0}")]
    ClaimAlreadyRedeemed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 对外暴露的错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ParticipantNotFound(_) => "PARTICIPANT_NOT_FOUND",
            AppError::NoPendingPrize => "NO_PENDING_PRIZE",
            AppError::NotAWin => "NOT_A_WIN",
            AppError::QuotaExhausted => "QUOTA_EXHAUSTED",
            AppError::BonusAlreadyGranted => "BONUS_ALREADY_GRANTED",
            AppError::StockRace { .. } => "STOCK_RACE",
            AppError::AllocationRace => "ALLOCATION_RACE",
            AppError::NoEligiblePrizes => "NO_ELIGIBLE_PRIZES",
            AppError::ClaimNotFound(_) => "CLAIM_NOT_FOUND",
            AppError::ClaimAlreadyRedeemed(_) => "CLAIM_ALREADY_REDEEMED",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::ConfigError(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ParticipantNotFound(_) | AppError::ClaimNotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoPendingPrize | AppError::NotAWin | AppError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::QuotaExhausted
            | AppError::BonusAlreadyGranted
            | AppError::ClaimAlreadyRedeemed(_) => StatusCode::CONFLICT,
            AppError::StockRace { .. } | AppError::AllocationRace => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::NoEligiblePrizes
            | AppError::ConfigError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            AppError::NoEligiblePrizes => {
                log::error!("CRITICAL: no eligible prizes, the campaign cannot allocate");
                self.to_string()
            }
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
            AppError::StockRace { .. } | AppError::AllocationRace => {
                log::warn!("Contention error: {self}");
                self.to_string()
            }
            AppError::Unauthorized => {
                log::warn!("Unauthorized admin access");
                self.to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_conflicts() {
        assert_eq!(AppError::QuotaExhausted.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::BonusAlreadyGranted.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_input_errors() {
        assert_eq!(
            AppError::ParticipantNotFound("abc".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::NotAWin.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoPendingPrize.error_code(), "NO_PENDING_PRIZE");
    }

    #[test]
    fn test_contention_is_retryable_status() {
        assert_eq!(
            AppError::AllocationRace.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::StockRace { slot_index: 3 }.to_string(),
            "Stock race on prize slot 3"
        );
    }
}
