use crate::entities::{claim_entity as claims, participant_entity as participants};
use crate::error::{AppError, AppResult};
use crate::models::{ClaimDetailResponse, PlayerRow};
use crate::utils::{ReferenceDay, normalize_claim_code};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};

const CSV_HEADER: &str = "Name,Phone,Registered At,Gift Code,Status\n";

/// 后台兑换码核销与玩家导出
#[derive(Clone)]
pub struct RedemptionService {
    pool: DatabaseConnection,
    reference_day: ReferenceDay,
}

impl RedemptionService {
    pub fn new(pool: DatabaseConnection, reference_day: ReferenceDay) -> Self {
        Self {
            pool,
            reference_day,
        }
    }

    /// 查询兑换码（大小写不敏感）
    pub async fn check_claim(&self, code: &str) -> AppResult<ClaimDetailResponse> {
        let code = normalize_claim_code(code);
        let claim = claims::Entity::find_by_id(code.clone())
            .one(&self.pool)
            .await?
            .ok_or(AppError::ClaimNotFound(code))?;
        self.with_participant(claim).await
    }

    /// 核销兑换码，仅能成功一次 (where redeemed_at IS NULL)
    pub async fn redeem_claim(
        &self,
        code: &str,
        redeemed_by: Option<String>,
    ) -> AppResult<ClaimDetailResponse> {
        let code = normalize_claim_code(code);
        let redeemed_by = redeemed_by
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "ADMIN".to_string());

        let update_result = claims::Entity::update_many()
            .col_expr(
                claims::Column::RedeemedAt,
                Expr::value(self.reference_day.now()),
            )
            .col_expr(claims::Column::RedeemedBy, Expr::value(redeemed_by.clone()))
            .filter(claims::Column::Code.eq(code.as_str()))
            .filter(claims::Column::RedeemedAt.is_null())
            .exec(&self.pool)
            .await?;

        let claim = claims::Entity::find_by_id(code.clone())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::ClaimNotFound(code.clone()))?;

        if update_result.rows_affected == 0 {
            return Err(AppError::ClaimAlreadyRedeemed(code));
        }

        log::info!("Claim {} redeemed by {}", claim.code, redeemed_by);
        self.with_participant(claim).await
    }

    /// 玩家列表（参与者 left join 兑换码，按报名时间倒序）
    pub async fn list_players(&self) -> AppResult<Vec<PlayerRow>> {
        let rows = participants::Entity::find()
            .find_with_related(claims::Entity)
            .order_by_desc(participants::Column::CreatedAt)
            .order_by_asc(participants::Column::Id)
            .order_by_asc(claims::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut players = Vec::new();
        for (participant, claim_list) in rows {
            if claim_list.is_empty() {
                players.push(PlayerRow {
                    name: participant.name.clone(),
                    phone: participant.phone.clone(),
                    created_at: participant.created_at,
                    code: None,
                    redeemed_at: None,
                });
                continue;
            }
            for claim in claim_list {
                players.push(PlayerRow {
                    name: participant.name.clone(),
                    phone: participant.phone.clone(),
                    created_at: participant.created_at,
                    code: Some(claim.code),
                    redeemed_at: claim.redeemed_at,
                });
            }
        }
        Ok(players)
    }

    /// 导出 CSV，时间按参考时区显示
    pub async fn export_players_csv(&self) -> AppResult<String> {
        let players = self.list_players().await?;
        let mut csv = String::from(CSV_HEADER);
        for player in &players {
            let status = match (&player.code, player.redeemed_at) {
                (None, _) => "",
                (Some(_), Some(_)) => "REDEEMED",
                (Some(_), None) => "PENDING",
            };
            let line = [
                csv_field(&player.name),
                csv_field(&player.phone),
                csv_field(&self.format_local(player.created_at)),
                csv_field(player.code.as_deref().unwrap_or("")),
                csv_field(status),
            ]
            .join(",");
            csv.push_str(&line);
            csv.push('\n');
        }
        Ok(csv)
    }

    async fn with_participant(&self, claim: claims::Model) -> AppResult<ClaimDetailResponse> {
        let participant = claim
            .find_related(participants::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::ParticipantNotFound(claim.participant_id.clone()))?;
        Ok(ClaimDetailResponse::new(claim, participant))
    }

    fn format_local(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.reference_day.offset())
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PrizeKind;
    use crate::services::test_support::*;

    async fn issued_code(ctx: &TestContext, phone: &str) -> String {
        let id = ctx.register(phone).await;
        ctx.campaign.spin(&id).await.unwrap();
        ctx.campaign.claim(&id).await.unwrap().code
    }

    #[test]
    fn test_csv_field_escapes_quotes() {
        assert_eq!(csv_field("plain"), "\"plain\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn test_check_and_redeem_once() {
        let ctx = TestContext::new(vec![seed_slot(0, PrizeKind::Voucher10, Some(10), 1)]).await;
        let code = issued_code(&ctx, "0914000001").await;

        let detail = ctx
            .redemption
            .check_claim(&code.to_lowercase())
            .await
            .unwrap();
        assert_eq!(detail.code, code);
        assert_eq!(detail.phone, "0914000001");
        assert!(detail.redeemed_at.is_none());

        let redeemed = ctx.redemption.redeem_claim(&code, None).await.unwrap();
        assert!(redeemed.redeemed_at.is_some());
        assert_eq!(redeemed.redeemed_by.as_deref(), Some("ADMIN"));

        let err = ctx
            .redemption
            .redeem_claim(&code, Some("STAFF".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ClaimAlreadyRedeemed(_)));

        // 核销人不会被覆盖
        let detail = ctx.redemption.check_claim(&code).await.unwrap();
        assert_eq!(detail.redeemed_by.as_deref(), Some("ADMIN"));
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let ctx = TestContext::new(default_test_slots()).await;
        assert!(matches!(
            ctx.redemption.check_claim("GIFT-NOPE0000").await.unwrap_err(),
            AppError::ClaimNotFound(_)
        ));
        assert!(matches!(
            ctx.redemption
                .redeem_claim("GIFT-NOPE0000", None)
                .await
                .unwrap_err(),
            AppError::ClaimNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_export_players_csv() {
        let ctx = TestContext::new(vec![seed_slot(0, PrizeKind::Voucher10, Some(10), 1)]).await;
        let code = issued_code(&ctx, "0914000002").await;
        ctx.register("0914000003").await;
        ctx.redemption.redeem_claim(&code, None).await.unwrap();

        let players = ctx.redemption.list_players().await.unwrap();
        assert_eq!(players.len(), 2);

        let csv = ctx.redemption.export_players_csv().await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Name,Phone,Registered At,Gift Code,Status");
        assert_eq!(lines.len(), 3);
        assert!(csv.contains(&format!("\"{code}\",\"REDEEMED\"")));
        assert!(csv.contains("\"0914000003\""));
        assert!(csv.contains("\"\",\"\""));
    }
}
