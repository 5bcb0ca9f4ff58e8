use crate::entities::participant_entity as participants;
use crate::error::{AppError, AppResult};
use crate::models::{RegisterRequest, RegisterResponse};
use crate::services::campaign_service::{find_participant, is_unique_violation};
use crate::utils::{ReferenceDay, normalize_phone};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[derive(Clone)]
pub struct ParticipantService {
    pool: DatabaseConnection,
    reference_day: ReferenceDay,
    base_daily_spins: i32,
}

impl ParticipantService {
    pub fn new(pool: DatabaseConnection, reference_day: ReferenceDay, base_daily_spins: i32) -> Self {
        Self {
            pool,
            reference_day,
            base_daily_spins,
        }
    }

    /// 报名：按手机号去重，已存在则返回原参与者ID
    pub async fn register_or_touch(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }
        let phone = normalize_phone(&request.phone)?;
        let now = self.reference_day.now();

        if let Some(existing) = self.find_by_phone(&phone).await? {
            participants::Entity::update_many()
                .col_expr(participants::Column::UpdatedAt, Expr::value(now))
                .filter(participants::Column::Id.eq(existing.id.as_str()))
                .exec(&self.pool)
                .await?;
            return Ok(RegisterResponse {
                participant_id: existing.id,
                created: false,
            });
        }

        let inserted = participants::ActiveModel {
            id: Set(Uuid::new_v4().simple().to_string()),
            name: Set(name.to_string()),
            phone: Set(phone.clone()),
            sex: Set(non_empty_or_other(request.sex)),
            job: Set(non_empty_or_other(request.job)),
            free_spins_remaining: Set(self.base_daily_spins),
            spin_day: Set(None),
            bonus_day: Set(None),
            last_claim_date: Set(None),
            last_pending_slot_index: Set(None),
            last_spin_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(participant) => {
                log::info!("Registered participant {}", participant.id);
                Ok(RegisterResponse {
                    participant_id: participant.id,
                    created: true,
                })
            }
            // 同一手机号并发报名
            Err(err) if is_unique_violation(&err) => match self.find_by_phone(&phone).await? {
                Some(existing) => Ok(RegisterResponse {
                    participant_id: existing.id,
                    created: false,
                }),
                None => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_participant(&self, participant_id: &str) -> AppResult<participants::Model> {
        find_participant(&self.pool, participant_id).await
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<participants::Model>> {
        let found = participants::Entity::find()
            .filter(participants::Column::Phone.eq(phone))
            .one(&self.pool)
            .await?;
        Ok(found)
    }
}

fn non_empty_or_other(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "other".to_string())
}
