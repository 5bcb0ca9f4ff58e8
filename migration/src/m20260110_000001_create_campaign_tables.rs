use sea_orm_migration::prelude::*;

/// 参与者 (每日抽奖次数 / 待领取奖品)
#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    Name,
    Phone,
    Sex,
    Job,
    FreeSpinsRemaining,
    SpinDay,
    BonusDay,
    LastClaimDate,
    LastPendingSlotIndex,
    LastSpinAt,
    CreatedAt,
    UpdatedAt,
}

/// 奖池槽位 (权重 + 可选库存)
#[derive(DeriveIden)]
enum PrizeSlots {
    Table,
    SlotIndex,
    Kind,
    Title,
    TotalStock,
    RemainingStock,
    Weight,
    Enabled,
    CreatedAt,
    UpdatedAt,
}

/// 兑换码记录
#[derive(DeriveIden)]
enum Claims {
    Table,
    Code,
    ParticipantId,
    SlotIndex,
    PrizeKind,
    PrizeTitle,
    ClaimDay,
    CreatedAt,
    RedeemedAt,
    RedeemedBy,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 表结构需同时兼容 PostgreSQL 与 SQLite:
/// - 外键在建表时声明 (SQLite 不支持 ALTER TABLE ADD CONSTRAINT)
/// - 时间默认值使用 CURRENT_TIMESTAMP
/// - 奖池数据不在迁移中写入，由启动时根据配置播种
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participants::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Participants::Phone).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Participants::Sex)
                            .string_len(32)
                            .not_null()
                            .default("other"),
                    )
                    .col(
                        ColumnDef::new(Participants::Job)
                            .string_len(64)
                            .not_null()
                            .default("other"),
                    )
                    .col(
                        ColumnDef::new(Participants::FreeSpinsRemaining)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Participants::SpinDay).date().null())
                    .col(ColumnDef::new(Participants::BonusDay).date().null())
                    .col(ColumnDef::new(Participants::LastClaimDate).date().null())
                    .col(
                        ColumnDef::new(Participants::LastPendingSlotIndex)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::LastSpinAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Participants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 手机号去重
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_phone_unique")
                    .table(Participants::Table)
                    .col(Participants::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PrizeSlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrizeSlots::SlotIndex)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PrizeSlots::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(PrizeSlots::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(PrizeSlots::TotalStock)
                            .integer()
                            .null(), // NULL = 无限库存
                    )
                    .col(
                        ColumnDef::new(PrizeSlots::RemainingStock)
                            .integer()
                            .null(), // 与 TotalStock 同时为 NULL
                    )
                    .col(
                        ColumnDef::new(PrizeSlots::Weight)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PrizeSlots::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PrizeSlots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PrizeSlots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Claims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Claims::Code)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Claims::ParticipantId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Claims::SlotIndex).integer().not_null())
                    .col(ColumnDef::new(Claims::PrizeKind).string_len(32).not_null())
                    .col(ColumnDef::new(Claims::PrizeTitle).string_len(255).not_null())
                    .col(ColumnDef::new(Claims::ClaimDay).date().not_null())
                    .col(
                        ColumnDef::new(Claims::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Claims::RedeemedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Claims::RedeemedBy).string_len(64).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claims_participant")
                            .from(Claims::Table, Claims::ParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claims_prize_slot")
                            .from(Claims::Table, Claims::SlotIndex)
                            .to(PrizeSlots::Table, PrizeSlots::SlotIndex),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个参与者每个参考日最多一条兑换码 (并发重复提交时由唯一约束兜底)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_claims_participant_day_unique")
                    .table(Claims::Table)
                    .col(Claims::ParticipantId)
                    .col(Claims::ClaimDay)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：兑换码 -> 奖池 -> 参与者
        manager
            .drop_table(Table::drop().if_exists().table(Claims::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(PrizeSlots::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Participants::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
