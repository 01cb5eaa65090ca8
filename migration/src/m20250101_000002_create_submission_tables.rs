use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Scores::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Scores::Player).string().not_null())
                    .col(ColumnDef::new(Scores::Score).string().not_null())
                    .col(ColumnDef::new(Scores::Week).integer().not_null())
                    .col(
                        ColumnDef::new(Scores::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Today's scores are queried by submission time
        manager
            .create_index(
                Index::create()
                    .name("idx_scores_submitted_at")
                    .table(Scores::Table)
                    .col(Scores::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scores_week")
                    .table(Scores::Table)
                    .col(Scores::Week)
                    .to_owned(),
            )
            .await?;

        // Uniqueness of words is checked before insert, not by the schema
        manager
            .create_table(
                Table::create()
                    .table(UsedWords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsedWords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsedWords::Word).string().not_null())
                    .col(ColumnDef::new(UsedWords::Week).integer().not_null())
                    .col(ColumnDef::new(UsedWords::Picker).string().not_null())
                    .col(
                        ColumnDef::new(UsedWords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_used_words_word")
                    .table(UsedWords::Table)
                    .col(UsedWords::Word)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsedWords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Scores::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Scores {
    Table,
    Id,
    Player,
    Score,
    Week,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum UsedWords {
    Table,
    Id,
    Word,
    Week,
    Picker,
    CreatedAt,
}
