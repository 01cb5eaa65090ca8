use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Players::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
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
                    .table(WeeklyStandings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeeklyStandings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WeeklyStandings::Week).integer().not_null())
                    .col(ColumnDef::new(WeeklyStandings::Name).string().not_null())
                    .col(
                        ColumnDef::new(WeeklyStandings::TotalScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WeeklyStandings::Avg)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(WeeklyStandings::Streak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // One standing per player per week
        manager
            .create_index(
                Index::create()
                    .name("idx_weekly_standings_week_name")
                    .table(WeeklyStandings::Table)
                    .col(WeeklyStandings::Week)
                    .col(WeeklyStandings::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WeeklyStandings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WeeklyStandings {
    Table,
    Id,
    Week,
    Name,
    TotalScore,
    Avg,
    Streak,
}
