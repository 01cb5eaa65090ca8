use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{prelude::*, weekly_standings};
use nerdle_types::WeeklyStanding;

/// Weekly aggregates. This service never computes them; whatever produces
/// them publishes a whole week at a time through `replace_week`.
pub struct StandingRepository {
    db: DatabaseConnection,
}

impl StandingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_standing(model: weekly_standings::Model) -> WeeklyStanding {
        WeeklyStanding {
            name: model.name,
            total_score: model.total_score,
            avg: model.avg,
            streak: model.streak,
        }
    }

    /// Standings for a week, lowest total first.
    pub async fn standings_for_week(&self, week: i32) -> Result<Vec<WeeklyStanding>> {
        let models = WeeklyStandings::find()
            .filter(weekly_standings::Column::Week.eq(week))
            .order_by_asc(weekly_standings::Column::TotalScore)
            .order_by_asc(weekly_standings::Column::Name)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_standing).collect())
    }

    pub async fn replace_week(&self, week: i32, standings: Vec<WeeklyStanding>) -> Result<()> {
        let txn = self.db.begin().await?;

        WeeklyStandings::delete_many()
            .filter(weekly_standings::Column::Week.eq(week))
            .exec(&txn)
            .await?;

        if !standings.is_empty() {
            let models = standings.into_iter().map(|standing| weekly_standings::ActiveModel {
                id: sea_orm::ActiveValue::Set(Uuid::new_v4().to_string()),
                week: sea_orm::ActiveValue::Set(week),
                name: sea_orm::ActiveValue::Set(standing.name),
                total_score: sea_orm::ActiveValue::Set(standing.total_score),
                avg: sea_orm::ActiveValue::Set(standing.avg),
                streak: sea_orm::ActiveValue::Set(standing.streak),
            });
            WeeklyStandings::insert_many(models).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
