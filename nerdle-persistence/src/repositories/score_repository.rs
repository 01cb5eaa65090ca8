use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{prelude::*, scores};
use nerdle_core::NewScoreEntry;
use nerdle_types::{ScoreEntry, ScoreValue};

pub struct ScoreRepository {
    db: DatabaseConnection,
}

impl ScoreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_entry(model: scores::Model) -> Result<ScoreEntry> {
        let score = model
            .score
            .parse::<ScoreValue>()
            .with_context(|| format!("Corrupt score row {}", model.id))?;

        Ok(ScoreEntry {
            id: model.id,
            player: model.player,
            score,
            week: model.week,
            submitted_at: model.submitted_at.to_rfc3339(),
        })
    }

    pub async fn create_score(&self, entry: NewScoreEntry) -> Result<ScoreEntry> {
        let id = Uuid::new_v4().to_string();

        let score_model = scores::ActiveModel {
            id: sea_orm::ActiveValue::Set(id.clone()),
            player: sea_orm::ActiveValue::Set(entry.player),
            score: sea_orm::ActiveValue::Set(entry.score.to_string()),
            week: sea_orm::ActiveValue::Set(entry.week),
            submitted_at: sea_orm::ActiveValue::Set(entry.submitted_at.into()),
        };
        Scores::insert(score_model).exec(&self.db).await?;

        let created = Scores::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created score"))?;

        Self::model_to_entry(created)
    }

    /// Scores submitted at or after `since`, oldest first.
    pub async fn scores_since(&self, since: DateTime<Utc>) -> Result<Vec<ScoreEntry>> {
        let since: chrono::DateTime<chrono::FixedOffset> = since.into();
        let models = Scores::find()
            .filter(scores::Column::SubmittedAt.gte(since))
            .order_by_asc(scores::Column::SubmittedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_entry).collect()
    }
}
