use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{players, prelude::*};
use nerdle_types::Player;

pub struct PlayerRepository {
    db: DatabaseConnection,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: players::Model) -> Player {
        Player {
            id: model.id,
            name: model.name,
        }
    }

    /// Roster in the order players joined.
    pub async fn list_players(&self) -> Result<Vec<Player>> {
        let models = Players::find()
            .order_by_asc(players::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Player>> {
        let model = Players::find()
            .filter(players::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(model.map(Self::model_to_player))
    }

    pub async fn create_player(&self, name: &str) -> Result<Player> {
        let id = Uuid::new_v4().to_string();

        let player_model = players::ActiveModel {
            id: sea_orm::ActiveValue::Set(id.clone()),
            name: sea_orm::ActiveValue::Set(name.to_string()),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };
        Players::insert(player_model).exec(&self.db).await?;

        let created = Players::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created player"))?;

        Ok(Self::model_to_player(created))
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Players::find().count(&self.db).await?)
    }
}
