use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{prelude::*, used_words};
use nerdle_types::UsedWord;

pub struct WordRepository {
    db: DatabaseConnection,
}

impl WordRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_word(model: used_words::Model) -> UsedWord {
        UsedWord {
            word: model.word,
            week: model.week,
            picker: model.picker,
        }
    }

    /// Every used word, most recent week first.
    pub async fn list_used_words(&self) -> Result<Vec<UsedWord>> {
        let models = UsedWords::find()
            .order_by_desc(used_words::Column::Week)
            .order_by_desc(used_words::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_word).collect())
    }

    pub async fn create_used_word(&self, word: UsedWord) -> Result<UsedWord> {
        let id = Uuid::new_v4().to_string();

        let word_model = used_words::ActiveModel {
            id: sea_orm::ActiveValue::Set(id.clone()),
            word: sea_orm::ActiveValue::Set(word.word.to_uppercase()),
            week: sea_orm::ActiveValue::Set(word.week),
            picker: sea_orm::ActiveValue::Set(word.picker),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        UsedWords::insert(word_model).exec(&self.db).await?;

        let created = UsedWords::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created word"))?;

        Ok(Self::model_to_word(created))
    }

    pub async fn is_used(&self, word: &str) -> Result<bool> {
        let count = UsedWords::find()
            .filter(used_words::Column::Word.eq(word.to_uppercase()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> WordRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        WordRepository::new(db)
    }

    fn used_word(word: &str, week: i32, picker: &str) -> UsedWord {
        UsedWord {
            word: word.to_string(),
            week,
            picker: picker.to_string(),
        }
    }

    #[tokio::test]
    async fn test_words_listed_newest_week_first() {
        let repo = setup_test_db().await;

        repo.create_used_word(used_word("AUDIO", 10, "Emma")).await.unwrap();
        repo.create_used_word(used_word("CRANE", 12, "Sarah")).await.unwrap();
        repo.create_used_word(used_word("SLATE", 11, "Mike")).await.unwrap();

        let words = repo.list_used_words().await.unwrap();
        let listed: Vec<_> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(listed, vec!["CRANE", "SLATE", "AUDIO"]);
    }

    #[tokio::test]
    async fn test_is_used_ignores_case() {
        let repo = setup_test_db().await;

        let saved = repo.create_used_word(used_word("crane", 12, "Sarah")).await.unwrap();
        assert_eq!(saved.word, "CRANE");

        assert!(repo.is_used("CRANE").await.unwrap());
        assert!(repo.is_used("crane").await.unwrap());
        assert!(!repo.is_used("STARE").await.unwrap());
    }
}
