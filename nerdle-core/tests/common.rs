#![allow(dead_code)]

use nerdle_core::{MemoryStore, NerdleSession, NerdleStore, SessionSettings, Snapshot, demo};
use nerdle_types::{CurrentWeekState, Player, UsedWord};
use std::sync::Arc;
use std::time::Duration;

/// Creates a roster player with a predictable id
pub fn create_test_player(name: &str) -> Player {
    Player::new(format!("test-player-{}", name.to_lowercase()), name)
}

pub fn create_roster(names: &[&str]) -> Vec<Player> {
    names.iter().map(|name| create_test_player(name)).collect()
}

pub fn create_used_word(word: &str, week: i32, picker: &str) -> UsedWord {
    UsedWord {
        word: word.to_string(),
        week,
        picker: picker.to_string(),
    }
}

pub fn test_week() -> CurrentWeekState {
    demo::demo_week()
}

/// Settings with a short acknowledgement so expiry tests stay quick
pub fn test_settings() -> SessionSettings {
    SessionSettings {
        ack_delay: Duration::from_millis(50),
        ..SessionSettings::default()
    }
}

/// A store with a roster, the demo word history and no scores yet today
pub async fn create_test_store(names: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new(test_week()));
    store.set_players(create_roster(names)).await;
    for word in demo::demo_used_words() {
        store.append_word(word).await.unwrap();
    }
    store
}

/// A session whose mirror is loaded straight from the store, without
/// running live feeds
pub async fn create_loaded_session(store: Arc<MemoryStore>) -> NerdleSession {
    let week = store.current_week().await.unwrap();
    let players = store.players().await.unwrap();
    let words = store.used_words().await.unwrap();

    let mut session = NerdleSession::new(store, test_settings(), week);
    session.apply_snapshot(Snapshot::Players(players));
    session.apply_snapshot(Snapshot::UsedWords(words));
    session
}
