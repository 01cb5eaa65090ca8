use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::websocket::connection::{ConnectionId, ConnectionManager};
use nerdle_core::{NerdleSession, Snapshot};
use nerdle_types::{ClientMessage, ScoreValue, ServerMessage, WordSubmissionError};

/// Drives one connection's `NerdleSession` from client messages, feed
/// snapshots and expiring acknowledgements. Every visible change is pushed
/// to the client as a fresh `SessionUpdate`.
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    session: NerdleSession,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        session: NerdleSession,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            session,
        }
    }

    pub fn session(&self) -> &NerdleSession {
        &self.session
    }

    pub async fn handle_message(&mut self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager
            .update_activity(self.connection_id)
            .await;

        match message {
            ClientMessage::SelectTab { tab } => {
                self.session.select_tab(tab);
                self.push_view().await
            }
            ClientMessage::SelectPlayer { name } => {
                self.session.select_player(&name);
                self.push_view().await
            }
            ClientMessage::SelectScore { score } => self.handle_select_score(&score).await,
            ClientMessage::SubmitScore => self.handle_submit_score().await,
            ClientMessage::ToggleWordPanel => {
                self.session.toggle_word_panel();
                self.push_view().await
            }
            ClientMessage::UpdateWordInput { text } => {
                self.session.set_word_input(&text);
                self.push_view().await
            }
            ClientMessage::SubmitWord => self.handle_submit_word().await,
            ClientMessage::Heartbeat => Ok(()),
        }
    }

    pub async fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<(), String> {
        self.session.apply_snapshot(snapshot);
        self.push_view().await
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    pub async fn expire_transients(&mut self, now: Instant) -> Result<(), String> {
        if self.session.expire_transients(now) {
            self.push_view().await
        } else {
            Ok(())
        }
    }

    pub async fn push_view(&self) -> Result<(), String> {
        self.send_message(ServerMessage::SessionUpdate {
            view: self.session.view(),
        })
        .await
    }

    pub async fn push_error(&self, message: String) -> Result<(), String> {
        self.send_message(ServerMessage::Error { message }).await
    }

    async fn handle_select_score(&mut self, raw: &str) -> Result<(), String> {
        match raw.parse::<ScoreValue>() {
            Ok(score) => {
                self.session.select_score(score);
                self.push_view().await
            }
            Err(e) => self.push_error(e.to_string()).await,
        }
    }

    async fn handle_submit_score(&mut self) -> Result<(), String> {
        match self.session.submit_score().await {
            Ok(entry) => {
                info!(
                    "Connection {} submitted {} for {}",
                    self.connection_id, entry.score, entry.player
                );
                self.send_message(ServerMessage::ScoreSubmitted { entry })
                    .await?;
                self.push_view().await
            }
            Err(e) => {
                self.send_message(ServerMessage::SubmissionFailed {
                    message: e.user_notice(),
                })
                .await
            }
        }
    }

    async fn handle_submit_word(&mut self) -> Result<(), String> {
        match self.session.submit_word().await {
            Ok(word) => {
                self.send_message(ServerMessage::WordAccepted { word })
                    .await?;
            }
            Err(WordSubmissionError::Invalid(reason)) => {
                self.send_message(ServerMessage::WordRejected {
                    reason,
                    message: reason.to_string(),
                })
                .await?;
            }
            Err(WordSubmissionError::Submission(e)) => {
                warn!(
                    "Word submission failed for connection {}: {}",
                    self.connection_id, e
                );
            }
        }
        // The inline status lives in the view
        self.push_view().await
    }

    async fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerdle_core::{MemoryStore, NerdleStore, SessionSettings, demo};
    use nerdle_types::{Tab, ValidationError};
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn setup() -> (
        MessageHandler,
        mpsc::UnboundedReceiver<ServerMessage>,
        Arc<MemoryStore>,
    ) {
        let store = Arc::new(MemoryStore::with_demo_data());
        let connection_manager = Arc::new(ConnectionManager::new());
        let connection_id = ConnectionId::new();
        let receiver = connection_manager.create_connection(connection_id).await;

        let settings = SessionSettings {
            ack_delay: Duration::from_millis(50),
            ..SessionSettings::default()
        };
        let mut session = NerdleSession::new(store.clone(), settings, demo::demo_week());
        session.apply_snapshot(Snapshot::Players(store.players().await.unwrap()));
        session.apply_snapshot(Snapshot::UsedWords(store.used_words().await.unwrap()));

        (
            MessageHandler::new(connection_id, connection_manager, session),
            receiver,
            store,
        )
    }

    fn drain(receiver: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_form_messages_push_views() {
        let (mut handler, mut receiver, _store) = setup().await;

        handler
            .handle_message(ClientMessage::SelectTab { tab: Tab::Stats })
            .await
            .unwrap();
        handler
            .handle_message(ClientMessage::SelectPlayer {
                name: "Tom".to_string(),
            })
            .await
            .unwrap();

        let messages = drain(&mut receiver);
        assert_eq!(messages.len(), 2);
        match messages.last().unwrap() {
            ServerMessage::SessionUpdate { view } => {
                assert_eq!(view.active_tab, Tab::Stats);
                assert_eq!(view.selected_player.as_deref(), Some("Tom"));
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_score_reports_error() {
        let (mut handler, mut receiver, _store) = setup().await;

        handler
            .handle_message(ClientMessage::SelectScore {
                score: "7".to_string(),
            })
            .await
            .unwrap();

        let messages = drain(&mut receiver);
        assert!(matches!(messages.as_slice(), [ServerMessage::Error { .. }]));
        assert_eq!(handler.session().selected_score(), None);
    }

    #[tokio::test]
    async fn test_submit_score_flow() {
        let (mut handler, mut receiver, store) = setup().await;

        handler
            .handle_message(ClientMessage::SelectPlayer {
                name: "Tom".to_string(),
            })
            .await
            .unwrap();
        handler
            .handle_message(ClientMessage::SelectScore {
                score: "X".to_string(),
            })
            .await
            .unwrap();
        drain(&mut receiver);

        handler.handle_message(ClientMessage::SubmitScore).await.unwrap();
        let messages = drain(&mut receiver);
        match &messages[0] {
            ServerMessage::ScoreSubmitted { entry } => {
                assert_eq!(entry.player, "Tom");
                assert_eq!(entry.score, ScoreValue::Bust);
            }
            other => panic!("Unexpected message: {:?}", other),
        }
        assert!(matches!(messages[1], ServerMessage::SessionUpdate { .. }));

        // A second submission while the store is down raises an alert
        store.set_available(false);
        handler.handle_message(ClientMessage::SubmitScore).await.unwrap();
        let messages = drain(&mut receiver);
        match messages.as_slice() {
            [ServerMessage::SubmissionFailed { message }] => {
                assert_eq!(message, "Error submitting score. Please try again.");
            }
            other => panic!("Unexpected messages: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_word_rejected_with_reason() {
        let (mut handler, mut receiver, _store) = setup().await;

        handler
            .handle_message(ClientMessage::UpdateWordInput {
                text: "crane".to_string(),
            })
            .await
            .unwrap();
        handler.handle_message(ClientMessage::SubmitWord).await.unwrap();

        let messages = drain(&mut receiver);
        let rejection = messages
            .iter()
            .find_map(|message| match message {
                ServerMessage::WordRejected { reason, message } => Some((*reason, message.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(rejection.0, ValidationError::AlreadyUsed);
        assert_eq!(rejection.1, "This word has already been used!");
    }

    #[tokio::test]
    async fn test_expiry_pushes_view_once() {
        let (mut handler, mut receiver, _store) = setup().await;

        handler
            .handle_message(ClientMessage::UpdateWordInput {
                text: "stare".to_string(),
            })
            .await
            .unwrap();
        handler.handle_message(ClientMessage::SubmitWord).await.unwrap();
        drain(&mut receiver);

        let deadline = handler.next_deadline().unwrap();
        handler.expire_transients(deadline).await.unwrap();
        handler.expire_transients(deadline).await.unwrap();

        let messages = drain(&mut receiver);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            ServerMessage::SessionUpdate { view } => {
                assert!(view.word_status.is_none());
                assert!(!view.show_word_submit);
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }
}
