use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ScoreEntry, SessionView, Tab, UsedWord, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    SelectTab { tab: Tab },
    SelectPlayer { name: String },
    SelectScore { score: String }, // "1".."6" or "X"
    SubmitScore,
    ToggleWordPanel,
    UpdateWordInput { text: String },
    SubmitWord,
    Heartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    SessionUpdate { view: SessionView },
    ScoreSubmitted { entry: ScoreEntry },
    SubmissionFailed { message: String },
    WordAccepted { word: UsedWord },
    WordRejected { reason: ValidationError, message: String },
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_json() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"SelectScore":{"score":"X"}}"#).unwrap();
        assert!(matches!(message, ClientMessage::SelectScore { score } if score == "X"));

        let message: ClientMessage = serde_json::from_str(r#""SubmitScore""#).unwrap();
        assert!(matches!(message, ClientMessage::SubmitScore));

        let message: ClientMessage =
            serde_json::from_str(r#"{"SelectTab":{"tab":"Leaderboard"}}"#).unwrap();
        assert!(matches!(message, ClientMessage::SelectTab { tab: Tab::Leaderboard }));
    }

    #[test]
    fn test_word_rejected_json() {
        let message = ServerMessage::WordRejected {
            reason: ValidationError::AlreadyUsed,
            message: ValidationError::AlreadyUsed.to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["WordRejected"]["reason"], "AlreadyUsed");
    }
}
