use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::errors::InvalidScore;

pub const BUST_MARKER: &str = "X";

/// A daily result: solved in one to six guesses, or bust.
///
/// Serialized as a JSON number for solved results and as the string `"X"`
/// for a bust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreValue {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Bust,
}

impl ScoreValue {
    pub const ALL: [ScoreValue; 7] = [
        ScoreValue::One,
        ScoreValue::Two,
        ScoreValue::Three,
        ScoreValue::Four,
        ScoreValue::Five,
        ScoreValue::Six,
        ScoreValue::Bust,
    ];

    pub fn from_guesses(guesses: u8) -> Option<Self> {
        match guesses {
            1 => Some(ScoreValue::One),
            2 => Some(ScoreValue::Two),
            3 => Some(ScoreValue::Three),
            4 => Some(ScoreValue::Four),
            5 => Some(ScoreValue::Five),
            6 => Some(ScoreValue::Six),
            _ => None,
        }
    }

    /// Number of guesses used, `None` for a bust.
    pub fn guesses(&self) -> Option<u8> {
        match self {
            ScoreValue::One => Some(1),
            ScoreValue::Two => Some(2),
            ScoreValue::Three => Some(3),
            ScoreValue::Four => Some(4),
            ScoreValue::Five => Some(5),
            ScoreValue::Six => Some(6),
            ScoreValue::Bust => None,
        }
    }

    pub fn is_bust(&self) -> bool {
        matches!(self, ScoreValue::Bust)
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.guesses() {
            Some(guesses) => write!(f, "{}", guesses),
            None => f.write_str(BUST_MARKER),
        }
    }
}

impl FromStr for ScoreValue {
    type Err = InvalidScore;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(BUST_MARKER) {
            return Ok(ScoreValue::Bust);
        }

        trimmed
            .parse::<u8>()
            .ok()
            .and_then(ScoreValue::from_guesses)
            .ok_or_else(|| InvalidScore {
                raw: raw.to_string(),
            })
    }
}

impl TryFrom<u8> for ScoreValue {
    type Error = InvalidScore;

    fn try_from(guesses: u8) -> Result<Self, Self::Error> {
        ScoreValue::from_guesses(guesses).ok_or_else(|| InvalidScore {
            raw: guesses.to_string(),
        })
    }
}

impl Serialize for ScoreValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.guesses() {
            Some(guesses) => serializer.serialize_u8(guesses),
            None => serializer.serialize_str(BUST_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for ScoreValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawScore {
            Number(i64),
            Text(String),
        }

        match RawScore::deserialize(deserializer)? {
            RawScore::Number(number) => u8::try_from(number)
                .ok()
                .and_then(ScoreValue::from_guesses)
                .ok_or_else(|| de::Error::custom(format!("invalid score: {}", number))),
            RawScore::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreEntry {
    pub id: String,
    pub player: String, // player name, not id
    #[ts(type = "number | string")]
    pub score: ScoreValue,
    pub week: i32,
    pub submitted_at: String, // RFC 3339
}

/// Display classification of a score tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ColorTag {
    Green,   // 1-2 guesses
    Yellow,  // 3-4 guesses
    Orange,  // 5-6 guesses
    Gray,    // bust
    Neutral, // anything unrecognised
}

impl ColorTag {
    pub fn css_class(&self) -> &'static str {
        match self {
            ColorTag::Green => "bg-green-500",
            ColorTag::Yellow => "bg-yellow-500",
            ColorTag::Orange => "bg-orange-500",
            ColorTag::Gray => "bg-gray-500",
            ColorTag::Neutral => "bg-gray-400",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scores() {
        assert_eq!("1".parse::<ScoreValue>().unwrap(), ScoreValue::One);
        assert_eq!("6".parse::<ScoreValue>().unwrap(), ScoreValue::Six);
        assert_eq!("X".parse::<ScoreValue>().unwrap(), ScoreValue::Bust);
        assert_eq!("x".parse::<ScoreValue>().unwrap(), ScoreValue::Bust);
        assert_eq!(" 3 ".parse::<ScoreValue>().unwrap(), ScoreValue::Three);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!("0".parse::<ScoreValue>().is_err());
        assert!("7".parse::<ScoreValue>().is_err());
        assert!("Y".parse::<ScoreValue>().is_err());
        assert!("".parse::<ScoreValue>().is_err());
        assert!("-1".parse::<ScoreValue>().is_err());

        let err = "Y".parse::<ScoreValue>().unwrap_err();
        assert_eq!(err.raw, "Y");
    }

    #[test]
    fn test_display_matches_parse() {
        for score in ScoreValue::ALL {
            let text = score.to_string();
            assert_eq!(text.parse::<ScoreValue>().unwrap(), score);
        }
        assert_eq!(ScoreValue::Bust.to_string(), "X");
        assert_eq!(ScoreValue::Four.to_string(), "4");
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(serde_json::to_string(&ScoreValue::Two).unwrap(), "2");
        assert_eq!(serde_json::to_string(&ScoreValue::Bust).unwrap(), "\"X\"");

        assert_eq!(
            serde_json::from_str::<ScoreValue>("5").unwrap(),
            ScoreValue::Five
        );
        assert_eq!(
            serde_json::from_str::<ScoreValue>("\"X\"").unwrap(),
            ScoreValue::Bust
        );
        assert!(serde_json::from_str::<ScoreValue>("0").is_err());
        assert!(serde_json::from_str::<ScoreValue>("9").is_err());
        assert!(serde_json::from_str::<ScoreValue>("\"Y\"").is_err());
        assert!(serde_json::from_str::<ScoreValue>("null").is_err());
    }

    #[test]
    fn test_score_entry_json() {
        let entry = ScoreEntry {
            id: "abc".to_string(),
            player: "Emma".to_string(),
            score: ScoreValue::Bust,
            week: 12,
            submitted_at: "2025-03-14T08:32:00+00:00".to_string(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["score"], "X");
        assert_eq!(json["player"], "Emma");

        let back: ScoreEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_guesses() {
        assert_eq!(ScoreValue::Three.guesses(), Some(3));
        assert_eq!(ScoreValue::Bust.guesses(), None);
        assert!(ScoreValue::Bust.is_bust());
        assert!(!ScoreValue::One.is_bust());
        assert!(ScoreValue::try_from(7u8).is_err());
        assert_eq!(ScoreValue::try_from(1u8).unwrap(), ScoreValue::One);
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(ColorTag::Green.css_class(), "bg-green-500");
        assert_eq!(ColorTag::Gray.css_class(), "bg-gray-500");
        assert_eq!(ColorTag::Neutral.css_class(), "bg-gray-400");
    }
}
