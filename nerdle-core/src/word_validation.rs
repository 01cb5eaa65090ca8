use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use nerdle_types::{STARTING_WORD_LENGTH, UsedWord, ValidationError};

static STARTING_WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}$").expect("starting word pattern compiles"));

/// Checks candidate starting words against the words already on record.
pub struct WordValidator {
    used_words: HashSet<String>,
}

impl WordValidator {
    /// Create a validator from the used-word records
    pub fn new(used: &[UsedWord]) -> Self {
        let used_words = used.iter().map(|entry| entry.word.to_uppercase()).collect();
        Self { used_words }
    }

    /// Validate a raw input and return the normalized word.
    ///
    /// Checks run cheapest first and the first failure wins:
    /// length, then letters only, then uniqueness.
    pub fn validate(&self, raw_input: &str) -> Result<String, ValidationError> {
        let word = raw_input.to_uppercase();

        if word.chars().count() != STARTING_WORD_LENGTH {
            return Err(ValidationError::WrongLength);
        }

        if !self.is_alphabetic(&word) {
            return Err(ValidationError::NonAlphabetic);
        }

        if self.is_used(&word) {
            return Err(ValidationError::AlreadyUsed);
        }

        Ok(word)
    }

    /// Check if an already uppercased word is five ASCII letters
    pub fn is_alphabetic(&self, word: &str) -> bool {
        STARTING_WORD_PATTERN.is_match(word)
    }

    pub fn is_used(&self, word: &str) -> bool {
        self.used_words.contains(&word.to_uppercase())
    }
}

pub fn validate_starting_word(raw_input: &str, used: &[UsedWord]) -> Result<String, ValidationError> {
    WordValidator::new(used).validate(raw_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(words: &[&str]) -> Vec<UsedWord> {
        words
            .iter()
            .enumerate()
            .map(|(i, word)| UsedWord {
                word: word.to_string(),
                week: 12 - i as i32,
                picker: "Sarah".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_accepts_fresh_word() {
        let validator = WordValidator::new(&used(&["CRANE", "SLATE", "AUDIO"]));

        assert_eq!(validator.validate("TRAIN").unwrap(), "TRAIN");
        assert_eq!(validator.validate("train").unwrap(), "TRAIN");
        assert_eq!(validator.validate("TrAiN").unwrap(), "TRAIN");
    }

    #[test]
    fn test_wrong_length() {
        let validator = WordValidator::new(&used(&["CRANE"]));

        assert_eq!(validator.validate(""), Err(ValidationError::WrongLength));
        assert_eq!(validator.validate("CRAN"), Err(ValidationError::WrongLength));
        assert_eq!(validator.validate("CRANES"), Err(ValidationError::WrongLength));
        // Character content is irrelevant once the length is off
        assert_eq!(validator.validate("12"), Err(ValidationError::WrongLength));
        assert_eq!(validator.validate("!!!!!!"), Err(ValidationError::WrongLength));
        assert_eq!(validator.validate(" CRANE"), Err(ValidationError::WrongLength));
    }

    #[test]
    fn test_non_alphabetic() {
        let validator = WordValidator::new(&used(&["CRANE"]));

        assert_eq!(validator.validate("CR4NE"), Err(ValidationError::NonAlphabetic));
        assert_eq!(validator.validate("12345"), Err(ValidationError::NonAlphabetic));
        assert_eq!(validator.validate("CRA E"), Err(ValidationError::NonAlphabetic));
        assert_eq!(validator.validate("CRA-E"), Err(ValidationError::NonAlphabetic));
        assert_eq!(validator.validate("crän!"), Err(ValidationError::NonAlphabetic));
        // Accented letters are not in the A-Z class
        assert_eq!(validator.validate("CAFÉS"), Err(ValidationError::NonAlphabetic));
    }

    #[test]
    fn test_already_used_any_case() {
        let validator = WordValidator::new(&used(&["CRANE", "SLATE"]));

        assert_eq!(validator.validate("CRANE"), Err(ValidationError::AlreadyUsed));
        assert_eq!(validator.validate("crane"), Err(ValidationError::AlreadyUsed));
        assert_eq!(validator.validate("sLaTe"), Err(ValidationError::AlreadyUsed));
    }

    #[test]
    fn test_stored_lowercase_still_counts_as_used() {
        let validator = WordValidator::new(&used(&["audio"]));
        assert_eq!(validator.validate("AUDIO"), Err(ValidationError::AlreadyUsed));
    }

    #[test]
    fn test_check_order() {
        let validator = WordValidator::new(&used(&["CRANE"]));

        // Length is checked before letters
        assert_eq!(validator.validate("CRANE1"), Err(ValidationError::WrongLength));
        // Letters are checked before uniqueness
        assert_eq!(validator.validate("CR@NE"), Err(ValidationError::NonAlphabetic));
    }

    #[test]
    fn test_empty_history() {
        let validator = WordValidator::new(&[]);
        assert!(validator.validate("CRANE").is_ok());
    }

    #[test]
    fn test_free_function() {
        let history = used(&["CRANE"]);
        assert_eq!(validate_starting_word("stare", &history).unwrap(), "STARE");
        assert_eq!(
            validate_starting_word("Crane", &history),
            Err(ValidationError::AlreadyUsed)
        );
    }
}
