pub mod generator;
pub mod phase;
pub mod verifier;
pub mod words;

use std::fmt;

use thiserror::Error;

/// Largest list a single game may ask for. Keeps generation bounded and the
/// review and results messages to a handful of chat messages.
pub const MAX_DATA_LENGTH: usize = 200;

/// What the user wants to memorize. Edited only while configuring.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub include_numbers: bool,
    pub include_words: bool,
    /// Numbers are drawn from `0..number_limit`
    pub number_limit: u32,
    pub data_length: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            include_numbers: false,
            include_words: false,
            number_limit: 100,
            data_length: 10,
        }
    }
}

impl Configuration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.include_numbers && !self.include_words {
            return Err(ConfigError::NoCategory);
        }
        if self.data_length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.data_length > MAX_DATA_LENGTH {
            return Err(ConfigError::TooLong {
                max: MAX_DATA_LENGTH,
            });
        }
        if self.include_numbers && self.number_limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("enable numbers, words or both before generating")]
    NoCategory,
    #[error("data length must be at least 1")]
    ZeroLength,
    #[error("data length must be at most {max}")]
    TooLong { max: usize },
    #[error("number limit must be at least 1")]
    ZeroLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("word source returned no candidates")]
    EmptyCandidates,
}

/// One unit of data the user has to memorize.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChallengeItem {
    Number(u32),
    Word(String),
}

// The display form is also the canonical form answers are compared against.
impl fmt::Display for ChallengeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeItem::Number(n) => write!(f, "{}", n),
            ChallengeItem::Word(w) => f.write_str(w),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VerificationResult {
    pub index: usize,
    pub expected: ChallengeItem,
    pub answer: String,
    pub is_correct: bool,
}

/// Number of correct results.
pub fn score(results: &[VerificationResult]) -> usize {
    results.iter().filter(|r| r.is_correct).count()
}
