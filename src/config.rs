use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::challenge::words::{Words, WordsError};
use crate::challenge::{Configuration, MAX_DATA_LENGTH};

pub const TOKEN_VAR: &str = "TELOXIDE_TOKEN";
pub const WORDS_FILE_VAR: &str = "MEMORIX_WORDS_FILE";
pub const DATA_LENGTH_VAR: &str = "MEMORIX_DATA_LENGTH";
pub const NUMBER_LIMIT_VAR: &str = "MEMORIX_NUMBER_LIMIT";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("TELOXIDE_TOKEN is not set")]
    MissingToken,
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("MEMORIX_DATA_LENGTH must be between 1 and {max}, got {value}")]
    DataLengthOutOfRange { value: usize, max: usize },
    #[error("failed to load words from {path:?}: {source}")]
    Words {
        path: PathBuf,
        #[source]
        source: WordsError,
    },
}

pub struct Settings {
    pub token: String,
    pub words: Words,
    /// Configuration every new or restarted game starts from
    pub defaults: Configuration,
}

// Keeps the token out of logs
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"***")
            .field("words", &self.words.len())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or(SettingsError::MissingToken)?;

        let words = match lookup(WORDS_FILE_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                log::info!("Loading words from {:?}", path);
                File::open(&path)
                    .map_err(WordsError::from)
                    .and_then(Words::new)
                    .map_err(|source| SettingsError::Words { path, source })?
            }
            None => Words::embedded(),
        };

        let mut defaults = Configuration::default();
        if let Some(length) = parse_var(&lookup, DATA_LENGTH_VAR)? {
            if length == 0 || length > MAX_DATA_LENGTH {
                return Err(SettingsError::DataLengthOutOfRange {
                    value: length,
                    max: MAX_DATA_LENGTH,
                });
            }
            defaults.data_length = length;
        }
        if let Some(limit) = parse_var(&lookup, NUMBER_LIMIT_VAR)? {
            defaults.number_limit = limit;
        }

        Ok(Self {
            token,
            words,
            defaults,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidNumber { var, value }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingToken));

        let err = Settings::from_lookup(lookup(&[(TOKEN_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingToken));
    }

    #[test]
    fn defaults_without_overrides() {
        let settings = Settings::from_lookup(lookup(&[(TOKEN_VAR, "123:abc")])).unwrap();
        assert_eq!(settings.token, "123:abc");
        assert_eq!(settings.defaults, Configuration::default());
        assert!(settings.words.len() > 0);
    }

    #[test]
    fn numeric_overrides_apply() {
        let settings = Settings::from_lookup(lookup(&[
            (TOKEN_VAR, "t"),
            (DATA_LENGTH_VAR, "5"),
            (NUMBER_LIMIT_VAR, " 1000 "),
        ]))
        .unwrap();
        assert_eq!(settings.defaults.data_length, 5);
        assert_eq!(settings.defaults.number_limit, 1000);
    }

    #[test]
    fn bad_number_is_reported() {
        let err = Settings::from_lookup(lookup(&[(TOKEN_VAR, "t"), (NUMBER_LIMIT_VAR, "-3")]))
            .unwrap_err();
        match err {
            SettingsError::InvalidNumber { var, value } => {
                assert_eq!(var, NUMBER_LIMIT_VAR);
                assert_eq!(value, "-3");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn data_length_outside_bounds_is_rejected() {
        let oversized = (MAX_DATA_LENGTH + 1).to_string();
        for value in ["0", oversized.as_str(), "9223372036854775807"] {
            let err = Settings::from_lookup(lookup(&[(TOKEN_VAR, "t"), (DATA_LENGTH_VAR, value)]))
                .unwrap_err();
            match err {
                SettingsError::DataLengthOutOfRange { value: got, max } => {
                    assert_eq!(got.to_string(), value);
                    assert_eq!(max, MAX_DATA_LENGTH);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn missing_words_file_is_reported() {
        let err = Settings::from_lookup(lookup(&[
            (TOKEN_VAR, "t"),
            (WORDS_FILE_VAR, "/definitely/not/here/words.txt"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Words {
                source: WordsError::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn debug_masks_token() {
        let settings = Settings::from_lookup(lookup(&[(TOKEN_VAR, "secret-token")])).unwrap();
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("secret-token"));
    }
}
