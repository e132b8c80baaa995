//! The game flow as one phase-tagged value.
//!
//! Configuring -> Reviewing -> Answering -> Results, with regeneration looping
//! on Reviewing and restart going back to Configuring. Every transition takes
//! the phase by value and returns the next one.

use std::fmt;

use rand::Rng;
use thiserror::Error;

use crate::challenge::words::WordSource;
use crate::challenge::{
    generator, verifier, ChallengeError, ChallengeItem, Configuration, VerificationResult,
};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Configuring {
        config: Configuration,
    },
    Reviewing {
        config: Configuration,
        items: Vec<ChallengeItem>,
    },
    Answering {
        config: Configuration,
        items: Vec<ChallengeItem>,
        answers: Vec<String>,
        /// Position the next `answer` call fills
        cursor: usize,
    },
    Results {
        config: Configuration,
        results: Vec<VerificationResult>,
    },
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Configuring {
            config: Configuration::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Configure,
    Generate,
    Start,
    Answer,
    Verify,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Configure => "configure",
            Action::Generate => "generate",
            Action::Start => "start",
            Action::Answer => "answer",
            Action::Verify => "verify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: Action, phase: &'static str },
    #[error("answer {} is out of range for {len} items", .index + 1)]
    AnswerOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
}

impl Phase {
    pub fn new(config: Configuration) -> Self {
        Phase::Configuring { config }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Configuring { .. } => "configuring",
            Phase::Reviewing { .. } => "reviewing",
            Phase::Answering { .. } => "answering",
            Phase::Results { .. } => "showing results",
        }
    }

    pub fn config(&self) -> &Configuration {
        match self {
            Phase::Configuring { config }
            | Phase::Reviewing { config, .. }
            | Phase::Answering { config, .. }
            | Phase::Results { config, .. } => config,
        }
    }

    /// Items of the current round; empty when there is none.
    pub fn items(&self) -> &[ChallengeItem] {
        match self {
            Phase::Reviewing { items, .. } | Phase::Answering { items, .. } => items,
            Phase::Configuring { .. } | Phase::Results { .. } => &[],
        }
    }

    fn invalid(&self, action: Action) -> PhaseError {
        PhaseError::InvalidTransition {
            action,
            phase: self.name(),
        }
    }

    /// Applies `edit` to the configuration. Only allowed while configuring.
    pub fn configure<F>(self, edit: F) -> Result<Self, PhaseError>
    where
        F: FnOnce(&mut Configuration),
    {
        match self {
            Phase::Configuring { mut config } => {
                edit(&mut config);
                Ok(Phase::Configuring { config })
            }
            other => Err(other.invalid(Action::Configure)),
        }
    }

    /// Generates a fresh set of items. Valid from Configuring, and from
    /// Reviewing where it replaces the previous items.
    pub fn generate<W, R>(self, words: &W, rng: &mut R) -> Result<Self, PhaseError>
    where
        W: WordSource,
        R: Rng + ?Sized,
    {
        match self {
            Phase::Configuring { config } | Phase::Reviewing { config, .. } => {
                let items = generator::generate(&config, words, rng)?;
                Ok(Phase::Reviewing { config, items })
            }
            other => Err(other.invalid(Action::Generate)),
        }
    }

    pub fn start(self) -> Result<Self, PhaseError> {
        match self {
            Phase::Reviewing { config, items } => {
                let answers = vec![String::new(); items.len()];
                Ok(Phase::Answering {
                    config,
                    items,
                    answers,
                    cursor: 0,
                })
            }
            other => Err(other.invalid(Action::Start)),
        }
    }

    /// Fills the answer at the cursor and moves the cursor forward.
    pub fn answer(self, value: impl Into<String>) -> Result<Self, PhaseError> {
        match self {
            Phase::Answering {
                config,
                items,
                mut answers,
                cursor,
            } => {
                fill(&mut answers, cursor, value.into())?;
                Ok(Phase::Answering {
                    config,
                    items,
                    answers,
                    cursor: cursor + 1,
                })
            }
            other => Err(other.invalid(Action::Answer)),
        }
    }

    /// Overwrites the answer at `index`, leaving the cursor alone.
    pub fn set_answer(self, index: usize, value: impl Into<String>) -> Result<Self, PhaseError> {
        match self {
            Phase::Answering {
                config,
                items,
                mut answers,
                cursor,
            } => {
                fill(&mut answers, index, value.into())?;
                Ok(Phase::Answering {
                    config,
                    items,
                    answers,
                    cursor,
                })
            }
            other => Err(other.invalid(Action::Answer)),
        }
    }

    pub fn verify(self) -> Result<Self, PhaseError> {
        match self {
            Phase::Answering {
                config,
                items,
                answers,
                ..
            } => {
                let results = verifier::verify(&items, &answers);
                Ok(Phase::Results { config, results })
            }
            other => Err(other.invalid(Action::Verify)),
        }
    }

    /// Drops everything derived and goes back to configuring with `defaults`.
    pub fn restart(self, defaults: &Configuration) -> Self {
        Phase::Configuring {
            config: defaults.clone(),
        }
    }

    /// True once every answer slot has been visited.
    pub fn all_answered(&self) -> bool {
        match self {
            Phase::Answering { items, cursor, .. } => *cursor >= items.len(),
            _ => false,
        }
    }
}

fn fill(answers: &mut [String], index: usize, value: String) -> Result<(), PhaseError> {
    let len = answers.len();
    let slot = answers
        .get_mut(index)
        .ok_or(PhaseError::AnswerOutOfRange { index, len })?;
    *slot = value;
    Ok(())
}
