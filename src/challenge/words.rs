use rand::seq::SliceRandom;
use rand::Rng;
use std::io::{self, BufRead, BufReader, Read};

use thiserror::Error;

use crate::challenge::ChallengeError;

const EMBEDDED_WORDS: &str = include_str!("words.txt");

/// Longer entries are skipped when loading a word list.
pub const MAX_WORD_CHARS: usize = 32;

/// What a word source hands back: one word, or a few to pick from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordDraw {
    Single(String),
    Candidates(Vec<String>),
}

impl WordDraw {
    /// Collapses the draw into one word, picking uniformly among candidates.
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> Result<String, ChallengeError> {
        match self {
            WordDraw::Single(word) => Ok(word),
            WordDraw::Candidates(mut words) => {
                if words.is_empty() {
                    return Err(ChallengeError::EmptyCandidates);
                }
                let idx = rng.gen_range(0..words.len());
                Ok(words.swap_remove(idx))
            }
        }
    }
}

pub trait WordSource {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> WordDraw;
}

#[derive(Debug, Error)]
pub enum WordsError {
    #[error("failed to read word list: {0}")]
    Io(#[from] io::Error),
    #[error("word list contains no usable words")]
    Empty,
}

/// Dictionary of lowercase single words.
#[derive(Debug, Clone, Default)]
pub struct Words {
    pub words: Vec<String>,
}

impl Words {
    pub fn new<R: Read>(source: R) -> Result<Self, WordsError> {
        let reader = BufReader::new(source);
        let mut words: Vec<String> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            // Phrases can't be typed back as one item
            if word.is_empty() || word.contains(char::is_whitespace) {
                continue;
            }
            if word.chars().count() > MAX_WORD_CHARS {
                continue;
            }
            words.push(word.to_lowercase());
        }

        if words.is_empty() {
            return Err(WordsError::Empty);
        }
        Ok(Self { words })
    }

    pub fn embedded() -> Self {
        // The embedded list is known to be non-empty
        Self::new(EMBEDDED_WORDS.as_bytes()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl WordSource for Words {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> WordDraw {
        match self.words.choose(rng) {
            Some(word) => WordDraw::Single(word.clone()),
            None => WordDraw::Candidates(Vec::new()),
        }
    }
}
