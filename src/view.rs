//! Message texts and keyboards for each phase of the game.

use teloxide::types::{KeyboardButton, KeyboardMarkup};
use teloxide::utils::html::escape;

use crate::challenge::{score, ChallengeItem, Configuration, VerificationResult, MAX_DATA_LENGTH};

/// Telegram rejects longer message texts.
pub const MESSAGE_LIMIT: usize = 4096;
/// Longest stretch of an answer echoed back in the results.
pub const MAX_ECHO_CHARS: usize = 100;

pub const NUMBERS_TOGGLE: &str = "Numbers:";
pub const WORDS_TOGGLE: &str = "Words:";
pub const NUMBER_LIMIT: &str = "Number limit:";
pub const DATA_LENGTH: &str = "Data length:";
pub const GENERATE: &str = "Generate";
pub const REGENERATE: &str = "Regenerate";
pub const START_CHALLENGE: &str = "Start challenge";
pub const SKIP: &str = "Skip";
pub const VERIFY: &str = "✅ Verify";
pub const RESTART: &str = "Restart";
pub const RESTART_COMMAND: &str = "/restart";

pub const GREETING_TEXT: &str = "Hi! I'm MemoriX. Pick what you want to memorize, \
press <b>Generate</b>, study the list and then type it back from memory.";

/// Buttons of the configuration board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChoice {
    ToggleNumbers,
    ToggleWords,
    NumberLimit,
    DataLength,
    Generate,
}

pub fn parse_config_choice(text: &str) -> Option<ConfigChoice> {
    if text.starts_with(NUMBERS_TOGGLE) {
        Some(ConfigChoice::ToggleNumbers)
    } else if text.starts_with(WORDS_TOGGLE) {
        Some(ConfigChoice::ToggleWords)
    } else if text.starts_with(NUMBER_LIMIT) {
        Some(ConfigChoice::NumberLimit)
    } else if text.starts_with(DATA_LENGTH) {
        Some(ConfigChoice::DataLength)
    } else if text == GENERATE {
        Some(ConfigChoice::Generate)
    } else {
        None
    }
}

/// Parses `#N text`, which replaces the answer at position N (1-based).
pub fn parse_correction(text: &str) -> Option<(usize, &str)> {
    let rest = text.strip_prefix('#')?;
    let (position, answer) = rest.split_once(' ')?;
    let position = parse_positive(Some(position))?;
    Some((position - 1, answer))
}

/// Parses a strictly positive integer typed by the user.
pub fn parse_positive(text: Option<&str>) -> Option<usize> {
    text?.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

/// Parses a data length the game can handle, `1..=MAX_DATA_LENGTH`.
pub fn parse_data_length(text: Option<&str>) -> Option<usize> {
    parse_positive(text).filter(|n| *n <= MAX_DATA_LENGTH)
}

pub fn data_length_prompt() -> String {
    format!("Send how many items to memorize (1 to {})", MAX_DATA_LENGTH)
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_ECHO_CHARS {
        return text.to_string();
    }
    let mut short: String = text.chars().take(MAX_ECHO_CHARS).collect();
    short.push('…');
    short
}

/// Joins lines into as few messages as possible, each within `MESSAGE_LIMIT`.
fn chunk_lines(lines: Vec<String>) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in lines {
        let line_len = line.chars().count();
        if !current.is_empty() && current_len + 1 + line_len > MESSAGE_LIMIT {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(&line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub fn config_board(config: &Configuration) -> String {
    format!(
        "<b>Settings</b>\nNumbers: {}\nWords: {}\nNumber limit: {}\nData length: {}",
        on_off(config.include_numbers),
        on_off(config.include_words),
        config.number_limit,
        config.data_length
    )
}

pub fn config_keyboard(config: &Configuration) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(format!(
                "{} {}",
                NUMBERS_TOGGLE,
                on_off(config.include_numbers)
            )),
            KeyboardButton::new(format!("{} {}", WORDS_TOGGLE, on_off(config.include_words))),
        ],
        vec![
            KeyboardButton::new(format!("{} {}", NUMBER_LIMIT, config.number_limit)),
            KeyboardButton::new(format!("{} {}", DATA_LENGTH, config.data_length)),
        ],
        vec![KeyboardButton::new(GENERATE)],
    ])
}

/// Items shown in the clear while reviewing, split to fit chat messages.
pub fn review_messages(items: &[ChallengeItem]) -> Vec<String> {
    let mut lines = vec!["Memorize these:".to_string(), String::new()];
    lines.extend(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. <b>{}</b>", i + 1, escape(&item.to_string()))),
    );
    chunk_lines(lines)
}

pub fn review_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(REGENERATE),
        KeyboardButton::new(START_CHALLENGE),
    ]])
}

pub fn answer_prompt(index: usize, len: usize) -> String {
    format!("Input {} of {}:", index + 1, len)
}

pub const ANSWERING_HELP: &str =
    "The list is hidden. Type the items back, one message each. \
Send <code>#N answer</code> to change answer N.";

pub fn all_answered_prompt(len: usize) -> String {
    format!("All {} answers are in. Press <b>{}</b> to check them.", len, VERIFY)
}

pub fn answering_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(SKIP), KeyboardButton::new(VERIFY)]])
}

pub fn results_messages(results: &[VerificationResult]) -> Vec<String> {
    let mut lines = vec!["<b>Verification results</b>".to_string()];
    for result in results {
        let answer = escape(&shorten(&result.answer));
        let line = if result.is_correct {
            format!(
                "{}) <b>User input:</b> {}, Correct: Yes",
                result.index + 1,
                answer
            )
        } else {
            format!(
                "{}) <b>Expected:</b> {}, <b>User input:</b> {}, Correct: No",
                result.index + 1,
                escape(&result.expected.to_string()),
                answer
            )
        };
        lines.push(line);
    }
    lines.push(String::new());
    lines.push(format!("Score: {} of {}", score(results), results.len()));
    chunk_lines(lines)
}

pub fn results_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(RESTART)]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::verifier::verify;

    fn labels(keyboard: &KeyboardMarkup) -> Vec<String> {
        keyboard
            .keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    #[test]
    fn config_buttons_parse_back() {
        let config = Configuration {
            include_numbers: true,
            ..Configuration::default()
        };
        let parsed: Vec<_> = labels(&config_keyboard(&config))
            .iter()
            .map(|l| parse_config_choice(l))
            .collect();
        assert_eq!(
            parsed,
            vec![
                Some(ConfigChoice::ToggleNumbers),
                Some(ConfigChoice::ToggleWords),
                Some(ConfigChoice::NumberLimit),
                Some(ConfigChoice::DataLength),
                Some(ConfigChoice::Generate),
            ]
        );
        assert_eq!(parse_config_choice("hello"), None);
    }

    #[test]
    fn positive_numbers_only() {
        assert_eq!(parse_positive(Some(" 12 ")), Some(12));
        assert_eq!(parse_positive(Some("0")), None);
        assert_eq!(parse_positive(Some("-4")), None);
        assert_eq!(parse_positive(Some("ten")), None);
        assert_eq!(parse_positive(None), None);
    }

    #[test]
    fn corrections_name_a_position() {
        assert_eq!(parse_correction("#2 apple"), Some((1, "apple")));
        assert_eq!(parse_correction("#1 "), Some((0, "")));
        assert_eq!(parse_correction("#0 apple"), None);
        assert_eq!(parse_correction("#x apple"), None);
        assert_eq!(parse_correction("apple"), None);
        assert_eq!(parse_correction("#3"), None);
    }

    #[test]
    fn config_keyboard_shows_current_values() {
        let config = Configuration {
            include_words: true,
            number_limit: 7,
            data_length: 3,
            ..Configuration::default()
        };
        assert_eq!(
            labels(&config_keyboard(&config)),
            vec![
                "Numbers: off",
                "Words: on",
                "Number limit: 7",
                "Data length: 3",
                "Generate"
            ]
        );
    }

    #[test]
    fn review_messages_number_items() {
        let items = vec![ChallengeItem::Number(4), ChallengeItem::Word("apple".into())];
        let messages = review_messages(&items);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Memorize these:\n\n1. <b>4</b>"));
        assert!(messages[0].contains("2. <b>apple</b>"));
    }

    #[test]
    fn results_follow_listing_format() {
        let items = vec![
            ChallengeItem::Number(4),
            ChallengeItem::Number(0),
            ChallengeItem::Number(9),
        ];
        let answers = vec!["4".to_string(), "1".to_string(), "9".to_string()];
        let messages = results_messages(&verify(&items, &answers));
        assert_eq!(messages.len(), 1);
        let text = &messages[0];

        assert!(text.contains("1) <b>User input:</b> 4, Correct: Yes"));
        assert!(text.contains("2) <b>Expected:</b> 0, <b>User input:</b> 1, Correct: No"));
        assert!(text.contains("3) <b>User input:</b> 9, Correct: Yes"));
        assert!(text.ends_with("Score: 2 of 3"));
    }

    #[test]
    fn results_escape_user_input() {
        let items = vec![ChallengeItem::Word("sun".into())];
        let answers = vec!["<b>sun</b>".to_string()];
        let text = results_messages(&verify(&items, &answers)).concat();
        assert!(text.contains("&lt;b&gt;sun&lt;/b&gt;"));
    }

    #[test]
    fn long_answers_are_shortened_in_results() {
        let items = vec![ChallengeItem::Word("sun".into())];
        let answers = vec!["x".repeat(MAX_ECHO_CHARS + 50)];
        let text = results_messages(&verify(&items, &answers)).concat();
        let echoed = format!("{}…", "x".repeat(MAX_ECHO_CHARS));
        assert!(text.contains(&format!("<b>User input:</b> {}, Correct: No", echoed)));
    }

    #[test]
    fn data_length_must_fit_the_game() {
        assert_eq!(parse_data_length(Some("1")), Some(1));
        assert_eq!(
            parse_data_length(Some(&MAX_DATA_LENGTH.to_string())),
            Some(MAX_DATA_LENGTH)
        );
        assert_eq!(parse_data_length(Some(&(MAX_DATA_LENGTH + 1).to_string())), None);
        assert_eq!(parse_data_length(Some("9223372036854775807")), None);
        assert_eq!(parse_data_length(Some("0")), None);
    }

    #[test]
    fn largest_game_fits_telegram_messages() {
        // Worst case: longest loadable words full of characters that grow when
        // escaped, every answer wrong and as long as a chat message allows.
        let word = "&".repeat(crate::challenge::words::MAX_WORD_CHARS);
        let items: Vec<ChallengeItem> = (0..MAX_DATA_LENGTH)
            .map(|i| {
                if i % 2 == 0 {
                    ChallengeItem::Word(word.clone())
                } else {
                    ChallengeItem::Number(u32::MAX)
                }
            })
            .collect();
        let answers = vec!["<".repeat(MESSAGE_LIMIT); MAX_DATA_LENGTH];

        let review = review_messages(&items);
        let results = results_messages(&verify(&items, &answers));

        for message in review.iter().chain(results.iter()) {
            assert!(!message.is_empty());
            assert!(message.chars().count() <= MESSAGE_LIMIT);
        }
        assert!(results.len() > 1);

        // Nothing lost when splitting
        let listed = results
            .iter()
            .flat_map(|m| m.lines())
            .filter(|l| l.contains(") <b>"))
            .count();
        assert_eq!(listed, MAX_DATA_LENGTH);
        let shown = review
            .iter()
            .flat_map(|m| m.lines())
            .filter(|l| l.contains(". <b>"))
            .count();
        assert_eq!(shown, MAX_DATA_LENGTH);
        let score_line = format!("Score: 0 of {}", MAX_DATA_LENGTH);
        assert!(results.last().unwrap().ends_with(&score_line));
    }
}
