use rand::Rng;

use crate::challenge::words::WordSource;
use crate::challenge::{ChallengeError, ChallengeItem, Configuration};

/// Draws `config.data_length` items. Each position independently flips a
/// coin between a number and a word when both are enabled.
pub fn generate<W, R>(
    config: &Configuration,
    words: &W,
    rng: &mut R,
) -> Result<Vec<ChallengeItem>, ChallengeError>
where
    W: WordSource,
    R: Rng + ?Sized,
{
    config.validate()?;

    let mut items = Vec::with_capacity(config.data_length);
    for _ in 0..config.data_length {
        let number = match (config.include_numbers, config.include_words) {
            (true, true) => rng.gen_bool(0.5),
            (numbers, _) => numbers,
        };

        let item = if number {
            ChallengeItem::Number(rng.gen_range(0..config.number_limit))
        } else {
            ChallengeItem::Word(words.draw(rng).pick(rng)?)
        };
        items.push(item);
    }

    log::debug!("Generated {} items", items.len());
    Ok(items)
}
