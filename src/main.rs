mod challenge;
mod config;
mod view;

use std::sync::Arc;

use challenge::phase::Phase;
use challenge::words::Words;
use challenge::Configuration;
use config::Settings;
use dotenv::dotenv;
use log::{debug, info, warn};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardMarkup, KeyboardRemove, MessageId, ParseMode},
    RequestError,
};
use view::ConfigChoice;

type GameDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    Play {
        phase: Phase,
        /// Messages holding the items while they are on screen
        board: Vec<MessageId>,
    },
    ReceiveNumberLimit {
        config: Configuration,
    },
    ReceiveDataLength {
        config: Configuration,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    info!("Starting MemoriX bot...");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Invalid settings: {}", err);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded {} words, defaults {:?}",
        settings.words.len(),
        settings.defaults
    );

    let bot = Bot::new(settings.token);
    let words = Arc::new(settings.words);
    let defaults = Arc::new(settings.defaults);

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .branch(
            dptree::filter(|msg: Message| msg.text() == Some(view::RESTART_COMMAND))
                .endpoint(restart),
        )
        .branch(dptree::case![State::Start].endpoint(start))
        .branch(dptree::case![State::ReceiveNumberLimit { config }].endpoint(receive_number_limit))
        .branch(dptree::case![State::ReceiveDataLength { config }].endpoint(receive_data_length))
        .branch(dptree::case![State::Play { phase, board }].endpoint(play));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<State>::new(), words, defaults])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Sends `chunks` as consecutive messages, the keyboard on the last one.
async fn send_chunks(
    bot: &Bot,
    chat_id: ChatId,
    chunks: Vec<String>,
    keyboard: KeyboardMarkup,
) -> Result<Vec<MessageId>, RequestError> {
    let last = chunks.len().saturating_sub(1);
    let mut sent = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut request = bot.send_message(chat_id, chunk).parse_mode(ParseMode::Html);
        if i == last {
            request = request.reply_markup(keyboard.clone());
        }
        sent.push(request.await?.id);
    }
    Ok(sent)
}

/// Deletes the messages showing the items.
async fn hide_board(bot: &Bot, chat_id: ChatId, board: Vec<MessageId>) {
    for id in board {
        if let Err(err) = bot.delete_message(chat_id, id).await {
            warn!("Could not hide items in chat {}: {}", chat_id, err);
        }
    }
}

async fn show_config(bot: &Bot, chat_id: ChatId, config: &Configuration) -> HandlerResult {
    bot.send_message(chat_id, view::config_board(config))
        .parse_mode(ParseMode::Html)
        .reply_markup(view::config_keyboard(config))
        .await?;
    Ok(())
}

async fn start(
    bot: Bot,
    dialogue: GameDialogue,
    defaults: Arc<Configuration>,
    msg: Message,
) -> HandlerResult {
    info!("New game in chat {}", msg.chat.id);
    bot.send_message(msg.chat.id, view::GREETING_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;

    let phase = Phase::new(defaults.as_ref().clone());
    show_config(&bot, msg.chat.id, phase.config()).await?;
    dialogue.update(State::Play { phase, board: Vec::new() }).await?;
    Ok(())
}

async fn restart(
    bot: Bot,
    dialogue: GameDialogue,
    defaults: Arc<Configuration>,
    msg: Message,
) -> HandlerResult {
    let phase = match dialogue.get().await? {
        Some(State::Play { phase, .. }) => phase.restart(&defaults),
        _ => Phase::new(defaults.as_ref().clone()),
    };
    info!("Restarting game in chat {}", msg.chat.id);

    show_config(&bot, msg.chat.id, phase.config()).await?;
    dialogue.update(State::Play { phase, board: Vec::new() }).await?;
    Ok(())
}

async fn receive_number_limit(
    bot: Bot,
    dialogue: GameDialogue,
    mut config: Configuration,
    msg: Message,
) -> HandlerResult {
    let limit = view::parse_positive(msg.text()).and_then(|n| u32::try_from(n).ok());
    let Some(limit) = limit else {
        bot.send_message(msg.chat.id, "Please enter a positive whole number")
            .await?;
        return Ok(());
    };

    config.number_limit = limit;
    show_config(&bot, msg.chat.id, &config).await?;
    dialogue
        .update(State::Play {
            phase: Phase::new(config),
            board: Vec::new(),
        })
        .await?;
    Ok(())
}

async fn receive_data_length(
    bot: Bot,
    dialogue: GameDialogue,
    mut config: Configuration,
    msg: Message,
) -> HandlerResult {
    let Some(length) = view::parse_data_length(msg.text()) else {
        bot.send_message(msg.chat.id, view::data_length_prompt())
            .await?;
        return Ok(());
    };

    config.data_length = length;
    show_config(&bot, msg.chat.id, &config).await?;
    dialogue
        .update(State::Play {
            phase: Phase::new(config),
            board: Vec::new(),
        })
        .await?;
    Ok(())
}

async fn play(
    bot: Bot,
    dialogue: GameDialogue,
    words: Arc<Words>,
    defaults: Arc<Configuration>,
    (phase, board): (Phase, Vec<MessageId>),
    msg: Message,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        bot.send_message(chat_id, "Please answer with text").await?;
        return Ok(());
    };
    debug!("Chat {} sent {:?} while {}", chat_id, text, phase.name());

    match phase {
        Phase::Configuring { .. } => {
            configuring(&bot, &dialogue, &words, phase, text, chat_id).await
        }
        Phase::Reviewing { .. } => {
            reviewing(&bot, &dialogue, &words, phase, board, text, chat_id).await
        }
        Phase::Answering { .. } => answering(&bot, &dialogue, phase, text, chat_id).await,
        Phase::Results { .. } => {
            if text == view::RESTART {
                let phase = phase.restart(&defaults);
                show_config(&bot, chat_id, phase.config()).await?;
                dialogue.update(State::Play { phase, board: Vec::new() }).await?;
            } else {
                bot.send_message(chat_id, "Press Restart to play again")
                    .reply_markup(view::results_keyboard())
                    .await?;
            }
            Ok(())
        }
    }
}

async fn configuring(
    bot: &Bot,
    dialogue: &GameDialogue,
    words: &Words,
    phase: Phase,
    text: &str,
    chat_id: ChatId,
) -> HandlerResult {
    let phase = match view::parse_config_choice(text) {
        Some(ConfigChoice::ToggleNumbers) => {
            phase.configure(|c| c.include_numbers = !c.include_numbers)?
        }
        Some(ConfigChoice::ToggleWords) => phase.configure(|c| c.include_words = !c.include_words)?,
        Some(ConfigChoice::NumberLimit) => {
            bot.send_message(chat_id, "Send the number limit (numbers are drawn below it)")
                .reply_markup(KeyboardRemove::new())
                .await?;
            dialogue
                .update(State::ReceiveNumberLimit {
                    config: phase.config().clone(),
                })
                .await?;
            return Ok(());
        }
        Some(ConfigChoice::DataLength) => {
            bot.send_message(chat_id, view::data_length_prompt())
                .reply_markup(KeyboardRemove::new())
                .await?;
            dialogue
                .update(State::ReceiveDataLength {
                    config: phase.config().clone(),
                })
                .await?;
            return Ok(());
        }
        Some(ConfigChoice::Generate) => {
            return generate(bot, dialogue, words, phase, Vec::new(), chat_id).await;
        }
        None => {
            bot.send_message(chat_id, "Please choose one of the options")
                .await?;
            phase
        }
    };

    show_config(bot, chat_id, phase.config()).await?;
    dialogue.update(State::Play { phase, board: Vec::new() }).await?;
    Ok(())
}

async fn generate(
    bot: &Bot,
    dialogue: &GameDialogue,
    words: &Words,
    phase: Phase,
    board: Vec<MessageId>,
    chat_id: ChatId,
) -> HandlerResult {
    let generated = phase.generate(words, &mut rand::thread_rng());
    let next = match generated {
        Ok(next) => next,
        Err(err) => {
            warn!("Generation rejected in chat {}: {}", chat_id, err);
            bot.send_message(chat_id, format!("Can't generate yet: {}", err))
                .await?;
            return Ok(());
        }
    };

    hide_board(bot, chat_id, board).await;
    let messages = view::review_messages(next.items());
    let sent = send_chunks(bot, chat_id, messages, view::review_keyboard()).await?;
    info!(
        "Generated {} items in chat {}",
        next.items().len(),
        chat_id
    );

    dialogue
        .update(State::Play {
            phase: next,
            board: sent,
        })
        .await?;
    Ok(())
}

async fn reviewing(
    bot: &Bot,
    dialogue: &GameDialogue,
    words: &Words,
    phase: Phase,
    board: Vec<MessageId>,
    text: &str,
    chat_id: ChatId,
) -> HandlerResult {
    match text {
        view::REGENERATE => generate(bot, dialogue, words, phase, board, chat_id).await,
        view::START_CHALLENGE => {
            let next = phase.start()?;
            hide_board(bot, chat_id, board).await;
            bot.send_message(chat_id, view::ANSWERING_HELP)
                .parse_mode(ParseMode::Html)
                .reply_markup(view::answering_keyboard())
                .await?;
            bot.send_message(chat_id, view::answer_prompt(0, next.items().len()))
                .await?;
            dialogue.update(State::Play { phase: next, board: Vec::new() }).await?;
            Ok(())
        }
        _ => {
            bot.send_message(chat_id, "Please choose one of the options")
                .reply_markup(view::review_keyboard())
                .await?;
            Ok(())
        }
    }
}

async fn answering(
    bot: &Bot,
    dialogue: &GameDialogue,
    phase: Phase,
    text: &str,
    chat_id: ChatId,
) -> HandlerResult {
    if text == view::VERIFY {
        let next = phase.verify()?;
        let messages = match &next {
            Phase::Results { results, .. } => {
                info!(
                    "Chat {} scored {} of {}",
                    chat_id,
                    challenge::score(results),
                    results.len()
                );
                view::results_messages(results)
            }
            _ => Vec::new(),
        };
        // Results are kept even if sending them fails
        dialogue
            .update(State::Play {
                phase: next,
                board: Vec::new(),
            })
            .await?;
        send_chunks(bot, chat_id, messages, view::results_keyboard()).await?;
        return Ok(());
    }

    if let Some((index, answer)) = view::parse_correction(text) {
        let next = match phase.set_answer(index, answer) {
            Ok(next) => next,
            Err(err) => {
                bot.send_message(chat_id, err.to_string()).await?;
                return Ok(());
            }
        };
        bot.send_message(chat_id, format!("Answer {} updated", index + 1))
            .await?;
        dialogue.update(State::Play { phase: next, board: Vec::new() }).await?;
        return Ok(());
    }

    if phase.all_answered() {
        bot.send_message(chat_id, view::all_answered_prompt(phase.items().len()))
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    let answer = if text == view::SKIP { "" } else { text };
    let next = phase.answer(answer)?;

    let len = next.items().len();
    if next.all_answered() {
        bot.send_message(chat_id, view::all_answered_prompt(len))
            .parse_mode(ParseMode::Html)
            .await?;
    } else if let Phase::Answering { cursor, .. } = &next {
        bot.send_message(chat_id, view::answer_prompt(*cursor, len))
            .await?;
    }

    dialogue.update(State::Play { phase: next, board: Vec::new() }).await?;
    Ok(())
}
