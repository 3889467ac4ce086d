use std::sync::Arc;

use autopsy_form_bot::config::Config;
use autopsy_form_bot::form::{
    client::PredictionClient,
    render,
    sessions::{Generation, Sessions},
    AnswerRecord, Field, HealthForm, PredictionRequest, SubmissionState, SubmitRejected,
};
use dotenv::dotenv;
use log::{debug, error, info, warn};
use teloxide::{
    dispatching::dialogue::{ErasedStorage, InMemStorage, Storage},
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode, ReplyMarkup},
};

type FormDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    Filling {
        field: Field,
    },
    Review,
}

type FormStorage = std::sync::Arc<ErasedStorage<State>>;

const START_COMMAND: &str = "/start";
const RESET_COMMAND: &str = "/reset";

#[tokio::main]
async fn main() {
    let dotenv_result = dotenv();

    pretty_env_logger::init();
    if let Err(e) = dotenv_result {
        warn!("No .env file loaded ({}), using the process environment", e);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let bot = Bot::from_env();
    let storage: FormStorage = InMemStorage::<State>::new().erase();
    let sessions = Arc::new(Sessions::new());
    let client = PredictionClient::new(config.predict_url);

    info!("Starting health form bot, predictions go to {}", client.endpoint());

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(
                dptree::filter(|msg: Message| {
                    matches!(msg.text().map(str::trim), Some(START_COMMAND) | Some(RESET_COMMAND))
                })
                .endpoint(start),
            )
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Filling { field }].endpoint(receive_answer))
            .branch(dptree::case![State::Review].endpoint(review)),
    )
    .dependencies(dptree::deps![storage, sessions, client])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "I will ask a few questions about the deceased and send the answers to the prediction service. Send /reset at any time to start over.";
async fn start(bot: Bot, dialogue: FormDialogue, sessions: Arc<Sessions>, msg: Message) -> HandlerResult {
    let chat = msg.chat.id;
    if sessions.with(chat, |form| form.submission.is_loading()).await {
        info!("Chat {} started over, its pending prediction will be discarded", chat);
    }
    sessions.open(chat).await;
    debug!("Chat {} opened a new form", chat);

    bot.send_message(chat, format!("<b>{}</b>\n\n{}", render::TITLE, GREETING_TEXT))
        .parse_mode(ParseMode::Html)
        .await?;

    ask(&bot, chat, &AnswerRecord::new(), Field::Age).await?;
    dialogue.update(State::Filling { field: Field::Age }).await?;
    Ok(())
}

async fn receive_answer(
    bot: Bot,
    dialogue: FormDialogue,
    field: Field,
    sessions: Arc<Sessions>,
    msg: Message,
) -> HandlerResult {
    let chat = msg.chat.id;

    let value = match msg.text().and_then(|text| parse_answer(field, text)) {
        Some(value) => value,
        None => {
            let hint = match field {
                Field::Age => "Please enter the age as a whole number from 0 to 120",
                _ => "Please choose one of the options",
            };
            bot.send_message(chat, hint).reply_markup(question_keyboard(field)).await?;
            return Ok(());
        }
    };

    let (answers, next) = sessions
        .with(chat, |form| {
            form.answers.update_field(field, value);
            (form.answers.clone(), form.answers.next_empty())
        })
        .await;
    debug!("Chat {} answered {}", chat, field);

    match next {
        Some(next) => {
            ask(&bot, chat, &answers, next).await?;
            dialogue.update(State::Filling { field: next }).await?;
        }
        None => {
            let form = sessions.with(chat, |form| form.clone()).await;
            show_review(&bot, chat, &form).await?;
            dialogue.update(State::Review).await?;
        }
    }
    Ok(())
}

async fn review(
    bot: Bot,
    dialogue: FormDialogue,
    sessions: Arc<Sessions>,
    client: PredictionClient,
    msg: Message,
) -> HandlerResult {
    let chat = msg.chat.id;
    let text = msg.text().map(str::trim).unwrap_or_default();
    let form = sessions.with(chat, |form| form.clone()).await;

    match review_action(text, &form.submission) {
        ReviewAction::Submit => submit(bot, dialogue, sessions, client, chat).await,
        ReviewAction::Ignore => {
            debug!("Chat {} pressed the disabled submit button", chat);
            Ok(())
        }
        ReviewAction::Refresh => show_review(&bot, chat, &form).await,
        ReviewAction::Edit(field) => {
            ask(&bot, chat, &form.answers, field).await?;
            dialogue.update(State::Filling { field }).await?;
            Ok(())
        }
        ReviewAction::Unknown => {
            bot.send_message(chat, "Please press Submit or pick a question to change")
                .await?;
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq)]
enum ReviewAction {
    Submit,
    Ignore,
    /// A stale "Processing..." button was pressed after the request settled
    Refresh,
    Edit(Field),
    Unknown,
}

fn review_action(text: &str, submission: &SubmissionState) -> ReviewAction {
    match text {
        render::SUBMIT_LABEL => ReviewAction::Submit,
        render::PROCESSING_LABEL if submission.is_loading() => ReviewAction::Ignore,
        render::PROCESSING_LABEL => ReviewAction::Refresh,
        _ => Field::from_label(text)
            .map(ReviewAction::Edit)
            .unwrap_or(ReviewAction::Unknown),
    }
}

async fn submit(
    bot: Bot,
    dialogue: FormDialogue,
    sessions: Arc<Sessions>,
    client: PredictionClient,
    chat: ChatId,
) -> HandlerResult {
    let (generation, request) = match sessions.start_submission(chat).await {
        Ok(started) => started,
        Err(SubmitRejected::InFlight) => {
            debug!("Chat {} submitted while a prediction is in flight", chat);
            return Ok(());
        }
        Err(e) => {
            let field = match &e {
                SubmitRejected::Incomplete(field) => *field,
                _ => Field::Age,
            };
            bot.send_message(chat, e.to_string()).await?;
            let answers = sessions.with(chat, |form| form.answers.clone()).await;
            ask(&bot, chat, &answers, field).await?;
            dialogue.update(State::Filling { field }).await?;
            return Ok(());
        }
    };

    info!("Chat {} submitted the form", chat);
    // Sent before the request starts so the result's keyboard always lands last
    let processing = bot
        .send_message(chat, render::PROCESSING_LABEL)
        .reply_markup(review_keyboard(&SubmissionState::Loading))
        .await;

    tokio::spawn(deliver_prediction(
        bot.clone(),
        dialogue,
        sessions,
        client,
        chat,
        generation,
        request,
    ));

    processing?;
    // Purely cosmetic, so a failure here does not matter
    let _ = bot.send_chat_action(chat, ChatAction::Typing).await;
    Ok(())
}

/// Waits for the service and applies the outcome to the chat's form. Runs
/// apart from the handlers so the chat keeps working meanwhile.
async fn deliver_prediction(
    bot: Bot,
    dialogue: FormDialogue,
    sessions: Arc<Sessions>,
    client: PredictionClient,
    chat: ChatId,
    generation: Generation,
    request: PredictionRequest,
) {
    let outcome = client.predict(&request).await;

    let Some(state) = sessions.finish_submission(chat, generation, outcome).await else {
        debug!("Chat {} started over before its prediction arrived", chat);
        return;
    };
    let Some(text) = render::outcome(&state) else {
        return;
    };

    let mut message = bot.send_message(chat, text).parse_mode(ParseMode::Html);
    // Only the review screen shows the submit button that needs re-enabling
    if let Ok(Some(State::Review)) = dialogue.get().await {
        message = message.reply_markup(review_keyboard(&state));
    }
    if let Err(e) = message.await {
        error!("Failed to deliver prediction to chat {}: {}", chat, e);
    }
}

fn parse_answer(field: Field, text: &str) -> Option<String> {
    match field.catalog() {
        Some(catalog) => catalog.resolve(text).map(str::to_string),
        None => text
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|age| *age <= 120)
            .map(|age| age.to_string()),
    }
}

async fn ask(bot: &Bot, chat: ChatId, answers: &AnswerRecord, field: Field) -> HandlerResult {
    bot.send_message(chat, render::question(answers, field))
        .parse_mode(ParseMode::Html)
        .reply_markup(question_keyboard(field))
        .await?;
    Ok(())
}

async fn show_review(bot: &Bot, chat: ChatId, form: &HealthForm) -> HandlerResult {
    bot.send_message(chat, render::summary(&form.answers))
        .parse_mode(ParseMode::Html)
        .reply_markup(review_keyboard(&form.submission))
        .await?;
    Ok(())
}

fn question_keyboard(field: Field) -> ReplyMarkup {
    let options = render::question_options(field);
    if options.is_empty() {
        return ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    }
    ReplyMarkup::Keyboard(KeyboardMarkup::new(
        options
            .into_iter()
            .map(|label| vec![KeyboardButton::new(label)])
            .collect::<Vec<_>>(),
    ))
}

fn review_keyboard(state: &SubmissionState) -> ReplyMarkup {
    let mut rows = vec![vec![KeyboardButton::new(render::submit_label(state))]];
    rows.extend(Field::ALL.iter().map(|field| vec![KeyboardButton::new(field.label())]));
    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows))
}
