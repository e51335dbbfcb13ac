use crate::evaluator::evaluate;
use crate::model::{Game, Message, Outcome, Prompts, ERROR_GUESSES, EXHAUSTED_GUESSES};
use crate::providers::llm::{Completion, CompletionClient};
use anyhow::Context;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::time::{timeout, Duration};

/// Completion calls allowed per session; a miss on the last one ends the game.
pub const MAX_ATTEMPTS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    AwaitingGuess,
    Evaluating(String),
    Done(Outcome),
}

/// Plays one model against one word, turn by turn.
///
/// Cheap to clone: the client and prompts are shared.
#[derive(Clone)]
pub struct GameSession {
    client: Arc<dyn CompletionClient>,
    prompts: Arc<Prompts>,
    turn_timeout: Option<Duration>,
}

impl GameSession {
    pub fn new(client: Arc<dyn CompletionClient>, prompts: Arc<Prompts>) -> Self {
        Self {
            client,
            prompts,
            turn_timeout: None,
        }
    }

    pub fn with_turn_timeout(mut self, turn_timeout: Option<Duration>) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    /// Runs the session to a terminal state.
    ///
    /// A reply without a guess tag is a normal (errored) outcome; only transport
    /// faults and timeouts come back as `Err`.
    pub async fn play(&self, model: &str, word: &str) -> anyhow::Result<Game> {
        tracing::info!(
            event = "session.start",
            provider = self.client.provider_name(),
            model = %model,
            word = %word
        );

        let target = word.to_uppercase();
        let mut game = Game::new(model, word);
        let mut messages = vec![
            Message::system(self.prompts.system.clone()),
            Message::user(self.prompts.user.clone()),
        ];

        let mut state = SessionState::AwaitingGuess;
        let outcome = loop {
            state = match state {
                SessionState::AwaitingGuess => {
                    let completion = self.request(model, &messages).await?;
                    game.cost += completion.cost;
                    let guess = extract_guess(&completion.text);
                    messages.push(Message::assistant(completion.text));
                    match guess {
                        Some(g) => SessionState::Evaluating(g),
                        None => SessionState::Done(Outcome::Errored),
                    }
                }
                SessionState::Evaluating(guess) => {
                    let feedback = evaluate(&guess, &target);
                    tracing::debug!(
                        event = "session.guess",
                        model = %model,
                        word = %word,
                        turn = game.guesses,
                        guess = %guess,
                        feedback = %feedback
                    );

                    if guess == target {
                        SessionState::Done(Outcome::Solved)
                    } else if game.guesses < MAX_ATTEMPTS {
                        game.guesses += 1;
                        messages.push(Message::user(format!("Result: {feedback}")));
                        SessionState::AwaitingGuess
                    } else {
                        SessionState::Done(Outcome::Exhausted)
                    }
                }
                SessionState::Done(outcome) => break outcome,
            };
        };

        match outcome {
            Outcome::Solved => {
                game.solved = true;
                tracing::info!(
                    event = "session.solved",
                    model = %model,
                    word = %word,
                    guesses = game.guesses
                );
            }
            Outcome::Exhausted => {
                game.solved = false;
                game.guesses = EXHAUSTED_GUESSES;
                tracing::info!(event = "session.exhausted", model = %model, word = %word);
            }
            Outcome::Errored => {
                game.solved = false;
                game.error = true;
                game.guesses = ERROR_GUESSES;
                tracing::warn!(
                    event = "session.protocol_error",
                    model = %model,
                    word = %word,
                    "model reply had no guess tag"
                );
            }
        }

        game.messages = messages;
        Ok(game)
    }

    async fn request(&self, model: &str, messages: &[Message]) -> anyhow::Result<Completion> {
        let fut = self.client.complete(model, messages);
        match self.turn_timeout {
            Some(t) => timeout(t, fut)
                .await
                .with_context(|| format!("completion timed out after {}s", t.as_secs()))?,
            None => fut.await,
        }
    }
}

/// Contents of the first `<guess>...</guess>` tag, trimmed and uppercased.
pub fn extract_guess(reply: &str) -> Option<String> {
    static GUESS_TAG: OnceLock<Regex> = OnceLock::new();
    let re = GUESS_TAG
        .get_or_init(|| Regex::new(r"(?s)<guess>(.*?)</guess>").expect("guess tag regex"));

    let guess = re.captures(reply)?.get(1)?.as_str().trim().to_uppercase();
    if guess.is_empty() {
        None
    } else {
        Some(guess)
    }
}
