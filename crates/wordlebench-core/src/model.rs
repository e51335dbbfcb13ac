use serde::{Deserialize, Serialize};

/// Guess counter value recorded when the model never produced a parseable guess.
pub const ERROR_GUESSES: i64 = -1;
/// Guess counter value recorded when every turn was used without a win.
pub const EXHAUSTED_GUESSES: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One played (or abandoned) session. Built by the session, immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub model: String,
    pub word: String,
    pub guesses: i64,
    pub solved: bool,
    pub error: bool,
    pub messages: Vec<Message>,
    pub cost: f64,
}

impl Game {
    pub fn new(model: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            word: word.into(),
            guesses: 1,
            solved: false,
            error: false,
            messages: Vec::new(),
            cost: 0.0,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.error {
            Outcome::Errored
        } else if self.solved {
            Outcome::Solved
        } else {
            Outcome::Exhausted
        }
    }

    pub fn pair(&self) -> Pair {
        Pair::new(&self.model, &self.word)
    }
}

/// A game as read back from the store, with its row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: i64,
    #[serde(flatten)]
    pub game: Game,
}

/// Terminal state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Solved,
    Exhausted,
    Errored,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Solved => "solved",
            Outcome::Exhausted => "exhausted",
            Outcome::Errored => "errored",
        }
    }
}

/// (model, word): the unit of dedup and scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub model: String,
    pub word: String,
}

impl Pair {
    pub fn new(model: &str, word: &str) -> Self {
        Self {
            model: model.to_string(),
            word: word.to_string(),
        }
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.model, self.word)
    }
}

/// System and user prompt loaded once at startup and shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}
