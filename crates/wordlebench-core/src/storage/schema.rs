pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  model TEXT NOT NULL,
  word TEXT NOT NULL,
  guesses INTEGER DEFAULT 1,
  solved BOOLEAN DEFAULT FALSE,
  error BOOLEAN DEFAULT FALSE,
  messages TEXT DEFAULT '[]',
  cost REAL DEFAULT 0.0
);

CREATE INDEX IF NOT EXISTS idx_games_model_word ON games(model, word);
"#;

/// Connection settings applied to every handle. WAL lets readers keep a
/// consistent snapshot while a writer commits.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode=WAL;\
     PRAGMA synchronous=NORMAL;\
     PRAGMA busy_timeout=5000;";
