use crate::model::{Game, StoredGame};
use crate::storage::rows::{encode_messages, select_list, stored_game_from_row, GameColumn};
use anyhow::Context;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// The games database. Cloning shares the write gate; connections come from [`Store::handle`].
#[derive(Clone)]
pub struct Store {
    path: PathBuf,
    write_gate: Arc<Mutex<()>>,
}

impl Store {
    /// Opens (creating if needed) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let store = Self {
            path: path.to_path_buf(),
            write_gate: Arc::new(Mutex::new(())),
        };
        let bootstrap = store.handle()?;
        bootstrap.init_schema()?;
        bootstrap.quiesce()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens an independent connection for one worker or caller.
    pub fn handle(&self) -> anyhow::Result<StoreHandle> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open sqlite db {}", self.path.display()))?;
        conn.execute_batch(crate::storage::schema::CONNECTION_PRAGMAS)?;
        Ok(StoreHandle {
            conn,
            write_gate: Arc::clone(&self.write_gate),
        })
    }
}

/// One connection to the games database.
///
/// Reads go straight to the connection. Inserts additionally hold the
/// store-wide write gate, so at most one insert is in progress at a time.
pub struct StoreHandle {
    conn: Connection,
    write_gate: Arc<Mutex<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameQuery {
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
    pub model: Option<String>,
    pub word: Option<String>,
    pub solved: Option<bool>,
    pub error: Option<bool>,
    pub sort_by: GameColumn,
    pub sort_order: SortOrder,
}

impl Default for GameQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
            model: None,
            word: None,
            solved: None,
            error: None,
            sort_by: GameColumn::Id,
            sort_order: SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GamePage {
    pub games: Vec<StoredGame>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl GamePage {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page.max(1)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub models: Vec<String>,
    pub words: Vec<String>,
}

impl StoreHandle {
    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Whether any game for (model, word) has been committed.
    pub fn exists(&self, model: &str, word: &str) -> anyhow::Result<bool> {
        let hit = self
            .conn
            .query_row(
                "SELECT 1 FROM games WHERE model = ?1 AND word = ?2 LIMIT 1",
                params![model, word],
                |_| Ok(()),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    /// Appends one game and returns its row id. A failed insert is rolled back.
    pub fn insert(&mut self, game: &Game) -> anyhow::Result<i64> {
        let messages = encode_messages(&game.messages)?;

        // The gate guards no data, so a poisoned lock is still usable.
        let _gate = self
            .write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO games (model, word, guesses, solved, error, messages, cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                game.model,
                game.word,
                game.guesses,
                game.solved,
                game.error,
                messages,
                game.cost,
            ],
        )
        .with_context(|| format!("failed to insert game ({} {})", game.model, game.word))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    pub fn get(&self, id: i64) -> anyhow::Result<Option<StoredGame>> {
        let sql = format!("SELECT {} FROM games WHERE id = ?1", select_list());
        let game = self
            .conn
            .query_row(&sql, params![id], stored_game_from_row)
            .optional()?;
        Ok(game)
    }

    pub fn count(&self) -> anyhow::Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))?;
        Ok(n as u64)
    }

    /// One page of games matching the query's filters.
    ///
    /// The total and the page are read in the same transaction, so they agree
    /// even while other handles insert.
    pub fn list(&self, q: &GameQuery) -> anyhow::Result<GamePage> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(m) = &q.model {
            clauses.push("model = ?");
            values.push(Value::Text(m.clone()));
        }
        if let Some(w) = &q.word {
            clauses.push("word = ?");
            values.push(Value::Text(w.clone()));
        }
        if let Some(s) = q.solved {
            clauses.push("solved = ?");
            values.push(Value::Integer(i64::from(s)));
        }
        if let Some(e) = q.error {
            clauses.push("error = ?");
            values.push(Value::Integer(i64::from(e)));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        // messages is a JSON blob; ordering by it is meaningless.
        let sort_by = match q.sort_by {
            GameColumn::Messages => GameColumn::Id,
            c => c,
        };
        let page = q.page.max(1);
        let per_page = q.per_page.clamp(1, 1000);
        let offset = u64::from(page - 1) * u64::from(per_page);

        let tx = self.conn.unchecked_transaction()?;

        let total: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM games{where_sql}"),
            params_from_iter(values.iter()),
            |r| r.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM games{} ORDER BY {} {}, id ASC LIMIT {} OFFSET {}",
            select_list(),
            where_sql,
            sort_by.name(),
            q.sort_order.sql(),
            per_page,
            offset
        );
        let games = {
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), stored_game_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        tx.finish()?;

        Ok(GamePage {
            games,
            total: total as u64,
            page,
            per_page,
        })
    }

    /// Distinct models and words present, for filter drop-downs.
    pub fn filter_options(&self) -> anyhow::Result<FilterOptions> {
        let tx = self.conn.unchecked_transaction()?;
        let models = distinct(&tx, "model")?;
        let words = distinct(&tx, "word")?;
        tx.finish()?;
        Ok(FilterOptions { models, words })
    }

    /// Closes the connection, reporting any error sqlite raises on close.
    pub fn quiesce(self) -> anyhow::Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("failed to close sqlite connection")
    }
}

fn distinct(conn: &Connection, column: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT {column} FROM games ORDER BY {column}"
    ))?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use tempfile::tempdir;

    fn game(model: &str, word: &str, guesses: i64, solved: bool) -> Game {
        Game {
            model: model.into(),
            word: word.into(),
            guesses,
            solved,
            error: false,
            messages: vec![Message::system("sys"), Message::user("go")],
            cost: 0.25,
        }
    }

    #[test]
    fn test_insert_then_exists_and_get() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = Store::open(&dir.path().join("nested/games.db"))?;
        let mut h = store.handle()?;

        assert!(!h.exists("m1", "CRANE")?);
        let id = h.insert(&game("m1", "CRANE", 3, true))?;
        assert!(h.exists("m1", "CRANE")?);
        assert!(!h.exists("m1", "SLATE")?);
        assert!(!h.exists("m2", "CRANE")?);

        let stored = h.get(id)?.expect("row");
        assert_eq!(stored.id, id);
        assert_eq!(stored.game, game("m1", "CRANE", 3, true));
        assert!(h.get(id + 1)?.is_none());
        h.quiesce()?;
        Ok(())
    }

    #[test]
    fn test_list_filters_sorts_and_paginates() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = Store::open(&dir.path().join("games.db"))?;
        let mut h = store.handle()?;
        for (i, w) in ["CRANE", "SLATE", "AUDIO", "PIZZA", "OCEAN"].iter().enumerate() {
            h.insert(&game("m1", w, i as i64 + 1, i % 2 == 0))?;
            h.insert(&game("m2", w, 6, false))?;
        }

        let all = h.list(&GameQuery::default())?;
        assert_eq!(all.total, 10);
        assert_eq!(all.games.len(), 10);
        assert_eq!(all.games[0].id, 1);

        let q = GameQuery {
            model: Some("m1".into()),
            solved: Some(true),
            sort_by: GameColumn::Guesses,
            sort_order: SortOrder::Desc,
            ..GameQuery::default()
        };
        let page = h.list(&q)?;
        assert_eq!(page.total, 3);
        let guesses: Vec<i64> = page.games.iter().map(|g| g.game.guesses).collect();
        assert_eq!(guesses, vec![5, 3, 1]);

        let q = GameQuery {
            per_page: 4,
            page: 3,
            ..GameQuery::default()
        };
        let page = h.list(&q)?;
        assert_eq!(page.total, 10);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.games.len(), 2);
        assert_eq!(page.games[0].id, 9);

        let q = GameQuery {
            word: Some("NOPE".into()),
            ..GameQuery::default()
        };
        assert_eq!(h.list(&q)?.total, 0);
        Ok(())
    }

    #[test]
    fn test_filter_options_are_distinct_and_sorted() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = Store::open(&dir.path().join("games.db"))?;
        let mut h = store.handle()?;
        h.insert(&game("zeta/x", "SLATE", 2, true))?;
        h.insert(&game("alpha/y", "CRANE", 6, false))?;
        h.insert(&game("alpha/y", "SLATE", 6, false))?;

        let opts = h.filter_options()?;
        assert_eq!(opts.models, vec!["alpha/y", "zeta/x"]);
        assert_eq!(opts.words, vec!["CRANE", "SLATE"]);
        assert_eq!(h.count()?, 3);
        Ok(())
    }

    #[test]
    fn test_reopen_keeps_rows() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("games.db");
        {
            let store = Store::open(&path)?;
            let mut h = store.handle()?;
            h.insert(&game("m1", "CRANE", 1, true))?;
        }
        let store = Store::open(&path)?;
        assert!(store.handle()?.exists("m1", "CRANE")?);
        Ok(())
    }
}
