//! Mapping between `games` rows and [`StoredGame`].
//!
//! Every query selects columns in [`GameColumn::ALL`] order and reads them back
//! by the same enum, so positions cannot drift from field names.

use crate::model::{Game, Message, StoredGame};
use rusqlite::types::Type;
use rusqlite::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameColumn {
    Id,
    Model,
    Word,
    Guesses,
    Solved,
    Error,
    Messages,
    Cost,
}

impl GameColumn {
    pub const ALL: [GameColumn; 8] = [
        GameColumn::Id,
        GameColumn::Model,
        GameColumn::Word,
        GameColumn::Guesses,
        GameColumn::Solved,
        GameColumn::Error,
        GameColumn::Messages,
        GameColumn::Cost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameColumn::Id => "id",
            GameColumn::Model => "model",
            GameColumn::Word => "word",
            GameColumn::Guesses => "guesses",
            GameColumn::Solved => "solved",
            GameColumn::Error => "error",
            GameColumn::Messages => "messages",
            GameColumn::Cost => "cost",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == s)
    }
}

/// `id, model, word, ...` in mapping order.
pub fn select_list() -> String {
    GameColumn::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn stored_game_from_row(row: &Row<'_>) -> rusqlite::Result<StoredGame> {
    use GameColumn as C;

    let messages_json: Option<String> = row.get(C::Messages.index())?;
    let messages = decode_messages(messages_json.as_deref().unwrap_or("[]"))?;

    Ok(StoredGame {
        id: row.get(C::Id.index())?,
        game: Game {
            model: row.get(C::Model.index())?,
            word: row.get(C::Word.index())?,
            guesses: row.get(C::Guesses.index())?,
            solved: row.get(C::Solved.index())?,
            error: row.get(C::Error.index())?,
            messages,
            cost: row.get(C::Cost.index())?,
        },
    })
}

pub fn encode_messages(messages: &[Message]) -> serde_json::Result<String> {
    serde_json::to_string(messages)
}

fn decode_messages(s: &str) -> rusqlite::Result<Vec<Message>> {
    serde_json::from_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            GameColumn::Messages.index(),
            Type::Text,
            Box::new(e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_mapping_table_matches_ddl_column_order() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(crate::storage::schema::DDL).unwrap();

        let mut stmt = conn.prepare("PRAGMA table_info(games)").unwrap();
        let names: Vec<String> = stmt
            .query_map([], |r| r.get::<_, String>(1))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let expected: Vec<&str> = GameColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_row_round_trip_through_mapping() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(crate::storage::schema::DDL).unwrap();
        conn.execute(
            "INSERT INTO games (model, word, guesses, solved, error, messages, cost)
             VALUES ('m', 'CRANE', 3, 1, 0, '[{\"role\":\"user\",\"content\":\"hi\"}]', 0.5)",
            [],
        )
        .unwrap();

        let sql = format!("SELECT {} FROM games", select_list());
        let g = conn.query_row(&sql, [], stored_game_from_row).unwrap();
        assert_eq!(g.id, 1);
        assert_eq!(g.game.word, "CRANE");
        assert_eq!(g.game.guesses, 3);
        assert!(g.game.solved);
        assert!(!g.game.error);
        assert_eq!(g.game.messages, vec![Message::user("hi")]);
        assert_eq!(g.game.cost, 0.5);
    }

    #[test]
    fn test_corrupt_messages_blob_is_conversion_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(crate::storage::schema::DDL).unwrap();
        conn.execute(
            "INSERT INTO games (model, word, messages) VALUES ('m', 'CRANE', '{not json')",
            [],
        )
        .unwrap();

        let sql = format!("SELECT {} FROM games", select_list());
        let err = conn.query_row(&sql, [], stored_game_from_row).unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(6, _, _)));
    }

    #[test]
    fn test_parse_column_names() {
        assert_eq!(GameColumn::parse("cost"), Some(GameColumn::Cost));
        assert_eq!(GameColumn::parse("id; DROP TABLE games"), None);
    }
}
