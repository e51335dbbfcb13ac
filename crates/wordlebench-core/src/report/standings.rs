//! Read-only aggregate queries over recorded games.

use crate::model::EXHAUSTED_GUESSES;
use crate::storage::StoreHandle;
use rusqlite::params;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStanding {
    pub model: String,
    pub games: u64,
    pub successful_games: u64,
    /// Successful games as a percentage of all games for the model.
    pub success_rate: f64,
    /// Mean guesses over successful games, rounded to 2 decimals.
    pub guesses_per_game_avg: Option<f64>,
    pub avg_cost_per_game: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedWord {
    pub word: String,
    pub failures: u64,
}

/// Per-model results, best first (most successful games, then model name).
pub fn standings(handle: &StoreHandle) -> anyhow::Result<Vec<ModelStanding>> {
    let mut stmt = handle.conn().prepare(
        "SELECT
            model,
            COUNT(*) AS games,
            COUNT(CASE WHEN solved = 1 AND guesses < ?1 THEN 1 END) AS successful_games,
            AVG(CASE WHEN solved = 1 AND guesses < ?1 THEN guesses END) AS guesses_avg,
            AVG(cost) AS cost_avg
         FROM games
         GROUP BY model
         ORDER BY successful_games DESC, model ASC",
    )?;

    let rows = stmt.query_map(params![EXHAUSTED_GUESSES], |row| {
        let games: i64 = row.get(1)?;
        let successful: i64 = row.get(2)?;
        let guesses_avg: Option<f64> = row.get(3)?;
        let cost_avg: Option<f64> = row.get(4)?;
        Ok(ModelStanding {
            model: row.get(0)?,
            games: games as u64,
            successful_games: successful as u64,
            success_rate: if games > 0 {
                round2(successful as f64 * 100.0 / games as f64)
            } else {
                0.0
            },
            guesses_per_game_avg: guesses_avg.map(round2),
            avg_cost_per_game: cost_avg.unwrap_or(0.0),
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Words most often not solved (errors included), hardest first.
pub fn failed_words(handle: &StoreHandle, limit: u32) -> anyhow::Result<Vec<FailedWord>> {
    let mut stmt = handle.conn().prepare(
        "SELECT word, COUNT(*) AS failures
         FROM games
         WHERE solved = 0
         GROUP BY word
         ORDER BY failures DESC, word ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        let failures: i64 = row.get(1)?;
        Ok(FailedWord {
            word: row.get(0)?,
            failures: failures as u64,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
