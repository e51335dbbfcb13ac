use crate::report::standings::{FailedWord, ModelStanding};
use crate::storage::StoreHandle;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

/// The document the leaderboard page is generated from.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsDocument {
    pub generated_at: String,
    pub total_games: u64,
    pub models: Vec<ModelStanding>,
    pub failed_words: Vec<FailedWord>,
}

impl ResultsDocument {
    pub fn collect(
        handle: &StoreHandle,
        failed_word_limit: u32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Self> {
        // One snapshot for all three queries.
        let tx = handle.conn().unchecked_transaction()?;
        let doc = Self {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_games: handle.count()?,
            models: crate::report::standings(handle)?,
            failed_words: crate::report::failed_words(handle, failed_word_limit)?,
        };
        tx.finish()?;
        Ok(doc)
    }
}

pub fn write_json(doc: &ResultsDocument, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(doc)?;
    std::fs::write(out, s)?;
    Ok(())
}
