use crate::config::PromptPaths;
use crate::errors::ConfigError;
use crate::model::Prompts;
use std::path::Path;

pub fn load_prompts(paths: &PromptPaths) -> Result<Prompts, ConfigError> {
    Ok(Prompts {
        system: read_text(Path::new(&paths.system), "system prompt")?,
        user: read_text(Path::new(&paths.user), "user prompt")?,
    })
}

pub fn load_words(path: &Path) -> Result<Vec<String>, ConfigError> {
    let raw = read_text(path, "word list")?;
    parse_words(&raw).map_err(|e| ConfigError(format!("{} ({})", e.0, path.display())))
}

/// One word per line; blank lines skipped; words uppercased.
///
/// Every word must be ASCII alphabetic and all words must share one length.
pub fn parse_words(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut words: Vec<String> = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let w = line.trim();
        if w.is_empty() {
            continue;
        }
        if !w.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError(format!(
                "word list line {}: {:?} is not alphabetic",
                lineno + 1,
                w
            )));
        }
        let w = w.to_ascii_uppercase();
        if let Some(first) = words.first() {
            if first.len() != w.len() {
                return Err(ConfigError(format!(
                    "word list line {}: {} has {} letters, expected {}",
                    lineno + 1,
                    w,
                    w.len(),
                    first.len()
                )));
            }
        }
        words.push(w);
    }

    if words.is_empty() {
        return Err(ConfigError("word list is empty".into()));
    }
    Ok(words)
}

fn read_text(path: &Path, what: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read {} {}: {}", what, path.display(), e)))
}
