use std::fs;
use tempfile::tempdir;
use wordlebench_core::config::sources::{load_prompts, load_words};
use wordlebench_core::config::{load_config, write_sample_config};
use wordlebench_core::errors::ConfigError;

#[test]
fn test_config_paths_resolve_against_config_dir() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let conf_dir = dir.path().join("bench");
    fs::create_dir_all(conf_dir.join("prompts"))?;
    fs::write(conf_dir.join("prompts/system_prompt.md"), "You play Wordle.")?;
    fs::write(conf_dir.join("prompts/user_prompt.md"), "Guess a word.")?;
    fs::write(conf_dir.join("words.txt"), "crane\nslate\n")?;
    let cfg_path = conf_dir.join("wordlebench.yaml");
    write_sample_config(&cfg_path)?;

    let cfg = load_config(&cfg_path, true).map_err(anyhow::Error::new)?;
    assert_eq!(cfg.words_file, conf_dir.join("words.txt").to_string_lossy());
    assert_eq!(
        cfg.prompts.system,
        conf_dir.join("prompts/system_prompt.md").to_string_lossy()
    );

    let prompts = load_prompts(&cfg.prompts)?;
    assert_eq!(prompts.system, "You play Wordle.");
    assert_eq!(prompts.user, "Guess a word.");

    let words = load_words(std::path::Path::new(&cfg.words_file))?;
    assert_eq!(words, vec!["CRANE", "SLATE"]);
    Ok(())
}

#[test]
fn test_missing_config_is_config_error() {
    let dir = tempdir().unwrap();
    let err: ConfigError = load_config(&dir.path().join("absent.yaml"), false).unwrap_err();
    assert!(err.to_string().starts_with("config error: failed to read config"));
}

#[test]
fn test_bad_word_file_names_the_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("words.txt");
    fs::write(&path, "crane\nno-way\n")?;
    let err = load_words(&path).unwrap_err();
    assert!(err.0.contains("words.txt"), "{}", err.0);
    Ok(())
}
