use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wordlebench",
    version,
    about = "Benchmark LLMs by having them play Wordle"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,

    /// tracing filter, e.g. `info` or `wordlebench_core=debug`
    #[arg(long, global = true, env = "WORDLEBENCH_LOG")]
    pub log_level: Option<String>,

    /// emit JSON log lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play every (model, word) pair not yet recorded
    Run(RunArgs),
    /// Show how many pairs a run would play
    Plan(PlanArgs),
    /// Compute standings and write results.json
    Report(ReportArgs),
    /// Inspect recorded games
    Games(GamesArgs),
    /// Write a sample config, prompts and word list
    Init(InitArgs),
    Version,
}

#[derive(Args, Clone)]
pub struct SourceArgs {
    #[arg(long, default_value = "wordlebench.yaml")]
    pub config: PathBuf,

    /// overrides `db` from the config and WORDLEBENCH_DB
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// play these models instead of the configured list (repeatable)
    #[arg(long = "model")]
    pub models: Vec<String>,

    /// reject unknown config keys
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// maximum sessions in flight
    #[arg(long)]
    pub parallel: Option<usize>,
}

#[derive(Parser, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Where read-side commands find the database.
#[derive(Args, Clone)]
pub struct DbArgs {
    /// used for its `db` setting when `--db` is not given
    #[arg(long, default_value = "wordlebench.yaml", global = true)]
    pub config: PathBuf,

    /// database path; defaults to the config's `db`, else `games.db`
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: DbArgs,
    #[arg(long, default_value = "results.json")]
    pub out: PathBuf,
    #[arg(long, default_value_t = 10)]
    pub failed_words: u32,
}

#[derive(Parser)]
pub struct GamesArgs {
    #[command(subcommand)]
    pub cmd: GamesSub,
    #[command(flatten)]
    pub source: DbArgs,
}

#[derive(Subcommand)]
pub enum GamesSub {
    List(ListArgs),
    Show {
        id: i64,
    },
}

#[derive(Parser, Clone)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 100)]
    pub per_page: u32,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub word: Option<String>,
    #[arg(long)]
    pub solved: Option<bool>,
    #[arg(long)]
    pub error: Option<bool>,
    /// id|model|word|guesses|solved|error|cost
    #[arg(long, default_value = "id")]
    pub sort_by: String,
    /// asc|desc
    #[arg(long, default_value = "asc")]
    pub sort_order: String,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "wordlebench.yaml")]
    pub config: PathBuf,
}
