use super::args::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wordlebench_core::config::sources::{load_prompts, load_words};
use wordlebench_core::config::{load_config, BenchConfig};
use wordlebench_core::engine::{plan_pending, GameSession, Scheduler};
use wordlebench_core::errors::ConfigError;
use wordlebench_core::providers::llm::openai::OpenAiCompatClient;
use wordlebench_core::report::{console, json};
use wordlebench_core::storage::{GameColumn, GameQuery, SortOrder, Store};

pub mod games;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Run(args) => cmd_run(args).await,
        Command::Plan(args) => cmd_plan(args).await,
        Command::Report(args) => cmd_report(args),
        Command::Games(args) => games::cmd_games(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if !args.config.exists() {
        ensure_parent_dir(&args.config)?;
        wordlebench_core::config::write_sample_config(&args.config)?;
        eprintln!("created {}", args.config.display());
    } else {
        eprintln!("note: {} already exists", args.config.display());
    }

    // The sample config's relative paths resolve next to it.
    let base = args.config.parent().unwrap_or(Path::new(""));
    write_file_if_missing(
        &base.join("prompts/system_prompt.md"),
        crate::templates::SYSTEM_PROMPT,
    )?;
    write_file_if_missing(
        &base.join("prompts/user_prompt.md"),
        crate::templates::USER_PROMPT,
    )?;
    write_file_if_missing(&base.join("words.txt"), crate::templates::WORDS)?;
    write_file_if_missing(&base.join(".gitignore"), crate::templates::GITIGNORE)?;

    Ok(exit_codes::OK)
}

/// Everything a run or a plan needs from disk.
struct Sources {
    cfg: BenchConfig,
    models: Vec<String>,
    words: Vec<String>,
}

fn load_sources(args: &SourceArgs) -> anyhow::Result<Sources> {
    let mut cfg = load_config(&args.config, args.strict)?;
    if let Some(db) = &args.db {
        cfg.db = db.to_string_lossy().into_owned();
    }

    let models = if args.models.is_empty() {
        cfg.models.clone()
    } else {
        args.models.clone()
    };
    let words = load_words(Path::new(&cfg.words_file))?;
    Ok(Sources { cfg, models, words })
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let Sources { cfg, models, words } = load_sources(&args.source)?;
    if args.parallel == Some(0) {
        return Err(ConfigError("--parallel must be at least 1".into()).into());
    }
    let parallel = args.parallel.unwrap_or_else(|| cfg.parallel());

    let prompts = load_prompts(&cfg.prompts)?;
    let api_key = cfg.provider.api_key()?;
    let client = OpenAiCompatClient::new(cfg.provider.base_url.clone(), api_key);

    ensure_parent_dir(Path::new(&cfg.db))?;
    let store = Store::open(Path::new(&cfg.db))?;
    let db = store.path().display().to_string();

    let session = GameSession::new(Arc::new(client), Arc::new(prompts))
        .with_turn_timeout(cfg.turn_timeout());
    let scheduler = Scheduler::new(store, session, parallel);
    tracing::info!(
        event = "run.start",
        db = %db,
        models = models.len(),
        words = words.len(),
        parallel = scheduler.parallel()
    );

    let summary = scheduler.run(&models, &words).await?;

    console::print_summary(&summary);
    Ok(if summary.is_clean() {
        exit_codes::OK
    } else {
        exit_codes::RUN_FAILED
    })
}

async fn cmd_plan(args: PlanArgs) -> anyhow::Result<i32> {
    let Sources { cfg, models, words } = load_sources(&args.source)?;
    ensure_parent_dir(Path::new(&cfg.db))?;
    let store = Store::open(Path::new(&cfg.db))?;
    let (model_count, word_count) = (models.len(), words.len());
    let plan = plan_pending(store, models, words).await?;

    for pair in &plan.pending {
        println!("{}\t{}", pair.model, pair.word);
    }
    eprintln!(
        "pending={} skipped={} ({} models x {} words)",
        plan.pending.len(),
        plan.skipped,
        model_count,
        word_count
    );
    Ok(exit_codes::OK)
}

fn cmd_report(args: ReportArgs) -> anyhow::Result<i32> {
    let store = open_existing(&args.source)?;
    let handle = store.handle()?;
    let doc = json::ResultsDocument::collect(&handle, args.failed_words, chrono::Utc::now())?;
    handle.quiesce()?;

    json::write_json(&doc, &args.out)?;
    console::print_standings(&doc.models, &doc.failed_words);
    eprintln!("wrote {} ({} games)", args.out.display(), doc.total_games);
    Ok(exit_codes::OK)
}

/// Read-side commands never create a database.
pub(crate) fn open_existing(args: &DbArgs) -> anyhow::Result<Store> {
    let db = resolve_db(args)?;
    if !db.exists() {
        return Err(ConfigError(format!("database {} does not exist", db.display())).into());
    }
    Store::open(&db)
}

/// `--db`, else the `db` of an existing config (resolved like `run` does), else `games.db`.
fn resolve_db(args: &DbArgs) -> anyhow::Result<PathBuf> {
    if let Some(db) = &args.db {
        return Ok(db.clone());
    }
    if args.config.exists() {
        let cfg = load_config(&args.config, false)?;
        return Ok(PathBuf::from(cfg.db));
    }
    Ok(PathBuf::from("games.db"))
}

pub(crate) fn build_query(args: &ListArgs) -> anyhow::Result<GameQuery> {
    let sort_by = GameColumn::parse(&args.sort_by)
        .ok_or_else(|| ConfigError(format!("unknown sort column {:?}", args.sort_by)))?;
    let sort_order = SortOrder::parse(&args.sort_order)
        .ok_or_else(|| ConfigError(format!("unknown sort order {:?}", args.sort_order)))?;
    Ok(GameQuery {
        page: args.page,
        per_page: args.per_page,
        model: args.model.clone(),
        word: args.word.clone(),
        solved: args.solved,
        error: args.error,
        sort_by,
        sort_order,
    })
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    if !path.exists() {
        std::fs::write(path, content)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists (skipped)", path.display());
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
