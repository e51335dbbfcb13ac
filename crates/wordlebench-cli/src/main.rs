use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod templates;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

fn init_logging(level: Option<&str>, json: bool) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr);
    if json {
        builder
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // A missing .env is fine; variables already set win over the file.
    let dotenv = dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_json);
    if let Some(path) = dotenv {
        tracing::debug!(event = "env.loaded", path = %path.display());
    }

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            if wordlebench_core::errors::is_config_error(&e) {
                eprintln!("{e:#}");
            } else {
                eprintln!("fatal: {e:?}");
            }
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
