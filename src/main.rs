//! Symptom checker — HTTP service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Load prompts (missing files abort startup)
//!   6. Build LLM provider and consultation store
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Serve HTTP until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use symptom_checker::checker::SymptomChecker;
use symptom_checker::error::AppError;
use symptom_checker::http::{self, AppState};
use symptom_checker::llm::providers;
use symptom_checker::prompts::PromptStore;
use symptom_checker::store::ConsultationStore;
use symptom_checker::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();
    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some(), config.log_format)?;

    info!(
        service = %config.service_name,
        work_dir = %config.work_dir.display(),
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let prompts = Arc::new(PromptStore::load(&config.prompts_dir)?);

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    if config.llm_api_key.is_none() && provider.name() == "openai" {
        warn!("LLM_API_KEY is not set; requests go out without authorization");
    }
    info!(
        provider = provider.name(),
        model = %config.llm.openai.model,
        endpoint = %config.llm.openai.api_base_url,
        "llm provider ready"
    );

    let store = ConsultationStore::new(&config.store_path);
    match store.init() {
        Ok(()) => info!(path = %store.path().display(), "consultation store ready"),
        Err(e) => warn!(
            error = %e,
            path = %store.path().display(),
            "consultation store unavailable; consultations are not saved until it recovers"
        ),
    }

    let checker = SymptomChecker::new(prompts, provider, store, config.strict_schema);
    let state = AppState { checker: Arc::new(checker) };

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — shutting down");
            ctrlc_token.cancel();
        }
    });

    http::serve(&config.bind, state, shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: symptom-checker [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    //   -v → warn, -vv → info, -vvv → debug, -vvvv+ → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
