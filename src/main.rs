use ipo_notifier::config::{Config, Endpoints, DEFAULT_CONFIG_FILE};
use ipo_notifier::logging;
use ipo_notifier::pipeline;
use ipo_notifier::state::StateStore;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
struct Args {
    config_path: PathBuf,
    dry_run: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut parsed = Args {
        config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
        dry_run: false,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dry-run" => parsed.dry_run = true,
            "--config" => {
                if let Some(path) = args.next() {
                    parsed.config_path = PathBuf::from(path);
                }
            }
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    parsed.config_path = PathBuf::from(path);
                }
            }
        }
    }
    parsed
}

// Always exits 0; every failure is reported through the log.
#[tokio::main]
async fn main() {
    let args = parse_args(std::env::args().skip(1));

    // Load saved values from .env (real env vars take precedence)
    Config::load_env_file();

    let (config, config_err) = match Config::load_or_default(&args.config_path) {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("failed to initialise logging: {:#}", e);
    }
    if let Some(e) = config_err {
        tracing::warn!(error = %format!("{:#}", e), "ignoring config file, using defaults");
    }

    let store = StateStore::new(&config.state.path);
    pipeline::run_once(Endpoints::from_env(), store, args.dry_run).await;
}
