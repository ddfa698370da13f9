//! Job board watcher CLI
//!
//! Local execution entry point, meant to be invoked by a periodic scheduler.
//! Runs must not overlap: the seen-id file has no locking.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use jobwatch::{
    error::{AppError, Result},
    models::{Config, KeywordTaxonomy, LoggingConfig},
    pipeline::Pipeline,
    services::{EmailNotifier, HttpJobBoard},
    storage::{LocalSeenStore, SeenIdStore},
    utils::http,
};

/// jobwatch - Job Board Listing Watcher
#[derive(Parser, Debug)]
#[command(
    name = "jobwatch",
    version,
    about = "Watches a job board and emails a digest of new matching listings"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, filter, commit new ids and send the digest
    Run,

    /// Show what a run would send, without saving state or sending mail
    Preview,

    /// Validate configuration and keyword taxonomy
    Validate,

    /// Show seen-id store info
    Info,
}

/// Initialize logging; appends to `logging.file` when one is configured.
fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    let mut file_error = None;
    if let Some(path) = &config.file {
        let opened = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| OpenOptions::new().create(true).append(true).open(path));
        match opened {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => file_error = Some((path.clone(), e)),
        }
    }

    builder.init();

    if let Some((path, e)) = file_error {
        log::warn!("Cannot open log file {}, logging to stderr: {}", path.display(), e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(&config.logging, cli.verbose);

    if let Some(e) = load_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }

    let result = match config.apply_env() {
        Ok(()) => execute(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    let store = LocalSeenStore::new(&config.paths.seen_ids_file);

    match command {
        Command::Run => {
            config.validate()?;
            config.mail.validate()?;
            log::info!("jobwatch starting...");

            let client = http::create_async_client(&config.upstream)?;
            let board = HttpJobBoard::new(client.clone(), config.upstream.clone());
            let notifier = EmailNotifier::new(
                client,
                config.auth.clone(),
                config.mail.clone(),
                config.locale.digest.clone(),
                config.upstream.timeout_secs,
            );

            let report = Pipeline::new(&board, &store, config)
                .run(&notifier, Utc::now())
                .await?;
            report.log_summary();
        }

        Command::Preview => {
            config.validate()?;

            let client = http::create_async_client(&config.upstream)?;
            let board = HttpJobBoard::new(client, config.upstream.clone());

            let plan = Pipeline::new(&board, &store, config).plan(Utc::now()).await;

            if plan.delta.new_listings.is_empty() {
                println!("No new listings.");
            }
            for listing in &plan.delta.new_listings {
                println!(
                    "{}\t{}\t{}\t{}",
                    listing.id, listing.title, listing.region_text, listing.expiration_date_text
                );
            }
            log::info!(
                "Preview: {} new of {} matching listing(s), nothing saved or sent",
                plan.delta.new_listings.len(),
                plan.filtered
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            if let Err(e) = config.mail.validate() {
                log::error!("Mail settings incomplete: {}", e);
                return Err(e);
            }
            log::info!("✓ Mail settings OK");

            let taxonomy = KeywordTaxonomy::load(&config.paths.keywords_file).map_err(|e| {
                AppError::validation(format!(
                    "keyword taxonomy {}: {}",
                    config.paths.keywords_file.display(),
                    e
                ))
            })?;
            let usable = match taxonomy.validate() {
                Ok(n) => n,
                Err(e) => {
                    log::error!("Taxonomy validation failed: {}", e);
                    return Err(e);
                }
            };
            log::info!(
                "✓ Taxonomy OK ({} categories, {} usable keywords)",
                taxonomy.categories.len(),
                usable
            );

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Seen-id store: {}", store.location());
            if store.path().exists() {
                log::info!("Seen ids: {}", store.load().await.len());
            } else {
                log::info!("No seen ids stored yet.");
            }
            log::info!("Keyword taxonomy: {}", config.paths.keywords_file.display());
            log::info!("Allowed regions: {:?}", config.filter.allowed_regions);
        }
    }

    Ok(())
}
