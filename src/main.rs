use chargebook::args::{Args, Command};
use chargebook::{commands, Config, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();
    let user = args.common().user();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home, user).await?.print(),

        Command::Import(import_args) => {
            commands::import(load(home, user).await?, import_args.file())
                .await?
                .print()
        }

        Command::Insert(charge_args) => commands::insert(load(home, user).await?, charge_args)
            .await?
            .print(),

        Command::Update(update_args) => commands::update(load(home, user).await?, update_args)
            .await?
            .print(),

        Command::Delete(delete_args) => commands::delete(load(home, user).await?, delete_args)
            .await?
            .print(),

        Command::List(filter_args) => {
            commands::list(load(home, user).await?, &filter_args.filter())
                .await?
                .print()
        }

        Command::Export(export_args) => commands::export(
            load(home, user).await?,
            export_args.out(),
            &export_args.filter(),
        )
        .await?
        .print(),

        Command::Baseline(baseline_args) => {
            commands::baseline(load(home, user).await?, baseline_args)
                .await?
                .print()
        }

        Command::Report => commands::report(load(home, user).await?).await?.print(),
    };
    Ok(())
}

/// Loads the configuration in `home`, acting as `user` when one was given on the command line.
async fn load(home: &Path, user: Option<&str>) -> Result<Config> {
    let config = Config::load(home).await?.with_user(user)?;
    debug!("Acting as user '{}'", config.user());
    Ok(config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
