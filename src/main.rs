use clap::Parser;
use daydash::args::{Args, Command};
use daydash::{commands, Config, Mode, Result};
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
    let home = args.common().daydash_home().path();

    // When DAYDASH_IN_TEST_MODE is set and non-empty the mode is Mode::Test and no request leaves
    // the machine, otherwise it is Mode::Gemini.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(config, add_args.amount(), add_args.category(), add_args.day())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, delete_args.id()).await?.print()
        }

        Command::List(day_args) => {
            let config = Config::load(home).await?;
            commands::list(config, day_args.day()).await?.print()
        }

        Command::Comment(day_args) => {
            let config = Config::load(home).await?;
            commands::comment(config, mode, day_args.day())
                .await?
                .print()
        }

        Command::Weather(weather_args) => {
            let config = Config::load(home).await?;
            commands::weather(config, mode, weather_args.save_image())
                .await?
                .print()
        }

        Command::Shortcuts => commands::shortcuts().await?.print(),

        Command::Dashboard => {
            let config = Config::load(home).await?;
            commands::dashboard(config, mode).await?.print()
        }
    };
    Ok(())
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
