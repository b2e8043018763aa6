mod account_linker;
mod account_selector;
mod app;
mod cli;
mod clock;
mod config;
mod error;
mod position_renderer;
mod position_syncer;
mod request_signer;
mod row_verifier;
mod service_account;
mod sheet_target;
mod sheets_client;
mod snaptrade_client;

use crate::app::App;
use crate::cli::Cli;
use crate::config::Config;
use crate::config::Credentials;
use crate::config::Settings;
use clap::Parser;
use log::LevelFilter;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Cli::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    let settings = if let Some(config_path) = &args.config {
        let config_yaml = tokio::fs::read_to_string(config_path).await?;
        Settings::parse(&config_yaml)?
    } else {
        Default::default()
    };
    let config = Config {
        credentials: Credentials::from_env()?,
        settings,
    };
    App::new(args, config)?.run().await
}
