mod aggregate;
mod auth;
mod cli;
mod config;
mod error;
mod export;
mod keep_awake;
mod models;
mod pagination;
mod providers;
mod reports;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting commitlens");
    cli.execute().await?;

    Ok(())
}
