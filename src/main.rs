mod cli;
mod commands;
mod error;
mod input;

use clap::Parser;
use exn::ResultExt;
use irve_config::Config;
use irve_store::{Database, Repository};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    init_tracing(&config.log);

    if let Some(parent) = config.database.path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Store)?;
    }
    let db = Database::connect(&config.database.path, config.database.max_connections)
        .await
        .or_raise(|| ErrorKind::Store)?;
    let repo = Repository::new(db.pool().clone(), config.import.chunk_size).with_author(cli.author);
    let result = commands::run(&repo, &config, cli.command).await;
    db.close().await;
    result
}
