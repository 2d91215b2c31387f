use anyhow::{Context, Result};
use std::{io, process::ExitCode};

use templateflow_fetch::{
    config::FetchConfig,
    fetch::{FetchOptions, Fetcher},
    logging, orchestrator,
    templates::{self as tpl},
};

async fn run() -> Result<()> {
    let config = FetchConfig::from_env().context("read configuration")?;

    match config.manifest_override() {
        Some(json) => tpl::init_from_json_str(json).context("load template manifest from environment")?,
        None => tpl::init_builtin().context("load built-in template catalogue")?,
    }

    let options = FetchOptions {
        show_progress: config.show_progress(),
        ..FetchOptions::default()
    };
    let fetcher = Fetcher::new(config.destination(), options)?;

    let mut stdout = io::stdout();
    orchestrator::run_all(&fetcher, tpl::all()?, &mut stdout).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("templateflow-fetch error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
