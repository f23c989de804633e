mod ai;
mod app;
mod classify;
mod config;
mod domain;
mod infrastructure;
mod pipeline;
mod reply;
mod rules;
mod text;

use anyhow::Result;
use infrastructure::{directories, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::TriageApp::initialize(config)?;
    app.run().await
}
