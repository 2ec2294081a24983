use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use multipost::browser::{ProfileStore, SessionManager};
use multipost::config::Config;
use multipost::models::{self, DestinationRegistry};
use multipost::orchestrator::Dispatcher;
use multipost::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env();

    let job_path = std::env::args()
        .nth(1)
        .context("usage: multipost <job.toml>")?;
    let job = models::load_job(Path::new(&job_path)).await?;

    let registry = match &config.destinations_file {
        Some(path) => models::load_registry(Path::new(path)).await?,
        None => DestinationRegistry::builtin(),
    };

    let profiles = ProfileStore::new(&config.profiles_dir);
    let sessions = Arc::new(SessionManager::new(profiles));
    let dispatcher = Dispatcher::new(registry, sessions, config);

    logging::log_batch_start(&job.request.file_path.display().to_string(), &job.destinations);

    let result = dispatcher.dispatch(&job.request, &job.destinations).await?;
    logging::log_batch_result(&result);

    if !result.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}
