use anyhow::Context;
use studyhall_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env first so Config sees it
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // 2. Working directory and logging
    setup_environment(&config).context("failed to prepare working directory")?;

    print_banner();
    tracing::info!(environment = %config.environment, "Studyhall server starting...");

    // 3. Storage, JWT, ...
    let state = ServerState::initialize(&config).context("failed to initialize server state")?;

    // 4. HTTP
    Server::with_state(config, state).run().await?;

    Ok(())
}
