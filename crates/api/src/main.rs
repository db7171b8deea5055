use anyhow::Context;

use clubhouse_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clubhouse_observability::init();

    let config = Config::from_env().context("failed to read configuration")?;
    let app = clubhouse_api::app::build_app(&config)
        .await
        .context("failed to initialise store")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
