use anyhow::Context;

use agencyhub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;

    agencyhub_observability::init_with(config.log_format);
    if let Some(warning) = config.secret_warning() {
        tracing::warn!("{warning}");
    }
    tracing::debug!(?config, "configuration loaded");

    let app = agencyhub_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
