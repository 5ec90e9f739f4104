use std::sync::Arc;

use anyhow::Context;

use pantry_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pantry_observability::init();

    let config = AppConfig::from_env();
    let services = pantry_api::app::services::build_services(&config)
        .await
        .context("failed to build services")?;

    let app = pantry_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
