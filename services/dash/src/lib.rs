pub mod api;
pub mod config;
pub mod figures;
pub mod pages;

use miette::IntoDiagnostic;
use tracing::info;

pub use config::Config;

pub async fn serve(config: Config) -> miette::Result<()> {
    let addr = config.address;
    let app = api::router(config);
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    info!(%addr, "dashboard listening");
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}
