mod config;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use time::UtcOffset;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to read environment file"),
    }

    // The local offset can only be read while the process is single-threaded.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "local UTC offset unavailable; timestamps will use UTC");
        UtcOffset::UTC
    });

    let config = config::ContactConfig::from_env()?;
    if config.mail_api_key.is_none() {
        tracing::info!("MAIL_API_KEY not set; sending without X-Api-Key");
    }
    let mailer = services::mail::MailChannelsClient::new(&config)?;
    tracing::info!(url = mailer.url(), recipient = %config.recipient_email, "mail client initialized");

    let state = state::AppState::new(config, Arc::new(mailer), utc_offset);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(state))
}

async fn serve(state: state::AppState) -> Result<(), Box<dyn std::error::Error>> {
    let port = state.config.port;
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "newport-site listening");
    axum::serve(listener, app).await?;
    Ok(())
}
