use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tokio::net::TcpListener;

use speechai::application::ports::{Mailer, SessionStore};
use speechai::application::services::{AuthService, TranscriptionService};
use speechai::infrastructure::audio::{WhisperApiEngine, probe_duration_seconds};
use speechai::infrastructure::email::{HttpMailer, NoopMailer};
use speechai::infrastructure::identity::GoogleIdentityProvider;
use speechai::infrastructure::observability::init_tracing;
use speechai::infrastructure::persistence::{
    PgSessionStore, PgTranscriptRepository, PgUserRepository, create_pool, run_migrations,
};
use speechai::infrastructure::storage::LocalStagingStore;
use speechai::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading configuration")?;
    init_tracing(settings.logging.enable_json);

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("connecting to PostgreSQL")?;
    run_migrations(&pool).await.context("applying schema")?;

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let transcripts = Arc::new(PgTranscriptRepository::new(pool.clone()));
    let sessions = Arc::new(PgSessionStore::new(pool));

    let purged = sessions.purge_expired(Utc::now()).await.unwrap_or_default();
    if purged > 0 {
        tracing::info!(purged, "Expired sessions removed");
    }

    let mailer: Arc<dyn Mailer> = match (
        settings.email.api_url.clone(),
        settings.email.api_key.clone(),
        settings.email.from.clone(),
    ) {
        (Some(url), Some(key), Some(from)) => Arc::new(HttpMailer::new(url, key, from)),
        _ => {
            tracing::warn!("No email delivery configured, falling back to no-op mailer");
            Arc::new(NoopMailer)
        }
    };

    let auth_service = Arc::new(AuthService::new(
        users,
        sessions,
        mailer,
        Duration::hours(settings.session.ttl_hours),
        !settings.environment.is_production(),
    ));

    let engine = Arc::new(WhisperApiEngine::new(
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        settings.transcription.model.clone(),
    ));
    let staging = Arc::new(
        LocalStagingStore::new(PathBuf::from(&settings.storage.staging_dir))
            .context("creating staging directory")?,
    );

    let transcription_service = Arc::new(TranscriptionService::new(
        engine,
        staging,
        transcripts,
        Box::new(probe_duration_seconds),
        settings.billing.rates(),
    ));

    let identity_provider = Arc::new(GoogleIdentityProvider::new(
        settings.google.client_id.clone(),
        settings.google.client_secret.clone(),
        settings.google.redirect_uri(),
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("parsing bind address")?;

    let state = AppState {
        auth_service,
        transcription_service,
        identity_provider,
        settings,
    };

    let router = create_router(state);

    tracing::info!(%addr, "Listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
