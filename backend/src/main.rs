//! Notes service entry-point: loads settings, migrates the database, wires
//! adapters into the note service and starts the HTTP server.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookmd::domain::NoteService;
use bookmd::inbound::http::health::HealthState;
use bookmd::inbound::http::state::HttpState;
use bookmd::outbound::blob::FsBlobStore;
use bookmd::outbound::persistence::{DbPool, DieselNoteRepository, PoolConfig, run_migrations};
use bookmd::outbound::transcription::{ChatCompletionTranscriber, TranscriberConfig};
use bookmd::settings::{AppSettings, load_dotenv};
use server::{ServerConfig, create_server, drain, shutdown_signal};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match load_dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => warn!("no .env file found; using the process environment only"),
        Err(e) => warn!(error = %e, "failed to read .env file; using the process environment only"),
    }

    let settings = AppSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;

    let database_url = settings.database_path().to_string_lossy().into_owned();
    run_migrations(&database_url)
        .await
        .map_err(io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(settings.db_pool_size()))
        .await
        .map_err(io::Error::other)?;

    let api_key = settings.api_key();
    if api_key.is_none() {
        warn!("no API key configured; set BOOKMD_API_KEY or OPENAI_API_KEY, transcription requests will fail");
    }
    let base_url = settings.base_url().map_err(io::Error::other)?;
    let transcriber = ChatCompletionTranscriber::new(
        TranscriberConfig::new(base_url)
            .with_api_key(api_key)
            .with_model(settings.model())
            .with_timeout(settings.transcription_timeout()),
    )
    .map_err(io::Error::other)?;

    let images_dir = settings.images_dir();
    info!(
        database = %database_url,
        images = %images_dir.display(),
        model = settings.model(),
        "note service configured"
    );
    let notes = Arc::new(NoteService::new(
        Arc::new(DieselNoteRepository::new(pool)),
        Arc::new(FsBlobStore::new(images_dir)),
        Arc::new(transcriber),
    ));
    let http_state = HttpState::new(notes.clone(), notes);

    let config =
        ServerConfig::new(settings.bind_host(), settings.port).with_static_dir(settings.static_dir());
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, config)?;
    let handle = server.handle();
    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested");
        drain(&health_state, handle).await;
    });
    server.await
}
