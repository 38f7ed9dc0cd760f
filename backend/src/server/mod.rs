//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use bookmd::Trace;
#[cfg(debug_assertions)]
use bookmd::doc::ApiDoc;
use bookmd::inbound::http::health::{HealthState, live, ready};
use bookmd::inbound::http::pages::StaticDir;
use bookmd::inbound::http::routes;
use bookmd::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    static_dir: web::Data<StaticDir>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        static_dir,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(static_dir)
        .wrap(Trace)
        .configure(routes::configure)
        .service(ready)
        .service(live)
        .default_service(web::to(routes::not_found));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server for the notes service.
///
/// # Parameters
/// - `health_state`: shared readiness state, marked ready once bound.
/// - `http_state`: note use-cases shared by every worker.
/// - `config`: binding and static file settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener. Actix's
/// own signal handling is disabled; pair the server with [`drain`] so the
/// liveness probe fails before connections close.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);
    let static_dir = web::Data::new(StaticDir::new(config.static_dir()));
    let (host, port) = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            static_dir: static_dir.clone(),
        })
    })
    .disable_signals()
    .bind((host, port))?
    .run();

    info!(host, port, "listening");
    health_state.mark_ready();
    Ok(server)
}

/// Fail liveness probes, then stop accepting connections and wait for
/// in-flight requests to finish.
pub async fn drain(health_state: &HealthState, handle: ServerHandle) {
    health_state.mark_unhealthy();
    info!("draining connections");
    handle.stop(true).await;
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(error) => warn!(%error, "SIGTERM handler unavailable; listening for Ctrl-C only"),
        }
    }

    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Ctrl-C handler unavailable; shutdown must be external");
        std::future::pending::<()>().await;
    }
}
