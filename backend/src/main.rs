//! Backend entry-point: wires REST endpoints, sessions, and OpenAPI docs.

use actix_web::cookie::Key;
use actix_web::{App, HttpServer, web};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use poke_community::ApiDoc;
use poke_community::Trace;
use poke_community::inbound::http::health::{HealthState, live, ready};
use poke_community::inbound::http::{configure_api, unsubscribe};
use poke_community::outbound::persistence::{DbPool, PoolConfig};
use poke_community::server::{AppConfig, build_http_state, session_middleware};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    run_migrations(&config.database_url)?;

    let key = load_session_key(&config.session_key_file, config.allow_ephemeral_session_key)?;
    let cookie_secure = config.cookie_secure;
    let bind_addr = config.bind_addr;

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;
    let state = build_http_state(pool, config).map_err(std::io::Error::other)?;
    let state = web::Data::new(state);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();

    #[cfg(feature = "metrics")]
    let prometheus = make_metrics();

    let server = HttpServer::new(move || {
        let session = session_middleware(key.clone(), cookie_secure);
        let api = web::scope("/api/v1").wrap(session).configure(configure_api);

        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(unsubscribe::unsubscribe_page)
            .service(unsubscribe::unsubscribe_one_click)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?;

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    server.run().await
}

/// Apply pending schema migrations before accepting traffic.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    use diesel::Connection;

    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    for migration in applied {
        info!(%migration, "applied migration");
    }
    Ok(())
}

/// Load the session cookie key, falling back to an ephemeral key only in
/// development builds or when explicitly allowed.
fn load_session_key(key_path: &str, allow_ephemeral: bool) -> std::io::Result<Key> {
    match std::fs::read(key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            if cfg!(debug_assertions) || allow_ephemeral {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    use actix_web_prom::PrometheusMetricsBuilder;

    PrometheusMetricsBuilder::new("poke_community")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}
