//! REST API over [`clinic_db`].
//!
//! [`router`] builds the axum application for any [`ClinicStore`]; [`run`]
//! is the binary entry point (argument parsing, configuration, store
//! selection, migrations and serving).

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

pub use config::{Backend, Settings};
pub use error::{ApiError, ErrorResponse};
pub use handlers::AppState;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, patch};
use clinic_db::{ClinicStore, MemoryStore, PgStore, create_pool_with_config};
use handlers::{appointments, catalog, notifications, patients, prp};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The API router over `store`.
pub fn router<S: ClinicStore + 'static>(store: S) -> Router {
    router_with_state(Arc::new(AppState::new(store)))
}

/// The API router over an existing state, for callers that keep a handle to it.
pub fn router_with_state<S: ClinicStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/patients",
            get(patients::list_patients::<S>).post(patients::create_patient::<S>),
        )
        .route("/api/patients/search", get(patients::search_patients::<S>))
        .route(
            "/api/patients/{id}",
            get(patients::get_patient::<S>)
                .patch(patients::update_patient::<S>)
                .delete(patients::delete_patient::<S>),
        )
        .route("/api/doctors", get(catalog::list_doctors::<S>))
        .route(
            "/api/appointment-types",
            get(catalog::list_appointment_types::<S>),
        )
        .route(
            "/api/appointments",
            get(appointments::list_appointments::<S>)
                .post(appointments::create_appointment::<S>),
        )
        .route(
            "/api/appointments/{id}",
            get(appointments::get_appointment::<S>).patch(appointments::update_appointment::<S>),
        )
        .route("/api/prp-treatments", get(prp::list_prp_treatments::<S>))
        .route("/api/prp-report", get(prp::prp_report::<S>))
        .route(
            "/api/notifications",
            get(notifications::list_notifications::<S>)
                .post(notifications::create_notification::<S>),
        )
        .route(
            "/api/notifications/{id}/read",
            patch(notifications::mark_notification_read::<S>),
        )
        .with_state(state)
}

/// Parse `args`, then serve or migrate.
pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    match cli::parse_args(&args)? {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Serve(args) => {
            let settings = Settings::load(&args.config)?.with_overrides(args.database, args.store)?;
            serve(settings).await
        }
        cli::Command::Migrate(args) => {
            let settings = Settings::load(&args.config)?
                .with_overrides(args.database, Some(Backend::Postgres))?;
            let pool = create_pool_with_config(settings.database_url()?, 1)?;
            let report = clinic_db::migrate::run_pool(&pool).await?;
            println!(
                "applied {} migration(s)",
                report.applied_migrations().len()
            );
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    match settings.store.backend {
        Backend::Memory => {
            tracing::warn!("store: in-memory with seed data; changes are lost on restart");
            serve_store(&settings, MemoryStore::seeded()).await
        }
        Backend::Postgres => {
            let pool = create_pool_with_config(
                settings.database_url()?,
                settings.database.max_pool_size,
            )?;
            if settings.database.run_migrations {
                let report = clinic_db::migrate::run_pool(&pool).await?;
                tracing::info!(
                    applied = report.applied_migrations().len(),
                    "database schema up to date"
                );
            }
            serve_store(&settings, PgStore::new(pool)).await
        }
    }
}

async fn serve_store<S: ClinicStore + 'static>(settings: &Settings, store: S) -> anyhow::Result<()> {
    let app = router(store)
        .layer(cors_layer(&settings.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    tracing::info!(%addr, backend = %settings.store.backend, "clinic server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        tracing::warn!("CORS: permissive. Set server.cors_origins to restrict origins.");
        return CorsLayer::permissive();
    }
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    tracing::info!("CORS: restricted to {} origin(s)", list.len());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
