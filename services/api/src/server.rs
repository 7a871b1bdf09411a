use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryParcelDirectory};
use crate::routes::{app_router, AppServices};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use union_portal::config::AppConfig;
use union_portal::error::AppError;
use union_portal::telemetry;
use union_portal::workflows::parcels::parse_parcel_rows;
use union_portal::workflows::tenancy::UnionId;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    telemetry::init(&config.telemetry)?;

    let parcels = preload_parcels(&args)?;
    let services = AppServices::in_memory(&config.bulk, parcels);

    let (metrics_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let state = AppState {
        readiness: Arc::new(AtomicBool::new(false)),
        metrics: Arc::new(metrics_handle),
    };
    let app = app_router(&services)
        .layer(Extension(state.clone()))
        .layer(metrics_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    state.readiness.store(true, Ordering::Release);
    info!(
        environment = ?config.environment,
        %addr,
        batch_size = config.bulk.batch_size,
        "union portal listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Seed the parcel directory from `--parcels` when given.
fn preload_parcels(args: &ServeArgs) -> Result<InMemoryParcelDirectory, AppError> {
    let directory = InMemoryParcelDirectory::default();
    let Some(path) = &args.parcels else {
        return Ok(directory);
    };

    let union_id = UnionId::new(args.union.clone());
    let rows = parse_parcel_rows(File::open(path)?)?;
    let loaded = directory.load(union_id.clone(), rows);
    info!(union = %union_id, parcels = loaded, path = %path.display(), "parcel table loaded");
    Ok(directory)
}
