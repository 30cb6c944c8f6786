use crate::cli::ServeArgs;
use crate::infra::{load_snapshot, AppState, InMemoryHackathonRepository};
use crate::routes::with_hackathon_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hackathon_analytics::config::AppConfig;
use hackathon_analytics::error::AppError;
use hackathon_analytics::telemetry;
use hackathon_analytics::workflows::hackathon::HackathonService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.snapshot_path = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = match &config.snapshot_path {
        Some(path) => {
            let snapshot = load_snapshot(path)?;
            info!(
                path = %path.display(),
                events = snapshot.events.len(),
                submissions = snapshot.submissions.len(),
                "seeded repository from snapshot"
            );
            InMemoryHackathonRepository::from_snapshot(snapshot)
        }
        None => {
            warn!("no snapshot configured; starting with an empty repository");
            InMemoryHackathonRepository::default()
        }
    };
    let service = Arc::new(HackathonService::new(Arc::new(repository), config.analytics));

    let app = with_hackathon_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hackathon analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
