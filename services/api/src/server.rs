use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReadingRepository, InMemorySubjectRepository};
use crate::routes::with_monitoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cardio_guard::config::AppConfig;
use cardio_guard::error::AppError;
use cardio_guard::monitoring::{
    channel_from_config, AuditLogger, FileAuditLog, MonitoringService, NotificationDispatcher,
    RuleEngine, RuleThresholds,
};
use cardio_guard::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let channel = channel_from_config(config.sms.as_ref())?;
    info!(channel = channel.name(), "notification channel selected");

    let audit_sink = Arc::new(FileAuditLog::new(config.storage.audit_log_path.clone()));
    let monitoring_service = Arc::new(MonitoringService::new(
        Arc::new(InMemorySubjectRepository::default()),
        Arc::new(InMemoryReadingRepository::default()),
        RuleEngine::new(RuleThresholds::default()),
        NotificationDispatcher::new(channel),
        AuditLogger::new(audit_sink),
        config.storage.history_limit,
    ));

    let app = with_monitoring_routes(monitoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        audit_log = %config.storage.audit_log_path.display(),
        "cardio guard monitor ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
