//! `platform-gateway run`: start the gateway.
//!
//! Resolves configuration (defaults, file, environment, CLI flags),
//! starts the Axum HTTP server with graceful shutdown, and runs the
//! startup backend self-check in the background.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::{self, model::Config, validation};
use crate::error::GatewayError;
use crate::failure::{AlertNotifier, NoopNotifier};
use crate::health::{self, RetryPolicy};
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), GatewayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let (mut config, origin) =
        config::resolve(args.config.as_deref(), |var| std::env::var(var).ok()).await?;
    apply_cli_overrides(&mut config, &args)?;

    let notifier = build_notifier(&args);
    let state = Arc::new(AppState::with_notifier(
        &config,
        server::build_http_client(),
        notifier,
    ));

    if !args.no_self_check {
        let prober = state
            .prober
            .with_policy(RetryPolicy::no_backoff(config.health.startup_retries));
        let routes = state.routes.entries().to_vec();
        tokio::spawn(health::startup_self_check(prober, routes));
    }

    let router = server::build_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        config = %origin,
        routes = state.routes.len(),
        timeout_secs = config.proxy.timeout_secs,
        failure_threshold = config.failures.threshold,
        "gateway started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!(
        uptime_secs = state.start_time.elapsed().as_secs(),
        "gateway stopped"
    );
    Ok(())
}

fn apply_cli_overrides(config: &mut Config, args: &RunArgs) -> Result<(), GatewayError> {
    if let Some(timeout) = args.timeout {
        config.proxy.timeout_secs = timeout;
    }
    if let Some(max_body) = args.max_body {
        config.proxy.max_body = max_body;
    }
    if let Some(threshold) = args.failure_threshold {
        config.failures.threshold = threshold;
    }
    validation::validate(config).map_err(|errors| GatewayError::ConfigValidation { errors })
}

#[cfg(feature = "sentry-integration")]
fn build_notifier(args: &RunArgs) -> Arc<dyn AlertNotifier> {
    if args.sentry_dsn.is_some() {
        Arc::new(crate::sentry_integration::SentryNotifier)
    } else {
        Arc::new(NoopNotifier)
    }
}

#[cfg(not(feature = "sentry-integration"))]
fn build_notifier(_args: &RunArgs) -> Arc<dyn AlertNotifier> {
    Arc::new(NoopNotifier)
}
