//! healthgauge demo
//!
//! Runs simulated health checks and serves their gauges for scraping.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        healthgauge demo                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐       │
//! │  │  Simulated   │───▶│   Metrics    │───▶│  /metrics    │       │
//! │  │   Checks     │    │   Listener   │    │  (scrape =   │       │
//! │  │  (tokio)     │    │              │    │   collect)   │       │
//! │  └──────────────┘    └──────────────┘    └──────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use parking_lot::RwLock;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use healthgauge::adapters::PrometheusExporter;
use healthgauge::domain::all_healthy;
use healthgauge::{
    CheckListener, CheckResult, HealthListener, ListenerConfig, MeterRegistry, MetricsListener,
};

type SharedResults = Arc<RwLock<HashMap<String, CheckResult>>>;

// =============================================================================
// CLI Arguments
// =============================================================================

/// healthgauge - health-check results as last-value gauges
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listener configuration file (YAML)
    #[arg(long, env = "HEALTHGAUGE_CONFIG")]
    config: Option<PathBuf>,

    /// Classification tag (liveness, readiness, startup or any custom value)
    #[arg(long, env = "HEALTHGAUGE_CLASSIFICATION")]
    classification: Option<String>,

    /// Number of simulated checks
    #[arg(long, env = "HEALTHGAUGE_CHECKS", default_value = "3")]
    checks: usize,

    /// Check execution period in seconds
    #[arg(long, env = "HEALTHGAUGE_CHECK_INTERVAL_SECONDS", default_value = "10")]
    check_interval_seconds: u64,

    /// Every Nth run of a check fails (0 = never)
    #[arg(long, env = "HEALTHGAUGE_FAIL_EVERY", default_value = "4")]
    fail_every: u64,

    /// Metrics server bind address
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:9464")]
    metrics_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let mut config = match &args.config {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            ListenerConfig::from_yaml_str(&raw)?
        }
        None => ListenerConfig::default(),
    };
    if let Some(classification) = &args.classification {
        config = config.with_classification(classification.as_str());
    }

    info!("Starting healthgauge demo");
    info!("  Checks: {}", args.checks);
    info!("  Check interval: {}s", args.check_interval_seconds);
    info!("  Classification: {:?}", config.classification);

    let meters = Arc::new(MeterRegistry::new("healthgauge"));
    let listener = Arc::new(MetricsListener::new(&meters, config)?);
    let exporter = Arc::new(PrometheusExporter::new(meters.clone())?);
    let results: SharedResults = Arc::new(RwLock::new(HashMap::new()));

    let period = Duration::from_secs(args.check_interval_seconds.max(1));
    for i in 0..args.checks {
        let name = format!("demo.check.{}", i);
        let listener = listener.clone();
        let results = results.clone();
        let fail_every = args.fail_every;
        tokio::spawn(async move {
            run_check(name, period, fail_every, listener, results).await;
        });
    }

    let metrics_addr = args.metrics_addr.clone();
    let server_results = results.clone();
    tokio::spawn(async move {
        if let Err(e) = run_metrics_server(&metrics_addr, exporter, server_results).await {
            error!("Metrics server error: {:#}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    info!("Shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn", level)));

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

// =============================================================================
// Simulated Checks
// =============================================================================

async fn run_check(
    name: String,
    period: Duration,
    fail_every: u64,
    listener: Arc<MetricsListener>,
    results: SharedResults,
) {
    let initial = CheckResult::failing("didn't run yet", Duration::ZERO);
    listener.on_check_registered(&name, &initial);
    results.write().insert(name.clone(), initial);

    let mut ticker = tokio::time::interval(period);
    let mut runs: u64 = 0;

    loop {
        ticker.tick().await;
        runs += 1;

        listener.on_check_started(&name);
        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(25)).await;
        let elapsed = started.elapsed();

        let outcome = if fail_every > 0 && runs % fail_every == 0 {
            CheckResult::failing(format!("simulated failure on run {}", runs), elapsed)
        } else {
            CheckResult::passing(elapsed).with_details(format!("run {}", runs))
        };

        let (result, snapshot) = {
            let mut guard = results.write();
            let result = outcome.following(guard.get(&name));
            guard.insert(name.clone(), result.clone());
            (result, guard.clone())
        };

        listener.on_check_completed(&name, &result);
        listener.on_results_updated(&snapshot);
    }
}

// =============================================================================
// Metrics Server
// =============================================================================

async fn run_metrics_server(
    addr: &str,
    exporter: Arc<PrometheusExporter>,
    results: SharedResults,
) -> anyhow::Result<()> {
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper_util::rt::TokioIo;
    use tokio::net::TcpListener;

    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid metrics server address: {}", addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics server on {}", addr))?;

    info!("Metrics server listening on {}", addr);

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("metrics server accept error")?;

        let io = TokioIo::new(stream);
        let exporter = exporter.clone();
        let results = results.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let exporter = exporter.clone();
                let results = results.clone();
                async move { Ok::<_, Infallible>(handle_request(req, &exporter, &results)) }
            });
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Metrics server connection error: {}", e);
            }
        });
    }
}

fn handle_request(
    req: hyper::Request<hyper::body::Incoming>,
    exporter: &PrometheusExporter,
    results: &SharedResults,
) -> hyper::Response<http_body_util::Full<hyper::body::Bytes>> {
    use hyper::header::{HeaderValue, CONTENT_TYPE};
    use hyper::StatusCode;

    match req.uri().path() {
        "/metrics" => match exporter.scrape() {
            Ok(body) => {
                let mut response = respond(StatusCode::OK, body);
                if let Ok(value) = HeaderValue::from_str(&exporter.content_type()) {
                    response.headers_mut().insert(CONTENT_TYPE, value);
                }
                response
            }
            Err(e) => {
                error!("Scrape failed: {}", e);
                respond(StatusCode::INTERNAL_SERVER_ERROR, "scrape failed")
            }
        },
        "/healthz" => {
            if all_healthy(&results.read()) {
                respond(StatusCode::OK, "ok")
            } else {
                respond(StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
            }
        }
        _ => respond(StatusCode::NOT_FOUND, "not found"),
    }
}

fn respond(
    status: hyper::StatusCode,
    body: impl Into<hyper::body::Bytes>,
) -> hyper::Response<http_body_util::Full<hyper::body::Bytes>> {
    let mut response = hyper::Response::new(http_body_util::Full::new(body.into()));
    *response.status_mut() = status;
    response
}
