//! Evidence scoring service: binary entrypoint.
//! Boots the Axum HTTP server with the stance + rubric pipeline and a
//! Prometheus `/metrics` endpoint.

use evidence_scoring_engine::{app, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEV_LOG_VAR: &str = "EVIDENCE_DEV_LOG";
const DEFAULT_LOG_FILTER: &str = "engine=info,stance=info,rubric=debug,config=info,warn";

/// Debug builds, or a Shuttle environment named local/dev/development.
fn running_in_dev() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    let env = std::env::var("SHUTTLE_ENV").unwrap_or_default();
    ["local", "dev", "development"]
        .iter()
        .any(|e| env.eq_ignore_ascii_case(e))
}

/// Compact stdout logs, off unless `EVIDENCE_DEV_LOG=1` in a dev environment.
/// `RUST_LOG` overrides the default filter.
fn enable_dev_tracing() {
    let requested = std::env::var(DEV_LOG_VAR).is_ok_and(|v| v == "1");
    if !requested || !running_in_dev() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // a subscriber may already be set by the host
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env is optional
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let metrics = Metrics::init()?;
    let router = app()?.merge(metrics.router());

    Ok(router.into())
}
