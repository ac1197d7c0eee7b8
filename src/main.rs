//! Head-to-head comparison service: binary entrypoint.
//! Boots the Axum HTTP server with the scoring config, the stats provider and
//! the Prometheus exporter.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use h2h_compare::api::{self, AppState};
use h2h_compare::config::ScoringConfig;
use h2h_compare::metrics::Metrics;
use h2h_compare::provider::{HttpStatsProvider, StatsProvider};

/// Compact console logs for local comparison runs. Off unless `H2H_DEV_LOG=1`
/// and the build is a debug build or `SHUTTLE_ENV` names a local/dev stage.
fn enable_dev_tracing() {
    let requested = std::env::var("H2H_DEV_LOG").is_ok_and(|v| v == "1");
    let local_stage = matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    );
    if !requested || !(cfg!(debug_assertions) || local_stage) {
        return;
    }

    // Session fetch/stale events are logged at debug; default to info for the crate.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("h2h_compare=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // STATS_API_BASE_URL / SCORING_CONFIG_PATH may come from a local .env.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = ScoringConfig::load_default()?;

    let provider: Option<Arc<dyn StatsProvider>> = match HttpStatsProvider::from_env() {
        Ok(p) => Some(Arc::new(p)),
        Err(e) => {
            warn!(error = %e, "stats provider disabled; /compare/by-id will answer 503");
            None
        }
    };

    let mut router = api::router(AppState::new(config, provider));

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = %e, "metrics exporter not installed"),
    }

    Ok(router.into())
}
