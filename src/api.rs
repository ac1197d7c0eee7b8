use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use metrics::counter;
use tower_http::cors::CorsLayer;

use crate::config::{ProfileKind, ScoringConfig};
use crate::engine::{aggregate, comparison_view, CompositeScore, ScoringContext};
use crate::metric::EnabledMetrics;
use crate::provider::{CompetitorKind, StatsProvider};
use crate::session::{ComparisonSession, Slot, SlotSnapshot};
use crate::stats::{CompetitorStats, TimeScope};
use crate::strength_index::StrengthIndex;

#[derive(Clone)]
pub struct AppState {
    pub index: &'static StrengthIndex,
    pub config: Arc<ScoringConfig>,
    /// Stats collaborator for id-based comparisons; `None` disables that route.
    pub provider: Option<Arc<dyn StatsProvider>>,
}

impl AppState {
    pub fn new(config: ScoringConfig, provider: Option<Arc<dyn StatsProvider>>) -> Self {
        Self {
            index: StrengthIndex::shipped(),
            config: Arc::new(config),
            provider,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/compare", post(compare_stats))
        .route("/compare/by-id", post(compare_by_id))
        .route("/strength", get(strength))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn current_season() -> i32 {
    chrono::Utc::now().year()
}

#[derive(serde::Deserialize)]
struct CompareReq {
    a: Option<CompetitorStats>,
    b: Option<CompetitorStats>,
    #[serde(default)]
    enabled_metrics: Option<EnabledMetrics>,
    #[serde(default)]
    profile: ProfileKind,
    #[serde(default)]
    fallback_season: Option<i32>,
}

async fn compare_stats(
    State(state): State<AppState>,
    Json(body): Json<CompareReq>,
) -> Json<CompositeScore> {
    counter!("h2h_compare_requests_total", "route" => "compare").increment(1);

    let enabled = body.enabled_metrics.unwrap_or_else(|| match (&body.a, &body.b) {
        (Some(a), Some(b)) => EnabledMetrics::for_view(comparison_view(a, b)),
        _ => EnabledMetrics::default(),
    });
    let ctx = ScoringContext::from_config(
        &state.config,
        body.profile,
        state.index,
        body.fallback_season.unwrap_or_else(current_season),
    );
    Json(aggregate(body.a.as_ref(), body.b.as_ref(), &enabled, &ctx))
}

#[derive(serde::Deserialize)]
struct SelectionReq {
    competitor_id: String,
    #[serde(default)]
    time_scope: Option<TimeScope>,
    /// Takes precedence over `time_scope`; more than one year means career.
    #[serde(default)]
    years: Option<Vec<i32>>,
}

impl SelectionReq {
    fn scope(&self) -> TimeScope {
        match (&self.years, self.time_scope) {
            (Some(years), _) => TimeScope::from_years(years),
            (None, Some(s)) => s,
            (None, None) => TimeScope::Career,
        }
    }
}

#[derive(serde::Deserialize)]
struct CompareByIdReq {
    #[serde(default)]
    kind: CompetitorKind,
    a: SelectionReq,
    b: SelectionReq,
    #[serde(default)]
    enabled_metrics: Option<EnabledMetrics>,
    #[serde(default)]
    profile: ProfileKind,
}

#[derive(serde::Serialize)]
struct CompareByIdResp {
    score: CompositeScore,
    enabled_metrics: EnabledMetrics,
    a: SlotSnapshot,
    b: SlotSnapshot,
}

async fn compare_by_id(
    State(state): State<AppState>,
    Json(body): Json<CompareByIdReq>,
) -> Response {
    counter!("h2h_compare_requests_total", "route" => "compare_by_id").increment(1);

    let Some(provider) = state.provider.clone() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "stats provider not configured",
        )
            .into_response();
    };

    let session = ComparisonSession::new(body.kind, provider)
        .with_config(*state.config)
        .with_profile(body.profile)
        .with_index(state.index)
        .with_fallback_season(current_season());

    session.select(Slot::A, &body.a.competitor_id, body.a.scope());
    session.select(Slot::B, &body.b.competitor_id, body.b.scope());
    session.settled().await;

    if let Some(m) = body.enabled_metrics {
        session.set_enabled_metrics(m);
    }

    let resp = CompareByIdResp {
        score: session.composite_score(),
        enabled_metrics: session.enabled_metrics(),
        a: session.slot(Slot::A),
        b: session.slot(Slot::B),
    };
    Json(resp).into_response()
}

#[derive(serde::Serialize)]
struct StrengthOut {
    season: i32,
    team: String,
    team_key: String,
    rating: f64,
}

async fn strength(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<StrengthOut> {
    let team = q.get("team").cloned().unwrap_or_default();
    let season = q
        .get("season")
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or_else(current_season);
    Json(StrengthOut {
        season,
        team_key: state.index.resolve_team_key(&team),
        rating: state.index.lookup(season, &team),
        team,
    })
}
