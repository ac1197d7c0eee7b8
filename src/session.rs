//! # Comparison session
//!
//! Owns the two comparison slots (`A`, `B`), their fetched statistics, and
//! the enabled-metric toggles; exposes the composite score derived from them.
//!
//! Each slot runs its own state machine:
//!
//! ```text
//! Empty -> Loading -> Ready
//!              \--> Failed -(retry)-> Loading
//! ```
//!
//! Fetches run as tokio tasks, one per slot, concurrently. A newer
//! `select()` on a slot aborts the older fetch and bumps the slot generation;
//! a response carrying an old generation is dropped (last selection wins).
//! After `close()` (or drop) nothing is applied any more.

use chrono::Datelike;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ProfileKind, ScoringConfig};
use crate::engine::{aggregate, comparison_view, CompositeScore, ScoringContext};
use crate::metric::{EnabledMetrics, MetricKey};
use crate::provider::{CompetitorKind, StatsProvider};
use crate::stats::{CompetitorStats, TimeScope};
use crate::strength_index::StrengthIndex;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("h2h_fetch_total", "Statistics fetches applied, by outcome.");
        describe_counter!(
            "h2h_fetch_stale_total",
            "Fetch results dropped because a newer selection or teardown superseded them."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::A => "A",
            Slot::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPhase {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub competitor_id: String,
    pub time_scope: TimeScope,
}

/// Read-only copy of one slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub phase: SlotPhase,
    pub selection: Option<Selection>,
    pub stats: Option<CompetitorStats>,
    pub error: Option<String>,
}

#[derive(Default)]
struct SlotEntry {
    snap: SlotSnapshot,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl SlotEntry {
    /// Invalidate whatever is in flight for this slot.
    fn supersede(&mut self) -> u64 {
        self.generation += 1;
        if let Some(t) = self.task.take() {
            t.abort();
        }
        self.generation
    }
}

#[derive(Default)]
struct Inner {
    a: SlotEntry,
    b: SlotEntry,
    enabled: EnabledMetrics,
    // Once the user flips a toggle, defaults stop following the view.
    metrics_touched: bool,
    closed: bool,
}

impl Inner {
    fn entry(&self, slot: Slot) -> &SlotEntry {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }

    fn entry_mut(&mut self, slot: Slot) -> &mut SlotEntry {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }

    fn ready_pair(&self) -> Option<(&CompetitorStats, &CompetitorStats)> {
        match (&self.a.snap, &self.b.snap) {
            (
                SlotSnapshot {
                    phase: SlotPhase::Ready,
                    stats: Some(a),
                    ..
                },
                SlotSnapshot {
                    phase: SlotPhase::Ready,
                    stats: Some(b),
                    ..
                },
            ) => Some((a, b)),
            _ => None,
        }
    }

    fn refresh_default_metrics(&mut self) {
        if self.metrics_touched {
            return;
        }
        if let Some((a, b)) = self.ready_pair() {
            let view = comparison_view(a, b);
            self.enabled = EnabledMetrics::for_view(view);
        }
    }
}

fn lock(m: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ComparisonSession {
    kind: CompetitorKind,
    provider: Arc<dyn StatsProvider>,
    config: ScoringConfig,
    profile: ProfileKind,
    index: &'static StrengthIndex,
    fallback_season: i32,
    inner: Arc<Mutex<Inner>>,
}

impl ComparisonSession {
    /// Head-to-head session against the shipped strength table. The fallback
    /// season for career comparisons is the current calendar year.
    pub fn new(kind: CompetitorKind, provider: Arc<dyn StatsProvider>) -> Self {
        ensure_metrics_described();
        Self {
            kind,
            provider,
            config: ScoringConfig::default(),
            profile: ProfileKind::HeadToHead,
            index: StrengthIndex::shipped(),
            fallback_season: chrono::Utc::now().year(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_profile(mut self, profile: ProfileKind) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_index(mut self, index: &'static StrengthIndex) -> Self {
        self.index = index;
        self
    }

    pub fn with_fallback_season(mut self, season: i32) -> Self {
        self.fallback_season = season;
        self
    }

    pub fn kind(&self) -> CompetitorKind {
        self.kind
    }

    /// Select a competitor for a slot and start fetching its statistics.
    /// A blank id is ignored. Must be called from within a tokio runtime.
    pub fn select(&self, slot: Slot, competitor_id: &str, time_scope: TimeScope) {
        let id = competitor_id.trim();
        if id.is_empty() {
            debug!(slot = slot.as_str(), "blank competitor id, selection ignored");
            return;
        }

        let mut inner = lock(&self.inner);
        if inner.closed {
            debug!(slot = slot.as_str(), "session closed, selection ignored");
            return;
        }

        let entry = inner.entry_mut(slot);
        let generation = entry.supersede();
        entry.snap = SlotSnapshot {
            phase: SlotPhase::Loading,
            selection: Some(Selection {
                competitor_id: id.to_string(),
                time_scope,
            }),
            stats: None,
            error: None,
        };

        info!(
            slot = slot.as_str(),
            competitor = id,
            scope = ?time_scope,
            generation,
            provider = self.provider.name(),
            "fetching competitor stats"
        );

        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.inner);
        let kind = self.kind;
        let id = id.to_string();
        entry.task = Some(tokio::spawn(async move {
            let result = provider.fetch(kind, &id, time_scope).await;
            apply_fetch(&shared, slot, generation, result);
        }));
    }

    /// Multi-year selection: one year keeps that season, anything else
    /// collapses to career totals.
    pub fn select_years(&self, slot: Slot, competitor_id: &str, years: &[i32]) {
        self.select(slot, competitor_id, TimeScope::from_years(years));
    }

    /// Re-issue the stored selection of a failed slot. Returns whether a fetch
    /// was started.
    pub fn retry(&self, slot: Slot) -> bool {
        let selection = {
            let inner = lock(&self.inner);
            let snap = &inner.entry(slot).snap;
            match (snap.phase, &snap.selection) {
                (SlotPhase::Failed, Some(sel)) => sel.clone(),
                _ => return false,
            }
        };
        self.select(slot, &selection.competitor_id, selection.time_scope);
        true
    }

    /// Reset a slot to `Empty`, dropping any in-flight fetch.
    pub fn clear(&self, slot: Slot) {
        let mut inner = lock(&self.inner);
        let entry = inner.entry_mut(slot);
        let generation = entry.supersede();
        entry.snap = SlotSnapshot::default();
        debug!(slot = slot.as_str(), generation, "slot cleared");
    }

    /// Flip one metric; returns its new state.
    pub fn toggle_metric(&self, key: MetricKey) -> bool {
        let mut inner = lock(&self.inner);
        inner.metrics_touched = true;
        let on = inner.enabled.toggle(key);
        debug!(metric = key.as_str(), enabled = on, "metric toggled");
        on
    }

    /// Replace every toggle at once (e.g. restored UI state).
    pub fn set_enabled_metrics(&self, metrics: EnabledMetrics) {
        let mut inner = lock(&self.inner);
        inner.metrics_touched = true;
        inner.enabled = metrics;
    }

    pub fn enabled_metrics(&self) -> EnabledMetrics {
        lock(&self.inner).enabled.clone()
    }

    pub fn slot(&self, slot: Slot) -> SlotSnapshot {
        lock(&self.inner).entry(slot).snap.clone()
    }

    /// Composite score for the current state; empty unless both slots are ready.
    pub fn composite_score(&self) -> CompositeScore {
        let inner = lock(&self.inner);
        let Some((a, b)) = inner.ready_pair() else {
            return CompositeScore::empty();
        };
        let ctx =
            ScoringContext::from_config(&self.config, self.profile, self.index, self.fallback_season);
        aggregate(Some(a), Some(b), &inner.enabled, &ctx)
    }

    /// Wait for every fetch in flight at the time of the call.
    pub async fn settled(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut inner = lock(&self.inner);
            [Slot::A, Slot::B]
                .into_iter()
                .filter_map(|s| inner.entry_mut(s).task.take())
                .collect()
        };
        for h in handles {
            // Aborted fetches resolve to a cancellation error; nothing to report.
            let _ = h.await;
        }
    }

    /// Tear down: abort in-flight fetches and refuse any late result.
    pub fn close(&self) {
        let mut inner = lock(&self.inner);
        if inner.closed {
            return;
        }
        inner.closed = true;
        for s in [Slot::A, Slot::B] {
            inner.entry_mut(s).supersede();
        }
        debug!("comparison session closed");
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }
}

impl Drop for ComparisonSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_fetch(
    shared: &Mutex<Inner>,
    slot: Slot,
    generation: u64,
    result: anyhow::Result<CompetitorStats>,
) {
    let mut inner = lock(shared);
    if inner.closed || inner.entry(slot).generation != generation {
        counter!("h2h_fetch_stale_total").increment(1);
        debug!(slot = slot.as_str(), generation, "stale fetch result dropped");
        return;
    }

    let entry = inner.entry_mut(slot);
    match result {
        Ok(stats) => {
            counter!("h2h_fetch_total", "outcome" => "ok").increment(1);
            debug!(slot = slot.as_str(), generation, competitor = stats.competitor_id, "stats ready");
            entry.snap.stats = Some(stats);
            entry.snap.error = None;
            entry.snap.phase = SlotPhase::Ready;
        }
        Err(e) => {
            counter!("h2h_fetch_total", "outcome" => "error").increment(1);
            let msg = format!("{e:#}");
            warn!(slot = slot.as_str(), generation, error = %msg, "stats fetch failed");
            entry.snap.stats = None;
            entry.snap.error = Some(msg);
            entry.snap.phase = SlotPhase::Failed;
        }
    }
    inner.refresh_default_metrics();
}
