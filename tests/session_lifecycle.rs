// tests/session_lifecycle.rs
//
// Slot state machine and fetch ordering, driven by a provider whose responses
// are released by the test through oneshot channels.
//
// Covered:
// - last selection wins on a slot
// - failure in one slot leaves the other alone
// - clear from Loading / Ready / Failed
// - retry only from Failed
// - nothing applied after close() or drop
// - toggles show up on the next composite_score() read
// - year comparisons default fastest_laps off until the user touches it
// - multi-year selections fetch the career record

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::oneshot;

use h2h_compare::provider::{CompetitorKind, StatsProvider};
use h2h_compare::session::{ComparisonSession, Slot, SlotPhase};
use h2h_compare::{CompetitorStats, MetricKey, StatLine, TimeScope};

type Reply = Result<CompetitorStats, String>;

/// Each (id, scope) answers once, when the test sends on the armed channel.
#[derive(Default)]
struct GatedProvider {
    pending: Mutex<HashMap<(String, TimeScope), oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<(String, TimeScope)>>,
}

impl GatedProvider {
    fn arm(&self, id: &str, scope: TimeScope) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .insert((id.to_string(), scope), rx);
        tx
    }

    fn calls(&self) -> Vec<(String, TimeScope)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsProvider for GatedProvider {
    async fn fetch(
        &self,
        _kind: CompetitorKind,
        competitor_id: &str,
        scope: TimeScope,
    ) -> Result<CompetitorStats> {
        let key = (competitor_id.to_string(), scope);
        self.calls.lock().unwrap().push(key.clone());
        let rx = self
            .pending
            .lock()
            .unwrap()
            .remove(&key)
            .ok_or_else(|| anyhow!("unexpected fetch {key:?}"))?;
        match rx.await {
            Ok(Ok(stats)) => Ok(stats),
            Ok(Err(msg)) => Err(anyhow!(msg)),
            Err(_) => Err(anyhow!("gate dropped")),
        }
    }

    fn name(&self) -> &'static str {
        "GatedProvider"
    }
}

fn career(id: i64, wins: f64) -> CompetitorStats {
    CompetitorStats {
        competitor_id: id,
        time_scope: Some(TimeScope::Career),
        team_name: None,
        career: StatLine {
            wins,
            podiums: wins * 2.0,
            points: wins * 25.0,
            races: 50.0,
            ..StatLine::default()
        },
        year_stats: None,
    }
}

fn season(id: i64, year: i32, wins: f64) -> CompetitorStats {
    let line = StatLine {
        wins,
        points: wins * 25.0,
        races: 22.0,
        ..StatLine::default()
    };
    CompetitorStats {
        competitor_id: id,
        time_scope: Some(TimeScope::Year(year)),
        team_name: None,
        career: line.clone(),
        year_stats: Some(line),
    }
}

fn setup() -> (Arc<GatedProvider>, ComparisonSession) {
    let gate = Arc::new(GatedProvider::default());
    let session = ComparisonSession::new(CompetitorKind::Driver, gate.clone() as Arc<dyn StatsProvider>)
        .with_fallback_season(2024);
    (gate, session)
}

async fn wait_for_calls(gate: &GatedProvider, n: usize) {
    while gate.calls().len() < n {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn later_selection_supersedes_in_flight_fetch() {
    let (gate, s) = setup();
    let tx_old = gate.arm("1", TimeScope::Career);
    let tx_new = gate.arm("2", TimeScope::Career);

    s.select(Slot::A, "1", TimeScope::Career);
    wait_for_calls(&gate, 1).await;
    s.select(Slot::A, "2", TimeScope::Career);

    tx_new.send(Ok(career(2, 3.0))).unwrap();
    // The first fetch was aborted; its receiver may already be gone.
    let _ = tx_old.send(Ok(career(1, 9.0)));
    s.settled().await;

    let a = s.slot(Slot::A);
    assert_eq!(a.phase, SlotPhase::Ready);
    assert_eq!(a.stats.unwrap().competitor_id, 2);
    assert_eq!(a.selection.unwrap().competitor_id, "2");
}

#[tokio::test]
async fn failure_stays_in_its_slot() {
    let (gate, s) = setup();
    let tx_a = gate.arm("1", TimeScope::Career);
    let tx_b = gate.arm("2", TimeScope::Career);

    s.select(Slot::A, "1", TimeScope::Career);
    s.select(Slot::B, "2", TimeScope::Career);
    tx_a.send(Ok(career(1, 4.0))).unwrap();
    tx_b.send(Err("stats API unavailable".into())).unwrap();
    s.settled().await;

    assert_eq!(s.slot(Slot::A).phase, SlotPhase::Ready);
    let b = s.slot(Slot::B);
    assert_eq!(b.phase, SlotPhase::Failed);
    assert!(b.error.unwrap().contains("stats API unavailable"));
    assert!(b.stats.is_none());
    assert!(s.composite_score().is_empty());
}

#[tokio::test]
async fn retry_refetches_failed_slot_only() {
    let (gate, s) = setup();
    let tx = gate.arm("7", TimeScope::Year(2021));
    s.select(Slot::B, "7", TimeScope::Year(2021));
    tx.send(Err("timeout".into())).unwrap();
    s.settled().await;
    assert_eq!(s.slot(Slot::B).phase, SlotPhase::Failed);

    let tx = gate.arm("7", TimeScope::Year(2021));
    assert!(s.retry(Slot::B));
    let b = s.slot(Slot::B);
    assert_eq!(b.phase, SlotPhase::Loading);
    assert!(b.error.is_none(), "retry clears the previous error");

    tx.send(Ok(season(7, 2021, 2.0))).unwrap();
    s.settled().await;
    assert_eq!(s.slot(Slot::B).phase, SlotPhase::Ready);

    assert!(!s.retry(Slot::B), "ready slot is not retried");
    assert!(!s.retry(Slot::A), "empty slot is not retried");
}

#[tokio::test]
async fn clear_resets_from_any_state() {
    let (gate, s) = setup();

    // Loading -> Empty; a late answer must not resurrect the slot.
    let tx = gate.arm("1", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    wait_for_calls(&gate, 1).await;
    s.clear(Slot::A);
    let _ = tx.send(Ok(career(1, 1.0)));
    s.settled().await;
    assert_eq!(s.slot(Slot::A), Default::default());

    // Ready -> Empty
    let tx = gate.arm("1", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    tx.send(Ok(career(1, 1.0))).unwrap();
    s.settled().await;
    assert_eq!(s.slot(Slot::A).phase, SlotPhase::Ready);
    s.clear(Slot::A);
    assert_eq!(s.slot(Slot::A), Default::default());

    // Failed -> Empty
    let tx = gate.arm("1", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    tx.send(Err("boom".into())).unwrap();
    s.settled().await;
    assert_eq!(s.slot(Slot::A).phase, SlotPhase::Failed);
    s.clear(Slot::A);
    assert_eq!(s.slot(Slot::A), Default::default());
}

#[tokio::test]
async fn blank_selection_keeps_current_state() {
    let (gate, s) = setup();
    let tx = gate.arm("1", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    tx.send(Ok(career(1, 2.0))).unwrap();
    s.settled().await;

    s.select(Slot::A, "", TimeScope::Career);
    let a = s.slot(Slot::A);
    assert_eq!(a.phase, SlotPhase::Ready);
    assert_eq!(a.stats.unwrap().competitor_id, 1);
    assert_eq!(gate.calls().len(), 1);
}

#[tokio::test]
async fn nothing_applies_after_close() {
    let (gate, s) = setup();
    let tx = gate.arm("1", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    wait_for_calls(&gate, 1).await;

    s.close();
    let _ = tx.send(Ok(career(1, 5.0)));
    s.settled().await;

    let a = s.slot(Slot::A);
    assert_ne!(a.phase, SlotPhase::Ready);
    assert!(a.stats.is_none());
    assert!(s.is_closed());
}

#[tokio::test]
async fn dropping_the_session_cancels_fetches() {
    let (gate, s) = setup();
    let mut tx = gate.arm("1", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    wait_for_calls(&gate, 1).await;

    drop(s);
    tokio::time::timeout(Duration::from_secs(1), tx.closed())
        .await
        .expect("in-flight fetch should be cancelled on drop");
}

#[tokio::test]
async fn toggle_is_visible_on_next_read() {
    let (gate, s) = setup();
    let tx_a = gate.arm("1", TimeScope::Career);
    let tx_b = gate.arm("2", TimeScope::Career);
    s.select(Slot::A, "1", TimeScope::Career);
    s.select(Slot::B, "2", TimeScope::Career);
    tx_a.send(Ok(career(1, 6.0))).unwrap();
    tx_b.send(Ok(career(2, 1.0))).unwrap();
    s.settled().await;

    let before = s.composite_score();
    assert!(before.per_metric.contains_key(&MetricKey::Wins));

    assert!(!s.toggle_metric(MetricKey::Wins));
    let after = s.composite_score();
    assert!(!after.per_metric.contains_key(&MetricKey::Wins));
    assert!(after.score_a.unwrap() < before.score_a.unwrap());

    assert!(s.toggle_metric(MetricKey::Wins));
    assert_eq!(s.composite_score(), before);
}

#[tokio::test]
async fn year_comparison_defaults_follow_view_until_touched() {
    let (gate, s) = setup();
    let tx_a = gate.arm("1", TimeScope::Year(2021));
    let tx_b = gate.arm("2", TimeScope::Year(2021));
    s.select(Slot::A, "1", TimeScope::Year(2021));
    s.select(Slot::B, "2", TimeScope::Year(2021));
    tx_a.send(Ok(season(1, 2021, 10.0))).unwrap();
    tx_b.send(Ok(season(2, 2021, 8.0))).unwrap();
    s.settled().await;

    assert!(!s.enabled_metrics().is_enabled(MetricKey::FastestLaps));
    assert!(s.enabled_metrics().is_enabled(MetricKey::Poles));
    assert!(!s.composite_score().per_metric.contains_key(&MetricKey::FastestLaps));

    assert!(s.toggle_metric(MetricKey::FastestLaps));

    // A fresh pair no longer resets the user's choice.
    let tx_b = gate.arm("3", TimeScope::Year(2021));
    s.select(Slot::B, "3", TimeScope::Year(2021));
    tx_b.send(Ok(season(3, 2021, 1.0))).unwrap();
    s.settled().await;
    assert!(s.enabled_metrics().is_enabled(MetricKey::FastestLaps));
}

#[tokio::test]
async fn multi_year_selection_fetches_career() {
    let (gate, s) = setup();
    let tx = gate.arm("44", TimeScope::Career);
    s.select_years(Slot::A, "44", &[2019, 2020, 2021]);
    tx.send(Ok(career(44, 10.0))).unwrap();
    s.settled().await;

    assert_eq!(gate.calls(), vec![("44".to_string(), TimeScope::Career)]);
    let a = s.slot(Slot::A);
    assert_eq!(a.phase, SlotPhase::Ready);
    assert_eq!(a.selection.unwrap().time_scope, TimeScope::Career);
}
