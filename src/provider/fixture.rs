// src/provider/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use super::{CompetitorKind, StatsProvider};
use crate::stats::{CompetitorStats, TimeScope};

/// In-memory provider keyed by `(kind, id, scope)`. Used for local runs
/// without a stats API and in tests.
#[derive(Debug, Default, Clone)]
pub struct FixtureStatsProvider {
    records: HashMap<(CompetitorKind, String, TimeScope), CompetitorStats>,
}

impl FixtureStatsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        kind: CompetitorKind,
        competitor_id: &str,
        scope: TimeScope,
        stats: CompetitorStats,
    ) -> Self {
        self.insert(kind, competitor_id, scope, stats);
        self
    }

    pub fn insert(
        &mut self,
        kind: CompetitorKind,
        competitor_id: &str,
        scope: TimeScope,
        stats: CompetitorStats,
    ) {
        self.records
            .insert((kind, competitor_id.to_string(), scope), stats);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl StatsProvider for FixtureStatsProvider {
    async fn fetch(
        &self,
        kind: CompetitorKind,
        competitor_id: &str,
        scope: TimeScope,
    ) -> Result<CompetitorStats> {
        self.records
            .get(&(kind, competitor_id.to_string(), scope))
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "no stats for {} {competitor_id} ({scope:?})",
                    kind.path()
                )
            })
    }

    fn name(&self) -> &'static str {
        "FixtureStatsProvider"
    }
}
