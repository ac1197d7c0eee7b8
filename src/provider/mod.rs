// src/provider/mod.rs
//! Statistics collaborator: where competitor records come from.

pub mod fixture;
pub mod http;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::stats::{CompetitorStats, TimeScope};

pub use fixture::FixtureStatsProvider;
pub use http::HttpStatsProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorKind {
    #[default]
    Driver,
    Constructor,
}

impl CompetitorKind {
    /// Collection segment in the stats API path.
    pub fn path(self) -> &'static str {
        match self {
            CompetitorKind::Driver => "drivers",
            CompetitorKind::Constructor => "constructors",
        }
    }
}

/// Fetches one competitor's statistics for a time scope. `scope` is already
/// resolved: a single season or `Career`.
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fetch(
        &self,
        kind: CompetitorKind,
        competitor_id: &str,
        scope: TimeScope,
    ) -> Result<CompetitorStats>;

    fn name(&self) -> &'static str;
}
