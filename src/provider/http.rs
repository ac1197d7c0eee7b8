// src/provider/http.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use super::{CompetitorKind, StatsProvider};
use crate::stats::{CompetitorStats, TimeScope};

pub const ENV_STATS_API_BASE_URL: &str = "STATS_API_BASE_URL";
pub const ENV_STATS_API_TOKEN: &str = "STATS_API_TOKEN";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Dashboard stats API client:
/// `GET {base}/api/{drivers|constructors}/{id}/stats[?year=YYYY]`.
pub struct HttpStatsProvider {
    base: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpStatsProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid stats base url {base_url:?}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("stats base url cannot be a base: {base_url}"));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building stats http client")?;
        Ok(Self {
            base,
            token: None,
            client,
        })
    }

    /// Bearer token issued by the auth collaborator.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let t = token.into();
        self.token = (!t.trim().is_empty()).then_some(t);
        self
    }

    /// `STATS_API_BASE_URL` (required) + `STATS_API_TOKEN` (optional).
    pub fn from_env() -> Result<Self> {
        let base = std::env::var(ENV_STATS_API_BASE_URL)
            .map_err(|_| anyhow!("Missing {ENV_STATS_API_BASE_URL} env var"))?;
        let p = Self::new(&base)?;
        Ok(match std::env::var(ENV_STATS_API_TOKEN) {
            Ok(t) => p.with_token(t),
            Err(_) => p,
        })
    }

    pub fn stats_url(&self, kind: CompetitorKind, competitor_id: &str, scope: TimeScope) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segs) = url.path_segments_mut() {
            segs.pop_if_empty()
                .extend(["api", kind.path(), competitor_id, "stats"]);
        }
        if let TimeScope::Year(y) = scope {
            url.query_pairs_mut().append_pair("year", &y.to_string());
        }
        url
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn fetch(
        &self,
        kind: CompetitorKind,
        competitor_id: &str,
        scope: TimeScope,
    ) -> Result<CompetitorStats> {
        let url = self.stats_url(kind, competitor_id, scope);
        let mut req = self.client.get(url.clone());
        if let Some(t) = &self.token {
            req = req.bearer_auth(t);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("stats API error for {} {competitor_id}", kind.path()))?;

        let mut stats: CompetitorStats = resp
            .json()
            .await
            .with_context(|| format!("decoding stats for {} {competitor_id}", kind.path()))?;

        // Older endpoints leave the scope out of the body.
        if stats.time_scope.is_none() {
            stats.time_scope = Some(scope);
        }
        Ok(stats)
    }

    fn name(&self) -> &'static str {
        "HttpStatsProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_year_and_career_urls() {
        let p = HttpStatsProvider::new("http://localhost:3000").unwrap();
        assert_eq!(
            p.stats_url(CompetitorKind::Driver, "44", TimeScope::Year(2023)).as_str(),
            "http://localhost:3000/api/drivers/44/stats?year=2023"
        );
        assert_eq!(
            p.stats_url(CompetitorKind::Constructor, "9", TimeScope::Career).as_str(),
            "http://localhost:3000/api/constructors/9/stats"
        );
    }

    #[test]
    fn keeps_base_path_and_escapes_ids() {
        let p = HttpStatsProvider::new("https://stats.example/v1/").unwrap();
        assert_eq!(
            p.stats_url(CompetitorKind::Driver, "a/b", TimeScope::Career).as_str(),
            "https://stats.example/v1/api/drivers/a%2Fb/stats"
        );
    }

    #[test]
    fn rejects_garbage_base() {
        assert!(HttpStatsProvider::new("not a url").is_err());
        assert!(HttpStatsProvider::new("mailto:ops@example.com").is_err());
    }

    #[test]
    fn blank_token_is_ignored() {
        let p = HttpStatsProvider::new("http://localhost").unwrap().with_token("  ");
        assert!(p.token.is_none());
    }
}
