// src/config/scoring.rs
//! Scoring configuration: dampening exponent and underdog multipliers per
//! comparison context, plus metric weights.
//!
//! TOML shape (every field optional):
//! ```toml
//! [head_to_head]
//! alpha = 0.3
//! [head_to_head.underdog]
//! threshold = 0.9
//! wins = 1.5
//! points = 1.5
//! podiums = 1.3
//!
//! [season]
//! alpha = 0.6
//!
//! [weights]
//! wins = 3.0
//! dnfs = 1.0
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::bonus::UnderdogBonus;
use crate::dampen::{HEAD_TO_HEAD_ALPHA, SEASON_ALPHA};
use crate::metric::MetricKey;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";

/// Which named profile a comparison uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    HeadToHead,
    Season,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringProfile {
    pub alpha: f64,
    pub underdog: UnderdogBonus,
}

impl ScoringProfile {
    pub const HEAD_TO_HEAD: ScoringProfile = ScoringProfile {
        alpha: HEAD_TO_HEAD_ALPHA,
        underdog: UnderdogBonus::HEAD_TO_HEAD,
    };

    pub const SEASON: ScoringProfile = ScoringProfile {
        alpha: SEASON_ALPHA,
        underdog: UnderdogBonus::SEASON,
    };
}

/// A profile section as written in TOML. `alpha` is required once the
/// section exists; underdog fields left out keep the values of the profile
/// the section overrides.
#[derive(Debug, Deserialize)]
struct ProfileSection {
    alpha: f64,
    #[serde(default)]
    underdog: UnderdogSection,
}

#[derive(Debug, Default, Deserialize)]
struct UnderdogSection {
    threshold: Option<f64>,
    wins: Option<f64>,
    points: Option<f64>,
    podiums: Option<f64>,
}

impl ProfileSection {
    fn over(self, base: ScoringProfile) -> ScoringProfile {
        let u = self.underdog;
        ScoringProfile {
            alpha: self.alpha,
            underdog: UnderdogBonus {
                threshold: u.threshold.unwrap_or(base.underdog.threshold),
                wins: u.wins.unwrap_or(base.underdog.wins),
                points: u.points.unwrap_or(base.underdog.points),
                podiums: u.podiums.unwrap_or(base.underdog.podiums),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoringFile {
    head_to_head: Option<ProfileSection>,
    season: Option<ProfileSection>,
    #[serde(default)]
    weights: MetricWeights,
}

impl From<ScoringFile> for ScoringConfig {
    fn from(f: ScoringFile) -> Self {
        let over = |section: Option<ProfileSection>, base: ScoringProfile| match section {
            Some(s) => s.over(base),
            None => base,
        };
        Self {
            head_to_head: over(f.head_to_head, ScoringProfile::HEAD_TO_HEAD),
            season: over(f.season, ScoringProfile::SEASON),
            weights: f.weights,
        }
    }
}

/// Importance weight per metric; unspecified keys keep their built-in weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub wins: f64,
    pub podiums: f64,
    pub points: f64,
    pub poles: f64,
    pub fastest_laps: f64,
    pub sprint_wins: f64,
    pub sprint_podiums: f64,
    pub dnfs: f64,
    pub races: f64,
}

impl MetricWeights {
    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Wins => self.wins,
            MetricKey::Podiums => self.podiums,
            MetricKey::Points => self.points,
            MetricKey::Poles => self.poles,
            MetricKey::FastestLaps => self.fastest_laps,
            MetricKey::SprintWins => self.sprint_wins,
            MetricKey::SprintPodiums => self.sprint_podiums,
            MetricKey::Dnfs => self.dnfs,
            MetricKey::Races => self.races,
        }
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            wins: MetricKey::Wins.default_weight(),
            podiums: MetricKey::Podiums.default_weight(),
            points: MetricKey::Points.default_weight(),
            poles: MetricKey::Poles.default_weight(),
            fastest_laps: MetricKey::FastestLaps.default_weight(),
            sprint_wins: MetricKey::SprintWins.default_weight(),
            sprint_podiums: MetricKey::SprintPodiums.default_weight(),
            dnfs: MetricKey::Dnfs.default_weight(),
            races: MetricKey::Races.default_weight(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoringFile")]
pub struct ScoringConfig {
    pub head_to_head: ScoringProfile,
    pub season: ScoringProfile,
    pub weights: MetricWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            head_to_head: ScoringProfile::HEAD_TO_HEAD,
            season: ScoringProfile::SEASON,
            weights: MetricWeights::default(),
        }
    }
}

impl ScoringConfig {
    pub fn profile(&self, kind: ProfileKind) -> ScoringProfile {
        match kind {
            ProfileKind::HeadToHead => self.head_to_head,
            ProfileKind::Season => self.season,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ScoringConfig = toml::from_str(s).context("parsing scoring config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Resolve the config file:
    /// 1) $SCORING_CONFIG_PATH (must exist)
    /// 2) config/scoring.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SCORING_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_SCORING_CONFIG_PATH} points to non-existent path");
            }
            info!(path = %pb.display(), "scoring config loaded from env path");
            return Self::load_from_file(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_SCORING_CONFIG_PATH);
        if default_p.exists() {
            info!(path = %default_p.display(), "scoring config loaded");
            return Self::load_from_file(&default_p);
        }
        info!("no scoring config file, using built-in defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        for (name, p) in [("head_to_head", &self.head_to_head), ("season", &self.season)] {
            if !p.alpha.is_finite() || p.alpha < 0.0 {
                bail!("{name}.alpha must be a finite, non-negative number");
            }
            let u = &p.underdog;
            for v in [u.threshold, u.wins, u.points, u.podiums] {
                if !v.is_finite() || v <= 0.0 {
                    bail!("{name}.underdog values must be finite and positive");
                }
            }
        }
        for k in MetricKey::ALL {
            let w = self.weights.get(k);
            if !w.is_finite() || w < 0.0 {
                bail!("weights.{} must be a finite, non-negative number", k.as_str());
            }
        }
        Ok(())
    }
}
