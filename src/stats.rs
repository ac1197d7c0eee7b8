//! Statistics records handed to the engine by the stats collaborator.
//!
//! The wire shape is snake_case; the camelCase spellings the dashboard API
//! historically returned (`yearStats`, `fastestLaps`, `constructorId`, ...)
//! are accepted as aliases. Every numeric field defaults to `0`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::metric::{MetricKey, StatsView};

/// A single season or the whole career.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum TimeScope {
    Year(i32),
    Career,
}

impl TimeScope {
    /// Multi-year selections collapse to career: one year keeps that year,
    /// anything else (none, or several) becomes `Career`.
    pub fn from_years(years: &[i32]) -> Self {
        match years {
            [y] => TimeScope::Year(*y),
            _ => TimeScope::Career,
        }
    }

    pub fn year(self) -> Option<i32> {
        match self {
            TimeScope::Year(y) => Some(y),
            TimeScope::Career => None,
        }
    }
}

impl TryFrom<Value> for TimeScope {
    type Error = String;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Number(n) => n
                .as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .map(TimeScope::Year)
                .ok_or_else(|| format!("invalid season: {n}")),
            Value::String(s) if s.eq_ignore_ascii_case("career") => Ok(TimeScope::Career),
            Value::String(s) => s
                .trim()
                .parse::<i32>()
                .map(TimeScope::Year)
                .map_err(|_| format!("invalid time scope: {s:?}")),
            other => Err(format!("invalid time scope: {other}")),
        }
    }
}

impl From<TimeScope> for Value {
    fn from(s: TimeScope) -> Self {
        match s {
            TimeScope::Year(y) => Value::from(y),
            TimeScope::Career => Value::from("career"),
        }
    }
}

/// `null` reads as the type's default, same as an absent field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Raw totals for one statistics block (a season or a career).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLine {
    #[serde(deserialize_with = "null_as_default")]
    pub wins: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub podiums: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub points: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub dnfs: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub poles: f64,
    #[serde(alias = "fastestLaps", deserialize_with = "null_as_default")]
    pub fastest_laps: f64,
    #[serde(alias = "sprintWins", deserialize_with = "null_as_default")]
    pub sprint_wins: f64,
    #[serde(alias = "sprintPodiums", deserialize_with = "null_as_default")]
    pub sprint_podiums: f64,
    #[serde(alias = "grandsPrixEntered", deserialize_with = "null_as_default")]
    pub races: f64,
}

impl StatLine {
    pub fn value(&self, key: MetricKey) -> f64 {
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

/// One record per (competitor, time scope).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorStats {
    #[serde(
        default,
        alias = "competitorId",
        alias = "constructorId",
        alias = "driverId",
        deserialize_with = "null_as_default"
    )]
    pub competitor_id: i64,
    #[serde(default, alias = "year")]
    pub time_scope: Option<TimeScope>,
    #[serde(default, alias = "teamName")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub career: StatLine,
    #[serde(default, alias = "yearStats")]
    pub year_stats: Option<StatLine>,
}

impl CompetitorStats {
    pub fn is_year_scoped(&self) -> bool {
        self.year_stats.is_some()
    }

    /// The block to read for `view`. A year view on a record without
    /// `year_stats` reads its career block.
    pub fn line(&self, view: StatsView) -> &StatLine {
        match (view, &self.year_stats) {
            (StatsView::Year, Some(y)) => y,
            _ => &self.career,
        }
    }

    pub fn season(&self) -> Option<i32> {
        self.time_scope.and_then(TimeScope::year)
    }

    /// Team name if present and not blank.
    pub fn team(&self) -> Option<&str> {
        self.team_name
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
