//! # Strength Index
//!
//! Historical season x team equipment ratings ("constructor strength index").
//! A rating describes how strong a car was in a given season:
//!
//! - 1.30-1.40: dominant (Red Bull 2010-2013, Mercedes 2014-2020)
//! - 1.10-1.20: strong contenders
//! - 0.90-1.00: midfield
//! - 0.75-0.85: backmarkers
//! - 0.65-0.70: tail-end / newcomers
//!
//! Display names coming from the stats collaborator are resolved through an
//! alias table; unknown names are slugged (`"Haas F1 Team"` -> `haas_f1_team`)
//! and anything missing from the table rates a neutral `1.0`.
//! Lookups never fail.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const NEUTRAL_RATING: f64 = 1.0;
pub const MIN_RATING: f64 = 0.6;
pub const MAX_RATING: f64 = 1.6;

static SHIPPED: Lazy<StrengthIndex> = Lazy::new(StrengthIndex::default_seed);

#[derive(Debug, Clone, Default)]
pub struct StrengthIndex {
    ratings: HashMap<i32, HashMap<String, f64>>,
    aliases: HashMap<String, String>,
}

impl StrengthIndex {
    /// Process-wide table, built on first use and never mutated.
    pub fn shipped() -> &'static StrengthIndex {
        &SHIPPED
    }

    /// Build from explicit rows; used for custom tables in tests and tools.
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = (i32, &'a str, f64)>,
        aliases: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut idx = Self::default();
        for (season, team, rating) in rows {
            idx.ratings
                .entry(season)
                .or_default()
                .insert(team.to_string(), rating);
        }
        for (display, key) in aliases {
            idx.aliases.insert(display.to_string(), key.to_string());
        }
        idx
    }

    /// Rating for a team display name in a season.
    pub fn lookup(&self, season: i32, team_display_name: &str) -> f64 {
        let key = self.resolve_team_key(team_display_name);
        self.rating(season, &key)
    }

    /// Rating for an already-canonical team key.
    pub fn rating(&self, season: i32, team_key: &str) -> f64 {
        self.ratings
            .get(&season)
            .and_then(|teams| teams.get(team_key))
            .map(|&r| clamp_rating(r))
            .unwrap_or(NEUTRAL_RATING)
    }

    /// Exact (case-sensitive) alias match first, otherwise the name's slug.
    pub fn resolve_team_key(&self, display_name: &str) -> String {
        match self.aliases.get(display_name) {
            Some(key) => key.clone(),
            None => slug(display_name),
        }
    }

    pub fn has_season(&self, season: i32) -> bool {
        self.ratings.contains_key(&season)
    }

    pub fn season_count(&self) -> usize {
        self.ratings.len()
    }

    pub(crate) fn default_seed() -> Self {
        Self::from_rows(
            SEASONS.iter().flat_map(|(season, teams)| {
                teams.iter().map(move |&(team, r)| (*season, team, r))
            }),
            ALIASES.iter().copied(),
        )
    }
}

/// Lowercase, whitespace runs -> `_`.
fn slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Clamp to [0.6, 1.6] so a data-entry slip cannot produce an extreme multiplier.
fn clamp_rating(r: f64) -> f64 {
    if r.is_nan() {
        NEUTRAL_RATING
    } else {
        r.clamp(MIN_RATING, MAX_RATING)
    }
}

type SeasonRow = (i32, &'static [(&'static str, f64)]);

const SEASONS: &[SeasonRow] = &[
    (2000, &[("ferrari", 1.35), ("mclaren", 1.20), ("williams", 1.00), ("benetton", 0.90), ("jaguar", 0.85), ("sauber", 0.85), ("jordan", 0.90), ("arrows", 0.80), ("prost", 0.75), ("minardi", 0.70)]),
    (2001, &[("ferrari", 1.35), ("mclaren", 1.15), ("williams", 1.10), ("sauber", 0.90), ("jordan", 0.85), ("bar", 0.85), ("jaguar", 0.80), ("arrows", 0.75), ("prost", 0.70), ("minardi", 0.70)]),
    (2002, &[("ferrari", 1.40), ("williams", 1.15), ("mclaren", 1.10), ("renault", 1.00), ("sauber", 0.90), ("jordan", 0.85), ("bar", 0.85), ("jaguar", 0.80), ("arrows", 0.75), ("minardi", 0.70)]),
    (2003, &[("ferrari", 1.30), ("williams", 1.20), ("mclaren", 1.10), ("renault", 1.00), ("sauber", 0.90), ("jordan", 0.85), ("bar", 0.90), ("jaguar", 0.85), ("minardi", 0.70)]),
    (2004, &[("ferrari", 1.40), ("renault", 1.10), ("bar", 1.10), ("williams", 1.00), ("mclaren", 0.95), ("sauber", 0.90), ("toyota", 0.85), ("jaguar", 0.85), ("jordan", 0.75), ("minardi", 0.70)]),
    (2005, &[("renault", 1.30), ("mclaren", 1.25), ("ferrari", 1.00), ("toyota", 1.00), ("williams", 0.95), ("bar", 0.90), ("sauber", 0.90), ("red_bull", 0.85), ("jordan", 0.75), ("minardi", 0.70)]),
    (2006, &[("renault", 1.30), ("ferrari", 1.25), ("mclaren", 1.05), ("honda", 1.00), ("bmw_sauber", 0.95), ("toyota", 0.90), ("red_bull", 0.85), ("williams", 0.85), ("toro_rosso", 0.80), ("spyker", 0.70)]),
    (2007, &[("ferrari", 1.30), ("mclaren", 1.30), ("bmw_sauber", 1.10), ("renault", 1.00), ("williams", 0.95), ("red_bull", 0.90), ("toyota", 0.85), ("toro_rosso", 0.80), ("honda", 0.75), ("spyker", 0.70)]),
    (2008, &[("ferrari", 1.25), ("mclaren", 1.25), ("bmw_sauber", 1.10), ("renault", 1.00), ("toyota", 0.95), ("toro_rosso", 0.90), ("red_bull", 0.90), ("williams", 0.85), ("honda", 0.75), ("force_india", 0.70)]),
    (2009, &[("brawn", 1.35), ("red_bull", 1.25), ("mclaren", 1.00), ("ferrari", 1.00), ("toyota", 1.00), ("williams", 0.95), ("bmw_sauber", 0.90), ("renault", 0.85), ("toro_rosso", 0.80), ("force_india", 0.75)]),
    (2010, &[("red_bull", 1.35), ("mclaren", 1.20), ("ferrari", 1.15), ("mercedes", 0.95), ("renault", 0.90), ("williams", 0.85), ("force_india", 0.85), ("sauber", 0.80), ("toro_rosso", 0.80), ("lotus", 0.70), ("virgin", 0.70), ("hrt", 0.65)]),
    (2011, &[("red_bull", 1.35), ("mclaren", 1.20), ("ferrari", 1.10), ("mercedes", 0.95), ("renault", 0.90), ("force_india", 0.85), ("sauber", 0.85), ("toro_rosso", 0.80), ("williams", 0.75), ("lotus", 0.70), ("virgin", 0.70), ("hrt", 0.65)]),
    (2012, &[("red_bull", 1.30), ("ferrari", 1.15), ("mclaren", 1.15), ("lotus", 1.10), ("mercedes", 0.95), ("sauber", 0.90), ("force_india", 0.90), ("williams", 0.90), ("toro_rosso", 0.80), ("caterham", 0.70), ("marussia", 0.70), ("hrt", 0.65)]),
    (2013, &[("red_bull", 1.35), ("mercedes", 1.15), ("ferrari", 1.10), ("lotus", 1.05), ("mclaren", 0.90), ("force_india", 0.90), ("sauber", 0.85), ("toro_rosso", 0.85), ("williams", 0.80), ("caterham", 0.70), ("marussia", 0.70)]),
    (2014, &[("mercedes", 1.40), ("red_bull", 1.20), ("williams", 1.10), ("ferrari", 1.00), ("force_india", 0.95), ("mclaren", 0.95), ("toro_rosso", 0.85), ("lotus", 0.80), ("sauber", 0.80), ("marussia", 0.75), ("caterham", 0.70)]),
    (2015, &[("mercedes", 1.40), ("ferrari", 1.20), ("williams", 1.00), ("red_bull", 0.95), ("force_india", 0.95), ("toro_rosso", 0.90), ("lotus", 0.85), ("sauber", 0.80), ("mclaren", 0.75), ("manor", 0.70)]),
    (2016, &[("mercedes", 1.40), ("red_bull", 1.20), ("ferrari", 1.10), ("force_india", 0.95), ("williams", 0.95), ("toro_rosso", 0.90), ("mclaren", 0.85), ("haas", 0.85), ("renault", 0.80), ("sauber", 0.75), ("manor", 0.70)]),
    (2017, &[("mercedes", 1.35), ("ferrari", 1.25), ("red_bull", 1.20), ("force_india", 0.95), ("williams", 0.90), ("renault", 0.90), ("toro_rosso", 0.85), ("haas", 0.85), ("mclaren", 0.80), ("sauber", 0.75)]),
    (2018, &[("mercedes", 1.35), ("ferrari", 1.30), ("red_bull", 1.20), ("renault", 1.00), ("haas", 0.95), ("force_india", 0.95), ("mclaren", 0.85), ("sauber", 0.85), ("toro_rosso", 0.80), ("williams", 0.70)]),
    (2019, &[("mercedes", 1.40), ("ferrari", 1.25), ("red_bull", 1.20), ("mclaren", 1.00), ("renault", 0.95), ("toro_rosso", 0.90), ("racing_point", 0.90), ("alfa_romeo", 0.85), ("haas", 0.80), ("williams", 0.70)]),
    (2020, &[("mercedes", 1.40), ("red_bull", 1.25), ("mclaren", 1.05), ("racing_point", 1.05), ("renault", 1.00), ("ferrari", 0.90), ("alpha_tauri", 0.90), ("alfa_romeo", 0.80), ("haas", 0.75), ("williams", 0.70)]),
    (2021, &[("mercedes", 1.35), ("red_bull", 1.35), ("ferrari", 1.10), ("mclaren", 1.05), ("alpine", 0.95), ("alpha_tauri", 0.95), ("aston_martin", 0.90), ("williams", 0.80), ("alfa_romeo", 0.75), ("haas", 0.70)]),
    (2022, &[("red_bull", 1.35), ("ferrari", 1.25), ("mercedes", 1.15), ("alpine", 1.00), ("mclaren", 0.95), ("alfa_romeo", 0.90), ("aston_martin", 0.90), ("haas", 0.85), ("alpha_tauri", 0.85), ("williams", 0.75)]),
    (2023, &[("red_bull", 1.40), ("mercedes", 1.10), ("ferrari", 1.10), ("mclaren", 1.05), ("aston_martin", 1.00), ("alpine", 0.90), ("williams", 0.85), ("alpha_tauri", 0.85), ("alfa_romeo", 0.80), ("haas", 0.75)]),
    (2024, &[("red_bull", 1.30), ("mclaren", 1.15), ("ferrari", 1.10), ("mercedes", 1.00), ("aston_martin", 0.95), ("rb", 0.90), ("haas", 0.85), ("williams", 0.85), ("sauber", 0.80), ("alpine", 0.80)]),
    (2025, &[("mclaren", 1.35), ("red_bull", 1.12), ("mercedes", 1.12), ("ferrari", 1.00), ("aston_martin", 0.95), ("rb", 0.90), ("alpine", 0.85), ("williams", 0.85), ("haas", 0.82), ("sauber", 0.80)]),
];

const ALIASES: &[(&str, &str)] = &[
    ("Red Bull Racing", "red_bull"),
    ("Red Bull", "red_bull"),
    ("Mercedes", "mercedes"),
    ("Ferrari", "ferrari"),
    ("McLaren", "mclaren"),
    ("Aston Martin", "aston_martin"),
    ("Alpine", "alpine"),
    ("AlphaTauri", "alpha_tauri"),
    ("RB", "rb"),
    ("Williams", "williams"),
    ("Haas F1 Team", "haas"),
    ("Haas", "haas"),
    ("Sauber", "sauber"),
    ("Alfa Romeo", "alfa_romeo"),
    ("Force India", "force_india"),
    ("Racing Point", "racing_point"),
    ("Lotus", "lotus"),
    ("Toro Rosso", "toro_rosso"),
    ("BMW Sauber", "bmw_sauber"),
    ("Honda", "honda"),
    ("Toyota", "toyota"),
    ("Renault", "renault"),
    ("BAR", "bar"),
    ("Jaguar", "jaguar"),
    ("Jordan", "jordan"),
    ("Arrows", "arrows"),
    ("Prost", "prost"),
    ("Minardi", "minardi"),
    ("Brawn", "brawn"),
    ("Virgin", "virgin"),
    ("HRT", "hrt"),
    ("Caterham", "caterham"),
    ("Marussia", "marussia"),
    ("Manor", "manor"),
    ("Spyker", "spyker"),
    ("Benetton", "benetton"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn idx() -> &'static StrengthIndex {
        StrengthIndex::shipped()
    }

    #[test]
    fn alias_match() {
        assert!((idx().lookup(2023, "Red Bull Racing") - 1.40).abs() < 1e-9);
        assert!((idx().lookup(2016, "Haas F1 Team") - 0.85).abs() < 1e-9);
    }

    #[test]
    fn unknown_team_or_season_is_neutral() {
        assert_eq!(idx().lookup(2023, "Unknown Team"), NEUTRAL_RATING);
        assert_eq!(idx().lookup(1950, "Ferrari"), NEUTRAL_RATING);
        assert_eq!(idx().lookup(2031, "Red Bull Racing"), NEUTRAL_RATING);
    }

    #[test]
    fn unmapped_names_are_slugged() {
        assert_eq!(idx().resolve_team_key("Aston   Martin F1"), "aston_martin_f1");
        // Not an alias (case differs), but the slug lands on the same key.
        assert_eq!(idx().resolve_team_key("ferrari"), "ferrari");
        assert!((idx().lookup(2019, "Racing point") - 0.90).abs() < 1e-9);
    }

    #[test]
    fn alias_match_is_case_sensitive() {
        // "red bull racing" misses the alias and slugs to a key not in the table.
        assert_eq!(idx().resolve_team_key("red bull racing"), "red_bull_racing");
        assert_eq!(idx().lookup(2023, "red bull racing"), NEUTRAL_RATING);
    }

    #[test]
    fn stored_values_are_clamped() {
        let t = StrengthIndex::from_rows(
            [(2030, "rocket", 3.0), (2030, "brick", 0.1)],
            [("Rocket Racing", "rocket")],
        );
        assert_eq!(t.lookup(2030, "Rocket Racing"), MAX_RATING);
        assert_eq!(t.lookup(2030, "Brick"), MIN_RATING);
    }

    #[test]
    fn shipped_table_covers_2000_to_2025() {
        for season in 2000..=2025 {
            assert!(idx().has_season(season), "missing season {season}");
        }
        assert_eq!(idx().season_count(), 26);
    }
}
