//! Season/episode sequence validation
//!
//! Identifiers are grouped per show and walked in season order against a
//! running expectation. Episode numbering may either continue across seasons
//! (S02E13 follows S01E12) or restart at 1 each season; a season whose first
//! episode is 1 is shifted onto the running counter so both conventions pass.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::filename::Identifier;

/// A deviation from strictly sequential numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    MissingOrOutOfOrderSeason {
        show: String,
        expected: u32,
        actual: u32,
    },
    MissingOrOutOfOrderEpisode {
        show: String,
        season: u32,
        expected: u32,
        actual: u32,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MissingOrOutOfOrderSeason { show, expected, actual } => {
                write!(f, "{}: expected season {}, got {}", show, expected, actual)
            }
            Anomaly::MissingOrOutOfOrderEpisode { show, season, expected, actual } => {
                write!(f, "{} (S{}): expected episode {}, got {}", show, season, expected, actual)
            }
        }
    }
}

/// Episodes observed for one show, keyed by season
#[derive(Debug, Clone, Default)]
pub struct ShowGroup {
    seasons: BTreeMap<u32, BTreeSet<u32>>,
}

/// One season's sorted, unique episode numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonReport {
    pub season: u32,
    pub episodes: Vec<u32>,
}

impl ShowGroup {
    /// Record an episode; returns false if it was already present
    pub fn insert(&mut self, season: u32, episode: u32) -> bool {
        self.seasons.entry(season).or_default().insert(episode)
    }

    /// Seasons in ascending order, each with ascending episodes
    pub fn season_reports(&self) -> Vec<SeasonReport> {
        self.seasons
            .iter()
            .map(|(&season, episodes)| SeasonReport {
                season,
                episodes: episodes.iter().copied().collect(),
            })
            .collect()
    }
}

/// Running expectation threaded through one show's walk
#[derive(Debug, Clone, Copy)]
struct Expectation {
    season: u32,
    episode: u32,
}

impl Default for Expectation {
    fn default() -> Self {
        Self { season: 1, episode: 1 }
    }
}

/// Group identifiers by show title
pub fn group_by_show<'a, I>(identifiers: I) -> BTreeMap<String, ShowGroup>
where
    I: IntoIterator<Item = &'a Identifier>,
{
    let mut shows: BTreeMap<String, ShowGroup> = BTreeMap::new();

    for id in identifiers {
        let fresh = shows
            .entry(id.show_title.clone())
            .or_default()
            .insert(id.season, id.episode);
        if !fresh {
            debug!("Duplicate episode merged: {} S{}E{}", id.show_title, id.season, id.episode);
        }
    }

    shows
}

/// Check every show for season and episode gaps.
///
/// Shows are reported in ascending title order; within a show anomalies follow
/// the season/episode walk.
pub fn validate(identifiers: &[Identifier]) -> Vec<Anomaly> {
    let shows = group_by_show(identifiers);
    debug!("Validating {} shows from {} identifiers", shows.len(), identifiers.len());

    shows
        .iter()
        .flat_map(|(show, group)| validate_show(show, &group.season_reports()))
        .collect()
}

/// Walk one show's seasons, already sorted by season number
pub fn validate_show(show: &str, seasons: &[SeasonReport]) -> Vec<Anomaly> {
    let (_, anomalies) = seasons.iter().fold(
        (Expectation::default(), Vec::new()),
        |(mut expected, mut anomalies), report| {
            let Some(&first) = report.episodes.first() else {
                expected.season += 1;
                return (expected, anomalies);
            };

            // A season restarting at 1 is shifted onto the cumulative counter
            let offset = if first == 1 { expected.episode - 1 } else { 0 };

            if report.season != expected.season {
                anomalies.push(Anomaly::MissingOrOutOfOrderSeason {
                    show: show.to_string(),
                    expected: expected.season,
                    actual: report.season,
                });
            }

            for &episode in &report.episodes {
                let adjusted = episode.saturating_add(offset);
                if adjusted != expected.episode {
                    anomalies.push(Anomaly::MissingOrOutOfOrderEpisode {
                        show: show.to_string(),
                        season: report.season,
                        expected: expected.episode,
                        actual: adjusted,
                    });
                }
                expected.episode += 1;
            }

            expected.season += 1;
            (expected, anomalies)
        },
    );

    anomalies
}
