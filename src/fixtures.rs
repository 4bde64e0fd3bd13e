use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::http_cache::HttpCache;
use crate::http_client::http_client;
use crate::json::{is_blank_body, pick_string, pick_u32};
use crate::score::ScoreLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Competition {
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
}

pub const COMPETITIONS: &[Competition] = &[
    Competition {
        code: "EPL",
        name: "Premier League",
        country: "England",
    },
    Competition {
        code: "ESP",
        name: "La Liga",
        country: "Spain",
    },
    Competition {
        code: "ITSA",
        name: "Serie A",
        country: "Italy",
    },
    Competition {
        code: "DEB",
        name: "Bundesliga",
        country: "Germany",
    },
    Competition {
        code: "MLS",
        name: "Major League Soccer",
        country: "USA",
    },
    Competition {
        code: "FRL1",
        name: "Ligue 1",
        country: "France",
    },
    Competition {
        code: "CWC",
        name: "FIFA Club World Cup",
        country: "International",
    },
    Competition {
        code: "UCL",
        name: "UEFA Champions League",
        country: "Europe",
    },
];

pub fn competition_by_code(code: &str) -> Option<&'static Competition> {
    COMPETITIONS
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureMatch {
    pub game_id: u64,
    pub competition: String,
    pub season: Option<u32>,
    pub status: String,
    pub is_closed: bool,
    pub date_time: Option<String>,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_key: String,
    pub away_team_key: String,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
    pub group: Option<String>,
    pub winner: Option<String>,
    pub updated: Option<String>,
    pub home_team_logo: Option<String>,
    pub away_team_logo: Option<String>,
}

impl FixtureMatch {
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        self.date_time.as_deref().and_then(parse_kickoff)
    }

    pub fn is_live(&self) -> bool {
        self.status.eq_ignore_ascii_case("InProgress")
    }

    pub fn is_final(&self) -> bool {
        self.is_closed || self.status.eq_ignore_ascii_case("Final")
    }

    /// Replaces the listed score with one derived from the box score goals.
    pub fn apply_score(&mut self, score: &ScoreLine) {
        self.home_team_score = Some(score.home_score as u32);
        self.away_team_score = Some(score.away_score as u32);
    }

    pub fn score_text(&self) -> String {
        match (self.home_team_score, self.away_team_score) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => "-".to_string(),
        }
    }
}

pub fn parse_matches_json(raw: &str, competition: &str) -> Result<Vec<FixtureMatch>> {
    if is_blank_body(raw) {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(raw.trim()).context("invalid matches json")?;
    let Some(list) = root.as_array() else {
        return Ok(Vec::new());
    };
    Ok(list
        .iter()
        .filter_map(|entry| parse_match(entry, competition))
        .collect())
}

fn parse_match(value: &Value, competition: &str) -> Option<FixtureMatch> {
    let game_id = value.get("GameId").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
    })?;
    Some(FixtureMatch {
        game_id,
        competition: competition.to_string(),
        season: pick_u32(value, &["Season"]),
        status: pick_string(value, &["Status"]).unwrap_or_else(|| "Scheduled".to_string()),
        is_closed: value
            .get("IsClosed")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        date_time: pick_string(value, &["DateTime", "Date"]),
        home_team_name: pick_string(value, &["HomeTeamName", "HomeTeam"]).unwrap_or_default(),
        away_team_name: pick_string(value, &["AwayTeamName", "AwayTeam"]).unwrap_or_default(),
        home_team_key: pick_string(value, &["HomeTeamKey"]).unwrap_or_default(),
        away_team_key: pick_string(value, &["AwayTeamKey"]).unwrap_or_default(),
        home_team_score: pick_u32(value, &["HomeTeamScore"]),
        away_team_score: pick_u32(value, &["AwayTeamScore"]),
        group: pick_string(value, &["Group"]),
        winner: pick_string(value, &["Winner"]),
        updated: pick_string(value, &["Updated"]),
        home_team_logo: pick_string(value, &["HomeTeamLogo"]),
        away_team_logo: pick_string(value, &["AwayTeamLogo"]),
    })
}

/// Kick-off times are read as wall-clock values; any offset is dropped.
pub fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    let trimmed = trimmed.trim_end_matches('Z');
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn matches_on_date(matches: &[FixtureMatch], date: NaiveDate) -> Vec<FixtureMatch> {
    let picked = matches
        .iter()
        .filter(|m| m.kickoff().map(|k| k.date()) == Some(date))
        .cloned()
        .collect();
    dedup_and_sort(picked)
}

/// Matches from `past_days` before `today` through `future_days` after it.
pub fn recent_matches(
    matches: &[FixtureMatch],
    today: NaiveDate,
    past_days: u32,
    future_days: u32,
) -> Vec<FixtureMatch> {
    let from = today - ChronoDuration::days(past_days as i64);
    let to = today + ChronoDuration::days(future_days as i64);
    let picked = matches
        .iter()
        .filter(|m| {
            m.kickoff()
                .map(|k| (from..=to).contains(&k.date()))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    dedup_and_sort(picked)
}

/// Today's matches that are in progress or still to start.
pub fn live_matches(matches: &[FixtureMatch], today: NaiveDate) -> Vec<FixtureMatch> {
    matches_on_date(matches, today)
        .into_iter()
        .filter(|m| m.is_live() || m.status.eq_ignore_ascii_case("Scheduled"))
        .collect()
}

/// Keeps the first occurrence of each game id, then orders by kick-off.
/// Matches without a parsable kick-off go last.
pub fn dedup_and_sort(matches: Vec<FixtureMatch>) -> Vec<FixtureMatch> {
    let mut seen = HashSet::new();
    let mut unique: Vec<FixtureMatch> = matches
        .into_iter()
        .filter(|m| seen.insert(m.game_id))
        .collect();
    unique.sort_by(|a, b| match (a.kickoff(), b.kickoff()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    unique
}

pub fn matches_url(config: &Config, competition: &str) -> String {
    format!(
        "{}/{}.json",
        config.matches_base_url.trim_end_matches('/'),
        competition.trim().to_uppercase()
    )
}

pub fn fetch_competition_matches(
    cache: &HttpCache,
    config: &Config,
    competition: &str,
) -> Result<Vec<FixtureMatch>> {
    let client = http_client()?;
    let url = matches_url(config, competition);
    let body = cache
        .fetch_json_cached(client, &url)
        .with_context(|| format!("matches request failed for {competition}"))?;
    parse_matches_json(&body, competition)
}

#[derive(Debug, Default)]
pub struct FixtureFetch {
    pub matches: Vec<FixtureMatch>,
    pub errors: Vec<String>,
}

/// Fetches every competition in parallel. A failing competition is reported
/// in `errors` and does not affect the others.
pub fn fetch_all_competitions(cache: &HttpCache, config: &Config) -> FixtureFetch {
    let results: Vec<(String, Result<Vec<FixtureMatch>>)> = with_fetch_pool(config, || {
        COMPETITIONS
            .par_iter()
            .map(|comp| {
                (
                    comp.code.to_string(),
                    fetch_competition_matches(cache, config, comp.code),
                )
            })
            .collect()
    });

    let mut out = FixtureFetch::default();
    for (code, result) in results {
        match result {
            Ok(matches) => out.matches.extend(matches),
            Err(err) => {
                tracing::warn!(competition = %code, error = %err, "failed to load fixtures");
                out.errors.push(format!("{code}: {err}"));
            }
        }
    }
    out
}

pub fn with_fetch_pool<T>(config: &Config, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.fetch_parallelism)
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
