use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::http_cache::HttpCache;
use crate::http_client::http_client;
use crate::json::{is_blank_body, null_as_default};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub wikipedia_logo_url: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedTeams {
    teams: Vec<Team>,
    fetched_at: Instant,
}

/// Per-competition team lists with a caller-chosen lifetime.
///
/// Callers pass `now` so expiry is deterministic under test.
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    ttl: Duration,
    entries: HashMap<String, CachedTeams>,
}

impl TeamDirectory {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, competition: &str, teams: Vec<Team>, now: Instant) {
        self.entries.insert(
            competition_key(competition),
            CachedTeams {
                teams,
                fetched_at: now,
            },
        );
    }

    pub fn cached(&self, competition: &str, now: Instant) -> Option<&[Team]> {
        let entry = self.entries.get(&competition_key(competition))?;
        if now.saturating_duration_since(entry.fetched_at) >= self.ttl {
            return None;
        }
        Some(entry.teams.as_slice())
    }

    /// Returns the cached list, calling `load` only when it is missing or
    /// expired.
    pub fn get_or_load<F>(&mut self, competition: &str, now: Instant, load: F) -> Result<&[Team]>
    where
        F: FnOnce(&str) -> Result<Vec<Team>>,
    {
        if self.cached(competition, now).is_none() {
            let teams = load(competition)?;
            tracing::debug!(competition, teams = teams.len(), "team list refreshed");
            self.insert(competition, teams, now);
        }
        Ok(self
            .entries
            .get(&competition_key(competition))
            .map(|e| e.teams.as_slice())
            .unwrap_or(&[]))
    }

    pub fn find_by_key(&self, competition: &str, key: &str, now: Instant) -> Option<&Team> {
        let wanted = key.trim();
        self.cached(competition, now)?
            .iter()
            .find(|t| t.key.eq_ignore_ascii_case(wanted))
    }

    pub fn logo_for(&self, competition: &str, key: &str, now: Instant) -> Option<&str> {
        self.find_by_key(competition, key, now)?
            .wikipedia_logo_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn invalidate(&mut self, competition: &str) {
        self.entries.remove(&competition_key(competition));
    }
}

fn competition_key(competition: &str) -> String {
    competition.trim().to_lowercase()
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>> {
    if is_blank_body(raw) {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw.trim()).context("invalid teams json")
}

pub fn teams_url(config: &Config, competition: &str) -> String {
    format!(
        "{}/{}.json",
        config.teams_base_url.trim_end_matches('/'),
        competition_key(competition)
    )
}

pub fn fetch_teams(cache: &HttpCache, config: &Config, competition: &str) -> Result<Vec<Team>> {
    let client = http_client()?;
    let url = teams_url(config, competition);
    let body = cache
        .fetch_json_cached(client, &url)
        .with_context(|| format!("teams request failed for {competition}"))?;
    parse_teams_json(&body)
}
