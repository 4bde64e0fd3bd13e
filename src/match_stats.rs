use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::http_cache::HttpCache;
use crate::http_client::http_client;
use crate::json::{
    default_invalid_rows, is_blank_body, lenient_opt_u32, null_as_default, pick_string,
    skip_invalid_rows,
};
use crate::lineup::{BenchPlayer, PositionedPlayer, TeamLineup, bench_players, layout_lineup};
use crate::timeline::{PlayerBadge, PlayerEvents};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub elapsed: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub extra: Option<u32>,
}

/// Event row from the per-competition statistics document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: EventTime,
    #[serde(default)]
    pub team: Option<EventRef>,
    #[serde(default)]
    pub player: Option<EventRef>,
    /// Assisting player for goals, incoming player for substitutions.
    #[serde(default)]
    pub assist: Option<EventRef>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    #[serde(rename = "GameId", default, deserialize_with = "game_id_from_any")]
    pub game_id: String,
    /// Home first, away second; a malformed side reads as an empty lineup.
    #[serde(rename = "Lineups", default, deserialize_with = "default_invalid_rows")]
    pub lineups: Vec<TeamLineup>,
    #[serde(rename = "Events", default, deserialize_with = "skip_invalid_rows")]
    pub events: Vec<StatsEvent>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchLayout {
    pub home: Vec<PositionedPlayer>,
    pub away: Vec<PositionedPlayer>,
    pub home_bench: Vec<BenchPlayer>,
    pub away_bench: Vec<BenchPlayer>,
}

impl MatchStats {
    pub fn home_lineup(&self) -> Option<&TeamLineup> {
        self.lineups.first()
    }

    pub fn away_lineup(&self) -> Option<&TeamLineup> {
        self.lineups.get(1)
    }

    pub fn player_events(&self) -> PlayerEvents {
        let mut map = PlayerEvents::new();
        for event in &self.events {
            let main_id = event.player.as_ref().and_then(|p| p.id);
            let kind = event.kind.trim().to_ascii_lowercase();
            let detail = event
                .detail
                .as_deref()
                .map(|d| d.trim().to_ascii_lowercase())
                .unwrap_or_default();
            match kind.as_str() {
                "goal" => {
                    if let Some(id) = main_id {
                        map.push(id, PlayerBadge::Goal);
                    }
                }
                "card" => {
                    let badge = match detail.as_str() {
                        "yellow card" => Some(PlayerBadge::YellowCard),
                        "red card" => Some(PlayerBadge::RedCard),
                        _ => None,
                    };
                    if let (Some(id), Some(badge)) = (main_id, badge) {
                        map.push(id, badge);
                    }
                }
                "subst" => {
                    if let Some(id) = main_id {
                        map.push(id, PlayerBadge::SubOut);
                    }
                    if let Some(in_id) = event.assist.as_ref().and_then(|a| a.id) {
                        map.mark_subbed_in(in_id);
                    }
                }
                _ => {}
            }
        }
        map
    }

    /// Home side occupies the top half of the pitch.
    pub fn pitch_layout(&self) -> PitchLayout {
        let events = self.player_events();
        let bench = |lineup: Option<&TeamLineup>| {
            lineup
                .map(|l| bench_players(&l.substitutes, &events))
                .unwrap_or_default()
        };
        PitchLayout {
            home: self
                .home_lineup()
                .map(|l| layout_lineup(&l.start_xi, true, &events))
                .unwrap_or_default(),
            away: self
                .away_lineup()
                .map(|l| layout_lineup(&l.start_xi, false, &events))
                .unwrap_or_default(),
            home_bench: bench(self.home_lineup()),
            away_bench: bench(self.away_lineup()),
        }
    }
}

/// Finds the entry for `game_id` in a competition document. Ids are compared
/// as strings since upstream mixes numbers and numeric strings.
pub fn parse_match_stats_json(raw: &str, game_id: &str) -> Result<Option<MatchStats>> {
    if is_blank_body(raw) {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(raw.trim()).context("invalid stats json")?;
    let Some(entries) = root.as_array() else {
        return Ok(None);
    };
    let wanted = game_id.trim();
    let Some(entry) = entries
        .iter()
        .find(|entry| pick_string(entry, &["GameId"]).as_deref() == Some(wanted))
    else {
        return Ok(None);
    };
    let mut stats: MatchStats =
        serde_json::from_value(entry.clone()).context("unexpected stats entry shape")?;
    for lineup in &mut stats.lineups {
        lineup.attach_team();
    }
    Ok(Some(stats))
}

pub fn stats_url(config: &Config, competition: &str) -> String {
    format!(
        "{}/{}.json",
        config.stats_base_url.trim_end_matches('/'),
        competition.trim().to_uppercase()
    )
}

pub fn fetch_match_stats(
    cache: &HttpCache,
    config: &Config,
    competition: &str,
    game_id: &str,
) -> Result<Option<MatchStats>> {
    let client = http_client()?;
    let url = stats_url(config, competition);
    let body = cache
        .fetch_json_cached(client, &url)
        .with_context(|| format!("stats request failed for {competition}"))?;
    parse_match_stats_json(&body, game_id)
}

fn game_id_from_any<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
