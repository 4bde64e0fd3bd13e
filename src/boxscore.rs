use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::http_cache::HttpCache;
use crate::http_client::http_client;
use crate::json::{
    is_blank_body, lenient_f64, lenient_opt_u32, lenient_opt_u64, lenient_u32, lenient_u64,
    null_as_default, skip_invalid_rows,
};
use crate::score::{Goal, ScoreLine, reconcile_score};
use crate::timeline::{Booking, BookingKind, TimelineEvent, merge_timeline};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub game_id: u64,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub attendance: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub venue_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub home_team_id: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub away_team_id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub home_team_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub away_team_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub home_team_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub away_team_key: String,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub home_team_score: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub away_team_score: Option<u32>,
    #[serde(default)]
    pub home_team_formation: Option<String>,
    #[serde(default)]
    pub away_team_formation: Option<String>,
}

/// One team's aggregate line from `TeamGames`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeamGame {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub team_id: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub possession: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shots: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shots_on_goal: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub passes: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tackles: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fouls: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub corner_kicks: f64,
}

/// Box-score lineup row. Substitutes carry the player they replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoxScoreLineup {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub team_id: u32,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub player_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "Type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub replaced_player_id: Option<u32>,
    #[serde(default)]
    pub replaced_player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub game_minute: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub game_minute_extra: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoxScore {
    #[serde(default, deserialize_with = "null_as_default")]
    pub game: Game,
    #[serde(default, deserialize_with = "skip_invalid_rows")]
    pub goals: Vec<Goal>,
    #[serde(default, deserialize_with = "skip_invalid_rows")]
    pub bookings: Vec<Booking>,
    #[serde(default, deserialize_with = "skip_invalid_rows")]
    pub team_games: Vec<TeamGame>,
    #[serde(default, deserialize_with = "skip_invalid_rows")]
    pub lineups: Vec<BoxScoreLineup>,
}

impl BoxScore {
    pub fn score_line(&self) -> ScoreLine {
        reconcile_score(&self.goals, self.game.home_team_id, self.game.away_team_id)
    }

    /// Goals, bookings and lineup substitutions as one timeline.
    pub fn timeline(&self) -> Vec<TimelineEvent> {
        let mut bookings = self.bookings.clone();
        let already_listed = bookings
            .iter()
            .any(|b| b.kind == BookingKind::Substitution);
        if !already_listed {
            bookings.extend(self.substitution_bookings());
        }
        merge_timeline(&self.goals, &bookings, self.game.home_team_id)
    }

    /// Substitutions reconstructed from `Lineups` rows that replaced someone.
    pub fn substitution_bookings(&self) -> Vec<Booking> {
        self.lineups
            .iter()
            .filter(|row| row.kind.eq_ignore_ascii_case("substitute"))
            .filter(|row| row.replaced_player_id.is_some() || row.replaced_player_name.is_some())
            .map(|row| Booking {
                booking_id: None,
                team_id: row.team_id,
                player_id: row.player_id,
                name: row.name.clone(),
                jersey: None,
                kind: BookingKind::Substitution,
                game_minute: row.game_minute,
                game_minute_extra: row.game_minute_extra,
                player_out_id: row.replaced_player_id,
                player_out_jersey: None,
                player_out_name: row.replaced_player_name.clone(),
            })
            .collect()
    }

    pub fn home_team_game(&self) -> Option<&TeamGame> {
        self.team_game_for(self.game.home_team_id, 0)
    }

    pub fn away_team_game(&self) -> Option<&TeamGame> {
        self.team_game_for(self.game.away_team_id, 1)
    }

    // Upstream lists home first; fall back to position when ids are absent.
    fn team_game_for(&self, team_id: u32, index: usize) -> Option<&TeamGame> {
        self.team_games
            .iter()
            .find(|t| t.team_id != 0 && t.team_id == team_id)
            .or_else(|| self.team_games.get(index))
    }
}

/// Accepts the one-element array the API returns, a bare object, or a blank
/// body (treated as an empty box score).
pub fn parse_box_score_json(raw: &str) -> Result<BoxScore> {
    if is_blank_body(raw) {
        return Ok(BoxScore::default());
    }
    let root: Value = serde_json::from_str(raw.trim()).context("invalid box score json")?;
    let record = match root {
        Value::Array(mut items) => {
            if items.is_empty() {
                return Ok(BoxScore::default());
            }
            items.swap_remove(0)
        }
        Value::Null => return Ok(BoxScore::default()),
        other => other,
    };
    serde_json::from_value(record).context("unexpected box score shape")
}

pub fn box_score_url(config: &Config, competition: &str, game_id: u64) -> Result<String> {
    let key = config
        .sportsdata_api_key
        .as_deref()
        .ok_or_else(|| anyhow!("SPORTSDATA_API_KEY is not set"))?;
    Ok(format!(
        "{}/BoxScoreFinal/{}/{}?key={}",
        config.sportsdata_base_url.trim_end_matches('/'),
        competition.trim().to_uppercase(),
        game_id,
        key
    ))
}

pub fn fetch_box_score(
    cache: &HttpCache,
    config: &Config,
    competition: &str,
    game_id: u64,
) -> Result<BoxScore> {
    let client = http_client()?;
    let url = box_score_url(config, competition, game_id)?;
    let body = cache
        .fetch_json_cached(client, &url)
        .with_context(|| format!("box score request failed for {competition}/{game_id}"))?;
    parse_box_score_json(&body)
}
