use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::json::{lenient_opt_u32, lenient_u32, null_as_default, skip_invalid_rows};
use crate::timeline::{PlayerBadge, PlayerEvents};

const TOP_ANCHOR_PCT: f64 = 8.0;
const BOTTOM_ANCHOR_PCT: f64 = 92.0;
// Each team gets a little less than half of the pitch.
const PLAYABLE_HEIGHT_PCT: f64 = 38.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupPlayer {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub number: Option<u32>,
    /// `"row:col"` formation slot.
    #[serde(default)]
    pub grid: Option<String>,
    #[serde(default)]
    pub pos: Option<String>,
}

impl LineupPlayer {
    pub fn grid_row(&self) -> Option<u32> {
        let grid = self.grid.as_deref()?.trim();
        if grid.is_empty() {
            return None;
        }
        grid.split(':').next()?.trim().parse::<u32>().ok()
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self.pos.as_deref().map(str::trim), Some("G") | Some("GK"))
    }

    /// Surname for the name plate under a pitch marker.
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub border: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColors {
    #[serde(default)]
    pub player: Option<Kit>,
    #[serde(default)]
    pub goalkeeper: Option<Kit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupTeam {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub colors: Option<TeamColors>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub player: LineupPlayer,
    #[serde(default)]
    pub team: Option<LineupTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLineup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: LineupTeam,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formation: String,
    #[serde(rename = "startXI", default, deserialize_with = "skip_invalid_rows")]
    pub start_xi: Vec<LineupEntry>,
    #[serde(default, deserialize_with = "skip_invalid_rows")]
    pub substitutes: Vec<LineupEntry>,
}

impl TeamLineup {
    pub fn kit_for(&self, player: &LineupPlayer) -> Option<&Kit> {
        let colors = self.team.colors.as_ref()?;
        if player.is_goalkeeper() {
            colors.goalkeeper.as_ref()
        } else {
            colors.player.as_ref()
        }
    }

    /// Copies the lineup's team onto entries that do not carry their own.
    pub fn attach_team(&mut self) {
        let team = self.team.clone();
        for entry in self.start_xi.iter_mut().chain(self.substitutes.iter_mut()) {
            if entry.team.is_none() {
                entry.team = Some(team.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedPlayer {
    pub player: LineupPlayer,
    /// Percent of pitch width.
    pub x: f64,
    /// Percent of pitch height, 0 at the top goal line.
    pub y: f64,
    pub events: Vec<PlayerBadge>,
}

/// Places a starting XI on one half of a vertical pitch.
///
/// Players are grouped into lines by the row of their grid slot; lines are
/// spread from the goal towards the halfway line and players are spaced evenly
/// across each line. Entries without a usable grid are dropped.
pub fn layout_lineup(
    start_xi: &[LineupEntry],
    is_top_half: bool,
    events: &PlayerEvents,
) -> Vec<PositionedPlayer> {
    let mut rows: BTreeMap<u32, Vec<&LineupPlayer>> = BTreeMap::new();
    for entry in start_xi {
        let Some(row) = entry.player.grid_row() else {
            continue;
        };
        rows.entry(row).or_default().push(&entry.player);
    }

    let total_rows = rows.len();
    let denominator = if total_rows > 1 {
        (total_rows - 1) as f64
    } else {
        1.0
    };

    let mut positioned = Vec::with_capacity(start_xi.len());
    for (index, players) in rows.values().enumerate() {
        let offset = (index as f64 / denominator) * PLAYABLE_HEIGHT_PCT;
        let y = if is_top_half {
            TOP_ANCHOR_PCT + offset
        } else {
            BOTTOM_ANCHOR_PCT - offset
        };
        let spacing = 100.0 / (players.len() + 1) as f64;
        for (slot, player) in players.iter().enumerate() {
            positioned.push(PositionedPlayer {
                player: (*player).clone(),
                x: spacing * (slot + 1) as f64,
                y,
                events: events.badges_for(player.id).to_vec(),
            });
        }
    }
    positioned
}

/// A substitute as listed beside the pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchPlayer {
    pub player: LineupPlayer,
    pub subbed_in: bool,
}

impl BenchPlayer {
    /// `"9 Gabriel Jesus ↑"`; the arrow marks a player who came on.
    pub fn label(&self) -> String {
        let number = self.player.number.map(|n| n.to_string()).unwrap_or_default();
        let arrow = if self.subbed_in { " ↑" } else { "" };
        format!("{number:>2} {}{arrow}", self.player.name)
    }
}

/// Substitutes in listed order, flagged when they came on.
pub fn bench_players(substitutes: &[LineupEntry], events: &PlayerEvents) -> Vec<BenchPlayer> {
    substitutes
        .iter()
        .map(|entry| BenchPlayer {
            player: entry.player.clone(),
            subbed_in: events.is_subbed_in(entry.player.id),
        })
        .collect()
}
