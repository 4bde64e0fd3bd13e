use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::json::{lenient_opt_u32, lenient_opt_u64, lenient_u32, null_as_default};
use crate::score::{Goal, GoalKind};

/// Regular time plus two 15 minute extra-time periods.
pub const TIMELINE_FULL_MINUTES: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum BookingKind {
    YellowCard,
    RedCard,
    Substitution,
    Other(String),
}

impl Default for BookingKind {
    fn default() -> Self {
        BookingKind::Other(String::new())
    }
}

impl From<Option<String>> for BookingKind {
    fn from(raw: Option<String>) -> Self {
        let Some(raw) = raw else {
            return BookingKind::default();
        };
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "yellowcard" => BookingKind::YellowCard,
            "redcard" => BookingKind::RedCard,
            "substitution" | "substitute" => BookingKind::Substitution,
            _ => BookingKind::Other(raw),
        }
    }
}

impl From<BookingKind> for String {
    fn from(kind: BookingKind) -> Self {
        kind.as_str().to_string()
    }
}

impl BookingKind {
    pub fn as_str(&self) -> &str {
        match self {
            BookingKind::YellowCard => "Yellow Card",
            BookingKind::RedCard => "Red Card",
            BookingKind::Substitution => "Substitution",
            BookingKind::Other(raw) => raw,
        }
    }
}

/// A card or substitution from the box score. For substitutions the main
/// player fields describe the incoming player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Booking {
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub booking_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub team_id: u32,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub player_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub jersey: Option<u32>,
    #[serde(rename = "Type", default)]
    pub kind: BookingKind,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub game_minute: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub game_minute_extra: u32,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub player_out_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub player_out_jersey: Option<u32>,
    #[serde(default)]
    pub player_out_name: Option<String>,
}

impl Booking {
    pub fn effective_minute(&self) -> u32 {
        self.game_minute.saturating_add(self.game_minute_extra)
    }

    fn substitution_label(&self) -> String {
        let incoming = player_tag(self.jersey, &self.name);
        let outgoing_name = self
            .player_out_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        match outgoing_name {
            Some(name) => format!(
                "{incoming} for {}",
                player_tag(self.player_out_jersey, name)
            ),
            None => incoming,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Goal,
    Yellow,
    Red,
    Substitution,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Goal => "goal",
            Category::Yellow => "yellow",
            Category::Red => "red",
            Category::Substitution => "substitution",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub minute: u32,
    pub side: Side,
    pub category: Category,
    pub label: String,
    pub team_id: u32,
    pub player_id: Option<u32>,
    pub player_out_id: Option<u32>,
    /// Set when the upstream type was not recognised and the event landed in
    /// the substitution bucket by default.
    pub raw_type: Option<String>,
}

impl TimelineEvent {
    /// Horizontal position on a 0..=100 track.
    pub fn position_pct(&self) -> f64 {
        display_position_pct(self.minute)
    }

    pub fn marker_class(&self) -> String {
        format!("{} {}", self.category.as_str(), self.side.as_str())
    }
}

pub fn display_position_pct(minute: u32) -> f64 {
    (minute as f64 / TIMELINE_FULL_MINUTES as f64).min(1.0) * 100.0
}

/// Interleaves goals and bookings into one sequence ordered by effective
/// minute. Goals precede bookings on equal minutes. Unrecognised types land in
/// the substitution bucket labelled with the raw type (or the player, when the
/// type is blank).
pub fn merge_timeline(
    goals: &[Goal],
    bookings: &[Booking],
    home_team_id: u32,
) -> Vec<TimelineEvent> {
    let side_of = |team_id: u32| {
        if team_id == home_team_id {
            Side::Home
        } else {
            Side::Away
        }
    };

    let mut events: Vec<TimelineEvent> = Vec::with_capacity(goals.len() + bookings.len());

    for goal in goals {
        let (category, label, raw_type) = match &goal.kind {
            GoalKind::Goal => (Category::Goal, goal.name.clone(), None),
            GoalKind::OwnGoal => (Category::Goal, format!("{} (Own Goal)", goal.name), None),
            GoalKind::Other(raw) if raw.trim().is_empty() => {
                (Category::Substitution, goal.name.clone(), Some(raw.clone()))
            }
            GoalKind::Other(raw) => (Category::Substitution, raw.clone(), Some(raw.clone())),
        };
        events.push(TimelineEvent {
            minute: goal.effective_minute(),
            side: side_of(goal.team_id),
            category,
            label,
            team_id: goal.team_id,
            player_id: goal.player_id,
            player_out_id: None,
            raw_type,
        });
    }

    for booking in bookings {
        let (category, label, raw_type) = match &booking.kind {
            BookingKind::YellowCard => (
                Category::Yellow,
                player_tag(booking.jersey, &booking.name),
                None,
            ),
            BookingKind::RedCard => (
                Category::Red,
                player_tag(booking.jersey, &booking.name),
                None,
            ),
            BookingKind::Substitution => {
                (Category::Substitution, booking.substitution_label(), None)
            }
            BookingKind::Other(raw) if raw.trim().is_empty() => (
                Category::Substitution,
                player_tag(booking.jersey, &booking.name),
                Some(raw.clone()),
            ),
            BookingKind::Other(raw) => (Category::Substitution, raw.clone(), Some(raw.clone())),
        };
        events.push(TimelineEvent {
            minute: booking.effective_minute(),
            side: side_of(booking.team_id),
            category,
            label,
            team_id: booking.team_id,
            player_id: booking.player_id,
            player_out_id: booking.player_out_id,
            raw_type,
        });
    }

    events.sort_by_key(|e| e.minute);
    events
}

fn player_tag(jersey: Option<u32>, name: &str) -> String {
    match jersey {
        Some(number) => format!("{number}. {name}"),
        None => name.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlayerBadge {
    Goal,
    YellowCard,
    RedCard,
    SubOut,
}

impl PlayerBadge {
    pub fn symbol(self) -> &'static str {
        match self {
            PlayerBadge::Goal => "⚽",
            PlayerBadge::YellowCard => "▮Y",
            PlayerBadge::RedCard => "▮R",
            PlayerBadge::SubOut => "↓",
        }
    }
}

/// Badges per player id, plus the players who came off the bench.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerEvents {
    by_player: HashMap<u32, Vec<PlayerBadge>>,
    subbed_in: HashSet<u32>,
}

impl PlayerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, player_id: u32, badge: PlayerBadge) {
        self.by_player.entry(player_id).or_default().push(badge);
    }

    pub fn mark_subbed_in(&mut self, player_id: u32) {
        self.subbed_in.insert(player_id);
    }

    pub fn badges_for(&self, player_id: u32) -> &[PlayerBadge] {
        self.by_player
            .get(&player_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_subbed_in(&self, player_id: u32) -> bool {
        self.subbed_in.contains(&player_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty() && self.subbed_in.is_empty()
    }
}

pub fn player_event_map(events: &[TimelineEvent]) -> PlayerEvents {
    let mut map = PlayerEvents::new();
    for event in events {
        if event.raw_type.is_some() {
            continue;
        }
        match event.category {
            Category::Goal => {
                if let Some(id) = event.player_id {
                    map.push(id, PlayerBadge::Goal);
                }
            }
            Category::Yellow => {
                if let Some(id) = event.player_id {
                    map.push(id, PlayerBadge::YellowCard);
                }
            }
            Category::Red => {
                if let Some(id) = event.player_id {
                    map.push(id, PlayerBadge::RedCard);
                }
            }
            Category::Substitution => {
                if let Some(out_id) = event.player_out_id {
                    map.push(out_id, PlayerBadge::SubOut);
                }
                if let Some(in_id) = event.player_id {
                    map.mark_subbed_in(in_id);
                }
            }
        }
    }
    map
}
