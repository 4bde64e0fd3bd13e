use serde::{Deserialize, Serialize};

use crate::json::{lenient_opt_u32, lenient_opt_u64, lenient_u32, null_as_default};

/// How a scoring event should be credited.
///
/// Upstream sends a free-form `Type` string; anything that is not a plain goal
/// or an own goal is kept verbatim and never counts towards either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum GoalKind {
    Goal,
    OwnGoal,
    Other(String),
}

impl Default for GoalKind {
    fn default() -> Self {
        GoalKind::Other(String::new())
    }
}

impl From<Option<String>> for GoalKind {
    fn from(raw: Option<String>) -> Self {
        let Some(raw) = raw else {
            return GoalKind::default();
        };
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "goal" => GoalKind::Goal,
            "owngoal" => GoalKind::OwnGoal,
            _ => GoalKind::Other(raw),
        }
    }
}

impl From<GoalKind> for String {
    fn from(kind: GoalKind) -> Self {
        kind.as_str().to_string()
    }
}

impl GoalKind {
    pub fn as_str(&self) -> &str {
        match self {
            GoalKind::Goal => "Goal",
            GoalKind::OwnGoal => "OwnGoal",
            GoalKind::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Goal {
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub goal_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub team_id: u32,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub player_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub game_minute: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub game_minute_extra: u32,
    #[serde(rename = "Type", default)]
    pub kind: GoalKind,
}

impl Goal {
    pub fn effective_minute(&self) -> u32 {
        self.game_minute.saturating_add(self.game_minute_extra)
    }

    pub fn is_own_goal(&self) -> bool {
        self.kind == GoalKind::OwnGoal
    }

    /// `"Saka 23'"`, or `"White 61' (Own Goal)"`.
    pub fn scorer_label(&self) -> String {
        if self.is_own_goal() {
            format!("{} {}' (Own Goal)", self.name, self.game_minute)
        } else {
            format!("{} {}'", self.name, self.game_minute)
        }
    }

    fn credits(&self, team_id: u32, opponent_id: u32) -> bool {
        match self.kind {
            GoalKind::Goal => self.team_id == team_id,
            GoalKind::OwnGoal => self.team_id == opponent_id,
            GoalKind::Other(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreLine {
    pub home_score: usize,
    pub away_score: usize,
    pub home_goals: Vec<Goal>,
    pub away_goals: Vec<Goal>,
}

impl ScoreLine {
    pub fn display(&self) -> String {
        format!("{} : {}", self.home_score, self.away_score)
    }
}

/// Derives the score from the goal list instead of trusting the feed's score
/// fields. Own goals count for the opponent of the team that committed them.
pub fn reconcile_score(goals: &[Goal], home_team_id: u32, away_team_id: u32) -> ScoreLine {
    let mut home_goals: Vec<Goal> = goals
        .iter()
        .filter(|g| g.credits(home_team_id, away_team_id))
        .cloned()
        .collect();
    let mut away_goals: Vec<Goal> = goals
        .iter()
        .filter(|g| g.credits(away_team_id, home_team_id))
        .cloned()
        .collect();

    home_goals.sort_by_key(|g| g.game_minute);
    away_goals.sort_by_key(|g| g.game_minute);

    ScoreLine {
        home_score: home_goals.len(),
        away_score: away_goals.len(),
        home_goals,
        away_goals,
    }
}
