use crate::boxscore::{BoxScore, Game, TeamGame};
use crate::score::{Goal, reconcile_score};

const POSSESSION_GAP_PCT: f64 = 10.0;
const PHYSICAL_FOULS: f64 = 10.0;

struct Side<'a> {
    name: &'a str,
    stats: &'a TeamGame,
}

/// Short prose recap of a finished match, split into two or three paragraphs.
pub fn generate_match_summary(
    game: &Game,
    home_stats: &TeamGame,
    away_stats: &TeamGame,
    goals: &[Goal],
) -> Vec<String> {
    let home = Side {
        name: &game.home_team_name,
        stats: home_stats,
    };
    let away = Side {
        name: &game.away_team_name,
        stats: away_stats,
    };

    let mut lines = Vec::new();
    lines.push(format!(
        "{} and {} faced off in a closely contested match.",
        home.name, away.name
    ));

    if (home.stats.possession - away.stats.possession).abs() > POSSESSION_GAP_PCT {
        let leader = if home.stats.possession > away.stats.possession {
            &home
        } else {
            &away
        };
        lines.push(format!(
            "{} controlled the game with {}% possession.",
            leader.name,
            fmt_stat(leader.stats.possession)
        ));
    }

    let dominant = if home.stats.shots_on_goal > away.stats.shots_on_goal {
        Some(&home)
    } else if away.stats.shots_on_goal > home.stats.shots_on_goal {
        Some(&away)
    } else {
        None
    };
    if let Some(team) = dominant {
        lines.push(format!(
            "{} looked more dangerous in attack with {} shots on target.",
            team.name,
            fmt_stat(team.stats.shots_on_goal)
        ));
    }

    let more_fouls = if home.stats.fouls > away.stats.fouls {
        &home
    } else {
        &away
    };
    if more_fouls.stats.fouls > PHYSICAL_FOULS {
        lines.push(format!(
            "{} committed a high number of fouls ({}), reflecting a physical approach.",
            more_fouls.name,
            fmt_stat(more_fouls.stats.fouls)
        ));
    }

    let score = reconcile_score(goals, game.home_team_id, game.away_team_id);
    if let Some(line) = scorers_sentence(home.name, &score.home_goals) {
        lines.push(line);
    }
    if let Some(line) = scorers_sentence(away.name, &score.away_goals) {
        lines.push(line);
    }

    let home_focus = if home.stats.passes > away.stats.passes {
        "possession and buildup"
    } else {
        "defensive play"
    };
    let away_aim = if away.stats.shots > home.stats.shots {
        "direct attacking chances"
    } else {
        "control in midfield"
    };
    lines.push(format!(
        "Overall, the match showcased contrasting styles, with {} focusing on {}, while {} aimed for {}.",
        home.name, home_focus, away.name, away_aim
    ));

    into_paragraphs(&lines)
}

/// Summary for a box score; missing team lines count as all zeros.
pub fn summarize_box_score(box_score: &BoxScore) -> Vec<String> {
    let empty = TeamGame::default();
    generate_match_summary(
        &box_score.game,
        box_score.home_team_game().unwrap_or(&empty),
        box_score.away_team_game().unwrap_or(&empty),
        &box_score.goals,
    )
}

fn scorers_sentence(team_name: &str, goals: &[Goal]) -> Option<String> {
    if goals.is_empty() {
        return None;
    }
    let scorers = goals
        .iter()
        .map(|g| {
            let own_goal = if g.is_own_goal() { " (Own Goal)" } else { "" };
            format!("{} ({}’{})", g.name, g.game_minute, own_goal)
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("Goals for {team_name} came from {scorers}."))
}

fn into_paragraphs(lines: &[String]) -> Vec<String> {
    let para_count = if lines.len() > 5 { 3 } else { 2 };
    let chunk_size = lines.len().div_ceil(para_count).max(1);
    lines.chunks(chunk_size).map(|chunk| chunk.join(" ")).collect()
}

/// Whole numbers print bare, anything else with one decimal.
pub fn fmt_stat(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}
