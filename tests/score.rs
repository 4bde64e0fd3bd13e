use std::fs;
use std::path::PathBuf;

use matchday_terminal::boxscore::parse_box_score_json;
use matchday_terminal::score::{Goal, GoalKind, reconcile_score};
use proptest::prelude::*;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn goal(team_id: u32, kind: GoalKind, minute: u32) -> Goal {
    Goal {
        goal_id: None,
        team_id,
        player_id: None,
        name: format!("P{team_id}-{minute}"),
        game_minute: minute,
        game_minute_extra: 0,
        kind,
    }
}

fn goal_strategy() -> impl Strategy<Value = Goal> {
    let kind = prop_oneof![
        3 => Just(GoalKind::Goal),
        1 => Just(GoalKind::OwnGoal),
        1 => Just(GoalKind::Other("Penalty Missed".to_string())),
        1 => Just(GoalKind::default()),
    ];
    // team 3 plays in neither side
    (1u32..=3, kind, 0u32..100).prop_map(|(team, kind, minute)| goal(team, kind, minute))
}

fn goal_list_strategy() -> impl Strategy<Value = Vec<Goal>> {
    prop::collection::vec(goal_strategy(), 0..12)
}

#[test]
fn own_goal_by_away_side_counts_for_home() {
    let goals = vec![
        goal(1, GoalKind::Goal, 10),
        goal(2, GoalKind::OwnGoal, 20),
    ];
    let score = reconcile_score(&goals, 1, 2);
    assert_eq!(score.home_score, 2);
    assert_eq!(score.away_score, 0);
    assert_eq!(score.home_goals[1].kind, GoalKind::OwnGoal);
    assert!(score.away_goals.is_empty());
}

#[test]
fn no_goals_is_nil_nil() {
    let score = reconcile_score(&[], 1, 2);
    assert_eq!(score.home_score, 0);
    assert_eq!(score.away_score, 0);
    assert!(score.home_goals.is_empty());
    assert!(score.away_goals.is_empty());
    assert_eq!(score.display(), "0 : 0");
}

#[test]
fn unknown_team_and_untyped_goals_are_ignored() {
    let goals = vec![
        goal(3, GoalKind::Goal, 5),
        goal(3, GoalKind::OwnGoal, 6),
        goal(1, GoalKind::default(), 7),
        goal(2, GoalKind::Other("Disallowed".to_string()), 8),
    ];
    let score = reconcile_score(&goals, 1, 2);
    assert_eq!((score.home_score, score.away_score), (0, 0));
}

#[test]
fn equal_minutes_keep_input_order() {
    let mut first = goal(1, GoalKind::Goal, 45);
    first.name = "First".to_string();
    first.game_minute_extra = 4;
    let mut second = goal(1, GoalKind::Goal, 45);
    second.name = "Second".to_string();
    let score = reconcile_score(&[first, second, goal(1, GoalKind::Goal, 12)], 1, 2);
    let names: Vec<&str> = score.home_goals.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["P1-12", "First", "Second"]);
}

#[test]
fn box_score_goals_override_stale_listed_score() {
    let box_score =
        parse_box_score_json(&read_fixture("boxscore.json")).expect("fixture should parse");
    assert_eq!(box_score.game.home_team_score, Some(1));

    let score = box_score.score_line();
    assert_eq!(score.display(), "2 : 1");
    let home: Vec<String> = score.home_goals.iter().map(|g| g.scorer_label()).collect();
    assert_eq!(
        home,
        vec!["Bukayo Saka 23'", "Marc Cucurella 61' (Own Goal)"]
    );
    assert_eq!(score.away_goals[0].name, "Cole Palmer");
}

#[test]
fn goal_type_spellings_are_folded() {
    let raw = r#"[
        {"TeamId": 1, "Type": "Own Goal", "GameMinute": 3},
        {"TeamId": 1, "Type": "owngoal", "GameMinute": 4},
        {"TeamId": 1, "Type": " goal ", "GameMinute": 5},
        {"TeamId": 1, "GameMinute": 6}
    ]"#;
    let goals: Vec<Goal> = serde_json::from_str(raw).expect("goals should parse");
    assert_eq!(goals[0].kind, GoalKind::OwnGoal);
    assert_eq!(goals[1].kind, GoalKind::OwnGoal);
    assert_eq!(goals[2].kind, GoalKind::Goal);
    assert_eq!(goals[3].kind, GoalKind::default());
}

#[test]
fn canonical_goal_types_map_exactly() {
    let raw = r#"[
        {"TeamId": 1, "Type": "Goal"},
        {"TeamId": 1, "Type": "OwnGoal"},
        {"TeamId": 1, "Type": "Penalty"},
        {"TeamId": 1, "Type": null}
    ]"#;
    let goals: Vec<Goal> = serde_json::from_str(raw).expect("goals should parse");
    assert_eq!(goals[0].kind, GoalKind::Goal);
    assert_eq!(goals[1].kind, GoalKind::OwnGoal);
    assert_eq!(goals[2].kind, GoalKind::Other("Penalty".to_string()));
    assert_eq!(goals[3].kind, GoalKind::default());
    assert_eq!(goals[0].kind.as_str(), "Goal");
    assert_eq!(goals[1].kind.as_str(), "OwnGoal");
    assert_eq!(goals[2].kind.as_str(), "Penalty");

    // the penalty and the untyped row credit nobody
    let score = reconcile_score(&goals, 1, 2);
    assert_eq!((score.home_score, score.away_score), (1, 1));
}

proptest! {
    #[test]
    fn prop_counts_match_lists_and_lists_are_disjoint(goals in goal_list_strategy()) {
        let score = reconcile_score(&goals, 1, 2);
        prop_assert_eq!(score.home_score, score.home_goals.len());
        prop_assert_eq!(score.away_score, score.away_goals.len());
        // each counted goal lands in exactly one list
        let credited = goals
            .iter()
            .filter(|g| !matches!(g.kind, GoalKind::Other(_)))
            .filter(|g| g.team_id == 1 || g.team_id == 2)
            .count();
        prop_assert_eq!(score.home_score + score.away_score, credited);
    }

    #[test]
    fn prop_own_goals_by_away_team_count_for_home(goals in goal_list_strategy()) {
        let score = reconcile_score(&goals, 1, 2);
        prop_assert!(
            !score
                .away_goals
                .iter()
                .any(|g| g.kind == GoalKind::OwnGoal && g.team_id == 2)
        );
        let expected = goals
            .iter()
            .filter(|g| g.kind == GoalKind::OwnGoal && g.team_id == 2)
            .count();
        let home_own_goals = score
            .home_goals
            .iter()
            .filter(|g| g.kind == GoalKind::OwnGoal)
            .count();
        prop_assert_eq!(home_own_goals, expected);
    }

    #[test]
    fn prop_goal_lists_are_sorted_by_minute(goals in goal_list_strategy()) {
        let score = reconcile_score(&goals, 1, 2);
        for list in [&score.home_goals, &score.away_goals] {
            prop_assert!(list.windows(2).all(|w| w[0].game_minute <= w[1].game_minute));
        }
    }

    #[test]
    fn prop_reconciling_twice_gives_the_same_result(goals in goal_list_strategy()) {
        prop_assert_eq!(reconcile_score(&goals, 1, 2), reconcile_score(&goals, 1, 2));
    }
}
