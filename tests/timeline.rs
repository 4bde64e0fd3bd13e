use std::fs;
use std::path::PathBuf;

use matchday_terminal::boxscore::parse_box_score_json;
use matchday_terminal::score::{Goal, GoalKind};
use matchday_terminal::timeline::{
    Booking, BookingKind, Category, PlayerBadge, Side, display_position_pct, merge_timeline,
    player_event_map,
};
use proptest::prelude::*;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn goal(team_id: u32, minute: u32, extra: u32) -> Goal {
    Goal {
        goal_id: None,
        team_id,
        player_id: Some(team_id * 100 + minute),
        name: format!("Scorer {minute}"),
        game_minute: minute,
        game_minute_extra: extra,
        kind: GoalKind::Goal,
    }
}

fn booking(team_id: u32, kind: BookingKind, minute: u32, extra: u32) -> Booking {
    Booking {
        booking_id: None,
        team_id,
        player_id: Some(team_id * 1000 + minute),
        name: format!("Player {minute}"),
        jersey: None,
        kind,
        game_minute: minute,
        game_minute_extra: extra,
        player_out_id: None,
        player_out_jersey: None,
        player_out_name: None,
    }
}

fn goal_kind_strategy() -> impl Strategy<Value = GoalKind> {
    prop_oneof![
        Just(GoalKind::Goal),
        Just(GoalKind::OwnGoal),
        Just(GoalKind::Other("Disallowed".to_string())),
        Just(GoalKind::Other(String::new())),
    ]
}

fn booking_kind_strategy() -> impl Strategy<Value = BookingKind> {
    prop_oneof![
        Just(BookingKind::YellowCard),
        Just(BookingKind::RedCard),
        Just(BookingKind::Substitution),
        Just(BookingKind::Other("Yellow Red Card".to_string())),
    ]
}

// Narrow minute ranges so equal effective minutes are common.
fn goals_strategy() -> impl Strategy<Value = Vec<Goal>> {
    let row = (1u32..=2, goal_kind_strategy(), 0u32..6, 0u32..3);
    prop::collection::vec(row, 0..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (team, kind, minute, extra))| Goal {
                player_id: Some(index as u32),
                kind,
                ..goal(team, minute, extra)
            })
            .collect()
    })
}

fn bookings_strategy() -> impl Strategy<Value = Vec<Booking>> {
    let row = (1u32..=2, booking_kind_strategy(), 0u32..6, 0u32..3);
    prop::collection::vec(row, 0..10).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (team, kind, minute, extra))| Booking {
                player_id: Some(1000 + index as u32),
                ..booking(team, kind, minute, extra)
            })
            .collect()
    })
}

#[test]
fn card_before_stoppage_time_goal() {
    let goals = vec![goal(1, 45, 2)];
    let bookings = vec![booking(2, BookingKind::YellowCard, 30, 0)];
    let events = merge_timeline(&goals, &bookings, 1);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].category, Category::Yellow);
    assert_eq!(events[0].minute, 30);
    assert_eq!(events[0].side, Side::Away);
    assert_eq!(events[1].category, Category::Goal);
    assert_eq!(events[1].minute, 47);
    assert_eq!(events[1].side, Side::Home);
}

#[test]
fn goals_precede_bookings_on_equal_minutes() {
    let goals = vec![goal(1, 60, 0)];
    let bookings = vec![
        booking(2, BookingKind::RedCard, 58, 2),
        booking(1, BookingKind::YellowCard, 60, 0),
    ];
    let events = merge_timeline(&goals, &bookings, 1);
    let categories: Vec<Category> = events.iter().map(|e| e.category).collect();
    assert_eq!(
        categories,
        vec![Category::Goal, Category::Red, Category::Yellow]
    );
}

#[test]
fn substitution_labels_name_both_players() {
    let mut sub = booking(1, BookingKind::Substitution, 70, 0);
    sub.jersey = Some(9);
    sub.name = "Gabriel Jesus".to_string();
    sub.player_out_jersey = Some(29);
    sub.player_out_name = Some("Kai Havertz".to_string());
    let mut lone = booking(1, BookingKind::Substitution, 75, 0);
    lone.jersey = Some(14);
    lone.name = "Leandro Trossard".to_string();

    let events = merge_timeline(&[], &[sub, lone], 1);
    assert_eq!(events[0].label, "9. Gabriel Jesus for 29. Kai Havertz");
    assert_eq!(events[1].label, "14. Leandro Trossard");
}

#[test]
fn unknown_booking_types_fall_into_substitution_bucket() {
    let events = merge_timeline(
        &[],
        &[booking(2, BookingKind::Other("Yellow Red Card".to_string()), 80, 0)],
        1,
    );
    assert_eq!(events[0].category, Category::Substitution);
    assert_eq!(events[0].label, "Yellow Red Card");
    assert_eq!(events[0].raw_type.as_deref(), Some("Yellow Red Card"));
}

#[test]
fn own_goal_label_names_the_scorer() {
    let own_goal = Goal {
        name: "Marc Cucurella".to_string(),
        kind: GoalKind::OwnGoal,
        ..goal(2, 61, 0)
    };
    let events = merge_timeline(&[own_goal], &[], 1);
    assert_eq!(events[0].category, Category::Goal);
    assert_eq!(events[0].side, Side::Away);
    assert_eq!(events[0].label, "Marc Cucurella (Own Goal)");
    assert_eq!(events[0].raw_type, None);
}

#[test]
fn unknown_goal_type_is_labelled_with_the_type() {
    let disallowed = Goal {
        kind: GoalKind::Other("Disallowed".to_string()),
        ..goal(1, 70, 0)
    };
    let events = merge_timeline(&[disallowed], &[], 1);
    assert_eq!(events[0].category, Category::Substitution);
    assert_eq!(events[0].label, "Disallowed");
    assert_eq!(events[0].raw_type.as_deref(), Some("Disallowed"));
}

#[test]
fn blank_goal_type_is_labelled_with_the_player() {
    let untyped = Goal {
        name: "Gabriel Martinelli".to_string(),
        kind: GoalKind::Other("  ".to_string()),
        ..goal(1, 33, 0)
    };
    let events = merge_timeline(&[untyped], &[], 1);
    assert_eq!(events[0].category, Category::Substitution);
    assert_eq!(events[0].label, "Gabriel Martinelli");
    assert_eq!(events[0].raw_type.as_deref(), Some("  "));
    // unrecognised rows never become player badges
    assert!(player_event_map(&events).is_empty());
}

#[test]
fn display_position_caps_but_minute_does_not() {
    assert_eq!(display_position_pct(0), 0.0);
    assert_eq!(display_position_pct(60), 50.0);
    assert_eq!(display_position_pct(120), 100.0);
    assert_eq!(display_position_pct(135), 100.0);

    let events = merge_timeline(&[goal(1, 120, 15)], &[], 1);
    assert_eq!(events[0].minute, 135);
    assert_eq!(events[0].position_pct(), 100.0);
    assert_eq!(events[0].marker_class(), "goal home");
}

#[test]
fn merging_is_repeatable() {
    let goals = vec![goal(1, 10, 0), goal(2, 10, 0)];
    let bookings = vec![booking(2, BookingKind::YellowCard, 10, 0)];
    assert_eq!(
        merge_timeline(&goals, &bookings, 1),
        merge_timeline(&goals, &bookings, 1)
    );
}

#[test]
fn box_score_fixture_timeline() {
    let box_score =
        parse_box_score_json(&read_fixture("boxscore.json")).expect("fixture should parse");
    let events = box_score.timeline();
    let summary: Vec<(u32, &str, Category)> = events
        .iter()
        .map(|e| (e.minute, e.side.as_str(), e.category))
        .collect();
    assert_eq!(
        summary,
        vec![
            (23, "home", Category::Goal),
            (30, "away", Category::Yellow),
            (50, "away", Category::Goal),
            (61, "away", Category::Goal),
            (70, "home", Category::Substitution),
            (70, "home", Category::Substitution),
            (80, "away", Category::Substitution),
            (88, "home", Category::Red),
            (93, "away", Category::Goal),
        ]
    );
    assert_eq!(events[3].label, "Marc Cucurella (Own Goal)");
    assert_eq!(events[1].label, "25. Moises Caicedo");
    // untyped goal keeps its slot ahead of the booking at the same minute
    assert_eq!(events[4].label, "Disallowed");
    assert_eq!(events[4].raw_type.as_deref(), Some(""));
    assert_eq!(events[5].label, "9. Gabriel Jesus for 29. Kai Havertz");
    assert_eq!(events[6].label, "Yellow Red Card");
}

#[test]
fn lineup_substitutes_fill_in_when_bookings_have_none() {
    let box_score = parse_box_score_json(&read_fixture("boxscore_lineup_subs.json"))
        .expect("fixture should parse");
    let events = box_score.timeline();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].category, Category::Yellow);
    assert_eq!(events[1].category, Category::Substitution);
    assert_eq!(events[1].minute, 64);
    assert_eq!(events[1].label, "Beto for Dominic Calvert-Lewin");
    assert_eq!(events[1].player_out_id, Some(9));
}

#[test]
fn player_event_map_tracks_badges_and_bench() {
    let box_score =
        parse_box_score_json(&read_fixture("boxscore.json")).expect("fixture should parse");
    let map = player_event_map(&box_score.timeline());
    assert_eq!(map.badges_for(9001), &[PlayerBadge::Goal]);
    assert_eq!(map.badges_for(9004), &[PlayerBadge::RedCard]);
    assert_eq!(map.badges_for(9002), &[PlayerBadge::SubOut]);
    assert!(map.is_subbed_in(9010));
    assert!(map.badges_for(9010).is_empty());
    // "Yellow Red Card" is not a known card type
    assert_eq!(map.badges_for(9103), &[PlayerBadge::YellowCard]);
}

proptest! {
    #[test]
    fn prop_merged_events_are_ordered_by_effective_minute(
        goals in goals_strategy(),
        bookings in bookings_strategy(),
    ) {
        let events = merge_timeline(&goals, &bookings, 1);
        prop_assert_eq!(events.len(), goals.len() + bookings.len());
        prop_assert!(events.windows(2).all(|w| w[0].minute <= w[1].minute));
    }

    #[test]
    fn prop_equal_minutes_keep_goals_first_then_input_order(
        goals in goals_strategy(),
        bookings in bookings_strategy(),
    ) {
        let events = merge_timeline(&goals, &bookings, 1);
        // goals carry ids below 1000, bookings 1000 and up, both in input order
        let mut expected: Vec<(u32, Option<u32>)> = goals
            .iter()
            .map(|g| (g.effective_minute(), g.player_id))
            .chain(bookings.iter().map(|b| (b.effective_minute(), b.player_id)))
            .collect();
        expected.sort_by_key(|(minute, _)| *minute);
        let actual: Vec<(u32, Option<u32>)> =
            events.iter().map(|e| (e.minute, e.player_id)).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_merging_is_repeatable(goals in goals_strategy(), bookings in bookings_strategy()) {
        prop_assert_eq!(
            merge_timeline(&goals, &bookings, 1),
            merge_timeline(&goals, &bookings, 1)
        );
    }
}
