use std::fs;
use std::path::PathBuf;

use matchday_terminal::boxscore::parse_box_score_json;
use matchday_terminal::fixtures::parse_matches_json;
use matchday_terminal::match_stats::parse_match_stats_json;
use matchday_terminal::stream::{load_channel_dir, parse_channels_json};
use matchday_terminal::teams::parse_teams_json;
use matchday_terminal::timeline::BookingKind;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn parses_box_score_fixture() {
    let box_score =
        parse_box_score_json(&read_fixture("boxscore.json")).expect("fixture should parse");
    assert_eq!(box_score.game.game_id, 70001);
    assert_eq!(box_score.game.home_team_name, "Arsenal FC");
    assert_eq!(box_score.game.attendance, Some(60212));
    assert_eq!(box_score.goals.len(), 5);
    assert_eq!(box_score.goals[0].game_minute_extra, 0);
    assert_eq!(box_score.bookings.len(), 4);
    assert_eq!(
        box_score.bookings[3].kind,
        BookingKind::Other("Yellow Red Card".to_string())
    );

    let away = box_score.away_team_game().expect("away team line");
    assert_eq!(away.team_id, 502);
    assert_eq!(away.corner_kicks, 0.0);
    assert_eq!(box_score.lineups.len(), 2);
}

#[test]
fn box_score_accepts_bare_object_and_blank_bodies() {
    let bare = parse_box_score_json(&read_fixture("boxscore_lineup_subs.json"))
        .expect("object should parse");
    assert_eq!(bare.game.game_id, 70003);
    assert!(bare.goals.is_empty());
    assert!(bare.home_team_game().is_none());

    for raw in ["", "null", "[]", "  null  "] {
        let empty = parse_box_score_json(raw).expect("blank should parse");
        assert_eq!(empty.game.game_id, 0);
        assert!(empty.goals.is_empty());
        assert!(empty.timeline().is_empty());
    }
}

#[test]
fn box_score_rejects_garbage() {
    assert!(parse_box_score_json("{not json").is_err());
}

#[test]
fn stats_lookup_matches_string_and_numeric_ids() {
    let raw = read_fixture("stats_epl.json");
    let by_string = parse_match_stats_json(&raw, "70001")
        .expect("fixture should parse")
        .expect("string id entry");
    assert_eq!(by_string.lineups.len(), 2);
    assert_eq!(by_string.events.len(), 6);
    let home = by_string.home_lineup().expect("home lineup");
    assert_eq!(home.formation, "4-3-3");
    assert!(
        home.start_xi
            .iter()
            .all(|e| e.team.as_ref().is_some_and(|t| t.id == 42))
    );
    let keeper = &home.start_xi[0].player;
    assert_eq!(
        home.kit_for(keeper).and_then(|k| k.primary.as_deref()),
        Some("00ff00")
    );

    let by_number = parse_match_stats_json(&raw, " 70002 ")
        .expect("fixture should parse")
        .expect("numeric id entry");
    assert_eq!(by_number.game_id, "70002");
    assert!(by_number.lineups.is_empty());
}

#[test]
fn stats_missing_game_is_none() {
    let raw = read_fixture("stats_epl.json");
    assert!(parse_match_stats_json(&raw, "99999").expect("should parse").is_none());
    assert!(parse_match_stats_json("null", "70001").expect("null should parse").is_none());
    assert!(parse_match_stats_json("{}", "70001").expect("object should parse").is_none());
}

#[test]
fn parses_matches_fixture() {
    let matches =
        parse_matches_json(&read_fixture("matches_epl.json"), "EPL").expect("fixture should parse");
    // the entry without a GameId is skipped, duplicates are kept until selection
    assert_eq!(matches.len(), 6);
    assert!(matches.iter().all(|m| m.competition == "EPL"));

    let live = &matches[1];
    assert_eq!(live.game_id, 70004);
    assert_eq!(live.season, Some(2025));
    assert_eq!(live.home_team_name, "Liverpool FC");
    assert!(live.is_live());

    let scheduled = &matches[2];
    assert_eq!(scheduled.status, "Scheduled");
    assert_eq!(scheduled.score_text(), "-");
    assert_eq!(
        scheduled.kickoff().map(|k| k.to_string()).as_deref(),
        Some("2025-03-17 00:00:00")
    );

    assert!(matches[0].is_final());
    assert!(matches[4].kickoff().is_none());
    assert_eq!(
        matches[5].kickoff().map(|k| k.format("%H:%M").to_string()).as_deref(),
        Some("12:30")
    );
}

#[test]
fn matches_blank_body_is_empty() {
    assert!(parse_matches_json("null", "EPL").expect("null should parse").is_empty());
    assert!(parse_matches_json("{\"GameId\": 1}", "EPL").expect("object should parse").is_empty());
}

#[test]
fn parses_teams_fixture() {
    let teams = parse_teams_json(&read_fixture("teams_epl.json")).expect("fixture should parse");
    assert_eq!(teams.len(), 4);
    assert_eq!(teams[0].key, "ARS");
    assert_eq!(teams[2].short_name, None);
    assert_eq!(teams[3].team_id, 0);
    assert_eq!(teams[3].key, "");
    assert!(parse_teams_json("").expect("blank should parse").is_empty());
}

#[test]
fn channel_dir_collects_lists_and_reports_missing_files() {
    let (channels, errors) = load_channel_dir(&fixture_path("channels"));
    assert_eq!(channels.len(), 4);
    assert_eq!(channels[0].label, "HD 4 ~>");
    // koora.json is absent
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("koora.json"));
    assert!(parse_channels_json("null").expect("null should parse").is_empty());
}

#[test]
fn box_score_keeps_good_rows_next_to_bad_ones() {
    let raw = r#"[{
        "Game": { "GameId": "70010", "HomeTeamId": 1, "AwayTeamId": 2 },
        "Goals": [
            { "TeamId": 1, "Name": "Early", "GameMinute": 12, "Type": "Goal" },
            { "TeamId": "2", "Name": "Stoppage", "GameMinute": "45+2", "Type": "Goal" },
            null,
            "not a goal"
        ],
        "Bookings": [
            {
                "TeamId": 2, "Name": "Booked", "Jersey": "25",
                "Type": "Yellow Card", "GameMinute": 30
            },
            42
        ],
        "TeamGames": [
            { "TeamId": 1, "Possession": "55.5", "Shots": null },
            { "TeamId": 2, "Possession": 44.5 }
        ]
    }]"#;
    let box_score = parse_box_score_json(raw).expect("bad rows should not fail the box score");
    assert_eq!(box_score.game.game_id, 70010);
    assert_eq!(box_score.goals.len(), 2);
    assert_eq!(box_score.goals[1].team_id, 2);
    assert_eq!(box_score.goals[1].game_minute, 45);
    assert_eq!(box_score.score_line().display(), "1 : 1");

    assert_eq!(box_score.bookings.len(), 1);
    assert_eq!(box_score.bookings[0].jersey, Some(25));
    let labels: Vec<String> = box_score.timeline().into_iter().map(|e| e.label).collect();
    assert_eq!(labels, vec!["Early", "25. Booked", "Stoppage"]);

    let home = box_score.home_team_game().expect("home line");
    assert_eq!(home.possession, 55.5);
    assert_eq!(home.shots, 0.0);
}

#[test]
fn stats_entry_keeps_players_with_string_numbers() {
    let raw = r#"[{
        "GameId": 5,
        "Lineups": [
            {
                "team": { "id": "42", "name": "Home" },
                "formation": "4-4-2",
                "startXI": [
                    {
                        "player": {
                            "id": "1", "name": "Keeper", "number": "1", "pos": "G", "grid": "1:1"
                        }
                    },
                    null,
                    { "player": null },
                    { "player": { "id": 2, "name": "Back", "number": 2, "grid": "2:1" } }
                ],
                "substitutes": "none"
            },
            null
        ],
        "Events": [null, { "type": "Goal", "player": { "id": "2" } }]
    }]"#;
    let stats = parse_match_stats_json(raw, "5")
        .expect("bad rows should not fail the entry")
        .expect("game present");
    let home = stats.home_lineup().expect("home lineup");
    assert_eq!(home.team.id, 42);
    assert_eq!(home.start_xi.len(), 2);
    assert_eq!(home.start_xi[0].player.number, Some(1));
    assert!(home.substitutes.is_empty());

    // the malformed away side keeps its slot
    assert_eq!(stats.lineups.len(), 2);
    assert!(stats.away_lineup().is_some_and(|l| l.start_xi.is_empty()));

    assert_eq!(stats.events.len(), 1);
    let pitch = stats.pitch_layout();
    assert_eq!(pitch.home.len(), 2);
    assert!(pitch.away.is_empty());
    assert_eq!(pitch.home[1].events.len(), 1);
}
