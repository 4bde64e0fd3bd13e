use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchday_terminal::boxscore::parse_box_score_json;
use matchday_terminal::fixtures::{dedup_and_sort, parse_matches_json};
use matchday_terminal::match_stats::parse_match_stats_json;
use matchday_terminal::score::{Goal, GoalKind, reconcile_score};
use matchday_terminal::timeline::{Booking, BookingKind, merge_timeline};

fn sample_goals(count: u32) -> Vec<Goal> {
    (0..count)
        .map(|i| Goal {
            goal_id: Some(i as u64),
            team_id: 1 + i % 2,
            player_id: Some(i),
            name: format!("Scorer {i}"),
            game_minute: (i * 37) % 95,
            game_minute_extra: i % 3,
            kind: if i % 5 == 0 {
                GoalKind::OwnGoal
            } else {
                GoalKind::Goal
            },
        })
        .collect()
}

fn sample_bookings(count: u32) -> Vec<Booking> {
    (0..count)
        .map(|i| Booking {
            booking_id: Some(i as u64),
            team_id: 1 + i % 2,
            player_id: Some(100 + i),
            name: format!("Player {i}"),
            jersey: Some(i % 30),
            kind: match i % 3 {
                0 => BookingKind::YellowCard,
                1 => BookingKind::RedCard,
                _ => BookingKind::Substitution,
            },
            game_minute: (i * 13) % 95,
            game_minute_extra: 0,
            player_out_id: Some(200 + i),
            player_out_jersey: Some(i % 25),
            player_out_name: Some(format!("Out {i}")),
        })
        .collect()
}

fn bench_reconcile_score(c: &mut Criterion) {
    let goals = sample_goals(40);
    c.bench_function("reconcile_score", |b| {
        b.iter(|| {
            let score = reconcile_score(black_box(&goals), 1, 2);
            black_box(score.home_score + score.away_score);
        })
    });
}

fn bench_merge_timeline(c: &mut Criterion) {
    let goals = sample_goals(12);
    let bookings = sample_bookings(30);
    c.bench_function("merge_timeline", |b| {
        b.iter(|| {
            let events = merge_timeline(black_box(&goals), black_box(&bookings), 1);
            black_box(events.len());
        })
    });
}

fn bench_box_score_parse(c: &mut Criterion) {
    c.bench_function("box_score_parse", |b| {
        b.iter(|| {
            let box_score = parse_box_score_json(black_box(BOX_SCORE_JSON)).unwrap();
            black_box(box_score.timeline().len());
        })
    });
}

fn bench_pitch_layout(c: &mut Criterion) {
    let stats = parse_match_stats_json(STATS_JSON, "70001")
        .expect("valid fixture json")
        .expect("fixture game present");
    c.bench_function("pitch_layout", |b| {
        b.iter(|| {
            let pitch = black_box(&stats).pitch_layout();
            black_box(pitch.home.len() + pitch.away.len());
        })
    });
}

fn bench_matches_parse(c: &mut Criterion) {
    c.bench_function("matches_parse", |b| {
        b.iter(|| {
            let rows = parse_matches_json(black_box(MATCHES_JSON), "EPL").unwrap();
            black_box(dedup_and_sort(rows).len());
        })
    });
}

criterion_group!(
    perf,
    bench_reconcile_score,
    bench_merge_timeline,
    bench_box_score_parse,
    bench_pitch_layout,
    bench_matches_parse
);
criterion_main!(perf);

static BOX_SCORE_JSON: &str = include_str!("../tests/fixtures/boxscore.json");
static STATS_JSON: &str = include_str!("../tests/fixtures/stats_epl.json");
static MATCHES_JSON: &str = include_str!("../tests/fixtures/matches_epl.json");
