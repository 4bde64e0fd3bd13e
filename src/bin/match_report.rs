use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use matchday_terminal::boxscore::{BoxScore, fetch_box_score, parse_box_score_json};
use matchday_terminal::config::{self, Config};
use matchday_terminal::http_cache::HttpCache;
use matchday_terminal::logging;
use matchday_terminal::match_stats::{MatchStats, parse_match_stats_json};
use matchday_terminal::summary::summarize_box_score;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_stderr_logging();

    let box_score = load_box_score()?;
    let game = &box_score.game;
    let game_id = arg_value("--game")
        .or_else(|| (game.game_id != 0).then(|| game.game_id.to_string()))
        .unwrap_or_default();

    let score = box_score.score_line();
    println!(
        "{} {} {}",
        game.home_team_name,
        score.display(),
        game.away_team_name
    );
    for (side, goals) in [("home", &score.home_goals), ("away", &score.away_goals)] {
        for goal in goals {
            println!("  {side}: {}", goal.scorer_label());
        }
    }

    let timeline = box_score.timeline();
    println!();
    println!("Timeline ({} events)", timeline.len());
    for event in &timeline {
        println!(
            "  {:>3}' {:>5.1}% {:<14} {}",
            event.minute,
            event.position_pct(),
            event.marker_class(),
            event.label
        );
    }

    println!();
    println!("Summary");
    for paragraph in summarize_box_score(&box_score) {
        println!("  {paragraph}");
    }

    if let Some(path) = arg_path("--stats") {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read stats file {}", path.display()))?;
        match parse_match_stats_json(&raw, &game_id)? {
            Some(stats) => print_lineups(&stats),
            None => println!("\nNo lineup entry for game {game_id}"),
        }
    }

    Ok(())
}

/// `--boxscore <file>` reads a saved response; otherwise `--competition` and
/// `--game` fetch it live.
fn load_box_score() -> Result<BoxScore> {
    if let Some(path) = arg_path("--boxscore") {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read box score file {}", path.display()))?;
        return parse_box_score_json(&raw);
    }
    let competition =
        arg_value("--competition").ok_or_else(|| anyhow!("pass --boxscore or --competition"))?;
    let game_id = arg_value("--game")
        .ok_or_else(|| anyhow!("--game is required when fetching"))?
        .parse::<u64>()
        .context("--game must be numeric")?;
    let config = Config::from_env();
    let cache = HttpCache::open_default();
    fetch_box_score(&cache, &config, &competition, game_id)
}

fn print_lineups(stats: &MatchStats) {
    let pitch = stats.pitch_layout();
    for (label, lineup, players, bench) in [
        ("Home", stats.home_lineup(), &pitch.home, &pitch.home_bench),
        ("Away", stats.away_lineup(), &pitch.away, &pitch.away_bench),
    ] {
        let Some(lineup) = lineup else {
            continue;
        };
        println!();
        println!("{label}: {} ({})", lineup.team.name, lineup.formation);
        for placed in players {
            let badges: String = placed.events.iter().map(|b| b.symbol()).collect();
            println!(
                "  #{:<3} {:<24} x={:>5.1} y={:>5.1} {}",
                placed
                    .player
                    .number
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                placed.player.name,
                placed.x,
                placed.y,
                badges
            );
        }
        if !bench.is_empty() {
            println!("  Bench:");
            for sub in bench {
                println!("    {}", sub.label());
            }
        }
    }
}

fn arg_path(flag: &str) -> Option<PathBuf> {
    arg_value(flag).map(PathBuf::from)
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
