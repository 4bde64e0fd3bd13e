use std::collections::{BTreeSet, HashSet};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use rayon::prelude::*;

use crate::boxscore::fetch_box_score;
use crate::config::Config;
use crate::fixtures::{FixtureMatch, fetch_all_competitions, recent_matches, with_fetch_pool};
use crate::http_cache::HttpCache;
use crate::match_stats::fetch_match_stats;
use crate::state::{Delta, ProviderCommand};
use crate::stream::load_channel_dir;
use crate::teams::{TeamDirectory, fetch_teams};

/// Runs the fetch loop on its own thread. The loop ends once the UI drops its
/// command sender.
pub fn spawn_provider(config: Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let config = Arc::new(config);
        let cache = Arc::new(HttpCache::open_default());
        let mut teams = TeamDirectory::new(config.team_cache_ttl);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.fetch_parallelism)
            .build()
            .ok();
        let inflight: Arc<Mutex<HashSet<u64>>> = Arc::new(Mutex::new(HashSet::new()));

        tracing::info!(
            poll_secs = config.matches_poll.as_secs(),
            parallelism = config.fetch_parallelism,
            "provider started"
        );

        refresh_matches(&cache, &config, &mut teams, &tx);
        let mut last_refresh = Instant::now();
        load_channels(&config, &tx);

        loop {
            match cmd_rx.recv_timeout(Duration::from_millis(500)) {
                Ok(ProviderCommand::RefreshMatches) => {
                    refresh_matches(&cache, &config, &mut teams, &tx);
                    last_refresh = Instant::now();
                }
                Ok(ProviderCommand::FetchMatchDetails {
                    competition,
                    game_id,
                }) => {
                    let fresh = inflight
                        .lock()
                        .expect("inflight details lock poisoned")
                        .insert(game_id);
                    if fresh {
                        let tx = tx.clone();
                        let cache = cache.clone();
                        let config = config.clone();
                        let inflight = inflight.clone();
                        let job = move || {
                            fetch_match_details(&cache, &config, &competition, game_id, &tx);
                            inflight
                                .lock()
                                .expect("inflight details lock poisoned")
                                .remove(&game_id);
                        };
                        match pool.as_ref() {
                            Some(pool) => pool.spawn(job),
                            None => {
                                thread::spawn(job);
                            }
                        }
                    }
                }
                Ok(ProviderCommand::ReloadChannels) => load_channels(&config, &tx),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("provider stopped");
                    return;
                }
            }

            if last_refresh.elapsed() >= config.matches_poll {
                refresh_matches(&cache, &config, &mut teams, &tx);
                last_refresh = Instant::now();
            }
        }
    });
}

fn refresh_matches(
    cache: &HttpCache,
    config: &Config,
    teams: &mut TeamDirectory,
    tx: &Sender<Delta>,
) {
    let fetched = fetch_all_competitions(cache, config);
    for err in &fetched.errors {
        let _ = tx.send(Delta::Log(format!("[WARN] Fixtures: {err}")));
    }

    let today = Local::now().date_naive();
    let mut matches = recent_matches(
        &fetched.matches,
        today,
        config.matches_past_days,
        config.matches_future_days,
    );
    fill_team_logos(cache, config, teams, &mut matches, tx);
    correct_final_scores(cache, config, today, &mut matches);

    tracing::info!(
        total = fetched.matches.len(),
        shown = matches.len(),
        "fixtures refreshed"
    );
    let _ = tx.send(Delta::SetMatches(matches));
}

/// Listings often omit crests; borrow them from the team directory.
fn fill_team_logos(
    cache: &HttpCache,
    config: &Config,
    teams: &mut TeamDirectory,
    matches: &mut [FixtureMatch],
    tx: &Sender<Delta>,
) {
    let now = Instant::now();
    let competitions: BTreeSet<String> = matches
        .iter()
        .filter(|m| m.home_team_logo.is_none() || m.away_team_logo.is_none())
        .map(|m| m.competition.clone())
        .collect();
    let mut loaded = HashSet::new();
    for comp in competitions {
        match teams.get_or_load(&comp, now, |c| fetch_teams(cache, config, c)) {
            Ok(_) => {
                loaded.insert(comp);
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Teams {comp}: {err:#}")));
            }
        }
    }

    for m in matches.iter_mut().filter(|m| loaded.contains(&m.competition)) {
        if m.home_team_logo.is_none() {
            m.home_team_logo = teams
                .logo_for(&m.competition, &m.home_team_key, now)
                .map(str::to_string);
        }
        if m.away_team_logo.is_none() {
            m.away_team_logo = teams
                .logo_for(&m.competition, &m.away_team_key, now)
                .map(str::to_string);
        }
    }
}

/// Listed scores for finished matches can lag; today's finals are re-scored
/// from their box score goals.
fn correct_final_scores(
    cache: &HttpCache,
    config: &Config,
    today: NaiveDate,
    matches: &mut [FixtureMatch],
) {
    if config.sportsdata_api_key.is_none() {
        return;
    }
    with_fetch_pool(config, || {
        matches
            .par_iter_mut()
            .filter(|m| m.is_final() && m.kickoff().map(|k| k.date()) == Some(today))
            .for_each(|m| match fetch_box_score(cache, config, &m.competition, m.game_id) {
                Ok(box_score) if box_score.game.game_id == m.game_id => {
                    m.apply_score(&box_score.score_line());
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(game_id = m.game_id, error = %err, "score correction skipped");
                }
            });
    });
}

fn fetch_match_details(
    cache: &HttpCache,
    config: &Config,
    competition: &str,
    game_id: u64,
    tx: &Sender<Delta>,
) {
    let game_key = game_id.to_string();
    let (box_score, stats) = rayon::join(
        || fetch_box_score(cache, config, competition, game_id),
        || fetch_match_stats(cache, config, competition, &game_key),
    );

    match box_score {
        Ok(box_score) => {
            let _ = tx.send(Delta::SetBoxScore {
                game_id,
                box_score: Box::new(box_score),
            });
        }
        Err(err) => {
            tracing::warn!(game_id, error = %err, "box score failed");
            let _ = tx.send(Delta::DetailFailed {
                game_id,
                message: format!("{err:#}"),
            });
        }
    }

    match stats {
        Ok(stats) => {
            let _ = tx.send(Delta::SetMatchStats {
                game_id,
                stats: stats.map(Box::new),
            });
        }
        Err(err) => {
            tracing::warn!(game_id, error = %err, "match stats failed");
            let _ = tx.send(Delta::Log(format!("[WARN] Stats {game_id}: {err:#}")));
        }
    }
}

fn load_channels(config: &Config, tx: &Sender<Delta>) {
    let Some(dir) = config.stream_channels_dir.as_deref() else {
        let _ = tx.send(Delta::Log(
            "[INFO] STREAM_CHANNELS_DIR not set; stream tab is empty".to_string(),
        ));
        return;
    };
    let (channels, errors) = load_channel_dir(dir);
    for err in errors {
        let _ = tx.send(Delta::Log(format!("[WARN] Channels: {err}")));
    }
    let _ = tx.send(Delta::SetChannels(channels));
}
