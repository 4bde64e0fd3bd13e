use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SPORTSDATA_BASE_URL: &str = "https://api.sportsdata.io/v4/soccer/stats/json";
const DEFAULT_MATCHES_BASE_URL: &str =
    "https://raw.githubusercontent.com/gowrapavan/shortsdata/main/matches";
const DEFAULT_STATS_BASE_URL: &str =
    "https://raw.githubusercontent.com/gowrapavan/shortsdata/main/stats";
const DEFAULT_TEAMS_BASE_URL: &str =
    "https://raw.githubusercontent.com/gowrapavan/shortsdata/main/teams";

/// Runtime settings, read from the environment after `.env.local` / `.env`
/// have been loaded.
#[derive(Debug, Clone)]
pub struct Config {
    pub sportsdata_api_key: Option<String>,
    pub sportsdata_base_url: String,
    pub matches_base_url: String,
    pub stats_base_url: String,
    pub teams_base_url: String,
    pub matches_poll: Duration,
    pub details_poll: Duration,
    pub fetch_parallelism: usize,
    pub team_cache_ttl: Duration,
    pub matches_past_days: u32,
    pub matches_future_days: u32,
    pub stream_channels_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sportsdata_api_key: None,
            sportsdata_base_url: DEFAULT_SPORTSDATA_BASE_URL.to_string(),
            matches_base_url: DEFAULT_MATCHES_BASE_URL.to_string(),
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            teams_base_url: DEFAULT_TEAMS_BASE_URL.to_string(),
            matches_poll: Duration::from_secs(60),
            details_poll: Duration::from_secs(60),
            fetch_parallelism: 6,
            team_cache_ttl: Duration::from_secs(6 * 60 * 60),
            matches_past_days: 7,
            matches_future_days: 7,
            stream_channels_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sportsdata_api_key: env_string("SPORTSDATA_API_KEY"),
            sportsdata_base_url: env_string("SPORTSDATA_BASE_URL")
                .unwrap_or(defaults.sportsdata_base_url),
            matches_base_url: env_string("MATCHES_BASE_URL").unwrap_or(defaults.matches_base_url),
            stats_base_url: env_string("STATS_BASE_URL").unwrap_or(defaults.stats_base_url),
            teams_base_url: env_string("TEAMS_BASE_URL").unwrap_or(defaults.teams_base_url),
            matches_poll: Duration::from_secs(env_u64("MATCHES_POLL_SECS").unwrap_or(60).max(10)),
            details_poll: Duration::from_secs(env_u64("DETAILS_POLL_SECS").unwrap_or(60).max(30)),
            fetch_parallelism: env_u64("FETCH_PARALLELISM")
                .map(|v| v as usize)
                .unwrap_or(defaults.fetch_parallelism)
                .clamp(2, 32),
            team_cache_ttl: env_u64("TEAM_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.team_cache_ttl),
            matches_past_days: env_u64("MATCHES_PAST_DAYS")
                .map(|v| v as u32)
                .unwrap_or(defaults.matches_past_days)
                .min(30),
            matches_future_days: env_u64("MATCHES_FUTURE_DAYS")
                .map(|v| v as u32)
                .unwrap_or(defaults.matches_future_days)
                .min(30),
            stream_channels_dir: env_string("STREAM_CHANNELS_DIR").map(PathBuf::from),
        }
    }
}

/// Loads `.env.local` first so it wins over `.env`.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|val| val.parse::<u64>().ok())
}
