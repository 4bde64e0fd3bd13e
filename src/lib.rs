pub mod boxscore;
pub mod config;
pub mod feed;
pub mod fixtures;
pub mod http_cache;
pub mod http_client;
pub mod json;
pub mod lineup;
pub mod logging;
pub mod match_stats;
pub mod score;
pub mod state;
pub mod stream;
pub mod summary;
pub mod teams;
pub mod timeline;
