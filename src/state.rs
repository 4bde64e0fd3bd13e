use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use chrono::NaiveDate;

use crate::boxscore::BoxScore;
use crate::fixtures::{COMPETITIONS, FixtureMatch, competition_by_code};
use crate::match_stats::{MatchStats, PitchLayout};
use crate::score::ScoreLine;
use crate::stream::{Channel, LIVE_TV_PATH, StreamState};
use crate::summary::summarize_box_score;
use crate::timeline::TimelineEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Matches,
    MatchCentre { game_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchView {
    Recent,
    Today,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTab {
    Summary,
    Timeline,
    Lineups,
    Stats,
    Stream,
}

impl MatchTab {
    pub const ALL: [MatchTab; 5] = [
        MatchTab::Summary,
        MatchTab::Timeline,
        MatchTab::Lineups,
        MatchTab::Stats,
        MatchTab::Stream,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MatchTab::Summary => "Summary",
            MatchTab::Timeline => "Timeline",
            MatchTab::Lineups => "Lineups",
            MatchTab::Stats => "Stats",
            MatchTab::Stream => "Stream",
        }
    }
}

pub fn view_label(view: MatchView) -> &'static str {
    match view {
        MatchView::Recent => "Recent",
        MatchView::Today => "Today",
        MatchView::Live => "Live",
    }
}

/// Everything loaded for one match, plus the values derived from it.
#[derive(Debug, Clone, Default)]
pub struct MatchDetail {
    pub box_score: Option<BoxScore>,
    pub score: Option<ScoreLine>,
    pub timeline: Vec<TimelineEvent>,
    pub summary: Vec<String>,
    pub stats: Option<MatchStats>,
    pub pitch: Option<PitchLayout>,
    /// Stats document loaded but had no entry for this game.
    pub stats_missing: bool,
    pub error: Option<String>,
    pub fetched_at: Option<SystemTime>,
}

impl MatchDetail {
    fn set_box_score(&mut self, box_score: BoxScore) {
        self.score = Some(box_score.score_line());
        self.timeline = box_score.timeline();
        self.summary = summarize_box_score(&box_score);
        self.box_score = Some(box_score);
        self.error = None;
        self.fetched_at = Some(SystemTime::now());
    }

    fn set_stats(&mut self, stats: Option<MatchStats>) {
        self.pitch = stats.as_ref().map(|s| s.pitch_layout());
        self.stats_missing = stats.is_none();
        self.stats = stats;
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub view: MatchView,
    pub tab: MatchTab,
    /// `None` shows every competition.
    pub competition: Option<&'static str>,
    pub today: NaiveDate,
    pub selected: usize,
    pub matches: Vec<FixtureMatch>,
    pub matches_loading: bool,
    pub matches_updated: Option<SystemTime>,
    pub details: HashMap<u64, MatchDetail>,
    pub stream: StreamState,
    /// Query string mirroring the selected channel, as a shareable link would.
    pub stream_query: String,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            screen: Screen::Matches,
            view: MatchView::Recent,
            tab: MatchTab::Summary,
            competition: None,
            today,
            selected: 0,
            matches: Vec::with_capacity(64),
            matches_loading: true,
            matches_updated: None,
            details: HashMap::with_capacity(16),
            stream: StreamState::default(),
            stream_query: String::new(),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.matches
            .iter()
            .enumerate()
            .filter(|(_, m)| self.in_competition(m) && self.in_view(m))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn visible_matches(&self) -> Vec<&FixtureMatch> {
        self.visible_indices()
            .into_iter()
            .filter_map(|idx| self.matches.get(idx))
            .collect()
    }

    fn in_competition(&self, m: &FixtureMatch) -> bool {
        self.competition
            .is_none_or(|code| m.competition.eq_ignore_ascii_case(code))
    }

    fn in_view(&self, m: &FixtureMatch) -> bool {
        let on_today = m.kickoff().map(|k| k.date()) == Some(self.today);
        match self.view {
            MatchView::Recent => true,
            MatchView::Today => on_today,
            MatchView::Live => {
                on_today && (m.is_live() || m.status.eq_ignore_ascii_case("Scheduled"))
            }
        }
    }

    pub fn selected_match(&self) -> Option<&FixtureMatch> {
        match &self.screen {
            Screen::MatchCentre { game_id } => self.matches.iter().find(|m| m.game_id == *game_id),
            Screen::Matches => self
                .visible_indices()
                .get(self.selected)
                .and_then(|idx| self.matches.get(*idx)),
        }
    }

    pub fn selected_detail(&self) -> Option<&MatchDetail> {
        let id = self.selected_match()?.game_id;
        self.details.get(&id)
    }

    pub fn select_next(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 {
            total - 1
        } else {
            self.selected - 1
        };
    }

    pub fn clamp_selection(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn cycle_view(&mut self) {
        self.view = match self.view {
            MatchView::Recent => MatchView::Today,
            MatchView::Today => MatchView::Live,
            MatchView::Live => MatchView::Recent,
        };
        self.selected = 0;
    }

    pub fn cycle_competition(&mut self) {
        self.competition = match self.competition {
            None => COMPETITIONS.first().map(|c| c.code),
            Some(code) => COMPETITIONS
                .iter()
                .position(|c| c.code == code)
                .and_then(|idx| COMPETITIONS.get(idx + 1))
                .map(|c| c.code),
        };
        self.selected = 0;
        let label = self
            .competition
            .and_then(competition_by_code)
            .map(|c| c.name)
            .unwrap_or("All competitions");
        self.push_log(format!("[INFO] Competition: {label}"));
    }

    pub fn cycle_tab(&mut self, forward: bool) {
        let tabs = MatchTab::ALL;
        let idx = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        let next = if forward {
            (idx + 1) % tabs.len()
        } else {
            (idx + tabs.len() - 1) % tabs.len()
        };
        self.tab = tabs[next];
    }

    /// Opens the match centre for the selected row and returns what the
    /// provider needs to load it.
    pub fn open_selected(&mut self) -> Option<(String, u64)> {
        let m = self.selected_match()?;
        let request = (m.competition.clone(), m.game_id);
        self.screen = Screen::MatchCentre { game_id: m.game_id };
        self.tab = MatchTab::Summary;
        Some(request)
    }

    pub fn back_to_list(&mut self) {
        self.screen = Screen::Matches;
        self.clamp_selection();
    }

    pub fn cycle_stream_channel(&mut self, forward: bool) {
        self.stream.cycle_channel(forward);
        self.sync_stream_query();
    }

    pub fn cycle_stream_provider(&mut self) {
        self.stream.cycle_provider();
        self.sync_stream_query();
    }

    fn sync_stream_query(&mut self) {
        if let Some(query) = self.stream.query() {
            self.stream_query = query;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetMatches(Vec<FixtureMatch>),
    SetBoxScore {
        game_id: u64,
        box_score: Box<BoxScore>,
    },
    SetMatchStats {
        game_id: u64,
        stats: Option<Box<MatchStats>>,
    },
    DetailFailed {
        game_id: u64,
        message: String,
    },
    SetChannels(Vec<Channel>),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    RefreshMatches,
    FetchMatchDetails { competition: String, game_id: u64 },
    ReloadChannels,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetMatches(mut matches) => {
            let selected_id = match state.screen {
                Screen::Matches => state.selected_match().map(|m| m.game_id),
                Screen::MatchCentre { .. } => None,
            };
            // Box-score corrections outlive a listing refresh.
            for m in &mut matches {
                if m.is_final()
                    && let Some(score) = state
                        .details
                        .get(&m.game_id)
                        .and_then(|d| d.score.as_ref())
                {
                    m.apply_score(score);
                }
            }
            state.matches = matches;
            state.matches_loading = false;
            state.matches_updated = Some(SystemTime::now());
            if let Some(id) = selected_id
                && let Some(pos) = state
                    .visible_indices()
                    .iter()
                    .position(|idx| state.matches[*idx].game_id == id)
            {
                state.selected = pos;
            }
            state.clamp_selection();
        }
        Delta::SetBoxScore { game_id, box_score } => {
            let detail = state.details.entry(game_id).or_default();
            detail.set_box_score(*box_score);
            let score = detail.score.clone();
            if let (Some(score), Some(m)) = (
                score,
                state.matches.iter_mut().find(|m| m.game_id == game_id),
            ) && m.is_final()
            {
                m.apply_score(&score);
            }
        }
        Delta::SetMatchStats { game_id, stats } => {
            state
                .details
                .entry(game_id)
                .or_default()
                .set_stats(stats.map(|s| *s));
        }
        Delta::DetailFailed { game_id, message } => {
            state.details.entry(game_id).or_default().error = Some(message.clone());
            state.push_log(format!("[WARN] Match {game_id}: {message}"));
        }
        Delta::SetChannels(channels) => {
            let count = channels.len();
            state.stream = StreamState::load(LIVE_TV_PATH, &state.stream_query, channels);
            state.sync_stream_query();
            state.push_log(format!("[INFO] Loaded {count} stream channels"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
