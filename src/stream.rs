use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::json::is_blank_body;

pub const STREAM_PARAM: &str = "stream";
pub const LIVE_TV_PATH: &str = "/livetv";
pub const DEFAULT_PROVIDER: &str = "elixx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub label: &'static str,
    /// Substring of the channel URL that identifies the provider.
    pub keyword: &'static str,
}

pub const PROVIDERS: &[Provider] = &[
    Provider {
        label: "Vivosoccer",
        keyword: "vivosoccer",
    },
    Provider {
        label: "Sportzonline",
        keyword: "sportzonline",
    },
    Provider {
        label: "Elixx",
        keyword: "elixx",
    },
    Provider {
        label: "Koora",
        keyword: "koora",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub label: String,
    pub url: String,
}

impl Channel {
    pub fn provider(&self) -> Option<&'static Provider> {
        provider_for_url(&self.url)
    }
}

pub fn provider_for_url(url: &str) -> Option<&'static Provider> {
    let lowered = url.to_lowercase();
    PROVIDERS.iter().find(|p| lowered.contains(p.keyword))
}

pub fn provider_by_keyword(keyword: &str) -> Option<&'static Provider> {
    PROVIDERS
        .iter()
        .find(|p| p.keyword.eq_ignore_ascii_case(keyword.trim()))
}

pub fn channels_for_provider<'a>(channels: &'a [Channel], keyword: &str) -> Vec<&'a Channel> {
    let keyword = keyword.to_lowercase();
    channels
        .iter()
        .filter(|c| c.url.to_lowercase().contains(&keyword))
        .collect()
}

/// Short, URL-safe-once-escaped code for a channel label.
pub fn encode_label(label: &str) -> String {
    BASE64.encode(label.as_bytes())
}

/// Inverse of [`encode_label`]. Codes whose `+` was turned into a space by
/// form decoding are repaired first.
pub fn decode_label(code: &str) -> Option<String> {
    let repaired = code.trim().replace(' ', "+");
    let bytes = BASE64.decode(repaired.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// `stream=<code>`, form-encoded.
pub fn query_for_channel(channel: &Channel) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(STREAM_PARAM, &encode_label(&channel.label))
        .finish()
}

pub fn location_for_channel(path: &str, channel: &Channel) -> String {
    format!("{}?{}", path, query_for_channel(channel))
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.trim().trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

pub fn stream_code_from_query(query: &str) -> Option<String> {
    parse_query(query)
        .into_iter()
        .find(|(key, _)| key == STREAM_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSelection {
    pub channel: Option<Channel>,
    pub provider: &'static str,
}

/// Picks the channel to show when the live-TV page loads.
///
/// The channel named by the `stream` code wins (label match ignores case).
/// Failing that, only the bare live-TV page with no parameters gets a default:
/// the first channel of the default provider, else the first channel at all.
pub fn resolve_initial_channel(path: &str, query: &str, channels: &[Channel]) -> StreamSelection {
    if let Some(label) = stream_code_from_query(query).and_then(|code| decode_label(&code)) {
        let wanted = label.to_lowercase();
        if let Some(matched) = channels.iter().find(|c| c.label.to_lowercase() == wanted) {
            let provider = matched
                .provider()
                .map(|p| p.keyword)
                .unwrap_or(DEFAULT_PROVIDER);
            return StreamSelection {
                channel: Some(matched.clone()),
                provider,
            };
        }
    }

    let bare_live_tv = path.trim_end_matches('/') == LIVE_TV_PATH && parse_query(query).is_empty();
    let channel = if bare_live_tv {
        channels_for_provider(channels, DEFAULT_PROVIDER)
            .first()
            .map(|c| (*c).clone())
            .or_else(|| channels.first().cloned())
    } else {
        None
    };
    StreamSelection {
        channel,
        provider: DEFAULT_PROVIDER,
    }
}

/// Channel picker state that mirrors the selection into a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamState {
    channels: Vec<Channel>,
    provider: String,
    current: Option<Channel>,
}

impl StreamState {
    pub fn load(path: &str, query: &str, channels: Vec<Channel>) -> Self {
        let selection = resolve_initial_channel(path, query, &channels);
        Self {
            channels,
            provider: selection.provider.to_string(),
            current: selection.channel,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn current(&self) -> Option<&Channel> {
        self.current.as_ref()
    }

    pub fn filtered(&self) -> Vec<&Channel> {
        channels_for_provider(&self.channels, &self.provider)
    }

    /// Switches provider, keeping the current channel when it already belongs
    /// to it.
    pub fn select_provider(&mut self, keyword: &str) {
        self.provider = provider_by_keyword(keyword)
            .map(|p| p.keyword.to_string())
            .unwrap_or_else(|| keyword.trim().to_lowercase());
        let keeps_current = self
            .current
            .as_ref()
            .is_some_and(|c| c.url.to_lowercase().contains(&self.provider));
        if keeps_current {
            return;
        }
        let first = self.filtered().first().map(|c| (*c).clone());
        if first.is_some() {
            self.current = first;
        }
    }

    pub fn select_channel(&mut self, url: &str) -> bool {
        let Some(channel) = self.channels.iter().find(|c| c.url == url) else {
            return false;
        };
        self.current = Some(channel.clone());
        true
    }

    pub fn cycle_channel(&mut self, forward: bool) {
        let filtered = self.filtered();
        if filtered.is_empty() {
            return;
        }
        let idx = self
            .current
            .as_ref()
            .and_then(|c| filtered.iter().position(|f| f.url == c.url));
        let next = match (idx, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % filtered.len(),
            (Some(i), false) => (i + filtered.len() - 1) % filtered.len(),
        };
        let picked = filtered[next].clone();
        self.current = Some(picked);
    }

    pub fn cycle_provider(&mut self) {
        let idx = PROVIDERS
            .iter()
            .position(|p| p.keyword == self.provider)
            .map(|i| (i + 1) % PROVIDERS.len())
            .unwrap_or(0);
        self.select_provider(PROVIDERS[idx].keyword);
    }

    /// Query string for the current channel, when it belongs to a known
    /// provider.
    pub fn query(&self) -> Option<String> {
        let current = self.current.as_ref()?;
        current.provider()?;
        Some(query_for_channel(current))
    }
}

pub fn parse_channels_json(raw: &str) -> Result<Vec<Channel>> {
    if is_blank_body(raw) {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw.trim()).context("invalid channel list json")
}

pub const CHANNEL_FILES: &[&str] = &[
    "sportzonline.json",
    "vivosoccer.json",
    "elixx.json",
    "koora.json",
];

/// Reads every provider list in `dir`. Unreadable files contribute nothing
/// and are reported back as errors.
pub fn load_channel_dir(dir: &Path) -> (Vec<Channel>, Vec<String>) {
    let mut channels = Vec::new();
    let mut errors = Vec::new();
    for name in CHANNEL_FILES {
        let path = dir.join(name);
        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))
            .and_then(|raw| parse_channels_json(&raw));
        match parsed {
            Ok(list) => channels.extend(list),
            Err(err) => errors.push(format!("{err:#}")),
        }
    }
    (channels, errors)
}
