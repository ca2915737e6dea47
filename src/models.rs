//! Data models for ChainStreamer Hub

use chrono::{DateTime, TimeZone, Utc};

/// UI Tab selection
#[derive(Debug, Clone, PartialEq)]
pub enum Tab {
    Live,
    Vod,
    Console,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Live,
    Vod,
}

/// One stream entry read from the Streamer object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamRecord {
    /// Stream key; empty or absent for recorded streams
    pub url: Option<String>,
    /// Display index, assigned to recorded streams only
    pub index: Option<String>,
    pub name: String,
    pub description: String,
    pub start_at: Option<String>,
    pub last_update_at: Option<String>,
    pub upload_at: Option<String>,
    pub m3u8_content: String,
}

impl StreamRecord {
    pub fn kind(&self) -> StreamKind {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => StreamKind::Live,
            _ => StreamKind::Vod,
        }
    }

    /// Epoch millis the "Started ... ago" label is based on
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.start_at
            .as_deref()
            .or(self.upload_at.as_deref())
            .and_then(|ts| ts.trim().parse::<i64>().ok())
    }
}

/// The two display-ready lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamLists {
    pub live: Vec<StreamRecord>,
    pub vod: Vec<StreamRecord>,
}

/// Relative age of an epoch-millis timestamp, e.g. "5 minutes" or "about 2 hours"
pub fn format_ago(millis: i64, now: DateTime<Utc>) -> String {
    let then = match Utc.timestamp_millis_opt(millis).single() {
        Some(then) => then,
        None => return "some time".to_string(),
    };

    let secs = (now - then).num_seconds().max(0);
    let mins = (secs + 30) / 60;
    let hours = (mins + 30) / 60;
    let days = (hours + 12) / 24;

    if secs < 30 {
        "less than a minute".to_string()
    } else if mins <= 1 {
        "1 minute".to_string()
    } else if mins < 45 {
        format!("{} minutes", mins)
    } else if mins < 90 {
        "about 1 hour".to_string()
    } else if hours < 24 {
        format!("about {} hours", hours)
    } else if hours < 42 {
        "1 day".to_string()
    } else if days < 30 {
        format!("{} days", days)
    } else if days < 45 {
        "about 1 month".to_string()
    } else if days < 365 {
        format!("{} months", (days + 15) / 30)
    } else {
        let years = days / 365;
        if years == 1 {
            "about 1 year".to_string()
        } else {
            format!("about {} years", years)
        }
    }
}
