//! Transient toast notifications

use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub text: String,
    pub created: Instant,
}

#[derive(Debug)]
pub struct Toasts {
    items: Vec<Toast>,
    ttl: Duration,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self { items: Vec::new(), ttl }
    }

    pub fn push_at(&mut self, level: ToastLevel, text: impl Into<String>, now: Instant) {
        self.items.push(Toast {
            level,
            text: text.into(),
            created: now,
        });
        if self.items.len() > MAX_TOASTS {
            let excess = self.items.len() - MAX_TOASTS;
            self.items.drain(..excess);
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push_at(ToastLevel::Success, text, Instant::now());
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push_at(ToastLevel::Info, text, Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push_at(ToastLevel::Error, text, Instant::now());
    }

    /// Drop expired toasts
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|t| now.saturating_duration_since(t.created) < ttl);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(TOAST_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_ttl() {
        let mut toasts = Toasts::new(Duration::from_secs(4));
        let t0 = Instant::now();
        toasts.push_at(ToastLevel::Success, "Success!", t0);
        toasts.push_at(ToastLevel::Error, "name taken", t0 + Duration::from_secs(2));

        toasts.prune(t0 + Duration::from_secs(3));
        assert_eq!(toasts.iter().count(), 2);

        toasts.prune(t0 + Duration::from_secs(4));
        let left: Vec<_> = toasts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(left, vec!["name taken"]);

        toasts.prune(t0 + Duration::from_secs(6));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_oldest_toasts_are_dropped_past_limit() {
        let mut toasts = Toasts::default();
        let now = Instant::now();
        for i in 0..8 {
            toasts.push_at(ToastLevel::Info, format!("msg {}", i), now);
        }
        let texts: Vec<_> = toasts.iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts.len(), MAX_TOASTS);
        assert_eq!(texts[0], "msg 3");
        assert_eq!(texts[4], "msg 7");
    }
}
