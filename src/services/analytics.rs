// src/services/analytics.rs
use crate::errors::CarspotError;
use crate::models::{DistributionEntry, Prediction, StatsResponse, TrendPoint};
use std::collections::HashSet;
use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(5);
pub const TREND_WINDOW: usize = 10;
pub const HIGH_CONFIDENCE: f64 = 0.9;

/// UI gate in front of the dashboard. Not an access-control boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Locked,
    Unlocked,
}

#[derive(Debug)]
pub struct AccessGate {
    password: String,
    state: GateState,
}

impl AccessGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            state: GateState::Locked,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    pub fn submit(&mut self, attempt: &str) -> Result<bool, CarspotError> {
        if attempt != self.password {
            return Err(CarspotError::InvalidCredential);
        }
        let entered = self.state == GateState::Locked;
        self.state = GateState::Unlocked;
        Ok(entered)
    }

    pub fn logout(&mut self) {
        self.state = GateState::Locked;
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    stats: Option<StatsResponse>,
    notice: Option<Notice>,
}

impl Dashboard {
    pub fn stats(&self) -> Option<&StatsResponse> {
        self.stats.as_ref()
    }

    pub fn apply_fetch(&mut self, outcome: Result<StatsResponse, CarspotError>, now: Instant) {
        match outcome {
            Ok(stats) => {
                self.stats = Some(stats);
                self.notice = None;
            }
            Err(e) => {
                self.notice = Some(Notice {
                    message: format!("Failed to load statistics: {}", e),
                    expires_at: now + NOTICE_TTL,
                });
            }
        }
    }

    pub fn notice_at(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| now < n.expires_at)
            .map(|n| n.message.as_str())
    }

    pub fn notice_expiry(&self) -> Option<Instant> {
        self.notice.as_ref().map(|n| n.expires_at)
    }

    pub fn clear(&mut self) {
        self.stats = None;
        self.notice = None;
    }
}

/// Class counts sorted by count descending, ties broken by label.
pub fn class_distribution(stats: &StatsResponse) -> Vec<DistributionEntry> {
    let mut entries: Vec<DistributionEntry> = stats
        .class_distribution
        .iter()
        .map(|(label, count)| DistributionEntry {
            label: label.clone(),
            count: *count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

pub fn confidence_trend(history: &[Prediction], window: usize) -> Vec<TrendPoint> {
    history
        .iter()
        .take(window)
        .rev()
        .enumerate()
        .map(|(i, p)| TrendPoint {
            position: i + 1,
            id: p.id,
            confidence: p.confidence,
        })
        .collect()
}

pub fn average_confidence(history: &[Prediction]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    Some(history.iter().map(|p| p.confidence).sum::<f64>() / history.len() as f64)
}

pub fn unique_brands(history: &[Prediction]) -> usize {
    history
        .iter()
        .map(|p| p.brand.as_str())
        .collect::<HashSet<_>>()
        .len()
}

pub fn high_confidence_count(history: &[Prediction]) -> usize {
    history
        .iter()
        .filter(|p| p.confidence > HIGH_CONFIDENCE)
        .count()
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
