// src/services/history.rs
use crate::models::{DetectionResult, Prediction};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Newest-first list of predictions made from this front-end.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<Prediction>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample rows shown before any detection has been made.
    pub fn seeded() -> Self {
        let rows = [
            (5, "2026-01-15 09:30", "Toyota", "Camry", 0.94),
            (4, "2026-01-15 16:45", "Audi", "A4", 0.91),
            (3, "2026-01-16 14:20", "Mercedes", "C-Class", 0.88),
            (2, "2026-01-16 11:15", "BMW", "X5", 0.92),
            (1, "2026-01-16 10:30", "Tesla", "Model 3", 0.95),
        ];

        let entries = rows
            .into_iter()
            .map(|(id, timestamp, brand, model, confidence)| Prediction {
                id,
                timestamp: timestamp.to_string(),
                brand: brand.to_string(),
                model: Some(model.to_string()),
                confidence,
            })
            .collect();
        Self { entries }
    }

    pub fn record(&mut self, result: &DetectionResult, timestamp: String) -> Prediction {
        let prediction = Prediction {
            id: self.len() as u64 + 1,
            timestamp,
            brand: result.brand.clone(),
            model: result.model.clone(),
            confidence: result.confidence,
        };
        self.entries.insert(0, prediction.clone());
        prediction
    }

    pub fn record_now(&mut self, result: &DetectionResult) -> Prediction {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.record(result, timestamp)
    }

    pub fn entries(&self) -> &[Prediction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn recent(&self, n: usize) -> &[Prediction] {
        &self.entries[..n.min(self.entries.len())]
    }
}
