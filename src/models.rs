// src/models.rs
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the local prediction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: u64,
    pub timestamp: String,
    pub brand: String,
    pub model: Option<String>,
    pub confidence: f64,
}

/// An image the user picked for detection.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Outcome of one detection, whichever remote endpoint produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub brand: String,
    pub model: Option<String>,
    pub confidence: f64,
    pub all_predictions: Option<HashMap<String, f64>>,
    pub prediction_id: Option<i64>,
}

/// Body of `POST /api/detect`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectResponse {
    pub brand: String,
    #[serde(default)]
    pub model: Option<String>,
    pub confidence: f64,
}

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_class: String,
    pub confidence: f64,
    #[serde(default)]
    pub all_predictions: HashMap<String, f64>,
    pub prediction_id: i64,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<DetectResponse> for DetectionResult {
    fn from(resp: DetectResponse) -> Self {
        Self {
            brand: resp.brand,
            model: resp.model.filter(|m| !m.is_empty()),
            confidence: resp.confidence,
            all_predictions: None,
            prediction_id: None,
        }
    }
}

impl From<PredictionResponse> for DetectionResult {
    fn from(resp: PredictionResponse) -> Self {
        Self {
            brand: resp.predicted_class,
            model: None,
            confidence: resp.confidence,
            all_predictions: Some(resp.all_predictions),
            prediction_id: Some(resp.prediction_id),
        }
    }
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_predictions: u64,
    pub average_confidence: f64,
    #[serde(default)]
    pub most_common_class: Option<String>,
    pub predictions_today: u64,
    #[serde(default)]
    pub class_distribution: HashMap<String, u64>,
}

/// One row of `GET /api/predictions`, the remote service's own history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePrediction {
    pub id: i64,
    pub image_path: String,
    pub predicted_class: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Error body the remote service sends on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ServiceErrorBody {
    pub fn text(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            return Some(message.clone());
        }
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub position: usize,
    pub id: u64,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_response_maps_class_to_brand() {
        let body = r#"{
            "predicted_class": "Toyota",
            "confidence": 0.87,
            "all_predictions": {"Toyota": 0.87, "Honda": 0.13},
            "prediction_id": 42,
            "image_path": "uploads/x.jpg",
            "message": "Prediction successful"
        }"#;
        let resp: PredictionResponse = serde_json::from_str(body).unwrap();
        let result = DetectionResult::from(resp);
        assert_eq!(result.brand, "Toyota");
        assert_eq!(result.model, None);
        assert_eq!(result.prediction_id, Some(42));
        assert_eq!(result.all_predictions.unwrap().len(), 2);
    }

    #[test]
    fn detect_response_without_model_is_accepted() {
        let resp: DetectResponse =
            serde_json::from_str(r#"{"brand": "Tesla", "confidence": 0.952}"#).unwrap();
        let result = DetectionResult::from(resp);
        assert_eq!(result.brand, "Tesla");
        assert!(result.model.is_none());
    }

    #[test]
    fn stats_accept_null_most_common_class() {
        let body = r#"{
            "total_predictions": 0,
            "average_confidence": 0.0,
            "most_common_class": null,
            "predictions_today": 0,
            "class_distribution": {}
        }"#;
        let stats: StatsResponse = serde_json::from_str(body).unwrap();
        assert!(stats.most_common_class.is_none());
        assert!(stats.class_distribution.is_empty());
    }

    #[test]
    fn service_error_prefers_message_then_detail() {
        let body: ServiceErrorBody =
            serde_json::from_str(r#"{"message": "Bad image", "detail": "ignored"}"#).unwrap();
        assert_eq!(body.text().as_deref(), Some("Bad image"));

        let body: ServiceErrorBody =
            serde_json::from_str(r#"{"detail": "Invalid file type"}"#).unwrap();
        assert_eq!(body.text().as_deref(), Some("Invalid file type"));

        assert_eq!(ServiceErrorBody::default().text(), None);
    }
}
