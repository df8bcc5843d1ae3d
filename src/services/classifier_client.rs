// src/services/classifier_client.rs
use crate::config::{AppConfig, DetectEndpoint};
use crate::errors::CarspotError;
use crate::models::*;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response, multipart};
use serde::de::DeserializeOwned;
use std::time::Duration;

const FALLBACK_FAILURE_MESSAGE: &str = "Failed to identify the car. Please try again.";

/// The remote classifier as seen by the rest of the front-end.
#[async_trait]
pub trait ClassifierApi: Send + Sync {
    async fn classify(&self, image: &SelectedImage) -> Result<DetectionResult, CarspotError>;
    async fn stats(&self) -> Result<StatsResponse, CarspotError>;
    async fn recent_predictions(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<RemotePrediction>, CarspotError>;
}

pub struct HttpClassifier {
    base_url: String,
    endpoint: DetectEndpoint,
    timeout: Duration,
    client: Client,
}

impl HttpClassifier {
    pub fn new(
        base_url: impl Into<String>,
        endpoint: DetectEndpoint,
        timeout: Duration,
    ) -> Result<Self, CarspotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CarspotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint,
            timeout,
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CarspotError> {
        Self::new(
            config.api_base_url.clone(),
            config.detect_endpoint,
            config.request_timeout,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> CarspotError {
        if e.is_timeout() {
            CarspotError::Timeout(self.timeout.as_secs().max(1))
        } else {
            CarspotError::Network(e.to_string())
        }
    }

    /// Turns a response into `T`, or into the service's own error text on non-2xx.
    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, CarspotError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ServiceErrorBody>(&body)
                .ok()
                .and_then(|b| b.text())
                .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string());
            warn!("Prediction service returned {}: {}", status, message);
            return Err(CarspotError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| CarspotError::Parse(e.to_string()))
    }

    fn image_form(&self, image: &SelectedImage) -> Result<multipart::Form, CarspotError> {
        let part = multipart::Part::bytes(image.data.to_vec())
            .file_name(image.filename.clone())
            .mime_str(&image.content_type)
            .map_err(|e| CarspotError::InvalidImage(format!("{} ({})", image.content_type, e)))?;

        Ok(multipart::Form::new().part(self.endpoint.field_name(), part))
    }
}

#[async_trait]
impl ClassifierApi for HttpClassifier {
    async fn classify(&self, image: &SelectedImage) -> Result<DetectionResult, CarspotError> {
        let form = self.image_form(image)?;
        debug!(
            "POST {} with {} ({} bytes)",
            self.endpoint.path(),
            image.filename,
            image.data.len()
        );

        let response = self
            .client
            .post(self.url(self.endpoint.path()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let result = match self.endpoint {
            DetectEndpoint::Predict => self
                .read_json::<PredictionResponse>(response)
                .await?
                .into(),
            DetectEndpoint::Detect => self.read_json::<DetectResponse>(response).await?.into(),
        };

        validate_confidence(result)
    }

    async fn stats(&self) -> Result<StatsResponse, CarspotError> {
        let response = self
            .client
            .get(self.url("/api/stats"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_json(response).await
    }

    async fn recent_predictions(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<RemotePrediction>, CarspotError> {
        let response = self
            .client
            .get(self.url("/api/predictions"))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_json(response).await
    }
}

fn validate_confidence(result: DetectionResult) -> Result<DetectionResult, CarspotError> {
    if result.confidence.is_finite() && (0.0..=1.0).contains(&result.confidence) {
        Ok(result)
    } else {
        Err(CarspotError::Parse(format!(
            "confidence {} is outside [0, 1]",
            result.confidence
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_multipart::Multipart;
    use actix_web::{App, HttpResponse, HttpServer, dev::ServerHandle, web};
    use futures_util::TryStreamExt;

    async fn fake_predict(mut payload: Multipart) -> HttpResponse {
        let mut field_name = String::new();
        while let Ok(Some(mut field)) = payload.try_next().await {
            field_name = field.name().to_string();
            while let Ok(Some(_chunk)) = field.try_next().await {}
        }
        if field_name != "file" {
            return HttpResponse::UnprocessableEntity()
                .json(serde_json::json!({ "detail": format!("missing file, got {field_name}") }));
        }
        HttpResponse::Ok().json(serde_json::json!({
            "predicted_class": "BMW",
            "confidence": 0.91,
            "all_predictions": { "BMW": 0.91, "Audi": 0.09 },
            "prediction_id": 7,
            "image_path": "uploads/car.png",
            "message": "Prediction successful"
        }))
    }

    async fn fake_detect(mut payload: Multipart) -> HttpResponse {
        let mut seen_image = false;
        while let Ok(Some(mut field)) = payload.try_next().await {
            seen_image |= field.name() == "image";
            while let Ok(Some(_chunk)) = field.try_next().await {}
        }
        if !seen_image {
            return HttpResponse::BadRequest().finish();
        }
        HttpResponse::Ok().json(serde_json::json!({
            "brand": "Tesla", "model": "Model 3", "confidence": 0.952
        }))
    }

    async fn fake_stats() -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({
            "total_predictions": 9,
            "average_confidence": 0.9,
            "most_common_class": "BMW",
            "predictions_today": 2,
            "class_distribution": { "Toyota": 3, "BMW": 5, "Audi": 1 }
        }))
    }

    async fn fake_predictions(query: web::Query<std::collections::HashMap<String, String>>) -> HttpResponse {
        assert_eq!(query.get("limit").map(String::as_str), Some("2"));
        HttpResponse::Ok().json(serde_json::json!([
            { "id": 2, "image_path": "uploads/b.jpg", "predicted_class": "Audi",
              "confidence": 0.8, "created_at": "2026-01-16T10:30:00Z" },
            { "id": 1, "image_path": "uploads/a.jpg", "predicted_class": "BMW",
              "confidence": 0.7, "created_at": "2026-01-16T09:30:00Z" }
        ]))
    }

    async fn fake_slow() -> HttpResponse {
        tokio::time::sleep(Duration::from_secs(3)).await;
        HttpResponse::Ok().finish()
    }

    async fn spawn_fake_service(broken: bool) -> (String, ServerHandle) {
        let server = HttpServer::new(move || {
            let app = App::new();
            if broken {
                app.route(
                    "/api/predict",
                    web::post().to(|| async {
                        HttpResponse::InternalServerError()
                            .json(serde_json::json!({ "detail": "Prediction failed: model not loaded" }))
                    }),
                )
                .route(
                    "/api/stats",
                    web::get().to(|| async { HttpResponse::Ok().body("<html>oops</html>") }),
                )
                .route("/api/detect", web::post().to(fake_slow))
            } else {
                app.route("/api/predict", web::post().to(fake_predict))
                    .route("/api/detect", web::post().to(fake_detect))
                    .route("/api/stats", web::get().to(fake_stats))
                    .route("/api/predictions", web::get().to(fake_predictions))
            }
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (format!("http://{}", addr), handle)
    }

    fn sample_image() -> SelectedImage {
        SelectedImage {
            filename: "car.png".to_string(),
            content_type: "image/png".to_string(),
            data: bytes::Bytes::from(crate::services::image_processor::tiny_png()),
        }
    }

    #[actix_web::test]
    async fn predict_endpoint_sends_file_field() {
        let (base, handle) = spawn_fake_service(false).await;
        let client =
            HttpClassifier::new(base, DetectEndpoint::Predict, Duration::from_secs(5)).unwrap();

        let result = client.classify(&sample_image()).await.unwrap();
        assert_eq!(result.brand, "BMW");
        assert_eq!(result.prediction_id, Some(7));
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn detect_endpoint_sends_image_field() {
        let (base, handle) = spawn_fake_service(false).await;
        let client =
            HttpClassifier::new(base, DetectEndpoint::Detect, Duration::from_secs(5)).unwrap();

        let result = client.classify(&sample_image()).await.unwrap();
        assert_eq!(result.brand, "Tesla");
        assert_eq!(result.model.as_deref(), Some("Model 3"));
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn stats_and_remote_history_are_parsed() {
        let (base, handle) = spawn_fake_service(false).await;
        let client =
            HttpClassifier::new(base, DetectEndpoint::Predict, Duration::from_secs(5)).unwrap();

        let stats = client.stats().await.unwrap();
        assert_eq!(stats.total_predictions, 9);
        assert_eq!(stats.class_distribution["BMW"], 5);

        let rows = client.recent_predictions(0, 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].predicted_class, "Audi");
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn non_success_carries_service_detail() {
        let (base, handle) = spawn_fake_service(true).await;
        let client =
            HttpClassifier::new(base, DetectEndpoint::Predict, Duration::from_secs(5)).unwrap();

        let err = client.classify(&sample_image()).await.unwrap_err();
        assert_eq!(
            err,
            CarspotError::Upstream {
                status: 500,
                message: "Prediction failed: model not loaded".to_string()
            }
        );

        let err = client.stats().await.unwrap_err();
        assert!(matches!(err, CarspotError::Parse(_)));
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn slow_service_times_out() {
        let (base, handle) = spawn_fake_service(true).await;
        let client =
            HttpClassifier::new(base, DetectEndpoint::Detect, Duration::from_millis(300)).unwrap();

        let err = client.classify(&sample_image()).await.unwrap_err();
        assert!(matches!(err, CarspotError::Timeout(_)), "{err:?}");
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn unreachable_service_is_a_network_error() {
        let client = HttpClassifier::new(
            "http://127.0.0.1:9",
            DetectEndpoint::Predict,
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.stats().await.unwrap_err();
        assert!(
            matches!(err, CarspotError::Network(_) | CarspotError::Timeout(_)),
            "{err:?}"
        );
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let result = DetectionResult {
            brand: "Audi".into(),
            model: None,
            confidence: 91.0,
            all_predictions: None,
            prediction_id: None,
        };
        assert!(matches!(
            validate_confidence(result),
            Err(CarspotError::Parse(_))
        ));
    }
}
