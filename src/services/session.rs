// src/services/session.rs
use crate::errors::CarspotError;
use crate::models::{Prediction, SelectedImage};
use crate::services::analytics::{AccessGate, Dashboard};
use crate::services::upload_controller::DetectTicket;
use crate::services::{ClassifierApi, HistoryStore, ImageProcessor, UploadController};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

/// The single local user's state. No lock is held across a remote call.
pub struct Session {
    classifier: Arc<dyn ClassifierApi>,
    image_processor: Arc<ImageProcessor>,
    pub controller: Mutex<UploadController>,
    pub history: RwLock<HistoryStore>,
    pub gate: Mutex<AccessGate>,
    pub dashboard: Mutex<Dashboard>,
}

impl Session {
    pub fn new(
        classifier: Arc<dyn ClassifierApi>,
        image_processor: Arc<ImageProcessor>,
        history: HistoryStore,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            image_processor,
            controller: Mutex::new(UploadController::new()),
            history: RwLock::new(history),
            gate: Mutex::new(AccessGate::new(admin_password)),
            dashboard: Mutex::new(Dashboard::default()),
        }
    }

    pub fn classifier(&self) -> &Arc<dyn ClassifierApi> {
        &self.classifier
    }

    pub async fn select_image(&self, image: SelectedImage) -> Result<(), CarspotError> {
        self.image_processor.check_media_type(&image.content_type)?;

        let processor = self.image_processor.clone();
        let data = image.data.clone();
        let content_type = image.content_type.clone();
        let preview = tokio::task::spawn_blocking(move || {
            processor.preview_data_url(&data, &content_type)
        })
        .await
        .unwrap_or_else(|e| {
            Err(CarspotError::InvalidImage(format!(
                "an image that could not be read ({})",
                e
            )))
        });

        if let Err(e) = &preview {
            warn!("Preview failed for {}: {}", image.filename, e);
        } else {
            info!("Selected {} ({} bytes)", image.filename, image.data.len());
        }

        self.controller.lock().await.select_image(image, preview);
        Ok(())
    }

    /// Runs one detection. `Ok(None)` when nothing is selected.
    ///
    /// The request and its bookkeeping run on their own task, so the busy flag is cleared
    /// even when the caller stops waiting (for example after a client disconnect).
    pub async fn detect(self: &Arc<Self>) -> Result<Option<Prediction>, CarspotError> {
        let Some(ticket) = self.controller.lock().await.begin_detect()? else {
            return Ok(None);
        };

        let session = Arc::clone(self);
        tokio::spawn(async move { session.complete_detect(ticket).await })
            .await
            .unwrap_or_else(|e| {
                Err(CarspotError::Network(format!(
                    "detection task did not finish ({})",
                    e
                )))
            })
    }

    async fn complete_detect(
        &self,
        ticket: DetectTicket,
    ) -> Result<Option<Prediction>, CarspotError> {
        info!("Detecting brand for {}", ticket.image.filename);
        let outcome = self.classifier.classify(&ticket.image).await;

        let recorded = match &outcome {
            Ok(result) => {
                let prediction = self.history.write().await.record_now(result);
                info!(
                    "Detected {} ({:.3}) as history #{}",
                    prediction.brand, prediction.confidence, prediction.id
                );
                Some(prediction)
            }
            Err(e) => {
                warn!("Detection failed: {}", e);
                None
            }
        };

        let applied = self.controller.lock().await.finish_detect(&ticket, &outcome);
        if !applied {
            info!("Detection finished after the view was reset");
        }

        outcome.map(|_| recorded)
    }

    pub async fn reset(&self) {
        self.controller.lock().await.reset();
    }

    /// Unlocks the dashboard and fetches stats when this call entered the unlocked state.
    pub async fn login(&self, password: &str) -> Result<(), CarspotError> {
        let entered = match self.gate.lock().await.submit(password) {
            Ok(entered) => entered,
            Err(e) => {
                warn!("Rejected analytics login attempt");
                return Err(e);
            }
        };

        if entered {
            info!("Analytics unlocked");
            self.refresh_stats().await;
        }
        Ok(())
    }

    pub async fn logout(&self) {
        self.gate.lock().await.logout();
        self.dashboard.lock().await.clear();
        info!("Analytics locked");
    }

    pub async fn refresh_stats(&self) {
        let outcome = self.classifier.stats().await;
        if let Err(e) = &outcome {
            warn!("Stats fetch failed: {}", e);
        }
        self.dashboard
            .lock()
            .await
            .apply_fetch(outcome, Instant::now());
    }
}
