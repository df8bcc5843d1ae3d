// src/services/mod.rs
pub mod analytics;
pub mod classifier_client;
pub mod history;
pub mod image_processor;
pub mod session;
pub mod upload_controller;

pub use classifier_client::{ClassifierApi, HttpClassifier};
pub use history::HistoryStore;
pub use image_processor::ImageProcessor;
pub use session::Session;
pub use upload_controller::UploadController;
