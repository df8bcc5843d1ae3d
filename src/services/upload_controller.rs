// src/services/upload_controller.rs
use crate::errors::CarspotError;
use crate::models::{DetectionResult, SelectedImage};

#[derive(Debug, Clone)]
pub struct DetectTicket {
    pub image: SelectedImage,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    Previewing,
    ResultShown,
}

/// Upload/preview/detect state of the prediction page.
#[derive(Debug, Default)]
pub struct UploadController {
    selected: Option<SelectedImage>,
    preview: Option<String>,
    result: Option<DetectionResult>,
    error: Option<String>,
    busy: bool,
    // Bumped by select/reset so a late completion cannot repopulate a cleared view.
    generation: u64,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn view_state(&self) -> ViewState {
        match (&self.preview, &self.result) {
            (None, _) => ViewState::Empty,
            (Some(_), None) => ViewState::Previewing,
            (Some(_), Some(_)) => ViewState::ResultShown,
        }
    }

    pub fn can_detect(&self) -> bool {
        self.selected.is_some() && self.preview.is_some() && !self.busy
    }

    pub fn select_image(
        &mut self,
        image: SelectedImage,
        preview: Result<String, CarspotError>,
    ) {
        self.generation += 1;
        self.selected = Some(image);
        self.result = None;
        match preview {
            Ok(url) => {
                self.preview = Some(url);
                self.error = None;
            }
            Err(e) => {
                self.preview = None;
                self.error = Some(e.to_string());
            }
        }
    }

    // Ok(None): nothing selected, or the selection has no preview.
    pub fn begin_detect(&mut self) -> Result<Option<DetectTicket>, CarspotError> {
        if self.busy {
            return Err(CarspotError::Busy);
        }
        let Some(image) = self.selected.clone() else {
            return Ok(None);
        };
        if self.preview.is_none() {
            return Ok(None);
        }

        self.busy = true;
        self.error = None;
        Ok(Some(DetectTicket {
            image,
            generation: self.generation,
        }))
    }

    pub fn finish_detect(
        &mut self,
        ticket: &DetectTicket,
        outcome: &Result<DetectionResult, CarspotError>,
    ) -> bool {
        self.busy = false;
        if ticket.generation != self.generation {
            return false;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result.clone());
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.selected = None;
        self.preview = None;
        self.result = None;
        self.error = None;
    }
}
