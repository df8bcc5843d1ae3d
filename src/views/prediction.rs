// src/views/prediction.rs
use super::{Page, escape, layout};
use crate::models::DetectionResult;
use crate::services::UploadController;
use crate::services::analytics::format_percent;
use crate::services::upload_controller::ViewState;

const UPLOAD_FORM: &str = r#"<form class="upload" method="post" action="/prediction/select" enctype="multipart/form-data">
<input type="file" name="image" accept="image/*" required onchange="this.form.submit()">
<button type="submit" class="button">Upload Car Image</button>
<p class="hint">Supports: JPG, PNG, WebP</p>
</form>"#;

/// `rejection` is the message for a file that was refused without touching the controller.
pub fn render(controller: &UploadController, rejection: Option<&str>) -> String {
    let mut body = String::from(
        r#"<header class="page-header"><h1>Car Brand Detection</h1><p>Upload a car image and let AI identify the brand</p></header>"#,
    );

    if let Some(message) = rejection {
        body.push_str(&banner("rejection", message));
    }
    if let Some(error) = controller.error() {
        body.push_str(&banner("error", error));
    }

    match (controller.view_state(), controller.preview()) {
        (ViewState::Empty, _) | (_, None) => body.push_str(UPLOAD_FORM),
        (state, Some(preview)) => {
            body.push_str(r#"<div class="workspace">"#);
            body.push_str(&format!(
                r#"<div class="preview"><img src="{}" alt="Selected car"><form method="post" action="/prediction/reset"><button type="submit" class="button danger">Remove</button></form></div>"#,
                escape(preview)
            ));
            body.push_str(r#"<div class="results">"#);
            if state == ViewState::ResultShown {
                if let Some(result) = controller.result() {
                    body.push_str(&result_card(result));
                }
            }
            body.push_str(&detect_controls(controller));
            body.push_str("</div></div>");
        }
    }

    layout(Page::Prediction, &body)
}

fn banner(kind: &str, message: &str) -> String {
    format!(
        r#"<div class="banner {}" role="alert">{}</div>"#,
        kind,
        escape(message)
    )
}

fn result_card(result: &DetectionResult) -> String {
    let mut card = format!(
        r#"<div class="result-card"><h3>Detection Result</h3><dl><dt>Brand</dt><dd class="brand">{}</dd>"#,
        escape(&result.brand)
    );
    if let Some(model) = &result.model {
        card.push_str(&format!("<dt>Model</dt><dd>{}</dd>", escape(model)));
    }
    card.push_str(&format!(
        r#"<dt>Confidence</dt><dd class="confidence">{}</dd></dl>"#,
        format_percent(result.confidence)
    ));

    if let Some(all) = &result.all_predictions {
        let mut ranked: Vec<(&String, &f64)> = all.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        card.push_str(r#"<ul class="alternatives">"#);
        for (label, score) in ranked.into_iter().take(5) {
            card.push_str(&format!(
                "<li>{} <span>{}</span></li>",
                escape(label),
                format_percent(*score)
            ));
        }
        card.push_str("</ul>");
    }
    if let Some(id) = result.prediction_id {
        card.push_str(&format!(r#"<p class="muted">ID: {}</p>"#, id));
    }
    card.push_str("</div>");
    card
}

fn detect_controls(controller: &UploadController) -> String {
    let label = if controller.is_busy() {
        "Detecting..."
    } else {
        "Detect Brand"
    };
    let disabled = if controller.can_detect() { "" } else { " disabled" };

    format!(
        r#"<div class="actions"><form method="post" action="/prediction/detect"><button type="submit" class="button primary"{}>{}</button></form>{}</div>"#,
        disabled,
        label,
        UPLOAD_FORM.replace("Upload Car Image", "Upload New")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CarspotError;
    use crate::models::SelectedImage;
    use bytes::Bytes;

    fn image() -> SelectedImage {
        SelectedImage {
            filename: "car.png".into(),
            content_type: "image/png".into(),
            data: Bytes::from_static(b"png"),
        }
    }

    #[test]
    fn empty_state_shows_upload_prompt_only() {
        let html = render(&UploadController::new(), None);
        assert!(html.contains("Upload Car Image"));
        assert!(!html.contains("Detect Brand"));
        assert!(!html.contains("banner"));
    }

    #[test]
    fn preview_state_enables_detect() {
        let mut controller = UploadController::new();
        controller.select_image(image(), Ok("data:image/png;base64,cG5n".into()));
        let html = render(&controller, None);
        assert!(html.contains(r#"<img src="data:image/png;base64,cG5n""#));
        assert!(html.contains(r#"<button type="submit" class="button primary">Detect Brand</button>"#));
        assert!(!html.contains("Detection Result"));
    }

    #[test]
    fn result_and_error_banner_render_together() {
        let mut controller = UploadController::new();
        controller.select_image(image(), Ok("data:".into()));
        let ticket = controller.begin_detect().unwrap().unwrap();
        controller.finish_detect(
            &ticket,
            &Ok(DetectionResult {
                brand: "Tesla".into(),
                model: Some("Model 3".into()),
                confidence: 0.952,
                all_predictions: None,
                prediction_id: None,
            }),
        );
        let ticket = controller.begin_detect().unwrap().unwrap();
        controller.finish_detect(&ticket, &Err(CarspotError::Network("refused".into())));

        let html = render(&controller, None);
        assert!(html.contains("Tesla"));
        assert!(html.contains("Model 3"));
        assert!(html.contains("95.2%"));
        assert!(html.contains(r#"<div class="banner error" role="alert">"#));
        assert!(html.contains("refused"));
    }

    #[test]
    fn busy_state_disables_detect() {
        let mut controller = UploadController::new();
        controller.select_image(image(), Ok("data:".into()));
        let _ticket = controller.begin_detect().unwrap();
        let html = render(&controller, None);
        assert!(html.contains(r#"class="button primary" disabled>Detecting...</button>"#));
    }

    #[test]
    fn rejection_message_is_escaped() {
        let html = render(&UploadController::new(), Some("<script>"));
        assert!(html.contains("banner rejection"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
