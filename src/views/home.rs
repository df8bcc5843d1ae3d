// src/views/home.rs
use super::{Page, layout};

const FEATURES: [(&str, &str); 4] = [
    ("Fast Detection", "Get results in seconds"),
    ("High Accuracy", "AI-powered precision"),
    ("Global Brands", "Supports 100+ car brands"),
    ("Real-time", "Instant processing"),
];

pub fn render() -> String {
    let features: String = FEATURES
        .iter()
        .map(|(title, blurb)| {
            format!(r#"<div class="feature"><h3>{}</h3><p>{}</p></div>"#, title, blurb)
        })
        .collect();

    let body = format!(
        r#"<section class="hero">
<h1>Welcome to Car Brand System</h1>
<p>Upload any car image and get instant brand recognition.</p>
<div class="features">{}</div>
<a class="button primary" href="{}">Start Detecting Cars</a>
</section>"#,
        features,
        Page::Prediction.path()
    );

    layout(Page::Home, &body)
}
