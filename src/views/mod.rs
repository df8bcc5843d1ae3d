// src/views/mod.rs
//! Server-rendered HTML for the three pages.
//!
//! Every function here is a pure function of the state it is handed; handlers take the
//! locks, views only format.

pub mod analytics;
pub mod home;
pub mod prediction;

/// The three top-level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Prediction,
    Analytics,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Prediction, Page::Analytics];

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Prediction => "/prediction",
            Page::Analytics => "/analytics",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Prediction => "Prediction",
            Page::Analytics => "Analytics",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.trim_end_matches('/');
        Page::ALL
            .into_iter()
            .find(|p| p.path().trim_end_matches('/') == path)
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn navbar(current: Page) -> String {
    let links: String = Page::ALL
        .into_iter()
        .map(|page| {
            let class = if page == current { "nav-link active" } else { "nav-link" };
            format!(
                r#"<a class="{}" href="{}">{}</a>"#,
                class,
                page.path(),
                page.title()
            )
        })
        .collect();

    format!(
        r#"<nav class="navbar"><span class="brand">Car Brand System</span><div class="links">{}</div></nav>"#,
        links
    )
}

/// Wraps a page body in the shared document shell.
pub fn layout(current: Page, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Car Brand System</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
{nav}
<main class="container">
{body}
</main>
<script>
document.querySelectorAll('[data-dismiss-ms]').forEach(function (el) {{
  setTimeout(function () {{ el.remove(); }}, parseInt(el.dataset.dismissMs, 10));
}});
</script>
</body>
</html>"#,
        title = current.title(),
        nav = navbar(current),
        body = body
    )
}
