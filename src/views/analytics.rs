// src/views/analytics.rs
use super::{Page, escape, layout};
use crate::models::{DistributionEntry, Prediction, StatsResponse, TrendPoint};
use crate::services::analytics::{
    Dashboard, TREND_WINDOW, average_confidence, class_distribution, confidence_trend,
    format_percent, high_confidence_count, unique_brands,
};
use std::time::{Duration, Instant};

const CHART_WIDTH: f64 = 480.0;
const CHART_HEIGHT: f64 = 200.0;

pub fn render_login(invalid: bool) -> String {
    let notice = if invalid {
        r#"<div class="banner error" role="alert">Invalid password</div>"#
    } else {
        ""
    };

    let body = format!(
        r#"<section class="login">
<h2>Admin Access Required</h2>
<p>Please enter the admin password to view analytics</p>
{}
<form method="post" action="/analytics/login">
<input type="password" name="password" placeholder="Enter password" autofocus>
<button type="submit" class="button primary">Login</button>
</form>
</section>"#,
        notice
    );

    layout(Page::Analytics, &body)
}

pub fn render_dashboard(dashboard: &Dashboard, history: &[Prediction], now: Instant) -> String {
    let mut body = String::from(
        r#"<header class="page-header split"><div><h1>Analytics Dashboard</h1><p>View all user predictions and detection history</p></div>
<div class="actions"><form method="post" action="/analytics/refresh"><button type="submit" class="button">Refresh</button></form>
<form method="post" action="/analytics/logout"><button type="submit" class="button danger">Logout</button></form></div></header>"#,
    );

    if let Some(message) = dashboard.notice_at(now) {
        let remaining = dashboard_notice_remaining(dashboard, now);
        body.push_str(&format!(
            r#"<div class="banner error" role="alert" data-dismiss-ms="{}">{}</div>"#,
            remaining.as_millis(),
            escape(message)
        ));
    }

    if let Some(stats) = dashboard.stats() {
        body.push_str(&stats_cards(stats));
    }
    body.push_str(&history_cards(history));

    body.push_str(r#"<div class="charts">"#);
    if let Some(stats) = dashboard.stats() {
        body.push_str(&distribution_chart(&class_distribution(stats)));
    }
    body.push_str(&trend_chart(&confidence_trend(history, TREND_WINDOW)));
    body.push_str("</div>");

    body.push_str(&history_table(history));

    layout(Page::Analytics, &body)
}

fn dashboard_notice_remaining(dashboard: &Dashboard, now: Instant) -> Duration {
    dashboard
        .notice_expiry()
        .map(|at| at.saturating_duration_since(now))
        .unwrap_or_default()
}

fn card(value: &str, label: &str) -> String {
    format!(
        r#"<div class="card"><div class="value">{}</div><div class="label">{}</div></div>"#,
        escape(value),
        label
    )
}

fn stats_cards(stats: &StatsResponse) -> String {
    let mut html = String::from(r#"<h2>Service statistics</h2><div class="cards">"#);
    html.push_str(&card(&stats.total_predictions.to_string(), "Total Predictions"));
    html.push_str(&card(&format_percent(stats.average_confidence), "Avg Confidence"));
    html.push_str(&card(
        stats.most_common_class.as_deref().unwrap_or("None"),
        "Most Common",
    ));
    html.push_str(&card(&stats.predictions_today.to_string(), "Today's Predictions"));
    html.push_str("</div>");
    html
}

fn history_cards(history: &[Prediction]) -> String {
    let avg = average_confidence(history)
        .map(format_percent)
        .unwrap_or_else(|| "-".to_string());

    let mut html = String::from(r#"<h2>This session</h2><div class="cards">"#);
    html.push_str(&card(&history.len().to_string(), "Predictions"));
    html.push_str(&card(&avg, "Avg Confidence"));
    html.push_str(&card(&unique_brands(history).to_string(), "Unique Brands"));
    html.push_str(&card(
        &high_confidence_count(history).to_string(),
        "High Confidence",
    ));
    html.push_str("</div>");
    html
}

fn distribution_chart(entries: &[DistributionEntry]) -> String {
    if entries.is_empty() {
        return r#"<figure class="chart"><figcaption>Class distribution</figcaption><p class="muted">No predictions recorded yet</p></figure>"#.to_string();
    }

    let max = entries.iter().map(|e| e.count).max().unwrap_or(1).max(1) as f64;
    let row = CHART_HEIGHT / entries.len() as f64;
    let label_width = 110.0;

    let bars: String = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let y = i as f64 * row;
            let width = (CHART_WIDTH - label_width - 40.0) * e.count as f64 / max;
            format!(
                r#"<text x="0" y="{ty:.1}">{label}</text><rect x="{x}" y="{y:.1}" width="{w:.1}" height="{h:.1}"/><text x="{cx:.1}" y="{ty:.1}">{count}</text>"#,
                ty = y + row * 0.65,
                label = escape(&e.label),
                x = label_width,
                y = y + row * 0.15,
                w = width,
                h = row * 0.7,
                cx = label_width + width + 6.0,
                count = e.count
            )
        })
        .collect();

    format!(
        r#"<figure class="chart"><figcaption>Class distribution</figcaption><svg viewBox="0 0 {} {}" class="bars">{}</svg></figure>"#,
        CHART_WIDTH, CHART_HEIGHT, bars
    )
}

fn trend_chart(points: &[TrendPoint]) -> String {
    if points.is_empty() {
        return r#"<figure class="chart"><figcaption>Confidence trend</figcaption><p class="muted">No predictions yet</p></figure>"#.to_string();
    }

    let step = if points.len() > 1 {
        CHART_WIDTH / (points.len() - 1) as f64
    } else {
        0.0
    };
    let coords: Vec<(f64, f64, &TrendPoint)> = points
        .iter()
        .map(|p| {
            let x = (p.position - 1) as f64 * step;
            let y = CHART_HEIGHT - p.confidence.clamp(0.0, 1.0) * CHART_HEIGHT;
            (x, y, p)
        })
        .collect();

    let line: Vec<String> = coords
        .iter()
        .map(|(x, y, _)| format!("{:.1},{:.1}", x, y))
        .collect();
    let dots: String = coords
        .iter()
        .map(|(x, y, p)| {
            format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="4"><title>#{} {}</title></circle>"#,
                x,
                y,
                p.id,
                format_percent(p.confidence)
            )
        })
        .collect();

    format!(
        r#"<figure class="chart"><figcaption>Confidence trend (last {})</figcaption><svg viewBox="-5 -5 {} {}" class="trend"><polyline points="{}"/>{}</svg></figure>"#,
        points.len(),
        CHART_WIDTH + 10.0,
        CHART_HEIGHT + 10.0,
        line.join(" "),
        dots
    )
}

fn history_table(history: &[Prediction]) -> String {
    let rows: String = history
        .iter()
        .map(|p| {
            format!(
                r#"<tr><td>#{}</td><td>{}</td><td><span class="pill">{}</span></td><td>{}</td><td><div class="meter"><div style="width: {:.1}%"></div></div> {}</td></tr>"#,
                p.id,
                escape(&p.timestamp),
                escape(&p.brand),
                escape(p.model.as_deref().unwrap_or("")),
                (p.confidence * 100.0).clamp(0.0, 100.0),
                format_percent(p.confidence)
            )
        })
        .collect();

    format!(
        r#"<section class="table"><h2>Prediction History</h2><table><thead><tr><th>ID</th><th>Timestamp</th><th>Brand</th><th>Model</th><th>Confidence</th></tr></thead><tbody>{}</tbody></table></section>"#,
        rows
    )
}
