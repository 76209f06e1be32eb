//! `GET /` HTML report. Presentation only.

use std::fmt::Write;

use axum::{extract::State, response::Html};

use metrix_core::MetricValue;

use crate::app_state::AppState;

pub async fn index(State(app): State<AppState>) -> Html<String> {
    // BTreeMaps: names come out sorted.
    let snap = app.repo().snapshot().await;

    let mut out = String::from("<html><head><title>Metrics</title></head><body><h1>Metrics</h1>");
    out.push_str("<h2>Gauges</h2><ul>");
    for (name, v) in &snap.gauges {
        let _ = write!(out, "<li>{}: {}</li>", escape_html(name), MetricValue::Gauge(*v));
    }
    out.push_str("</ul><h2>Counters</h2><ul>");
    for (name, v) in &snap.counters {
        let _ = write!(out, "<li>{}: {}</li>", escape_html(name), MetricValue::Counter(*v));
    }
    out.push_str("</ul></body></html>");

    Html(out)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup_in_names() {
        assert_eq!(escape_html("<b>&\"x'"), "&lt;b&gt;&amp;&quot;x&#39;");
        assert_eq!(escape_html("Alloc"), "Alloc");
    }
}
