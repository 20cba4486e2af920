// src/notify/render.rs
use reqwest::Url;

use super::OutageNotice;

pub fn title(notice: &OutageNotice) -> String {
    format!("Scheduled power outages: {}", notice.source)
}

/// One line per date, followed by its notices as absolute links where the page URL allows it.
pub fn body(notice: &OutageNotice) -> String {
    if notice.batch.is_empty() {
        return "No scheduled outages listed.".to_string();
    }

    let base = Url::parse(&notice.page_url).ok();
    let mut out = String::new();
    for rec in &notice.batch {
        out.push_str(&rec.date);
        out.push('\n');
        for link in &rec.pdf_links {
            out.push_str("  - ");
            out.push_str(&resolve_link(base.as_ref(), link));
            out.push('\n');
        }
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn resolve_link(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

/// Cut `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
