use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Something the report should show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    /// Image shown inline at `width`
    ScreenshotEmbedded {
        path: PathBuf,
        link: String,
        width: String,
    },
    /// Image saved and only linked
    ScreenshotLinked { path: PathBuf, link: String },
    /// WebM shown inline at `width`
    VideoEmbedded {
        path: PathBuf,
        link: String,
        width: String,
    },
    /// Plain text
    Message { text: String },
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

impl ReportEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ReportEvent::ScreenshotEmbedded { .. } => "screenshot_embedded",
            ReportEvent::ScreenshotLinked { .. } => "screenshot_linked",
            ReportEvent::VideoEmbedded { .. } => "video_embedded",
            ReportEvent::Message { .. } => "message",
        }
    }

    /// The saved file, if the event refers to one
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ReportEvent::ScreenshotEmbedded { path, .. }
            | ReportEvent::ScreenshotLinked { path, .. }
            | ReportEvent::VideoEmbedded { path, .. } => Some(path),
            ReportEvent::Message { .. } => None,
        }
    }

    /// HTML fragment for the report
    pub fn to_html(&self) -> String {
        match self {
            ReportEvent::ScreenshotEmbedded { link, width, .. } => format!(
                "<a href=\"{link}\"><img src=\"{link}\" width=\"{width}\"></a>",
                link = link,
                width = escape_html(width)
            ),
            ReportEvent::ScreenshotLinked { path, link } => format!(
                "Screenshot saved to '<a href=\"{link}\">{path}</a>'.",
                link = link,
                path = escape_html(&path.display().to_string())
            ),
            ReportEvent::VideoEmbedded { link, width, .. } => format!(
                "<a href=\"{link}\"><video width=\"{width}\" autoplay>\
                 <source src=\"{link}\" type=\"video/webm\"></video></a>",
                link = link,
                width = escape_html(width)
            ),
            ReportEvent::Message { text } => escape_html(text),
        }
    }
}
