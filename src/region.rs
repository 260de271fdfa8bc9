//! The rendered draft region handed to the capture engine

use crate::draft::Draft;
use std::sync::Arc;

/// An image element inside the region
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub url: String,
    /// Whether the element was loaded with `crossorigin="anonymous"`
    pub cross_origin: bool,
    /// Bytes pinned when the region was taken. When present they win over
    /// resolving `url`, which may be released before the capture runs.
    pub bytes: Option<Arc<[u8]>>,
}

impl ImageRef {
    /// A reference that is resolved by URL at capture time
    pub fn linked(url: impl Into<String>, cross_origin: bool) -> Self {
        Self { url: url.into(), cross_origin, bytes: None }
    }
}

/// The composed post layout at the moment a capture was requested
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRegion {
    pub title: String,
    pub content_html: String,
    pub image: Option<ImageRef>,
    /// Logical width in CSS pixels
    pub width: u32,
    /// Logical height in CSS pixels
    pub height: u32,
}

impl RenderedRegion {
    pub fn from_draft(draft: &Draft, width: u32, height: u32) -> Self {
        Self {
            title: draft.title().to_string(),
            content_html: draft.content().to_string(),
            image: draft.image().map(|img| ImageRef {
                url: img.url.clone(),
                cross_origin: true,
                bytes: Some(img.bytes.clone()),
            }),
            width,
            height,
        }
    }

    /// Markup of the post card. Content is the editor's HTML and is embedded as-is.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"og-post\">");
        html.push_str(&format!("<h2 class=\"og-title\">{}</h2>", escape_text(&self.title)));
        html.push_str(&format!("<div class=\"og-content\">{}</div>", self.content_html));
        if let Some(img) = &self.image {
            let cors = if img.cross_origin { " crossorigin=\"anonymous\"" } else { "" };
            html.push_str(&format!(
                "<img class=\"og-image\" src=\"{}\" alt=\"Post\"{}>",
                escape_attr(&img.url),
                cors
            ));
        }
        html.push_str("</div>");
        html
    }
}

pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub(crate) fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
