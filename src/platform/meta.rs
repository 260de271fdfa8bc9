/// Page-level metadata slots (the `<meta property=...>` tags in a page head)

use crate::region::escape_attr;
use std::sync::Mutex;

/// A publish target with at most one value per property
pub trait MetaSlot: Send + Sync {
    /// Create the slot if absent, otherwise overwrite its value
    fn publish(&self, property: &str, value: &str);

    fn value(&self, property: &str) -> Option<String>;
}

/// In-memory page head. Keeps insertion order so rendering is stable.
pub struct HeadMetadata {
    entries: Mutex<Vec<(String, String)>>,
}

impl HeadMetadata {
    pub fn new() -> Self {
        HeadMetadata { entries: Mutex::new(Vec::new()) }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of tags carrying `property`; never more than one
    pub fn count(&self, property: &str) -> usize {
        self.entries().iter().filter(|(p, _)| p == property).count()
    }

    /// Render all tags, one per line
    pub fn render(&self) -> String {
        self.entries()
            .iter()
            .map(|(p, v)| format!("<meta property=\"{}\" content=\"{}\">", escape_attr(p), escape_attr(v)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for HeadMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaSlot for HeadMetadata {
    fn publish(&self, property: &str, value: &str) {
        let mut entries = self.entries();
        match entries.iter_mut().find(|(p, _)| p == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((property.to_string(), value.to_string())),
        }
    }

    fn value(&self, property: &str) -> Option<String> {
        self.entries().iter().find(|(p, _)| p == property).map(|(_, v)| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_creates_then_overwrites() {
        let head = HeadMetadata::new();
        assert_eq!(head.value("og:image"), None);
        head.publish("og:image", "data:a");
        head.publish("og:image", "data:b");
        assert_eq!(head.value("og:image").as_deref(), Some("data:b"));
        assert_eq!(head.count("og:image"), 1);
    }

    #[test]
    fn render_escapes_attributes() {
        let head = HeadMetadata::new();
        head.publish("og:title", "\"Tom & Jerry\"");
        assert_eq!(head.render(), "<meta property=\"og:title\" content=\"&quot;Tom &amp; Jerry&quot;\">");
    }
}
