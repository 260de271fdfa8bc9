use crate::data_url;
use crate::Result;

/// The most recent generated image, as a self-contained data URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageArtifact {
    data_url: Option<String>,
}

impl ImageArtifact {
    /// Replace any previous artifact
    pub fn store(&mut self, data_url: String) {
        self.data_url = Some(data_url);
    }

    pub fn data_url(&self) -> Option<&str> {
        self.data_url.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.data_url.is_some()
    }

    /// Raw image bytes, if an artifact exists
    pub fn decode(&self) -> Result<Option<Vec<u8>>> {
        self.data_url
            .as_deref()
            .map(|url| data_url::decode(url).map(|d| d.bytes))
            .transpose()
    }
}

/// Whether the generated-image panel is shown. Hidden by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelVisibility {
    visible: bool,
}

impl PanelVisibility {
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
