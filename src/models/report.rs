use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed page geometry and text metrics, all in millimetres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    /// Average glyph advance for body text
    pub char_width_mm: f64,
    pub line_height_mm: f64,
    /// Vertical gap added below every block
    pub block_gap_mm: f64,
}

impl PageLayout {
    /// A4 portrait, 10 mm margins, ~11pt body text
    pub fn a4() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            char_width_mm: 2.0,
            line_height_mm: 5.5,
            block_gap_mm: 3.0,
        }
    }

    pub fn content_width(&self) -> f64 {
        (self.page_width_mm - 2.0 * self.margin_mm).max(0.0)
    }

    pub fn content_height(&self) -> f64 {
        (self.page_height_mm - 2.0 * self.margin_mm).max(0.0)
    }

    pub fn chars_per_line(&self) -> usize {
        if self.char_width_mm <= 0.0 {
            return usize::MAX;
        }
        ((self.content_width() / self.char_width_mm).floor() as usize).max(1)
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

/// Pixel output of a chart surface capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RasterizedImage {
    pub width_px: u32,
    pub height_px: u32,
    pub content_type: String,
    /// Encoded image as captured, base64 in JSON
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

impl RasterizedImage {
    pub fn png(width_px: u32, height_px: u32, bytes: Vec<u8>) -> Self {
        Self {
            width_px,
            height_px,
            content_type: "image/png".to_string(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width_px == 0 || self.height_px == 0 || self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Heading,
    TextBlock,
    ChartImage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionContent {
    Heading {
        text: String,
        level: u8,
    },
    TextBlock {
        text: String,
    },
    ChartImage {
        section_id: String,
        title: String,
        image: RasterizedImage,
        /// Rendered size on the page
        width_mm: f64,
        height_mm: f64,
    },
}

impl SectionContent {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionContent::Heading { .. } => SectionKind::Heading,
            SectionContent::TextBlock { .. } => SectionKind::TextBlock,
            SectionContent::ChartImage { .. } => SectionKind::ChartImage,
        }
    }

    /// Plain-text form used by text rendering and the tabular export
    pub fn plain_text(&self) -> String {
        match self {
            SectionContent::Heading { text, .. } => text.clone(),
            SectionContent::TextBlock { text } => text.clone(),
            SectionContent::ChartImage { section_id, title, .. } => format!("[chart {}: {}]", section_id, title),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSection {
    #[serde(flatten)]
    pub content: SectionContent,
    /// Includes the trailing block gap
    pub estimated_height_mm: f64,
}

impl ReportSection {
    pub fn kind(&self) -> SectionKind {
        self.content.kind()
    }
}

/// A chart that could not be captured; an inline note stands in for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureWarning {
    pub section_id: String,
    pub title: String,
    pub message: String,
}

/// Ordered report content, built fresh for each export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub layout: PageLayout,
    pub sections: Vec<ReportSection>,
    pub warnings: Vec<CaptureWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedBlock {
    /// Offset from the top of the content area
    pub y_mm: f64,
    pub height_mm: f64,
    /// Set when the block alone is taller than a page
    pub overflow: bool,
    #[serde(flatten)]
    pub content: SectionContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub blocks: Vec<PlacedBlock>,
}

/// Fixed-size paginated rendering of a [`ReportDocument`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub layout: PageLayout,
    pub page_count: usize,
    pub pages: Vec<Page>,
    pub warnings: Vec<CaptureWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_bytes_embedded_as_base64() {
        let image = RasterizedImage::png(2, 1, vec![1, 1, 1]);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["bytes"], "AQEB");

        let back: RasterizedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }
}
