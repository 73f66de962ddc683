use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::mutation::MutationRequest;
use crate::paragraphs::TextRun;
use crate::transform::ElementGeometry;
use crate::units::{Length, Unit, points_to_emu};

/// Snapshot of a presentation as returned by the editing API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub presentation_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slides: Vec<Page>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: Length,
    pub height: Length,
}

/// Element transform as stored in the snapshot; omitted fields are identity values
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub shear_x: f64,
    #[serde(default)]
    pub shear_y: f64,
    #[serde(default)]
    pub translate_x: f64,
    #[serde(default)]
    pub translate_y: f64,
    #[serde(default = "emu")]
    pub unit: Unit,
}

fn one() -> f64 {
    1.0
}

fn emu() -> Unit {
    Unit::Emu
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            unit: Unit::Emu,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_marker: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRunContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRunContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Table {
    pub rows: usize,
    pub columns: usize,
}

/// What a page element is, as far as the editing tools care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Shape,
    Table,
    Video,
    Image,
    Other,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementKind::Shape => "shape",
            ElementKind::Table => "table",
            ElementKind::Video => "video",
            ElementKind::Image => "image",
            ElementKind::Other => "other",
        };
        f.write_str(name)
    }
}

impl DocumentSnapshot {
    /// Find a page element by object id, together with its slide
    pub fn find_element(&self, object_id: &str) -> Option<(&Page, &PageElement)> {
        self.slides.iter().find_map(|page| {
            page.page_elements
                .iter()
                .find(|element| element.object_id == object_id)
                .map(|element| (page, element))
        })
    }

    pub fn find_page(&self, object_id: &str) -> Option<&Page> {
        self.slides.iter().find(|page| page.object_id == object_id)
    }
}

impl PageElement {
    pub fn kind(&self) -> ElementKind {
        if self.shape.is_some() {
            ElementKind::Shape
        } else if self.table.is_some() {
            ElementKind::Table
        } else if self.video.is_some() {
            ElementKind::Video
        } else if self.image.is_some() {
            ElementKind::Image
        } else {
            ElementKind::Other
        }
    }

    /// Current geometry in EMU; missing transform or size read as identity and zero
    pub fn geometry(&self) -> ElementGeometry {
        let transform = self.transform.unwrap_or_default();
        let to_emu = |value: f64| match transform.unit {
            Unit::Emu => value,
            Unit::Pt => points_to_emu(value),
        };
        let (width_emu, height_emu) = self
            .size
            .map(|size| (size.width.to_emu(), size.height.to_emu()))
            .unwrap_or((0.0, 0.0));

        ElementGeometry {
            scale_x: transform.scale_x,
            scale_y: transform.scale_y,
            shear_x: transform.shear_x,
            shear_y: transform.shear_y,
            translate_x: to_emu(transform.translate_x),
            translate_y: to_emu(transform.translate_y),
            width_emu,
            height_emu,
        }
    }

    /// Flattened text runs of the element's text, empty when it holds none
    pub fn text_runs(&self) -> Vec<TextRun> {
        self.text_elements()
            .iter()
            .map(|element| TextRun {
                start_offset: element.start_index,
                end_offset: element.end_index.max(element.start_index),
                is_paragraph_boundary: element.paragraph_marker.is_some(),
            })
            .collect()
    }

    /// Concatenated text of the element's runs
    pub fn plain_text(&self) -> String {
        self.text_elements()
            .iter()
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }

    fn text_elements(&self) -> &[TextElement] {
        self.shape
            .as_ref()
            .and_then(|shape| shape.text.as_ref())
            .map(|text| text.text_elements.as_slice())
            .unwrap_or(&[])
    }
}

/// Outcome of a successful mutation submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitReceipt {
    pub presentation_id: String,
    pub applied: usize,
}

/// Collaborator that owns document retrieval and mutation submission
pub trait DocumentService: Send + Sync {
    fn fetch_document(&self, presentation_id: &str) -> Result<DocumentSnapshot>;

    fn submit_mutations(
        &self,
        presentation_id: &str,
        requests: &[MutationRequest],
    ) -> Result<SubmitReceipt>;
}
