use serde::{Deserialize, Serialize};

use crate::document::Size;
use crate::paragraphs::TextRangeSelector;
use crate::transform::{AffineTransform, ApplyMode};
use crate::units::{Length, Unit};

/// One request of a batched mutation, serialized as `{"<kind>": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationRequest {
    CreateShape(CreateShape),
    InsertText(InsertText),
    DeleteText(DeleteText),
    UpdatePageElementTransform(UpdatePageElementTransform),
    UpdateParagraphStyle(UpdateParagraphStyle),
    CreateParagraphBullets(CreateParagraphBullets),
    DeleteParagraphBullets(DeleteParagraphBullets),
    MergeTableCells(MergeTableCells),
}

impl MutationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            MutationRequest::CreateShape(_) => "createShape",
            MutationRequest::InsertText(_) => "insertText",
            MutationRequest::DeleteText(_) => "deleteText",
            MutationRequest::UpdatePageElementTransform(_) => "updatePageElementTransform",
            MutationRequest::UpdateParagraphStyle(_) => "updateParagraphStyle",
            MutationRequest::CreateParagraphBullets(_) => "createParagraphBullets",
            MutationRequest::DeleteParagraphBullets(_) => "deleteParagraphBullets",
            MutationRequest::MergeTableCells(_) => "mergeTableCells",
        }
    }

    pub fn update_transform(object_id: &str, transform: &AffineTransform) -> Self {
        MutationRequest::UpdatePageElementTransform(UpdatePageElementTransform {
            object_id: object_id.to_string(),
            transform: TransformMatrix::from(transform),
            apply_mode: transform.apply_mode,
        })
    }
}

/// Transform matrix without apply mode, as embedded in requests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformMatrix {
    pub scale_x: f64,
    pub scale_y: f64,
    pub shear_x: f64,
    pub shear_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub unit: Unit,
}

impl From<&AffineTransform> for TransformMatrix {
    fn from(t: &AffineTransform) -> Self {
        Self {
            scale_x: t.scale_x,
            scale_y: t.scale_y,
            shear_x: t.shear_x,
            shear_y: t.shear_y,
            translate_x: t.translate_x,
            translate_y: t.translate_y,
            unit: t.unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShape {
    pub object_id: String,
    pub shape_type: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub page_object_id: String,
    pub size: Size,
    pub transform: TransformMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageElementTransform {
    pub object_id: String,
    pub transform: TransformMatrix,
    pub apply_mode: ApplyMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    pub insertion_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteText {
    pub object_id: String,
    pub text_range: TextRangeSelector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    pub object_id: String,
    pub text_range: TextRangeSelector,
    pub style: ParagraphStyle,
    /// Comma-separated names of the style fields being set
    pub fields: String,
}

impl UpdateParagraphStyle {
    pub fn new(object_id: &str, text_range: TextRangeSelector, style: ParagraphStyle) -> Self {
        let fields = style.field_mask();
        Self {
            object_id: object_id.to_string(),
            text_range,
            style,
            fields,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    /// Percentage of normal line height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_above: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_below: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_start: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_end: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_first_line: Option<Length>,
}

impl ParagraphStyle {
    /// Names of the fields that are set, in declaration order
    pub fn field_mask(&self) -> String {
        let fields = [
            ("alignment", self.alignment.is_some()),
            ("lineSpacing", self.line_spacing.is_some()),
            ("spaceAbove", self.space_above.is_some()),
            ("spaceBelow", self.space_below.is_some()),
            ("indentStart", self.indent_start.is_some()),
            ("indentEnd", self.indent_end.is_some()),
            ("indentFirstLine", self.indent_first_line.is_some()),
        ];
        fields
            .iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.field_mask().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParagraphBullets {
    pub object_id: String,
    pub text_range: TextRangeSelector,
    pub bullet_preset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParagraphBullets {
    pub object_id: String,
    pub text_range: TextRangeSelector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeTableCells {
    pub object_id: String,
    pub table_range: TableRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRange {
    pub location: TableCellLocation,
    pub row_span: usize,
    pub column_span: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub row_index: usize,
    pub column_index: usize,
}
