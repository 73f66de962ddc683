use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentService, DocumentSnapshot, ElementKind, PageElement, SubmitReceipt};
use crate::error::{EditError, EditResult};
use crate::mutation::{
    CreateParagraphBullets, CreateShape, DeleteParagraphBullets, DeleteText, ElementProperties,
    InsertText, MergeTableCells, MutationRequest, ParagraphStyle, TableCellLocation, TableRange,
    TransformMatrix, UpdateParagraphStyle,
};
use crate::paragraphs::{
    TextRangeSelector, TextRun, count_paragraphs, paragraph_ranges, range_for_index,
    range_for_indices,
};
use crate::scope::{index_scope, scope_label};
use crate::shared_utils::{
    break_at_word_boundary, parse_indices_parameter, validate_new_object_id, validate_object_id,
    validate_presentation_id,
};
use crate::transform::{AffineTransform, ElementGeometry, GeometryEdit, Position, compose};
use crate::units::{Length, emu_to_points, points_to_emu};

pub const ALIGNMENTS: [&str; 4] = ["START", "CENTER", "END", "JUSTIFIED"];

pub const BULLET_PRESETS: [&str; 9] = [
    "BULLET_DISC_CIRCLE_SQUARE",
    "BULLET_DIAMONDX_ARROW3D_SQUARE",
    "BULLET_CHECKBOX",
    "BULLET_ARROW_DIAMOND_DISC",
    "BULLET_STAR_CIRCLE_SQUARE",
    "BULLET_ARROW3D_CIRCLE_SQUARE",
    "BULLET_LEFTTRIANGLE_DIAMOND_DISC",
    "BULLET_DIAMONDX_HOLLOWDIAMOND_SQUARE",
    "BULLET_DIAMOND_CIRCLE_SQUARE",
];

pub const NUMBERED_PRESETS: [&str; 6] = [
    "NUMBERED_DIGIT_ALPHA_ROMAN",
    "NUMBERED_DIGIT_ALPHA_ROMAN_PARENS",
    "NUMBERED_DIGIT_NESTED",
    "NUMBERED_UPPERALPHA_ALPHA_ROMAN",
    "NUMBERED_UPPERROMAN_UPPERALPHA_DIGIT",
    "NUMBERED_ZERODIGIT_ALPHA_ROMAN",
];

const PREVIEW_CHARS: usize = 60;

/// Paragraph indices given either as a list or as a string like "0,2-4" / "all"
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ParagraphSelection {
    Indices(Vec<usize>),
    Spec(String),
}

/// Input for the transform_element tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct TransformElementParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape, image or video to move/resize/rotate")]
    pub object_id: String,
    #[schemars(description = "New X position of the top-left corner in points (requires y)")]
    pub x: Option<f64>,
    #[schemars(description = "New Y position of the top-left corner in points (requires x)")]
    pub y: Option<f64>,
    #[schemars(description = "New rendered width in points")]
    pub width: Option<f64>,
    #[schemars(description = "New rendered height in points")]
    pub height: Option<f64>,
    #[schemars(description = "Absolute rotation in degrees (clockwise)")]
    pub rotation: Option<f64>,
    #[schemars(description = "When only width or height is given, scale the other axis by the same factor")]
    pub scale_proportionally: Option<bool>,
}

/// Input for the create_text_box tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct CreateTextBoxParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the slide to place the text box on")]
    pub slide_object_id: String,
    #[schemars(description = "Object ID for the new text box (generated when omitted)")]
    pub object_id: Option<String>,
    #[schemars(description = "X position in points from the left edge")]
    pub x: f64,
    #[schemars(description = "Y position in points from the top edge")]
    pub y: f64,
    #[schemars(description = "Width in points")]
    pub width: f64,
    #[schemars(description = "Height in points")]
    pub height: f64,
    #[schemars(description = "Rotation in degrees")]
    pub rotation: Option<f64>,
    #[schemars(description = "Initial text of the box")]
    pub text: Option<String>,
}

/// Input for the format_paragraph tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct FormatParagraphParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape holding the text")]
    pub object_id: String,
    #[schemars(description = "0-based paragraph index (all paragraphs when omitted)")]
    pub paragraph_index: Option<usize>,
    #[schemars(description = "Alignment: START, CENTER, END or JUSTIFIED")]
    pub alignment: Option<String>,
    #[schemars(description = "Line spacing as a percentage of normal (100 = single)")]
    pub line_spacing: Option<f64>,
    #[schemars(description = "Space above the paragraph in points")]
    pub space_above: Option<f64>,
    #[schemars(description = "Space below the paragraph in points")]
    pub space_below: Option<f64>,
}

/// Input for the apply_list tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct ApplyListParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape holding the text")]
    pub object_id: String,
    #[schemars(description = "0-based paragraph indices as a list or a string like \"0,2-4\" (all when omitted)")]
    pub paragraph_indices: Option<ParagraphSelection>,
    #[schemars(description = "BULLET or NUMBERED (default: BULLET)")]
    pub list_type: Option<String>,
    #[schemars(description = "Bullet glyph preset, e.g. BULLET_DISC_CIRCLE_SQUARE or NUMBERED_DIGIT_ALPHA_ROMAN")]
    pub preset: Option<String>,
}

/// Input for the modify_list tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct ModifyListParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape holding the list")]
    pub object_id: String,
    #[schemars(description = "0-based paragraph indices as a list or a string like \"0,2-4\" (all when omitted)")]
    pub paragraph_indices: Option<ParagraphSelection>,
    #[schemars(description = "REMOVE to drop bullets, CHANGE_PRESET to switch glyphs")]
    pub action: String,
    #[schemars(description = "New preset. Required for: CHANGE_PRESET")]
    pub preset: Option<String>,
}

/// Input for the set_indentation tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct SetIndentationParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape holding the text")]
    pub object_id: String,
    #[schemars(description = "0-based paragraph indices as a list or a string like \"0,2-4\" (all when omitted)")]
    pub paragraph_indices: Option<ParagraphSelection>,
    #[schemars(description = "Indent of the paragraph's start side in points")]
    pub indent_start: Option<f64>,
    #[schemars(description = "Indent of the first line relative to the start side, in points")]
    pub indent_first_line: Option<f64>,
    #[schemars(description = "Indent of the paragraph's end side in points")]
    pub indent_end: Option<f64>,
}

/// Input for the insert_text tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct InsertTextParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape")]
    pub object_id: String,
    #[schemars(description = "Text to insert")]
    pub text: String,
    #[schemars(description = "Insert at the start of this 0-based paragraph")]
    pub paragraph_index: Option<usize>,
    #[schemars(description = "Insert at this character offset (default: 0)")]
    pub insertion_index: Option<usize>,
}

/// Input for the replace_text tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct ReplaceTextParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the shape")]
    pub object_id: String,
    #[schemars(description = "Replacement text (empty clears the text)")]
    pub text: String,
    #[schemars(description = "Replace only this 0-based paragraph (all text when omitted)")]
    pub paragraph_index: Option<usize>,
}

/// Input for the merge_table_cells tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct MergeTableCellsParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the table")]
    pub object_id: String,
    #[schemars(description = "0-based row of the top-left cell")]
    pub row_index: usize,
    #[schemars(description = "0-based column of the top-left cell")]
    pub column_index: usize,
    #[schemars(description = "Number of rows to merge")]
    pub row_span: usize,
    #[schemars(description = "Number of columns to merge")]
    pub column_span: usize,
}

/// Input for the describe_element tool
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct DescribeElementParams {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Object ID of the page element")]
    pub object_id: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct TransformElementOutput {
    pub object_id: String,
    pub element_kind: String,
    pub transform: AffineTransform,
    pub x_pt: f64,
    pub y_pt: f64,
    pub mutations: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateTextBoxOutput {
    pub object_id: String,
    pub slide_object_id: String,
    pub transform: AffineTransform,
    pub inserted_text: bool,
    pub mutations: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct ParagraphEditOutput {
    pub object_id: String,
    pub scope: String,
    pub text_range: TextRangeSelector,
    pub fields: String,
    pub mutations: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct ListEditOutput {
    pub object_id: String,
    pub action: String,
    pub preset: Option<String>,
    pub scope: String,
    pub text_range: TextRangeSelector,
    pub mutations: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct TextEditOutput {
    pub object_id: String,
    pub scope: String,
    pub insertion_index: usize,
    pub characters: usize,
    pub mutations: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct MergeCellsOutput {
    pub object_id: String,
    pub table_range: TableRange,
    pub mutations: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct ParagraphSummary {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub preview: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ElementDescription {
    pub object_id: String,
    pub slide_object_id: String,
    pub element_kind: String,
    pub x_pt: f64,
    pub y_pt: f64,
    pub width_pt: f64,
    pub height_pt: f64,
    pub rotation_degrees: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub paragraphs: Vec<ParagraphSummary>,
}

/// Editing operations over a document service
#[derive(Clone)]
pub struct SlideEditor {
    service: Arc<dyn DocumentService>,
}

impl SlideEditor {
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        Self { service }
    }

    fn load(&self, presentation_id: &str) -> EditResult<DocumentSnapshot> {
        validate_presentation_id(presentation_id)?;
        Ok(self.service.fetch_document(presentation_id)?)
    }

    fn submit(&self, presentation_id: &str, requests: Vec<MutationRequest>) -> EditResult<SubmitReceipt> {
        log::debug!(
            "Submitting {} mutation(s) to {}",
            requests.len(),
            presentation_id
        );
        Ok(self.service.submit_mutations(presentation_id, &requests)?)
    }

    /// Move, resize and/or rotate a page element
    pub fn transform_element(&self, params: TransformElementParams) -> EditResult<TransformElementOutput> {
        validate_object_id("object_id", &params.object_id)?;
        let edit = geometry_edit(&params)?;

        let snapshot = self.load(&params.presentation_id)?;
        let element = locate(&snapshot, &params.object_id)?;
        let current = element.geometry();

        if edit.width.is_some() && current.width_emu == 0.0 {
            return Err(EditError::invalid(format!(
                "Element {} has no width; it cannot be resized horizontally",
                params.object_id
            )));
        }
        if edit.height.is_some() && current.height_emu == 0.0 {
            return Err(EditError::invalid(format!(
                "Element {} has no height; it cannot be resized vertically",
                params.object_id
            )));
        }

        let transform = compose(&current, &edit);
        let receipt = self.submit(
            &params.presentation_id,
            vec![MutationRequest::update_transform(&params.object_id, &transform)],
        )?;

        Ok(TransformElementOutput {
            object_id: params.object_id,
            element_kind: element.kind().to_string(),
            transform,
            x_pt: emu_to_points(transform.translate_x),
            y_pt: emu_to_points(transform.translate_y),
            mutations: receipt.applied,
        })
    }

    /// Place a new text box on a slide
    pub fn create_text_box(&self, params: CreateTextBoxParams) -> EditResult<CreateTextBoxOutput> {
        validate_object_id("slide_object_id", &params.slide_object_id)?;
        let object_id = match &params.object_id {
            Some(id) => {
                validate_new_object_id("object_id", id)?;
                id.clone()
            }
            None => format!("textbox_{}", chrono::Utc::now().format("%Y%m%d%H%M%S%3f")),
        };
        require_finite("x", params.x)?;
        require_finite("y", params.y)?;
        require_positive("width", params.width)?;
        require_positive("height", params.height)?;
        if let Some(rotation) = params.rotation {
            require_finite("rotation", rotation)?;
        }

        let snapshot = self.load(&params.presentation_id)?;
        if snapshot.find_page(&params.slide_object_id).is_none() {
            return Err(EditError::ElementNotFound {
                object_id: params.slide_object_id,
            });
        }
        if snapshot.find_element(&object_id).is_some() {
            return Err(EditError::invalid(format!("Object ID {} is already in use", object_id)));
        }

        let width = Length::points(params.width).in_emu();
        let height = Length::points(params.height).in_emu();
        let placement = ElementGeometry::unit_scale(width.magnitude, height.magnitude);
        let transform = compose(
            &placement,
            &GeometryEdit {
                position: Some(Position {
                    x: params.x,
                    y: params.y,
                }),
                rotation: params.rotation,
                ..Default::default()
            },
        );

        let mut requests = vec![MutationRequest::CreateShape(CreateShape {
            object_id: object_id.clone(),
            shape_type: "TEXT_BOX".to_string(),
            element_properties: ElementProperties {
                page_object_id: params.slide_object_id.clone(),
                size: crate::document::Size { width, height },
                transform: TransformMatrix::from(&transform),
            },
        })];

        let text = params.text.filter(|text| !text.is_empty());
        let inserted_text = text.is_some();
        if let Some(text) = text {
            requests.push(MutationRequest::InsertText(InsertText {
                object_id: object_id.clone(),
                insertion_index: 0,
                text,
            }));
        }

        let receipt = self.submit(&params.presentation_id, requests)?;

        Ok(CreateTextBoxOutput {
            object_id,
            slide_object_id: params.slide_object_id,
            transform,
            inserted_text,
            mutations: receipt.applied,
        })
    }

    /// Set alignment and spacing of one paragraph or all text
    pub fn format_paragraph(&self, params: FormatParagraphParams) -> EditResult<ParagraphEditOutput> {
        validate_object_id("object_id", &params.object_id)?;
        let alignment = params
            .alignment
            .as_deref()
            .map(normalize_alignment)
            .transpose()?;
        if let Some(spacing) = params.line_spacing {
            require_positive("line_spacing", spacing)?;
        }
        if let Some(space) = params.space_above {
            require_non_negative("space_above", space)?;
        }
        if let Some(space) = params.space_below {
            require_non_negative("space_below", space)?;
        }

        let style = ParagraphStyle {
            alignment,
            line_spacing: params.line_spacing,
            space_above: params.space_above.map(|pt| Length::points(pt).in_emu()),
            space_below: params.space_below.map(|pt| Length::points(pt).in_emu()),
            ..Default::default()
        };
        if style.is_empty() {
            return Err(EditError::invalid(
                "Provide at least one of alignment, line_spacing, space_above, space_below",
            ));
        }

        let snapshot = self.load(&params.presentation_id)?;
        let runs = text_runs_of(locate(&snapshot, &params.object_id)?, &params.object_id)?;
        if let Some(index) = params.paragraph_index {
            check_index(index, count_paragraphs(&runs))?;
        }

        let text_range = range_for_index(&runs, params.paragraph_index);
        let request = UpdateParagraphStyle::new(&params.object_id, text_range, style);
        let fields = request.fields.clone();
        let receipt = self.submit(
            &params.presentation_id,
            vec![MutationRequest::UpdateParagraphStyle(request)],
        )?;

        Ok(ParagraphEditOutput {
            object_id: params.object_id,
            scope: index_scope(params.paragraph_index),
            text_range,
            fields,
            mutations: receipt.applied,
        })
    }

    /// Turn paragraphs into a bulleted or numbered list
    pub fn apply_list(&self, params: ApplyListParams) -> EditResult<ListEditOutput> {
        validate_object_id("object_id", &params.object_id)?;
        let list_type = params
            .list_type
            .as_deref()
            .unwrap_or("BULLET")
            .trim()
            .to_uppercase();
        let preset = match (list_type.as_str(), params.preset.as_deref()) {
            ("BULLET", None) => BULLET_PRESETS[0].to_string(),
            ("NUMBERED", None) => NUMBERED_PRESETS[0].to_string(),
            ("BULLET" | "NUMBERED", Some(preset)) => {
                let preset = normalize_preset(preset)?;
                if !preset.starts_with(list_type.as_str()) {
                    return Err(EditError::invalid(format!(
                        "Preset {} does not match list_type {}",
                        preset, list_type
                    )));
                }
                preset
            }
            (other, _) => {
                return Err(EditError::invalid(format!(
                    "Unknown list_type '{}'; expected BULLET or NUMBERED",
                    other
                )));
            }
        };

        let snapshot = self.load(&params.presentation_id)?;
        let runs = text_runs_of(locate(&snapshot, &params.object_id)?, &params.object_id)?;
        let indices = resolve_indices(params.paragraph_indices.as_ref(), &runs)?;
        let text_range = range_for_indices(&runs, &indices);

        let receipt = self.submit(
            &params.presentation_id,
            vec![MutationRequest::CreateParagraphBullets(CreateParagraphBullets {
                object_id: params.object_id.clone(),
                text_range,
                bullet_preset: preset.clone(),
            })],
        )?;

        Ok(ListEditOutput {
            object_id: params.object_id,
            action: list_type,
            preset: Some(preset),
            scope: scope_label(&text_range, &indices),
            text_range,
            mutations: receipt.applied,
        })
    }

    /// Remove bullets from paragraphs, or switch them to another preset
    pub fn modify_list(&self, params: ModifyListParams) -> EditResult<ListEditOutput> {
        validate_object_id("object_id", &params.object_id)?;
        let action = params.action.trim().to_uppercase();
        let preset = match action.as_str() {
            "REMOVE" => None,
            "CHANGE_PRESET" => {
                let preset = params.preset.as_deref().ok_or_else(|| {
                    EditError::invalid("preset is required for CHANGE_PRESET")
                })?;
                Some(normalize_preset(preset)?)
            }
            other => {
                return Err(EditError::invalid(format!(
                    "Unknown action '{}'; expected REMOVE or CHANGE_PRESET",
                    other
                )));
            }
        };

        let snapshot = self.load(&params.presentation_id)?;
        let runs = text_runs_of(locate(&snapshot, &params.object_id)?, &params.object_id)?;
        let indices = resolve_indices(params.paragraph_indices.as_ref(), &runs)?;
        let text_range = range_for_indices(&runs, &indices);

        // Bullets cannot be restyled in place: drop them, then recreate
        let mut requests = vec![MutationRequest::DeleteParagraphBullets(DeleteParagraphBullets {
            object_id: params.object_id.clone(),
            text_range,
        })];
        if let Some(preset) = &preset {
            requests.push(MutationRequest::CreateParagraphBullets(CreateParagraphBullets {
                object_id: params.object_id.clone(),
                text_range,
                bullet_preset: preset.clone(),
            }));
        }

        let receipt = self.submit(&params.presentation_id, requests)?;

        Ok(ListEditOutput {
            object_id: params.object_id,
            action,
            preset,
            scope: scope_label(&text_range, &indices),
            text_range,
            mutations: receipt.applied,
        })
    }

    /// Set start, first-line and end indents on paragraphs
    pub fn set_indentation(&self, params: SetIndentationParams) -> EditResult<ParagraphEditOutput> {
        validate_object_id("object_id", &params.object_id)?;
        for (field, value) in [
            ("indent_start", params.indent_start),
            ("indent_first_line", params.indent_first_line),
            ("indent_end", params.indent_end),
        ] {
            if let Some(value) = value {
                require_non_negative(field, value)?;
            }
        }

        let style = ParagraphStyle {
            indent_start: params.indent_start.map(|pt| Length::emu(points_to_emu(pt))),
            indent_first_line: params.indent_first_line.map(|pt| Length::emu(points_to_emu(pt))),
            indent_end: params.indent_end.map(|pt| Length::emu(points_to_emu(pt))),
            ..Default::default()
        };
        if style.is_empty() {
            return Err(EditError::invalid(
                "Provide at least one of indent_start, indent_first_line, indent_end",
            ));
        }

        let snapshot = self.load(&params.presentation_id)?;
        let runs = text_runs_of(locate(&snapshot, &params.object_id)?, &params.object_id)?;
        let indices = resolve_indices(params.paragraph_indices.as_ref(), &runs)?;
        let text_range = range_for_indices(&runs, &indices);

        let request = UpdateParagraphStyle::new(&params.object_id, text_range, style);
        let fields = request.fields.clone();
        let receipt = self.submit(
            &params.presentation_id,
            vec![MutationRequest::UpdateParagraphStyle(request)],
        )?;

        Ok(ParagraphEditOutput {
            object_id: params.object_id,
            scope: scope_label(&text_range, &indices),
            text_range,
            fields,
            mutations: receipt.applied,
        })
    }

    /// Insert text at a paragraph start or character offset
    pub fn insert_text(&self, params: InsertTextParams) -> EditResult<TextEditOutput> {
        validate_object_id("object_id", &params.object_id)?;
        if params.text.is_empty() {
            return Err(EditError::invalid("text must not be empty"));
        }
        if params.paragraph_index.is_some() && params.insertion_index.is_some() {
            return Err(EditError::invalid(
                "Use either paragraph_index or insertion_index, not both",
            ));
        }

        let snapshot = self.load(&params.presentation_id)?;
        let runs = text_runs_of(locate(&snapshot, &params.object_id)?, &params.object_id)?;

        let (insertion_index, scope) = match (params.paragraph_index, params.insertion_index) {
            (Some(index), _) => {
                let ranges = paragraph_ranges(&runs);
                check_index(index, ranges.len())?;
                (ranges[index].start, index_scope(Some(index)))
            }
            (None, Some(offset)) => {
                let text_end = runs.iter().map(|run| run.end_offset).max().unwrap_or(0);
                if offset > text_end {
                    return Err(EditError::invalid(format!(
                        "insertion_index {} is past the end of the text ({})",
                        offset, text_end
                    )));
                }
                (offset, format!("OFFSET ({})", offset))
            }
            (None, None) => (0, index_scope(Some(0))),
        };

        let characters = params.text.chars().count();
        let receipt = self.submit(
            &params.presentation_id,
            vec![MutationRequest::InsertText(InsertText {
                object_id: params.object_id.clone(),
                insertion_index,
                text: params.text,
            })],
        )?;

        Ok(TextEditOutput {
            object_id: params.object_id,
            scope,
            insertion_index,
            characters,
            mutations: receipt.applied,
        })
    }

    /// Replace one paragraph's text, or all text of the shape
    pub fn replace_text(&self, params: ReplaceTextParams) -> EditResult<TextEditOutput> {
        validate_object_id("object_id", &params.object_id)?;

        let snapshot = self.load(&params.presentation_id)?;
        let runs = text_runs_of(locate(&snapshot, &params.object_id)?, &params.object_id)?;
        if let Some(index) = params.paragraph_index {
            check_index(index, count_paragraphs(&runs))?;
        }

        // The paragraph's own terminator stays so neighbouring paragraphs do not merge
        let delete_range = match range_for_index(&runs, params.paragraph_index) {
            TextRangeSelector::FixedRange {
                start_index,
                end_index,
            } => (end_index > start_index + 1)
                .then(|| TextRangeSelector::fixed(start_index, end_index - 1)),
            TextRangeSelector::All => (!runs.is_empty()).then_some(TextRangeSelector::All),
        };
        let insertion_index = delete_range.map(|range| range.start()).unwrap_or_else(|| {
            params
                .paragraph_index
                .map(|index| paragraph_ranges(&runs)[index].start)
                .unwrap_or(0)
        });

        let mut requests = Vec::new();
        if let Some(text_range) = delete_range {
            requests.push(MutationRequest::DeleteText(DeleteText {
                object_id: params.object_id.clone(),
                text_range,
            }));
        }
        let characters = params.text.chars().count();
        if !params.text.is_empty() {
            requests.push(MutationRequest::InsertText(InsertText {
                object_id: params.object_id.clone(),
                insertion_index,
                text: params.text,
            }));
        }
        if requests.is_empty() {
            return Err(EditError::invalid("Nothing to replace: the text is already empty"));
        }

        let receipt = self.submit(&params.presentation_id, requests)?;

        Ok(TextEditOutput {
            object_id: params.object_id,
            scope: index_scope(params.paragraph_index),
            insertion_index,
            characters,
            mutations: receipt.applied,
        })
    }

    /// Merge a rectangular block of table cells
    pub fn merge_table_cells(&self, params: MergeTableCellsParams) -> EditResult<MergeCellsOutput> {
        validate_object_id("object_id", &params.object_id)?;
        if params.row_span == 0 || params.column_span == 0 {
            return Err(EditError::invalid("row_span and column_span must be at least 1"));
        }
        if params.row_span == 1 && params.column_span == 1 {
            return Err(EditError::invalid("Merging needs at least two cells"));
        }
        let last_row = params.row_index.checked_add(params.row_span);
        let last_column = params.column_index.checked_add(params.column_span);
        let (Some(last_row), Some(last_column)) = (last_row, last_column) else {
            return Err(EditError::invalid("Cell range exceeds the addressable table size"));
        };

        let snapshot = self.load(&params.presentation_id)?;
        let element = locate(&snapshot, &params.object_id)?;
        let table = element.table.ok_or_else(|| EditError::WrongElementKind {
            object_id: params.object_id.clone(),
            expected: "table",
            found: element.kind(),
        })?;

        if last_row > table.rows || last_column > table.columns {
            return Err(EditError::invalid(format!(
                "Cells rows {}..{} / columns {}..{} fall outside the {}x{} table",
                params.row_index, last_row, params.column_index, last_column, table.rows, table.columns
            )));
        }

        let table_range = TableRange {
            location: TableCellLocation {
                row_index: params.row_index,
                column_index: params.column_index,
            },
            row_span: params.row_span,
            column_span: params.column_span,
        };
        let receipt = self.submit(
            &params.presentation_id,
            vec![MutationRequest::MergeTableCells(MergeTableCells {
                object_id: params.object_id.clone(),
                table_range,
            })],
        )?;

        Ok(MergeCellsOutput {
            object_id: params.object_id,
            table_range,
            mutations: receipt.applied,
        })
    }

    /// Report an element's placement in points and its paragraph layout
    pub fn describe_element(&self, params: DescribeElementParams) -> EditResult<ElementDescription> {
        validate_object_id("object_id", &params.object_id)?;
        let snapshot = self.load(&params.presentation_id)?;
        let (page, element) = snapshot.find_element(&params.object_id).ok_or_else(|| {
            EditError::ElementNotFound {
                object_id: params.object_id.clone(),
            }
        })?;

        let geometry = element.geometry();
        // Text offsets count UTF-16 code units
        let text: Vec<u16> = element.plain_text().encode_utf16().collect();
        let paragraphs = paragraph_ranges(&element.text_runs())
            .into_iter()
            .enumerate()
            .map(|(index, range)| {
                let units = text
                    .get(range.start.min(text.len())..range.end.min(text.len()))
                    .unwrap_or_default();
                let slice = String::from_utf16_lossy(units);
                ParagraphSummary {
                    index,
                    start: range.start,
                    end: range.end,
                    preview: break_at_word_boundary(slice.trim_end(), PREVIEW_CHARS).to_string(),
                }
            })
            .collect();

        Ok(ElementDescription {
            object_id: params.object_id,
            slide_object_id: page.object_id.clone(),
            element_kind: element.kind().to_string(),
            x_pt: emu_to_points(geometry.translate_x),
            y_pt: emu_to_points(geometry.translate_y),
            width_pt: emu_to_points(geometry.width_emu),
            height_pt: emu_to_points(geometry.height_emu),
            rotation_degrees: geometry.shear_y.atan2(geometry.scale_x).to_degrees(),
            scale_x: geometry.scale_x,
            scale_y: geometry.scale_y,
            paragraphs,
        })
    }
}

fn locate<'a>(snapshot: &'a DocumentSnapshot, object_id: &str) -> EditResult<&'a PageElement> {
    snapshot
        .find_element(object_id)
        .map(|(_, element)| element)
        .ok_or_else(|| EditError::ElementNotFound {
            object_id: object_id.to_string(),
        })
}

fn text_runs_of(element: &PageElement, object_id: &str) -> EditResult<Vec<TextRun>> {
    match element.kind() {
        ElementKind::Shape => Ok(element.text_runs()),
        found => Err(EditError::WrongElementKind {
            object_id: object_id.to_string(),
            expected: "shape",
            found,
        }),
    }
}

fn check_index(index: usize, count: usize) -> EditResult<()> {
    if index >= count {
        return Err(EditError::ParagraphOutOfRange { index, count });
    }
    Ok(())
}

fn resolve_indices(selection: Option<&ParagraphSelection>, runs: &[TextRun]) -> EditResult<Vec<usize>> {
    let count = count_paragraphs(runs);
    match selection {
        None => Ok(Vec::new()),
        Some(ParagraphSelection::Spec(spec)) => {
            parse_indices_parameter(spec, count).map_err(EditError::InvalidInput)
        }
        Some(ParagraphSelection::Indices(indices)) => {
            let mut unique = Vec::with_capacity(indices.len());
            for &index in indices {
                check_index(index, count)?;
                if !unique.contains(&index) {
                    unique.push(index);
                }
            }
            Ok(unique)
        }
    }
}

fn geometry_edit(params: &TransformElementParams) -> EditResult<GeometryEdit> {
    let position = match (params.x, params.y) {
        (Some(x), Some(y)) => {
            require_finite("x", x)?;
            require_finite("y", y)?;
            Some(Position { x, y })
        }
        (None, None) => None,
        _ => return Err(EditError::invalid("x and y must be given together")),
    };
    if let Some(width) = params.width {
        require_positive("width", width)?;
    }
    if let Some(height) = params.height {
        require_positive("height", height)?;
    }
    if let Some(rotation) = params.rotation {
        require_finite("rotation", rotation)?;
    }

    let edit = GeometryEdit {
        position,
        width: params.width,
        height: params.height,
        rotation: params.rotation,
        scale_proportionally: params.scale_proportionally.unwrap_or(false),
    };
    if edit.is_empty() {
        return Err(EditError::invalid(
            "Provide a position (x, y), a size (width and/or height) or a rotation",
        ));
    }
    Ok(edit)
}

fn normalize_alignment(alignment: &str) -> EditResult<String> {
    let normalized = alignment.trim().to_uppercase();
    if ALIGNMENTS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(EditError::invalid(format!(
            "Unknown alignment '{}'; expected one of {}",
            alignment,
            ALIGNMENTS.join(", ")
        )))
    }
}

fn normalize_preset(preset: &str) -> EditResult<String> {
    let normalized = preset.trim().to_uppercase();
    if BULLET_PRESETS.contains(&normalized.as_str()) || NUMBERED_PRESETS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(EditError::invalid(format!("Unknown bullet preset '{}'", preset)))
    }
}

fn require_finite(field: &str, value: f64) -> EditResult<()> {
    if !value.is_finite() {
        return Err(EditError::invalid(format!("{} must be a finite number", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> EditResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(EditError::invalid(format!("{} must be greater than 0 (got {})", field, value)));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> EditResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(EditError::invalid(format!("{} must not be negative (got {})", field, value)));
    }
    Ok(())
}
