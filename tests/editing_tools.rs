mod common;

use std::sync::Arc;

use common::{DECK_ID, RecordingService, deck};
use serde_json::json;
use slide_editor_mcp::handlers::{
    ApplyListParams, CreateTextBoxParams, DescribeElementParams, FormatParagraphParams,
    InsertTextParams, MergeTableCellsParams, ModifyListParams, ParagraphSelection,
    ReplaceTextParams, SetIndentationParams, TransformElementParams,
};
use slide_editor_mcp::{EditError, SlideEditor, TextRangeSelector};

const EPS: f64 = 1e-9;

fn editor() -> (Arc<RecordingService>, SlideEditor) {
    let service = Arc::new(RecordingService::new(deck()));
    let editor = SlideEditor::new(service.clone());
    (service, editor)
}

fn transform_params(object_id: &str) -> TransformElementParams {
    TransformElementParams {
        presentation_id: DECK_ID.to_string(),
        object_id: object_id.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_move_keeps_scale() {
    let (service, editor) = editor();
    let output = editor
        .transform_element(TransformElementParams {
            x: Some(72.0),
            y: Some(144.0),
            ..transform_params("body_text")
        })
        .unwrap();

    assert_eq!(output.element_kind, "shape");
    assert_eq!(output.x_pt, 72.0);
    assert_eq!(output.y_pt, 144.0);
    assert_eq!(output.mutations, 1);

    let batch = service.last_batch_json();
    let update = &batch[0]["updatePageElementTransform"];
    assert_eq!(update["objectId"], "body_text");
    assert_eq!(update["applyMode"], "ABSOLUTE");
    assert_eq!(update["transform"]["unit"], "EMU");
    assert_eq!(update["transform"]["translateX"], 914400.0);
    assert_eq!(update["transform"]["translateY"], 1828800.0);
    assert_eq!(update["transform"]["scaleX"], 1.0);
    assert_eq!(update["transform"]["scaleY"], 1.0);
}

#[test]
fn test_resize_proportionally() {
    let (_, editor) = editor();
    let output = editor
        .transform_element(TransformElementParams {
            width: Some(600.0),
            scale_proportionally: Some(true),
            ..transform_params("body_text")
        })
        .unwrap();
    assert!((output.transform.scale_x - 2.0).abs() < EPS);
    assert!((output.transform.scale_y - 2.0).abs() < EPS);
    // Position untouched
    assert_eq!(output.x_pt, 10.0);
    assert_eq!(output.y_pt, 20.0);
}

#[test]
fn test_resize_single_axis() {
    let (_, editor) = editor();
    let output = editor
        .transform_element(TransformElementParams {
            width: Some(600.0),
            ..transform_params("body_text")
        })
        .unwrap();
    assert!((output.transform.scale_x - 2.0).abs() < EPS);
    assert_eq!(output.transform.scale_y, 1.0);
}

#[test]
fn test_rotate_video_with_move() {
    let (_, editor) = editor();
    let output = editor
        .transform_element(TransformElementParams {
            x: Some(5.0),
            y: Some(6.0),
            rotation: Some(90.0),
            ..transform_params("video_clip")
        })
        .unwrap();
    assert_eq!(output.element_kind, "video");
    let t = output.transform;
    assert_eq!(t.translate_x, 63500.0);
    assert_eq!(t.translate_y, 76200.0);
    assert!(t.scale_x.abs() < EPS);
    assert!(t.scale_y.abs() < EPS);
    assert!((t.shear_y - 1.0).abs() < EPS);
    assert!((t.shear_x + 1.0).abs() < EPS);
}

#[test]
fn test_transform_rejections() {
    let (service, editor) = editor();

    let err = editor.transform_element(transform_params("body_text")).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .transform_element(TransformElementParams {
            x: Some(1.0),
            ..transform_params("body_text")
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .transform_element(TransformElementParams {
            height: Some(-4.0),
            ..transform_params("body_text")
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .transform_element(TransformElementParams {
            width: Some(50.0),
            ..transform_params("no_size_shape")
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .transform_element(TransformElementParams {
            rotation: Some(45.0),
            ..transform_params("missing_shape")
        })
        .unwrap_err();
    assert!(matches!(err, EditError::ElementNotFound { .. }));

    let err = editor
        .transform_element(TransformElementParams {
            presentation_id: "other_deck".to_string(),
            rotation: Some(45.0),
            ..transform_params("body_text")
        })
        .unwrap_err();
    assert!(matches!(err, EditError::Service(_)));
    assert!(!err.is_caller_error());

    assert_eq!(service.batch_count(), 0);
}

#[test]
fn test_create_text_box() {
    let (service, editor) = editor();
    let output = editor
        .create_text_box(CreateTextBoxParams {
            presentation_id: DECK_ID.to_string(),
            slide_object_id: "slide_one".to_string(),
            object_id: Some("caption_box".to_string()),
            x: 36.0,
            y: 18.0,
            width: 200.0,
            height: 40.0,
            rotation: Some(180.0),
            text: Some("Caption".to_string()),
        })
        .unwrap();

    assert_eq!(output.object_id, "caption_box");
    assert!(output.inserted_text);
    assert_eq!(output.mutations, 2);
    assert!((output.transform.scale_x + 1.0).abs() < EPS);
    assert!((output.transform.scale_y + 1.0).abs() < EPS);

    let batch = service.last_batch_json();
    let create = &batch[0]["createShape"];
    assert_eq!(create["shapeType"], "TEXT_BOX");
    assert_eq!(create["elementProperties"]["pageObjectId"], "slide_one");
    assert_eq!(
        create["elementProperties"]["size"]["width"],
        json!({"magnitude": 2540000.0, "unit": "EMU"})
    );
    assert_eq!(create["elementProperties"]["transform"]["translateX"], 457200.0);
    assert_eq!(batch[1]["insertText"]["text"], "Caption");
    assert_eq!(batch[1]["insertText"]["insertionIndex"], 0);
}

#[test]
fn test_create_text_box_rejections() {
    let (_, editor) = editor();
    let base = CreateTextBoxParams {
        presentation_id: DECK_ID.to_string(),
        slide_object_id: "slide_one".to_string(),
        object_id: Some("caption_box".to_string()),
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 20.0,
        ..Default::default()
    };

    let err = editor
        .create_text_box(CreateTextBoxParams {
            width: 0.0,
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .create_text_box(CreateTextBoxParams {
            slide_object_id: "slide_nine".to_string(),
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::ElementNotFound { .. }));

    let err = editor
        .create_text_box(CreateTextBoxParams {
            object_id: Some("body_text".to_string()),
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    // Generated id and no text: a single createShape
    let output = editor
        .create_text_box(CreateTextBoxParams {
            object_id: None,
            ..base
        })
        .unwrap();
    assert!(output.object_id.starts_with("textbox_"));
    assert!(!output.inserted_text);
    assert_eq!(output.mutations, 1);
}

#[test]
fn test_format_single_paragraph() {
    let (service, editor) = editor();
    let output = editor
        .format_paragraph(FormatParagraphParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            paragraph_index: Some(1),
            alignment: Some("center".to_string()),
            space_below: Some(6.0),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(output.scope, "INDEX (1)");
    assert_eq!(output.text_range, TextRangeSelector::fixed(6, 13));
    assert_eq!(output.fields, "alignment,spaceBelow");

    let batch = service.last_batch_json();
    let update = &batch[0]["updateParagraphStyle"];
    assert_eq!(update["textRange"], json!({"type": "FIXED_RANGE", "startIndex": 6, "endIndex": 13}));
    assert_eq!(update["style"]["alignment"], "CENTER");
    assert_eq!(update["style"]["spaceBelow"], json!({"magnitude": 76200.0, "unit": "EMU"}));
}

#[test]
fn test_format_all_paragraphs() {
    let (_, editor) = editor();
    let output = editor
        .format_paragraph(FormatParagraphParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            line_spacing: Some(150.0),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(output.scope, "ALL");
    assert_eq!(output.text_range, TextRangeSelector::All);
}

#[test]
fn test_format_paragraph_rejections() {
    let (_, editor) = editor();
    let base = FormatParagraphParams {
        presentation_id: DECK_ID.to_string(),
        object_id: "body_text".to_string(),
        alignment: Some("START".to_string()),
        ..Default::default()
    };

    let err = editor
        .format_paragraph(FormatParagraphParams {
            paragraph_index: Some(3),
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::ParagraphOutOfRange { index: 3, count: 3 }));

    let err = editor
        .format_paragraph(FormatParagraphParams {
            object_id: "table_grid".to_string(),
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::WrongElementKind { expected: "shape", .. }));

    let err = editor
        .format_paragraph(FormatParagraphParams {
            alignment: None,
            ..base
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));
}

#[test]
fn test_apply_list_envelope_covers_untouched_paragraph() {
    // Paragraphs 0 and 2 selected; the range also spans paragraph 1
    let (service, editor) = editor();
    let output = editor
        .apply_list(ApplyListParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            paragraph_indices: Some(ParagraphSelection::Indices(vec![0, 2])),
            list_type: Some("numbered".to_string()),
            preset: None,
        })
        .unwrap();

    assert_eq!(output.text_range, TextRangeSelector::fixed(0, 19));
    assert_eq!(output.scope, "INDICES [0, 2]");
    assert_eq!(output.preset.as_deref(), Some("NUMBERED_DIGIT_ALPHA_ROMAN"));

    let batch = service.last_batch_json();
    assert_eq!(
        batch[0]["createParagraphBullets"]["bulletPreset"],
        "NUMBERED_DIGIT_ALPHA_ROMAN"
    );
}

#[test]
fn test_apply_list_selections() {
    let (_, editor) = editor();
    let base = ApplyListParams {
        presentation_id: DECK_ID.to_string(),
        object_id: "body_text".to_string(),
        ..Default::default()
    };

    let all = editor.apply_list(base.clone()).unwrap();
    assert_eq!(all.text_range, TextRangeSelector::All);
    assert_eq!(all.scope, "ALL");
    assert_eq!(all.preset.as_deref(), Some("BULLET_DISC_CIRCLE_SQUARE"));

    let spec = editor
        .apply_list(ApplyListParams {
            paragraph_indices: Some(ParagraphSelection::Spec("1-2".to_string())),
            ..base.clone()
        })
        .unwrap();
    assert_eq!(spec.text_range, TextRangeSelector::fixed(6, 19));
    assert_eq!(spec.scope, "INDICES [1, 2]");

    let err = editor
        .apply_list(ApplyListParams {
            list_type: Some("BULLET".to_string()),
            preset: Some("NUMBERED_DIGIT_NESTED".to_string()),
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .apply_list(ApplyListParams {
            list_type: Some("CHECKLIST".to_string()),
            ..base
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));
}

#[test]
fn test_modify_list() {
    let (service, editor) = editor();
    let base = ModifyListParams {
        presentation_id: DECK_ID.to_string(),
        object_id: "body_text".to_string(),
        paragraph_indices: Some(ParagraphSelection::Indices(vec![1])),
        action: "remove".to_string(),
        preset: None,
    };

    let removed = editor.modify_list(base.clone()).unwrap();
    assert_eq!(removed.action, "REMOVE");
    assert_eq!(removed.mutations, 1);
    assert_eq!(removed.scope, "INDEX (1)");
    let batch = service.last_batch_json();
    assert_eq!(
        batch[0]["deleteParagraphBullets"]["textRange"],
        json!({"type": "FIXED_RANGE", "startIndex": 6, "endIndex": 13})
    );

    let changed = editor
        .modify_list(ModifyListParams {
            action: "CHANGE_PRESET".to_string(),
            preset: Some("BULLET_CHECKBOX".to_string()),
            ..base.clone()
        })
        .unwrap();
    assert_eq!(changed.mutations, 2);
    let batch = service.last_batch();
    assert_eq!(batch[0].kind(), "deleteParagraphBullets");
    assert_eq!(batch[1].kind(), "createParagraphBullets");

    let err = editor
        .modify_list(ModifyListParams {
            action: "CHANGE_PRESET".to_string(),
            ..base
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));
}

#[test]
fn test_set_indentation() {
    let (service, editor) = editor();
    let output = editor
        .set_indentation(SetIndentationParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            paragraph_indices: Some(ParagraphSelection::Spec("0,2".to_string())),
            indent_start: Some(18.0),
            indent_first_line: Some(0.5),
            indent_end: None,
        })
        .unwrap();

    assert_eq!(output.fields, "indentStart,indentFirstLine");
    assert_eq!(output.text_range, TextRangeSelector::fixed(0, 19));
    assert_eq!(output.scope, "INDICES [0, 2]");

    let batch = service.last_batch_json();
    let style = &batch[0]["updateParagraphStyle"]["style"];
    assert_eq!(style["indentStart"], json!({"magnitude": 228600.0, "unit": "EMU"}));
    assert_eq!(style["indentFirstLine"], json!({"magnitude": 6350.0, "unit": "EMU"}));

    let err = editor
        .set_indentation(SetIndentationParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            indent_start: Some(-1.0),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));
}

#[test]
fn test_insert_text() {
    let (service, editor) = editor();
    let base = InsertTextParams {
        presentation_id: DECK_ID.to_string(),
        object_id: "body_text".to_string(),
        text: "New ".to_string(),
        ..Default::default()
    };

    let at_paragraph = editor
        .insert_text(InsertTextParams {
            paragraph_index: Some(2),
            ..base.clone()
        })
        .unwrap();
    assert_eq!(at_paragraph.insertion_index, 13);
    assert_eq!(at_paragraph.scope, "INDEX (2)");
    assert_eq!(service.last_batch_json()[0]["insertText"]["insertionIndex"], 13);

    let at_offset = editor
        .insert_text(InsertTextParams {
            insertion_index: Some(19),
            ..base.clone()
        })
        .unwrap();
    assert_eq!(at_offset.insertion_index, 19);

    let err = editor
        .insert_text(InsertTextParams {
            insertion_index: Some(20),
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .insert_text(InsertTextParams {
            text: String::new(),
            ..base
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));
}

#[test]
fn test_replace_paragraph_keeps_terminator() {
    let (service, editor) = editor();
    let output = editor
        .replace_text(ReplaceTextParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            text: "Revised".to_string(),
            paragraph_index: Some(1),
        })
        .unwrap();

    assert_eq!(output.insertion_index, 6);
    assert_eq!(output.mutations, 2);

    let batch = service.last_batch_json();
    assert_eq!(
        batch[0]["deleteText"]["textRange"],
        json!({"type": "FIXED_RANGE", "startIndex": 6, "endIndex": 12})
    );
    assert_eq!(batch[1]["insertText"]["insertionIndex"], 6);
    assert_eq!(batch[1]["insertText"]["text"], "Revised");
}

#[test]
fn test_replace_all_text() {
    let (service, editor) = editor();
    let output = editor
        .replace_text(ReplaceTextParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            text: "Only line".to_string(),
            paragraph_index: None,
        })
        .unwrap();
    assert_eq!(output.scope, "ALL");
    assert_eq!(output.insertion_index, 0);

    let batch = service.last_batch_json();
    assert_eq!(batch[0]["deleteText"]["textRange"], json!({"type": "ALL"}));
}

#[test]
fn test_merge_table_cells() {
    let (service, editor) = editor();
    let base = MergeTableCellsParams {
        presentation_id: DECK_ID.to_string(),
        object_id: "table_grid".to_string(),
        row_index: 1,
        column_index: 1,
        row_span: 2,
        column_span: 2,
    };

    let output = editor.merge_table_cells(base.clone()).unwrap();
    assert_eq!(output.mutations, 1);
    let batch = service.last_batch_json();
    assert_eq!(batch[0]["mergeTableCells"]["tableRange"]["columnSpan"], 2);

    let err = editor
        .merge_table_cells(MergeTableCellsParams {
            row_span: 3,
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .merge_table_cells(MergeTableCellsParams {
            row_span: 1,
            column_span: 1,
            ..base.clone()
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .merge_table_cells(MergeTableCellsParams {
            object_id: "body_text".to_string(),
            ..base
        })
        .unwrap_err();
    assert!(matches!(err, EditError::WrongElementKind { expected: "table", .. }));
}

#[test]
fn test_describe_element() {
    let (service, editor) = editor();
    let description = editor
        .describe_element(DescribeElementParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
        })
        .unwrap();

    assert_eq!(description.slide_object_id, "slide_one");
    assert_eq!(description.x_pt, 10.0);
    assert_eq!(description.y_pt, 20.0);
    assert_eq!(description.width_pt, 300.0);
    assert_eq!(description.height_pt, 100.0);
    assert_eq!(description.rotation_degrees, 0.0);
    assert_eq!(description.paragraphs.len(), 3);
    assert_eq!(description.paragraphs[1].start, 6);
    assert_eq!(description.paragraphs[1].end, 13);
    assert_eq!(description.paragraphs[1].preview, "Second");

    // Read-only
    assert_eq!(service.batch_count(), 0);
}

#[test]
fn test_merge_rejects_overflowing_cell_range() {
    let (service, editor) = editor();
    let base = MergeTableCellsParams {
        presentation_id: DECK_ID.to_string(),
        object_id: "table_grid".to_string(),
        row_index: usize::MAX,
        column_index: 0,
        row_span: 2,
        column_span: 1,
    };

    let err = editor.merge_table_cells(base.clone()).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    let err = editor
        .merge_table_cells(MergeTableCellsParams {
            row_index: 0,
            column_index: usize::MAX,
            row_span: 1,
            column_span: usize::MAX,
            ..base
        })
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidInput(_)));

    assert_eq!(service.batch_count(), 0);
}

#[test]
fn test_repeated_list_indices_collapse() {
    let (_, editor) = editor();
    let output = editor
        .apply_list(ApplyListParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "body_text".to_string(),
            paragraph_indices: Some(ParagraphSelection::Indices(vec![1, 1])),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(output.scope, "INDEX (1)");
    assert_eq!(output.text_range, TextRangeSelector::fixed(6, 13));
}

#[test]
fn test_describe_previews_follow_utf16_offsets() {
    // The emoji takes two UTF-16 units, so its paragraph spans 0..3
    let snapshot = serde_json::from_value(json!({
        "presentationId": DECK_ID,
        "slides": [{
            "objectId": "slide_one",
            "pageElements": [{
                "objectId": "emoji_text",
                "shape": {
                    "shapeType": "TEXT_BOX",
                    "text": {"textElements": [
                        {"endIndex": 3, "paragraphMarker": {"style": {}}},
                        {"endIndex": 3, "textRun": {"content": "\u{1F600}\n"}},
                        {"startIndex": 3, "endIndex": 6, "paragraphMarker": {"style": {}}},
                        {"startIndex": 3, "endIndex": 6, "textRun": {"content": "ab\n"}}
                    ]}
                }
            }]
        }]
    }))
    .unwrap();
    let editor = SlideEditor::new(Arc::new(RecordingService::new(snapshot)));

    let description = editor
        .describe_element(DescribeElementParams {
            presentation_id: DECK_ID.to_string(),
            object_id: "emoji_text".to_string(),
        })
        .unwrap();

    assert_eq!(description.paragraphs.len(), 2);
    assert_eq!(description.paragraphs[0].preview, "\u{1F600}");
    assert_eq!(description.paragraphs[1].start, 3);
    assert_eq!(description.paragraphs[1].preview, "ab");
}
