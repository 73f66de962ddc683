#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use slide_editor_mcp::{DocumentService, DocumentSnapshot, MutationRequest, SubmitReceipt};

pub const DECK_ID: &str = "deck_q3";

/// One slide with a three-paragraph text box ("Title\n", "Second\n", "Third\n"
/// with paragraph boundaries at 6, 13 and 19), a 3x3 table, a video and a
/// shape that carries no size.
pub fn deck_json() -> serde_json::Value {
    serde_json::json!({
        "presentationId": DECK_ID,
        "title": "Quarterly review",
        "slides": [{
            "objectId": "slide_one",
            "pageElements": [
                {
                    "objectId": "body_text",
                    "size": {
                        "width": {"magnitude": 3810000, "unit": "EMU"},
                        "height": {"magnitude": 1270000, "unit": "EMU"}
                    },
                    "transform": {"scaleX": 1, "scaleY": 1, "translateX": 127000, "translateY": 254000, "unit": "EMU"},
                    "shape": {
                        "shapeType": "TEXT_BOX",
                        "text": {"textElements": [
                            {"endIndex": 6, "paragraphMarker": {"style": {}}},
                            {"endIndex": 6, "textRun": {"content": "Title\n"}},
                            {"startIndex": 6, "endIndex": 13, "paragraphMarker": {"style": {}}},
                            {"startIndex": 6, "endIndex": 13, "textRun": {"content": "Second\n"}},
                            {"startIndex": 13, "endIndex": 19, "paragraphMarker": {"style": {}}},
                            {"startIndex": 13, "endIndex": 19, "textRun": {"content": "Third\n"}}
                        ]}
                    }
                },
                {
                    "objectId": "table_grid",
                    "size": {
                        "width": {"magnitude": 300, "unit": "PT"},
                        "height": {"magnitude": 120, "unit": "PT"}
                    },
                    "table": {"rows": 3, "columns": 3}
                },
                {
                    "objectId": "video_clip",
                    "size": {
                        "width": {"magnitude": 200, "unit": "PT"},
                        "height": {"magnitude": 100, "unit": "PT"}
                    },
                    "transform": {"scaleX": 1, "scaleY": 1, "unit": "EMU"},
                    "video": {"id": "dQw4w9WgXcQ", "source": "YOUTUBE"}
                },
                {
                    "objectId": "no_size_shape",
                    "shape": {"shapeType": "RECTANGLE"}
                }
            ]
        }]
    })
}

pub fn deck() -> DocumentSnapshot {
    serde_json::from_value(deck_json()).expect("fixture deck parses")
}

/// In-memory document service that records every submitted batch
pub struct RecordingService {
    pub snapshot: DocumentSnapshot,
    pub batches: Mutex<Vec<Vec<MutationRequest>>>,
}

impl RecordingService {
    pub fn new(snapshot: DocumentSnapshot) -> Self {
        Self {
            snapshot,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn last_batch(&self) -> Vec<MutationRequest> {
        self.batches
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_batch_json(&self) -> serde_json::Value {
        serde_json::to_value(self.last_batch()).unwrap()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl DocumentService for RecordingService {
    fn fetch_document(&self, presentation_id: &str) -> Result<DocumentSnapshot> {
        if presentation_id != self.snapshot.presentation_id {
            anyhow::bail!("Unknown presentation: {}", presentation_id);
        }
        Ok(self.snapshot.clone())
    }

    fn submit_mutations(
        &self,
        presentation_id: &str,
        requests: &[MutationRequest],
    ) -> Result<SubmitReceipt> {
        self.batches.lock().unwrap().push(requests.to_vec());
        Ok(SubmitReceipt {
            presentation_id: presentation_id.to_string(),
            applied: requests.len(),
        })
    }
}
