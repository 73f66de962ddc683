use serde::{Deserialize, Serialize};

/// One entry of a flattened text-content sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun {
    pub start_offset: usize,
    pub end_offset: usize,
    pub is_paragraph_boundary: bool,
}

impl TextRun {
    pub fn text(start_offset: usize, end_offset: usize) -> Self {
        Self {
            start_offset,
            end_offset,
            is_paragraph_boundary: false,
        }
    }

    pub fn boundary(start_offset: usize, end_offset: usize) -> Self {
        Self {
            start_offset,
            end_offset,
            is_paragraph_boundary: true,
        }
    }
}

/// Character span of one paragraph, exclusive end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParagraphRange {
    pub start: usize,
    pub end: usize,
}

/// Text range as consumed by range-scoped mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextRangeSelector {
    All,
    #[serde(rename_all = "camelCase")]
    FixedRange { start_index: usize, end_index: usize },
}

impl TextRangeSelector {
    pub fn fixed(start_index: usize, end_index: usize) -> Self {
        TextRangeSelector::FixedRange {
            start_index,
            end_index,
        }
    }

    /// Offset at which the selected text begins
    pub fn start(&self) -> usize {
        match self {
            TextRangeSelector::All => 0,
            TextRangeSelector::FixedRange { start_index, .. } => *start_index,
        }
    }
}

/// Count the runs flagged as paragraph boundaries
pub fn count_paragraphs(runs: &[TextRun]) -> usize {
    runs.iter().filter(|run| run.is_paragraph_boundary).count()
}

/// Compute paragraph spans from the boundary markers, in order.
///
/// A paragraph only exists once its terminating marker has been seen, so
/// trailing text after the last boundary is not emitted.
pub fn paragraph_ranges(runs: &[TextRun]) -> Vec<ParagraphRange> {
    let mut ranges = Vec::with_capacity(count_paragraphs(runs));
    let mut current_start = 0;

    for run in runs.iter().filter(|run| run.is_paragraph_boundary) {
        ranges.push(ParagraphRange {
            start: current_start,
            end: run.end_offset,
        });
        current_start = run.end_offset;
    }

    ranges
}

/// Range for a single paragraph, or all text when no index is given.
///
/// The index must already be validated against `count_paragraphs`.
pub fn range_for_index(runs: &[TextRun], index: Option<usize>) -> TextRangeSelector {
    let Some(index) = index else {
        return TextRangeSelector::All;
    };

    let range = paragraph_ranges(runs)[index];
    TextRangeSelector::fixed(range.start, range.end)
}

/// Smallest contiguous range covering every listed paragraph.
///
/// Non-contiguous selections also cover the paragraphs in between, since a
/// range-scoped mutation accepts a single span. An empty list selects all
/// text. Indices must already be validated against `count_paragraphs`.
pub fn range_for_indices(runs: &[TextRun], indices: &[usize]) -> TextRangeSelector {
    if indices.is_empty() {
        return TextRangeSelector::All;
    }

    let ranges = paragraph_ranges(runs);
    let start = indices.iter().map(|&i| ranges[i].start).min().unwrap_or(0);
    let end = indices.iter().map(|&i| ranges[i].end).max().unwrap_or(0);

    TextRangeSelector::fixed(start, end)
}
