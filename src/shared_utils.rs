use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{EditError, EditResult};

lazy_static! {
    /// Object ids accepted by the editing API
    static ref OBJECT_ID_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_\-:]{0,49}$").unwrap();
    /// Presentation ids double as file names for the local service
    static ref PRESENTATION_ID_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_\-]{1,128}$").unwrap();
}

/// Parse a comma-separated string of 0-based paragraph indices and ranges.
/// Examples: "0,2,4-6" -> [0,2,4,5,6], "all" or "" -> [] (meaning all text)
pub fn parse_indices_parameter(indices: &str, total_paragraphs: usize) -> Result<Vec<usize>, String> {
    if indices.trim().is_empty() || indices.trim().to_lowercase() == "all" {
        return Ok(Vec::new());
    }

    let mut parsed = Vec::new();

    for part in indices.split(',') {
        let part = part.trim();

        if part.contains('-') {
            let range_parts: Vec<&str> = part.split('-').collect();
            if range_parts.len() != 2 {
                return Err(format!("Invalid range format: {}", part));
            }

            let start: usize = range_parts[0].trim().parse()
                .map_err(|_| format!("Invalid paragraph index: {}", range_parts[0]))?;
            let end: usize = range_parts[1].trim().parse()
                .map_err(|_| format!("Invalid paragraph index: {}", range_parts[1]))?;

            if start > end {
                return Err(format!("Invalid range: {} > {}", start, end));
            }

            if end >= total_paragraphs {
                return Err(format!("Paragraph {} exceeds paragraph count ({})", end, total_paragraphs));
            }

            for index in start..=end {
                if !parsed.contains(&index) {
                    parsed.push(index);
                }
            }
        } else {
            let index: usize = part.parse()
                .map_err(|_| format!("Invalid paragraph index: {}", part))?;

            if index >= total_paragraphs {
                return Err(format!("Paragraph {} exceeds paragraph count ({})", index, total_paragraphs));
            }

            if !parsed.contains(&index) {
                parsed.push(index);
            }
        }
    }

    parsed.sort();
    Ok(parsed)
}

/// Check an element or page object id before it goes into a request
pub fn validate_object_id(field: &str, object_id: &str) -> EditResult<()> {
    if object_id.trim().is_empty() {
        return Err(EditError::invalid(format!("{} must not be empty", field)));
    }
    if !OBJECT_ID_PATTERN.is_match(object_id) {
        return Err(EditError::invalid(format!(
            "{} '{}' is not a valid object id (up to 50 characters: letters, digits, '_', '-', ':')",
            field, object_id
        )));
    }
    Ok(())
}

/// Ids for newly created elements must also be at least 5 characters long
pub fn validate_new_object_id(field: &str, object_id: &str) -> EditResult<()> {
    validate_object_id(field, object_id)?;
    if object_id.chars().count() < 5 {
        return Err(EditError::invalid(format!(
            "{} '{}' is too short; new object ids need at least 5 characters",
            field, object_id
        )));
    }
    Ok(())
}

/// Check a presentation id; rejects anything that could escape a directory
pub fn validate_presentation_id(presentation_id: &str) -> EditResult<()> {
    if !PRESENTATION_ID_PATTERN.is_match(presentation_id) {
        return Err(EditError::invalid(format!(
            "presentation_id '{}' is not valid (letters, digits, '_' and '-' only)",
            presentation_id
        )));
    }
    Ok(())
}

/// Break text at word boundaries for short previews
pub fn break_at_word_boundary(text: &str, max_chars: usize) -> &str {
    if text.chars().count() <= max_chars {
        return text;
    }

    let truncated_end = text
        .char_indices()
        .nth(max_chars)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len());
    let truncated_text = &text[..truncated_end];

    if let Some(last_space_pos) = truncated_text.rfind(' ') {
        let word_boundary_chunk = &truncated_text[..last_space_pos];
        // Only accept the boundary if it keeps a meaningful share of the text
        let min_progress = std::cmp::max(max_chars / 10, 10);
        if word_boundary_chunk.chars().count() >= min_progress {
            return word_boundary_chunk;
        }
    }

    truncated_text
}
