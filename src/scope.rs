use crate::paragraphs::TextRangeSelector;

/// Describe which paragraphs a range-scoped edit touched.
///
/// `indices` is the caller's original list; its order is kept as given.
pub fn scope_label(selector: &TextRangeSelector, indices: &[usize]) -> String {
    match (selector, indices) {
        (TextRangeSelector::All, _) | (_, []) => "ALL".to_string(),
        (_, [index]) => format!("INDEX ({})", index),
        (_, many) => {
            let joined = many
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("INDICES [{}]", joined)
        }
    }
}

/// Scope label for an edit addressed by an optional single index
pub fn index_scope(index: Option<usize>) -> String {
    match index {
        Some(index) => format!("INDEX ({})", index),
        None => "ALL".to_string(),
    }
}
