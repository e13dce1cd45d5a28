//! Conversion between grid cell text (`"<Category>: <Title>"`) and structured entries.

use crate::model::Category;

const SEPARATOR: &str = ": ";

/// Structured view of a single grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEntry {
    pub category: Category,
    pub title: String,
}

impl CellEntry {
    pub fn new(category: Category, title: impl Into<String>) -> Self {
        Self {
            category,
            title: title.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
    }
}

/// Render a cell. Blank titles produce an empty cell.
pub fn encode(category: Category, title: &str) -> String {
    if title.trim().is_empty() {
        return String::new();
    }
    format!("{}{}{}", category, SEPARATOR, title)
}

/// Parse a cell, splitting on the first `": "`.
///
/// Without a separator the whole text is the title under the default category
/// (the first entry of [`Category::ALL`]). Titles that themselves contain `": "`
/// do not survive an encode/decode cycle.
pub fn decode(cell_text: &str) -> CellEntry {
    match cell_text.split_once(SEPARATOR) {
        Some((prefix, title)) => CellEntry::new(Category::normalize(prefix), title),
        None => CellEntry::new(default_category(), cell_text),
    }
}

pub fn default_category() -> Category {
    Category::ALL[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Category::Work, "Standup")]
    #[case(Category::Study, "Read chapter 4")]
    #[case(Category::Personal, "Call mum")]
    #[case(Category::Activity, "Gym: legs")]
    #[case(Category::Work, "Ship 1:1 notes")]
    fn encode_formats_category_prefix(#[case] category: Category, #[case] title: &str) {
        assert_eq!(encode(category, title), format!("{}: {}", category, title));
    }

    #[test]
    fn encode_blank_title_is_empty_cell() {
        assert_eq!(encode(Category::Work, ""), "");
        assert_eq!(encode(Category::Study, "   "), "");
    }

    #[test]
    fn decode_is_left_inverse_of_encode() {
        let titles = ["Standup", "Ship 1:1 notes", "a:b", "Review: ", "x"];
        for category in Category::ALL {
            for title in titles.iter().filter(|t| !t.contains(SEPARATOR)) {
                let decoded = decode(&encode(category, title));
                assert_eq!(decoded, CellEntry::new(category, *title));
            }
        }
    }

    #[test]
    fn decode_without_separator_uses_default_category() {
        assert_eq!(decode("Lunch"), CellEntry::new(Category::Work, "Lunch"));
        assert_eq!(decode("10:30 sync"), CellEntry::new(Category::Work, "10:30 sync"));
    }

    #[test]
    fn decode_empty_text_yields_default_and_blank_title() {
        let entry = decode("");
        assert_eq!(entry, CellEntry::new(Category::Work, ""));
        assert!(entry.is_empty());
    }

    #[test]
    fn decode_splits_on_first_separator_only() {
        assert_eq!(
            decode("Study: Rust: ownership"),
            CellEntry::new(Category::Study, "Rust: ownership")
        );
    }

    #[test]
    fn decode_unknown_prefix_folds_into_personal() {
        assert_eq!(
            decode("Health: Dentist"),
            CellEntry::new(Category::Personal, "Dentist")
        );
    }
}
