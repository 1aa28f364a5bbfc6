use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";

/// Source-agnostic metadata for one book, as persisted to `books.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub source: String,
}

impl BookRecord {
    /// Blank titles collapse to [`UNTITLED`].
    pub fn new(
        title: Option<String>,
        authors: Vec<String>,
        description: Option<String>,
        source: &str,
    ) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Self {
            title,
            authors,
            description: description.map(|d| d.trim().to_string()).unwrap_or_default(),
            source: source.to_string(),
        }
    }

    /// Records without a description are kept but skipped by the summarizer.
    pub fn is_summarizable(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// Output of the summarize stage, persisted to `summaries.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub source: String,
    pub summary: String,
}

impl SummaryRecord {
    pub fn from_book(book: &BookRecord, summary: String) -> Self {
        Self {
            title: book.title.clone(),
            authors: book.authors.clone(),
            source: book.source.clone(),
            summary,
        }
    }

    /// Narration text read over the video.
    pub fn narration_script(&self) -> String {
        let authors = if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        };
        format!(
            "Title: {}\nAuthor(s): {}\n\nSummary:\n{}",
            self.title, authors, self.summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_falls_back_to_placeholder() {
        let rec = BookRecord::new(Some("   ".into()), vec![], None, "GoogleBooks");
        assert_eq!(rec.title, UNTITLED);
        assert_eq!(rec.description, "");
        assert!(!rec.is_summarizable());
    }

    #[test]
    fn serializes_with_canonical_keys_only() {
        let rec = BookRecord::new(
            Some("Deep Work".into()),
            vec!["Cal Newport".into()],
            Some("Rules for focused success.".into()),
            "OpenLibrary",
        );
        let value = serde_json::to_value(&rec).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["authors", "description", "source", "title"]);
    }

    #[test]
    fn narration_script_lists_authors() {
        let summary = SummaryRecord {
            title: "Atomic Habits".into(),
            authors: vec!["James Clear".into(), "Someone Else".into()],
            source: "OpenLibrary".into(),
            summary: "Small habits compound.".into(),
        };
        let script = summary.narration_script();
        assert!(script.starts_with("Title: Atomic Habits\n"));
        assert!(script.contains("Author(s): James Clear, Someone Else"));
        assert!(script.ends_with("Summary:\nSmall habits compound."));
    }

    #[test]
    fn narration_script_without_authors() {
        let summary = SummaryRecord {
            title: "Anon".into(),
            authors: vec![],
            source: "ProjectGutenberg".into(),
            summary: "x".into(),
        };
        assert!(summary.narration_script().contains("Author(s): Unknown"));
    }
}
