use crate::record::BookRecord;
use std::collections::HashSet;

/// Keeps the first record for every distinct title, preserving order.
///
/// Titles compare exactly (case-sensitive). Earlier providers win ties
/// regardless of how complete the later record is.
pub fn dedupe_by_title(records: Vec<BookRecord>) -> Vec<BookRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|rec| seen.insert(rec.title.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str, author: &str, source: &str) -> BookRecord {
        BookRecord::new(Some(title.into()), vec![author.into()], None, source)
    }

    #[test]
    fn first_seen_wins() {
        let out = dedupe_by_title(vec![
            rec("Atomic Habits", "James Clear", "OpenLibrary"),
            rec("Deep Work", "Cal Newport", "OpenLibrary"),
            rec("Atomic Habits", "J. Clear", "GoogleBooks"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].authors, vec!["James Clear"]);
        assert_eq!(out[0].source, "OpenLibrary");
        assert_eq!(out[1].title, "Deep Work");
    }

    #[test]
    fn case_differences_are_distinct() {
        let out = dedupe_by_title(vec![
            rec("Walden", "a", "x"),
            rec("WALDEN", "b", "y"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(dedupe_by_title(Vec::new()).is_empty());
    }
}
