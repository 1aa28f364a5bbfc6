//! Conversion from untyped provider payloads to [`BookRecord`].
//!
//! Nothing past this module sees a `serde_json::Value`. Every helper tolerates
//! missing or oddly-typed fields and falls back to an empty value instead of
//! failing.

use crate::record::BookRecord;
use serde_json::Value;

/// Reads a text field that may be a plain string or `{ "value": string }`.
pub fn text_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Object(map) => map.get("value")?.as_str()?.to_string(),
        Value::Array(items) => items.iter().find_map(|v| text_field(Some(v)))?,
        _ => return None,
    };
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Reads an author list given as strings, as `{ "name": .. }` objects, or as a
/// single string.
pub fn authors_field(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let mut out = Vec::new();
    match value {
        Value::String(s) => push_author(&mut out, s),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) => push_author(&mut out, s),
                    Value::Object(map) => {
                        if let Some(name) = map.get("name").and_then(|v| v.as_str()) {
                            push_author(&mut out, name);
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::Object(map) => {
            if let Some(name) = map.get("name").and_then(|v| v.as_str()) {
                push_author(&mut out, name);
            }
        }
        _ => {}
    }
    out
}

fn push_author(out: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if !name.is_empty() {
        out.push(name.to_string());
    }
}

/// One entry of an OpenLibrary `search.json` response.
pub fn openlibrary_doc(doc: &Value, source: &str) -> BookRecord {
    let authors = match doc.get("author_name") {
        Some(v) => authors_field(Some(v)),
        None => authors_field(doc.get("authors")),
    };
    BookRecord::new(
        text_field(doc.get("title")),
        authors,
        text_field(doc.get("description")),
        source,
    )
}

/// One entry of a Google Books `volumes` response. Fields live under
/// `volumeInfo`; a flat item is accepted too.
pub fn google_volume(item: &Value, source: &str) -> BookRecord {
    let info = item.get("volumeInfo").unwrap_or(item);
    BookRecord::new(
        text_field(info.get("title")),
        authors_field(info.get("authors")),
        text_field(info.get("description")),
        source,
    )
}

/// One entry of a Gutendex `books/` response.
pub fn gutendex_book(book: &Value, source: &str) -> BookRecord {
    let description = text_field(book.get("summaries")).or_else(|| text_field(book.get("description")));
    BookRecord::new(
        text_field(book.get("title")),
        authors_field(book.get("authors")),
        description,
        source,
    )
}

/// Picks the plain-text download link out of a Gutendex `formats` map,
/// preferring the UTF-8 edition.
pub fn gutendex_text_url(book: &Value) -> Option<String> {
    let formats = book.get("formats")?.as_object()?;
    if let Some(url) = formats.get("text/plain; charset=utf-8").and_then(|v| v.as_str()) {
        return Some(url.to_string());
    }
    formats
        .iter()
        .filter(|(mime, _)| mime.starts_with("text/plain"))
        .find_map(|(_, v)| v.as_str().map(str::to_string))
}

/// Cuts `input` to at most `max_chars` characters.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}
