use crate::error::{PipelineError, Result};
use crate::record::BookRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// Writes `items` as an indented JSON array, replacing whatever was at `path`.
///
/// Missing parent directories are created. On error the file must be treated
/// as absent.
pub async fn save_json<T: Serialize>(items: &[T], path: &Path) -> Result<()> {
    let persist_err = |source: std::io::Error| PipelineError::PersistFailure {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(persist_err)?;
        }
    }

    let mut bytes = serde_json::to_vec_pretty(items)
        .map_err(|e| persist_err(std::io::Error::other(e)))?;
    bytes.push(b'\n');
    fs::write(path, &bytes).await.map_err(persist_err)?;
    Ok(())
}

pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let load_err = |reason: String| PipelineError::LoadFailure {
        path: path.to_path_buf(),
        reason,
    };
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| load_err(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))
}

pub async fn save_books(records: &[BookRecord], path: &Path) -> Result<()> {
    save_json(records, path).await
}

pub async fn load_books(path: &Path) -> Result<Vec<BookRecord>> {
    load_json(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<BookRecord> {
        vec![
            BookRecord::new(
                Some("Atomic Habits".into()),
                vec!["James Clear".into()],
                Some("Tiny changes, remarkable results.".into()),
                "OpenLibrary",
            ),
            BookRecord::new(Some("Café Stories".into()), vec![], None, "ProjectGutenberg"),
        ]
    }

    #[tokio::test]
    async fn creates_parent_dirs_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/books.json");

        save_books(&sample(), &path).await.unwrap();
        let loaded = load_books(&path).await.unwrap();
        assert_eq!(loaded, sample());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Café Stories"), "non-ASCII must be written as UTF-8");
    }

    #[tokio::test]
    async fn overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");

        save_books(&sample(), &path).await.unwrap();
        save_books(&[], &path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn same_input_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        save_books(&sample(), &a).await.unwrap();
        save_books(&sample(), &b).await.unwrap();
        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[tokio::test]
    async fn write_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let err = save_books(&sample(), &blocker.join("books.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::PersistFailure { .. }));
    }
}
