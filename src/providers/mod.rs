//! Book metadata providers.
//!
//! Each provider turns a query into normalized [`BookRecord`]s. A provider
//! either returns its records or a `ProviderUnavailable` error; it never
//! leaks its raw payload shape.

use crate::config::{Config, GOOGLE_BOOKS, OPENLIBRARY, OPENLIBRARY_WORK, PROJECT_GUTENBERG};
use crate::error::{PipelineError, Result};
use crate::record::BookRecord;
use async_trait::async_trait;

pub mod google_books;
pub mod gutendex;
pub mod http;
pub mod openlibrary;

pub use google_books::GoogleBooks;
pub use gutendex::Gutendex;
pub use http::ProviderHttp;
pub use openlibrary::OpenLibrary;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Tag written to [`BookRecord::source`].
    fn name(&self) -> &str;

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<BookRecord>>;
}

/// Builds the providers named in `cfg.providers`, in that order.
pub fn from_config(cfg: &Config, http: &ProviderHttp) -> Result<Vec<Box<dyn Provider>>> {
    let mut out: Vec<Box<dyn Provider>> = Vec::with_capacity(cfg.providers.len());
    for name in &cfg.providers {
        let template = cfg
            .endpoint(name)
            .ok_or_else(|| PipelineError::Config(format!("no endpoint for provider {name}")))?
            .to_string();

        let provider: Box<dyn Provider> = match name.as_str() {
            OPENLIBRARY => Box::new(OpenLibrary::new(
                http.clone(),
                template,
                cfg.endpoint(OPENLIBRARY_WORK).map(str::to_string),
                cfg.fetch_details,
            )),
            GOOGLE_BOOKS => Box::new(GoogleBooks::new(
                http.clone(),
                template,
                cfg.google_books_key.clone(),
            )),
            PROJECT_GUTENBERG => Box::new(Gutendex::new(
                http.clone(),
                template,
                cfg.fetch_details,
                cfg.gutenberg_text_chars,
            )),
            other => {
                return Err(PipelineError::Config(format!("unknown provider {other}")));
            }
        };
        out.push(provider);
    }
    Ok(out)
}
