pub mod api;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod fetcher;
pub mod ffmpeg;
pub mod init;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod providers;
pub mod record;
pub mod reel;
pub mod retry;

pub use config::Config;
pub use error::{PipelineError, Result};
pub use fetcher::{FetchReport, Fetcher, ProviderFailure};
pub use record::{BookRecord, SummaryRecord};

pub(crate) fn logv(tag: &str, message: &str) {
    match tag {
        "WARN" => tracing::warn!(tag, "{}", message),
        _ => tracing::info!(tag, "{}", message),
    }
}

pub(crate) fn logi(message: impl AsRef<str>) {
    logv("INFO", message.as_ref());
}

pub(crate) fn logok(message: impl AsRef<str>) {
    logv("OK", message.as_ref());
}

pub(crate) fn logw(message: impl AsRef<str>) {
    logv("WARN", message.as_ref());
}
