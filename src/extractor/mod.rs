mod types;
mod ytdlp;

pub use types::{FormatDescriptor, VideoMetadata};
pub use ytdlp::YtDlpExtractor;

use crate::errors::ExtractError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// The extraction capability: resolve a URL into stream metadata, or
/// download one selected format. yt-dlp is the only implementation today;
/// the seam exists so another backend can be dropped in.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name of the extractor
    fn name(&self) -> &'static str;

    /// Resolve metadata for the given URL without downloading anything
    async fn resolve(&self, url: &str) -> Result<VideoMetadata, ExtractError>;

    /// Download one format into `output_dir`, reporting percentages to
    /// `progress` as they arrive. Returns the path of the written file.
    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        format_id: &str,
        progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<PathBuf, ExtractError>;

    /// Test if this extractor is available on the system
    async fn probe(&self) -> bool;
}
