use thiserror::Error;

/// Everything that can go wrong while talking to the extraction tool.
///
/// The fetcher turns these into an `{"error": ...}` payload, the validator
/// into an exit code, and the downloader lets them propagate.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("yt-dlp not found; install it and make sure it is on PATH")]
    BinaryNotFound,

    #[error("metadata extraction timed out")]
    Timeout,

    #[error("no formats available")]
    NoFormatsAvailable,

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("invalid metadata payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            ExtractError::NoFormatsAvailable.to_string(),
            "no formats available"
        );
        assert_eq!(
            ExtractError::Extraction("Unsupported URL".to_string()).to_string(),
            "extraction failed: Unsupported URL"
        );
    }
}
