use crate::config::Config;
use crate::errors::ExtractError;
use crate::extractor::{Extractor, YtDlpExtractor};
use crate::progress::ProgressPrinter;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

fn build_extractor(config: &Config, min_height: Option<u32>) -> Box<dyn Extractor> {
    let mut extractor = YtDlpExtractor::new().with_min_height(min_height);
    if let Some(path) = &config.ytdlp_path {
        extractor = extractor.with_binary(path);
    }
    Box::new(extractor)
}

/// Fetch metadata and print it as a single JSON object on stdout. Extraction
/// failures become an `{"error": ...}` payload; the exit code stays 0 either
/// way, so callers inspect the payload.
pub async fn info(config: &Config, url: &str, min_height: Option<u32>) -> Result<i32> {
    // The format filter only applies here; the config default never leaks
    // into the other subcommands
    let extractor = build_extractor(config, min_height.or(config.min_height));

    let payload = match extractor.resolve(url).await {
        Ok(metadata) => {
            serde_json::to_string(&metadata).context("Failed to encode metadata as JSON")?
        }
        Err(err) => {
            debug!("Metadata fetch failed: {}", err);
            error_payload(&err)
        }
    };

    println!("{}", payload);
    Ok(0)
}

/// Download one format into `output_dir`, printing progress to stdout.
/// Failures propagate out of `main` and terminate with a non-zero status.
pub async fn download(
    config: &Config,
    url: &str,
    output_dir: &Path,
    format_id: &str,
) -> Result<i32> {
    let extractor = build_extractor(config, None);

    let mut printer = ProgressPrinter::new(std::io::stdout());
    let path = extractor
        .download(url, output_dir, format_id, &mut |percent| {
            printer.update(percent)
        })
        .await
        .with_context(|| format!("Download failed for {}", url))?;
    printer.finish();

    info!("Saved {}", path.display());
    Ok(0)
}

/// Check whether the URL resolves to a downloadable video. The result is the
/// exit code: 0 = valid, 1 = invalid.
pub async fn validate(config: &Config, url: &str) -> Result<i32> {
    // A URL that does not even parse never reaches the network
    if url::Url::parse(url).is_err() {
        debug!("Rejecting syntactically invalid URL");
        return Ok(1);
    }

    let extractor = build_extractor(config, None);
    match extractor.resolve(url).await {
        // A resolution that succeeds but reports zero formats still proves
        // the URL points at a real video
        Ok(_) | Err(ExtractError::NoFormatsAvailable) => Ok(0),
        Err(err) => {
            debug!("Validation failed: {}", err);
            Ok(1)
        }
    }
}

/// Verify that the extraction tooling is installed.
pub async fn check(config: &Config) -> Result<i32> {
    let extractor = build_extractor(config, None);
    if extractor.probe().await {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn error_payload(err: &ExtractError) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}
