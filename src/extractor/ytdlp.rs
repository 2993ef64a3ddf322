use super::{
    types::{FormatDescriptor, VideoMetadata},
    Extractor,
};
use crate::errors::ExtractError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

const METADATA_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub struct YtDlpExtractor {
    binary: String,
    min_height: Option<u32>,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            min_height: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Drop formats whose reported height is below `height`. Formats that
    /// report no height at all are always kept.
    pub fn with_min_height(mut self, height: Option<u32>) -> Self {
        self.min_height = height;
        self
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn resolve(&self, url: &str) -> Result<VideoMetadata, ExtractError> {
        debug!("Resolving metadata with yt-dlp for: {}", url);

        let output = tokio::time::timeout(
            METADATA_TIMEOUT,
            Command::new(&self.binary)
                .arg("--dump-single-json")
                .arg("--no-download")
                .arg("--no-warnings")
                .arg("--no-playlist")
                .arg(url)
                .output(),
        )
        .await
        .map_err(|_| ExtractError::Timeout)?
        .map_err(spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Extraction(extract_error_line(&stderr)));
        }

        let json: Value = serde_json::from_slice(&output.stdout)?;
        parse_metadata(&json, self.min_height)
    }

    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        format_id: &str,
        progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<PathBuf, ExtractError> {
        info!("Downloading format {} from: {}", format_id, url);

        tokio::fs::create_dir_all(output_dir).await?;
        let template = output_dir.join("%(title)s.%(ext)s");

        let mut child = Command::new(&self.binary)
            .arg("-f")
            .arg(format_id)
            .arg("-o")
            .arg(&template)
            .arg("--newline")
            .arg("--no-warnings")
            .arg("--no-playlist")
            .arg("--progress-template")
            .arg("download:%(progress._percent_str)s")
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractError::Download("yt-dlp stdout unavailable".to_string()))?;
        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| ExtractError::Download("yt-dlp stderr unavailable".to_string()))?;

        let stderr_reader = tokio::spawn(async move {
            let mut buf = String::new();
            let mut lines = BufReader::new(stderr_pipe).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        let mut destination: Option<PathBuf> = None;
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(path) = parse_destination_line(&line) {
                debug!("yt-dlp destination: {}", path);
                destination = Some(PathBuf::from(path));
            }
            if let Some(percent) = parse_progress_line(&line) {
                progress(percent);
            }
        }

        let status = child.wait().await?;
        let stderr_content = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            return Err(ExtractError::Download(extract_error_line(&stderr_content)));
        }

        destination
            .ok_or_else(|| ExtractError::Download("yt-dlp did not report an output file".to_string()))
    }

    async fn probe(&self) -> bool {
        let ytdlp_available = match Command::new(&self.binary).arg("--version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("yt-dlp is available, version: {}", version.trim());
                    true
                } else {
                    warn!("yt-dlp command failed");
                    false
                }
            }
            Err(e) => {
                warn!("yt-dlp not found: {}", e);
                false
            }
        };

        // ffmpeg is only needed when a format id selects separate video and
        // audio streams that have to be merged
        match Command::new("ffmpeg").arg("-version").output().await {
            Ok(output) if output.status.success() => {
                let version_line = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .unwrap_or("unknown")
                    .to_string();
                info!("ffmpeg is available: {}", version_line);
            }
            _ => {
                warn!("ffmpeg not found; merged formats (e.g. 137+140) will fail");
            }
        }

        ytdlp_available
    }
}

fn spawn_error(err: std::io::Error) -> ExtractError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ExtractError::BinaryNotFound
    } else {
        ExtractError::Io(err)
    }
}

fn parse_metadata(json: &Value, min_height: Option<u32>) -> Result<VideoMetadata, ExtractError> {
    let formats = parse_formats(json, min_height)?;

    Ok(VideoMetadata {
        title: json["title"].as_str().map(|s| s.to_string()),
        thumbnail: json["thumbnail"].as_str().map(|s| s.to_string()),
        duration: json["duration"].as_f64(),
        formats,
    })
}

fn parse_formats(
    json: &Value,
    min_height: Option<u32>,
) -> Result<Vec<FormatDescriptor>, ExtractError> {
    let raw = json.get("formats").and_then(|v| v.as_array());

    let mut formats = Vec::new();
    for f in raw.into_iter().flatten() {
        let format_id = match f.get("format_id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => continue,
        };

        let height = f.get("height").and_then(|v| v.as_u64()).map(|h| h as u32);
        if let (Some(min), Some(h)) = (min_height, height) {
            if h < min {
                continue;
            }
        }

        formats.push(FormatDescriptor {
            format_id,
            ext: f.get("ext").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            resolution: height,
            fps: f.get("fps").and_then(|v| v.as_f64()),
            tbr: f.get("tbr").and_then(|v| v.as_f64()),
        });
    }

    if formats.is_empty() {
        return Err(ExtractError::NoFormatsAvailable);
    }

    Ok(formats)
}

/// Parse a progress line emitted under `--progress-template
/// "download:%(progress._percent_str)s"`, e.g. `download:  42.3%`.
fn parse_progress_line(line: &str) -> Option<f64> {
    let rest = line.trim().strip_prefix("download:")?;
    rest.trim().trim_end_matches('%').parse::<f64>().ok()
}

/// Pull the output file path out of yt-dlp's status lines.
fn parse_destination_line(line: &str) -> Option<String> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("[download] Destination:") {
        let path = rest.trim();
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }

    if let Some(rest) = line.strip_prefix("[Merger] Merging formats into \"") {
        let path = rest.trim_end_matches('"');
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }

    if let Some(rest) = line.strip_prefix("[download]") {
        if let Some(path) = rest.trim().strip_suffix("has already been downloaded") {
            let path = path.trim();
            if !path.is_empty() {
                return Some(path.to_string());
            }
        }
    }

    None
}

/// Distill yt-dlp's stderr down to its last `ERROR:` line, falling back to
/// the trimmed output when no such line exists.
fn extract_error_line(stderr: &str) -> String {
    let error_line = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.to_lowercase().starts_with("error"));

    match error_line {
        Some(line) => line
            .strip_prefix("ERROR: ")
            .or_else(|| line.strip_prefix("ERROR:"))
            .unwrap_or(line)
            .to_string(),
        None => {
            let trimmed = stderr.trim();
            if trimmed.is_empty() {
                "yt-dlp exited with an error".to_string()
            } else {
                trimmed.chars().take(300).collect()
            }
        }
    }
}
