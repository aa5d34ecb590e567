// ffmpeg-backed transcoder.
//
// The pipeline is strictly sequential: download → palettegen → paletteuse →
// size check. Nothing here runs concurrently for the same job; uniqueness
// of scratch and artifact names comes from tempfile's random suffixes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{TranscodeError, TranscodeSettings};
use crate::followup::traits::ClipTranscoder;

/// Keep only the tail of ffmpeg's stderr in errors; the useful line is last.
const STDERR_TAIL_CHARS: usize = 500;

/// Downloads clips and runs the two-pass GIF encode.
pub struct Transcoder {
    client: reqwest::Client,
    ffmpeg_path: String,
    scratch_root: PathBuf,
    output_dir: PathBuf,
    settings: TranscodeSettings,
}

impl Transcoder {
    /// Create a transcoder rooted at `work_dir`.
    ///
    /// Scratch directories go under `work_dir/scratch`, finished artifacts
    /// under `work_dir/artifacts`. Both are created if missing.
    pub fn new(ffmpeg_path: &str, work_dir: &Path, settings: TranscodeSettings) -> Result<Self> {
        let scratch_root = work_dir.join("scratch");
        let output_dir = work_dir.join("artifacts");
        for dir in [&scratch_root, &output_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let client = reqwest::Client::builder()
            .user_agent(crate::savant::client::USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            ffmpeg_path: ffmpeg_path.to_string(),
            scratch_root,
            output_dir,
            settings,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Download `url` and encode it into a GIF no larger than `max_bytes`.
    ///
    /// On success the returned path is owned by the caller, who must delete
    /// it once it has been used. On failure nothing is left behind.
    pub async fn run(
        &self,
        url: &str,
        max_duration_secs: u32,
        max_bytes: u64,
    ) -> Result<PathBuf, TranscodeError> {
        // Removed on drop, whichever way we leave this function.
        let scratch = tempfile::Builder::new()
            .prefix("clip-")
            .tempdir_in(&self.scratch_root)?;

        let source = scratch.path().join("source.webm");
        let palette = scratch.path().join("palette.png");

        let downloaded = self.download(url, &source).await?;
        debug!(url, bytes = downloaded, "Downloaded source clip");

        self.run_tool(
            "palettegen",
            palette_args(&self.settings, &source, &palette, max_duration_secs),
        )
        .await?;

        // Deleted on drop unless kept below.
        let artifact = tempfile::Builder::new()
            .prefix("followup-")
            .suffix(".gif")
            .tempfile_in(&self.output_dir)?
            .into_temp_path();

        self.run_tool(
            "paletteuse",
            encode_args(&self.settings, &source, &palette, &artifact, max_duration_secs),
        )
        .await?;

        let bytes = tokio::fs::metadata(&artifact).await?.len();
        if bytes > max_bytes {
            warn!(
                bytes,
                limit = max_bytes,
                "Artifact over size limit, discarding"
            );
            artifact.close()?;
            return Err(TranscodeError::Oversize {
                bytes,
                limit: max_bytes,
            });
        }

        let path = artifact.keep().map_err(|e| TranscodeError::Io(e.error))?;
        info!(path = %path.display(), bytes, "Created animation");
        Ok(path)
    }

    /// Stream the response body to `dest` chunk by chunk.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, TranscodeError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    async fn run_tool(&self, step: &'static str, args: Vec<OsString>) -> Result<(), TranscodeError> {
        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn { step, source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::ToolFailure {
                step,
                code: output.status.code(),
                stderr: tail(stderr.trim(), STDERR_TAIL_CHARS),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ClipTranscoder for Transcoder {
    async fn transcode(
        &self,
        url: &str,
        max_duration_secs: u32,
        max_bytes: u64,
    ) -> Result<PathBuf, TranscodeError> {
        self.run(url, max_duration_secs, max_bytes).await
    }
}

/// Arguments for the palette generation pass.
pub fn palette_args(
    settings: &TranscodeSettings,
    source: &Path,
    palette: &Path,
    max_duration_secs: u32,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(source.into());
    args.push("-t".into());
    args.push(max_duration_secs.to_string().into());
    args.push("-vf".into());
    args.push(settings.palette_filter().into());
    args.push("-y".into());
    args.push(palette.into());
    args
}

/// Arguments for the paletted encode pass.
pub fn encode_args(
    settings: &TranscodeSettings,
    source: &Path,
    palette: &Path,
    output: &Path,
    max_duration_secs: u32,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(source.into());
    args.push("-i".into());
    args.push(palette.into());
    args.push("-t".into());
    args.push(max_duration_secs.to_string().into());
    args.push("-lavfi".into());
    args.push(settings.encode_filter().into());
    args.push("-y".into());
    args.push(output.into());
    args
}

fn tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        text.to_string()
    } else {
        text.chars().skip(count - max_chars).collect()
    }
}
