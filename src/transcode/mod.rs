// Transcoder — downloads a clip and turns it into a size-bounded looping GIF.
//
// Two ffmpeg passes: palettegen builds a reduced palette from the clip, then
// paletteuse re-encodes against it with ordered dithering. Scratch files
// (the raw clip and the palette) live in a per-invocation temp directory
// that is removed on every exit path.

pub mod ffmpeg;

use thiserror::Error;

/// Failure modes of a single transcode invocation.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The source clip could not be downloaded.
    #[error("clip download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// Local file handling failed (scratch dir, artifact file, metadata).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool could not be started at all.
    #[error("failed to run ffmpeg ({step}): {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("ffmpeg {step} exited with {code:?}: {stderr}")]
    ToolFailure {
        step: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// The encode succeeded but the artifact is over the size bound.
    /// The artifact has already been deleted when this is returned.
    #[error("artifact is {bytes} bytes, limit is {limit}")]
    Oversize { bytes: u64, limit: u64 },
}

/// Fixed encode parameters. Duration and size limits are passed per run.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeSettings {
    /// Output frame rate (default 15)
    pub fps: u32,
    /// Output width in pixels; height follows aspect ratio (default 480)
    pub width: u32,
    /// Dither mode passed to paletteuse (default "bayer")
    pub dither: String,
    /// Bayer matrix scale, only meaningful for bayer dithering (default 5)
    pub bayer_scale: u8,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            fps: 15,
            width: 480,
            dither: "bayer".to_string(),
            bayer_scale: 5,
        }
    }
}

impl TranscodeSettings {
    fn scale_filter(&self) -> String {
        format!("fps={},scale={}:-1:flags=lanczos", self.fps, self.width)
    }

    /// Filter chain for the palette pass.
    pub fn palette_filter(&self) -> String {
        format!("{},palettegen=stats_mode=diff", self.scale_filter())
    }

    /// Filter graph for the paletted encode pass.
    pub fn encode_filter(&self) -> String {
        let dither = if self.dither == "bayer" {
            format!("dither=bayer:bayer_scale={}", self.bayer_scale)
        } else {
            format!("dither={}", self.dither)
        };
        format!("{}[x];[x][1:v]paletteuse={}", self.scale_filter(), dither)
    }
}
