/*!
 * External media tool abstraction.
 *
 * Every encoder invocation the pipeline needs goes through [`MediaTool`], so the
 * pipeline can be exercised without ffmpeg installed. `ffmpeg` holds the
 * subprocess-backed implementation.
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::app_config::EncodingConfig;
use crate::errors::MediaToolError;

pub mod ffmpeg;

pub use ffmpeg::Ffmpeg;

/// Output frame geometry and fill colour
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub width: u32,
    pub height: u32,
    /// #RRGGBB
    pub color: String,
}

impl From<&crate::app_config::FrameConfig> for FrameSpec {
    fn from(frame: &crate::app_config::FrameConfig) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            color: frame.background_color.clone(),
        }
    }
}

/// Inputs and settings of the final encode
#[derive(Debug, Clone)]
pub struct ComposeJob<'a> {
    /// Background video track
    pub video: &'a Path,
    /// Merged audio track
    pub audio: &'a Path,
    /// Subtitle document to burn in, none for the fallback encode
    pub subtitles: Option<&'a Path>,
    pub encoding: &'a EncodingConfig,
    /// Length of the output in seconds
    pub duration: f64,
    pub output: &'a Path,
}

/// Operations the pipeline needs from the external media tool
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Playable duration of a media file in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError>;

    /// Losslessly concatenate audio files in order
    ///
    /// `list_file` is a scratch path the implementation may use for its input list.
    async fn concat_audio(&self, inputs: &[PathBuf], list_file: &Path, output: &Path) -> Result<(), MediaToolError>;

    /// Synthesize a solid colour video of the given length
    async fn solid_color(&self, frame: &FrameSpec, duration: f64, output: &Path) -> Result<(), MediaToolError>;

    /// Scale, crop and loop/trim a clip to the frame and length, dropping its audio
    async fn fit_clip(&self, source: &Path, frame: &FrameSpec, duration: f64, output: &Path) -> Result<(), MediaToolError>;

    /// Produce the final video
    async fn compose(&self, job: &ComposeJob<'_>) -> Result<(), MediaToolError>;
}
