use log::{info, warn};
use std::path::Path;

use crate::app_config::EncodingConfig;
use crate::catalog;
use crate::errors::GenerationError;
use crate::file_utils::FileManager;
use crate::media::{ComposeJob, MediaTool};
use super::models::UnitRange;

/// Tracks that go into the final encode
#[derive(Debug, Clone, Copy)]
pub struct CompositionInputs<'p> {
    pub video: &'p Path,
    pub audio: &'p Path,
    pub subtitles: &'p Path,
    pub duration: f64,
    pub output: &'p Path,
}

/// Runs the final encode, falling back to an encode without subtitles once
pub struct Composer<'a, M: MediaTool + ?Sized> {
    tool: &'a M,
    encoding: &'a EncodingConfig,
}

impl<'a, M: MediaTool + ?Sized> Composer<'a, M> {
    pub fn new(tool: &'a M, encoding: &'a EncodingConfig) -> Self {
        Self { tool, encoding }
    }

    /// Compose the video, returning whether the subtitles were burned in
    pub async fn compose(&self, inputs: CompositionInputs<'_>) -> Result<bool, GenerationError> {
        let mut job = ComposeJob {
            video: inputs.video,
            audio: inputs.audio,
            subtitles: Some(inputs.subtitles),
            encoding: self.encoding,
            duration: inputs.duration,
            output: inputs.output,
        };

        info!("Composing {:.1}s video", inputs.duration);
        let first = match self.tool.compose(&job).await {
            Ok(()) => return Ok(true),
            Err(e) => e,
        };

        warn!("Composition with subtitles failed, retrying without them: {}", first);
        job.subtitles = None;

        match self.tool.compose(&job).await {
            Ok(()) => Ok(false),
            Err(retry) => Err(GenerationError::Composition { first, retry }),
        }
    }
}

/// Default output file name for a realized range
pub fn output_file_name(range: &UnitRange, voice: &str) -> String {
    FileManager::generate_output_name(
        &catalog::collection_name(range.collection),
        &catalog::voice_short_name(voice),
        range.start,
        range.end,
    )
}
