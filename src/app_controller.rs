use anyhow::{Result, Context};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::catalog;
use crate::generation::{
    BackgroundSource, GenerationOutcome, GenerationRequest, Pipeline, Progress, ProgressSink, RangeSelector, RunStage,
    UnitRange,
};
use crate::media::{Ffmpeg, MediaTool};
use crate::providers::ContentProvider;
use crate::providers::alquran::AlQuranCloud;

// @module: Application controller for video generation

/// Progress bar fed by pipeline checkpoints
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("=>-"));
        Self { bar }
    }

    /// A reporter that draws nothing
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Whether the bar has been finished or abandoned
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, progress: Progress) {
        self.bar.set_position(u64::from(progress.percent));

        match progress.stage {
            RunStage::Done => self.bar.finish_with_message(progress.stage.to_string()),
            stage if stage.is_terminal() => self.bar.abandon_with_message(stage.to_string()),
            stage => self.bar.set_message(stage.to_string()),
        }
    }
}

/// Main application controller for video generation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request for an explicit unit range
    pub fn explicit_request(
        &self,
        range: UnitRange,
        voice: Option<String>,
        background: Option<PathBuf>,
        output_name: Option<String>,
    ) -> GenerationRequest {
        let voice = voice.unwrap_or_else(|| self.config.default_voice.clone());
        let mut request = GenerationRequest::explicit(range, voice, self.config.translation_language.clone());

        if let Some(clip) = background {
            request = request.with_background(BackgroundSource::Clip(clip));
        }
        if let Some(name) = output_name {
            request = request.with_output_name(name);
        }
        request
    }

    /// Request for a range sized to the target duration, with a random voice
    /// unless one is given and a random clip from the background library
    pub fn random_request<R: Rng + ?Sized>(
        &self,
        collection: Option<u32>,
        voice: Option<String>,
        rng: &mut R,
    ) -> GenerationRequest {
        let voice = voice.unwrap_or_else(|| catalog::random_voice(rng).id.to_string());

        GenerationRequest {
            range: RangeSelector::FromTargetDuration { collection },
            voice,
            translation_language: self.config.translation_language.clone(),
            background: BackgroundSource::Library(self.config.background_dir.clone()),
            output_name: None,
        }
    }

    /// Run a request against the live lookup service and the local ffmpeg
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let pipeline = self.live_pipeline().await?;
        let progress = ProgressReporter::new();

        self.run_with_progress(&pipeline, request, &progress).await
    }

    /// Generate `count` random videos against the live lookup service
    pub async fn run_random(
        &self,
        collection: Option<u32>,
        voice: Option<String>,
        count: u32,
    ) -> Result<Vec<GenerationOutcome>> {
        let pipeline = self.live_pipeline().await?;
        let mut rng = StdRng::from_os_rng();

        self.run_random_batch(&pipeline, collection, voice, count, &mut rng, ProgressReporter::new).await
    }

    /// Generate `count` random videos one after another on a given pipeline
    ///
    /// Every video gets a fresh request, so each draws its own range, voice
    /// (unless `voice` is given) and background clip. The batch stops after a
    /// cancelled run; a failed run fails the batch.
    pub async fn run_random_batch<P, M, R, F>(
        &self,
        pipeline: &Pipeline<P, M>,
        collection: Option<u32>,
        voice: Option<String>,
        count: u32,
        rng: &mut R,
        make_progress: F,
    ) -> Result<Vec<GenerationOutcome>>
    where
        P: ContentProvider,
        M: MediaTool,
        R: Rng + ?Sized,
        F: Fn() -> ProgressReporter,
    {
        let mut outcomes = Vec::with_capacity(count as usize);

        for index in 1..=count {
            let request = self.random_request(collection, voice.clone(), rng);
            info!("Video {}/{} ({})", index, count, request.voice);

            let progress = make_progress();
            let outcome = self
                .run_with_progress(pipeline, &request, &progress)
                .await
                .with_context(|| format!("Video {} of {} failed", index, count))?;

            let cancelled = outcome.is_cancelled();
            outcomes.push(outcome);
            if cancelled {
                warn!("Stopping after {} of {} videos", index - 1, count);
                break;
            }
        }

        Ok(outcomes)
    }

    async fn live_pipeline(&self) -> Result<Pipeline<AlQuranCloud, Ffmpeg>> {
        let tool = Ffmpeg::from_config(&self.config.media);
        tool.check_available().await.with_context(|| {
            format!(
                "ffmpeg is required; install it or set media.ffmpeg_path (currently '{}')",
                self.config.media.ffmpeg_path
            )
        })?;

        let provider = AlQuranCloud::new(self.config.service.endpoint.clone(), self.config.service.timeout_secs);
        Ok(Pipeline::new(provider, tool))
    }

    /// Run a request on a given pipeline, cancelling it on Ctrl-C
    pub async fn run_with_progress<P: ContentProvider, M: MediaTool>(
        &self,
        pipeline: &Pipeline<P, M>,
        request: &GenerationRequest,
        progress: &ProgressReporter,
    ) -> Result<GenerationOutcome> {
        let start_time = std::time::Instant::now();
        let cancel = CancellationToken::new();

        let watcher_token = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping at the next checkpoint");
                watcher_token.cancel();
            }
        });

        let outcome = pipeline.run(&self.config, request, progress, &cancel).await;
        watcher.abort();

        match &outcome {
            Ok(GenerationOutcome::Completed(result)) => {
                info!("Success: {} in {}", result.output_path.display(), Self::format_duration(start_time.elapsed()));
                if !result.subtitles_burned {
                    warn!("Subtitles could not be burned in; the video has none");
                }
            }
            Ok(GenerationOutcome::Cancelled { stage }) => warn!("Cancelled during: {}", stage),
            Err(_) => {}
        }

        Ok(outcome?)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
