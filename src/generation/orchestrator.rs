use log::{error, info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use tokio_util::sync::CancellationToken;

use crate::app_config::{Config, DurationConfig};
use crate::catalog;
use crate::errors::GenerationError;
use crate::file_utils::{FileManager, ScratchSpace};
use crate::media::{FrameSpec, MediaTool};
use crate::providers::ContentProvider;
use crate::subtitle_processor::SubtitleTrack;
use super::background::{plan_background, BackgroundResolver};
use super::budget::TimelineBudget;
use super::composer::{output_file_name, Composer, CompositionInputs};
use super::downloader::BudgetedDownloader;
use super::fetcher::ContentFetcher;
use super::models::{GenerationOutcome, GenerationRequest, GenerationResult, RangeSelector, RunStage, UnitRange};
use super::timing::{self, LineLimits};

const CONCAT_LIST: &str = "concat_list.txt";
const MERGED_AUDIO: &str = "merged_audio.mp3";
const SUBTITLES: &str = "subtitles.ass";
const BACKGROUND: &str = "background.mp4";
const COMPOSED: &str = "composed.mp4";

/// A progress update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 0 to 100, never decreasing within a run
    pub percent: u8,
    pub stage: RunStage,
}

/// Receives progress updates of a run
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

/// Sink that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Forwards updates and remembers the last percentage reported
struct TrackedProgress<'a> {
    inner: &'a dyn ProgressSink,
    last_percent: AtomicU8,
}

impl<'a> TrackedProgress<'a> {
    fn new(inner: &'a dyn ProgressSink) -> Self {
        Self { inner, last_percent: AtomicU8::new(0) }
    }

    /// Report a terminal stage at the last percentage reached
    fn finish(&self, stage: RunStage) {
        let percent = self.last_percent.load(Ordering::Relaxed);
        self.inner.report(Progress { percent, stage });
    }
}

impl ProgressSink for TrackedProgress<'_> {
    fn report(&self, progress: Progress) {
        self.last_percent.fetch_max(progress.percent, Ordering::Relaxed);
        self.inner.report(progress);
    }
}

/// Report progress, then honour a pending cancellation
fn checkpoint(
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
    percent: u8,
    stage: RunStage,
) -> Option<GenerationOutcome> {
    progress.report(Progress { percent, stage });

    if cancel.is_cancelled() {
        info!("Cancelled during stage: {}", stage);
        return Some(GenerationOutcome::Cancelled { stage });
    }
    None
}

macro_rules! checkpoint {
    ($progress:expr, $cancel:expr, $percent:expr, $stage:expr) => {
        if let Some(outcome) = checkpoint($progress, $cancel, $percent, $stage) {
            return Ok(outcome);
        }
    };
}

/// Resolve the unit range of a request against the collection catalogue
///
/// Explicit ranges are checked. Derived ranges start at a random unit and are
/// sized from the target duration, clipped to the collection's end.
pub fn resolve_range<R: Rng + ?Sized>(
    selector: &RangeSelector,
    duration: &DurationConfig,
    rng: &mut R,
) -> Result<UnitRange, GenerationError> {
    match selector {
        RangeSelector::Explicit(range) => {
            let info = catalog::collection(range.collection).ok_or_else(|| {
                GenerationError::InvalidRequest(format!(
                    "collection {} is not in 1-{}", range.collection, catalog::collection_count()
                ))
            })?;

            if range.start == 0 || range.is_empty() {
                return Err(GenerationError::InvalidRequest(format!("invalid unit range {}", range)));
            }
            if range.end > info.unit_count {
                return Err(GenerationError::InvalidRequest(format!(
                    "range {} exceeds {} ({} units)", range, info.name, info.unit_count
                )));
            }
            Ok(*range)
        }
        RangeSelector::FromTargetDuration { collection } => {
            let info = match collection {
                Some(number) => catalog::collection(*number).ok_or_else(|| {
                    GenerationError::InvalidRequest(format!(
                        "collection {} is not in 1-{}", number, catalog::collection_count()
                    ))
                })?,
                None => catalog::random_collection(rng),
            };

            let budget = TimelineBudget::from_config(duration);
            let count = budget.estimated_unit_count(duration.secs_per_unit);
            let last_start = info.unit_count.saturating_sub(4).max(1);
            let start = rng.random_range(1..=last_start);
            let end = (start + count - 1).min(info.unit_count);

            Ok(UnitRange::new(info.number, start, end))
        }
    }
}

/// The generation pipeline
///
/// Holds only its collaborators; configuration, progress and cancellation are
/// supplied per run, so one pipeline can serve several runs at once.
#[derive(Debug)]
pub struct Pipeline<P: ContentProvider, M: MediaTool> {
    provider: P,
    tool: M,
}

impl<P: ContentProvider, M: MediaTool> Pipeline<P, M> {
    pub fn new(provider: P, tool: M) -> Self {
        Self { provider, tool }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn tool(&self) -> &M {
        &self.tool
    }

    /// Run one generation with an entropy-seeded random source
    pub async fn run(
        &self,
        config: &Config,
        request: &GenerationRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        let mut rng = StdRng::from_os_rng();
        self.run_with_rng(config, request, progress, cancel, &mut rng).await
    }

    /// Run one generation
    ///
    /// The scratch space is removed whatever the outcome. The output file only
    /// appears once the run has passed its last checkpoint.
    pub async fn run_with_rng<R: Rng + Send + ?Sized>(
        &self,
        config: &Config,
        request: &GenerationRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
        rng: &mut R,
    ) -> Result<GenerationOutcome, GenerationError> {
        let scratch = ScratchSpace::create(config.scratch_root.as_deref())
            .map_err(|e| GenerationError::File(format!("{:#}", e)))?;

        let tracked = TrackedProgress::new(progress);
        let result = self.execute(config, request, &tracked, cancel, &scratch, rng).await;

        info!("{}", RunStage::Cleanup);
        if let Err(e) = scratch.close() {
            warn!("{:#}", e);
        }

        match &result {
            Ok(GenerationOutcome::Completed(done)) => {
                tracked.report(Progress { percent: 100, stage: RunStage::Done });
                info!("Created {:?} ({:.1}s, units {})", done.output_path, done.duration, done.range);
            }
            Ok(GenerationOutcome::Cancelled { .. }) => tracked.finish(RunStage::Cancelled),
            Err(e) => {
                error!("Generation failed: {}", e);
                tracked.finish(RunStage::Failed);
            }
        }

        result
    }

    async fn execute<R: Rng + Send + ?Sized>(
        &self,
        config: &Config,
        request: &GenerationRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
        scratch: &ScratchSpace,
        rng: &mut R,
    ) -> Result<GenerationOutcome, GenerationError> {
        if request.voice.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("voice must not be empty".to_string()));
        }
        let range = resolve_range(&request.range, &config.duration, rng)?;
        let background_plan = plan_background(&request.background, rng)?;

        // Fetching
        checkpoint!(progress, cancel, 5, RunStage::Fetching);
        let units = ContentFetcher::new(&self.provider)
            .fetch(range, &request.voice, &request.translation_language)
            .await?;

        // Downloading
        checkpoint!(progress, cancel, 10, RunStage::Downloading);
        let mut budget = TimelineBudget::from_config(&config.duration);
        let downloaded = BudgetedDownloader::new(&self.provider, &self.tool, scratch.path(), config.duration.probe_fallback_secs)
            .download(&units, &mut budget)
            .await?;

        let (first, last) = match (downloaded.units.first(), downloaded.units.last()) {
            (Some(first), Some(last)) => (first.unit.number, last.unit.number),
            _ => {
                return Err(GenerationError::NoContent {
                    collection: range.collection,
                    start: range.start,
                    end: range.end,
                })
            }
        };
        let realized = UnitRange::new(range.collection, first, last);

        // Merging
        let merged = scratch.file(MERGED_AUDIO);
        let inputs: Vec<PathBuf> = downloaded.units.iter().map(|u| u.audio_path.clone()).collect();
        self.tool.concat_audio(&inputs, &scratch.file(CONCAT_LIST), &merged).await?;
        let measured_total = match self.tool.probe_duration(&merged).await {
            Ok(total) => total,
            Err(e) => {
                warn!("Could not measure merged audio, using the sum of units: {}", e);
                downloaded.total_duration
            }
        };
        let length = budget.composition_length(measured_total);
        checkpoint!(progress, cancel, 40, RunStage::Merging);

        // Timing
        checkpoint!(progress, cancel, 50, RunStage::Timing);
        let chunks = timing::allocate(
            &downloaded.units,
            LineLimits::from(&config.subtitles.primary),
            LineLimits::from(&config.subtitles.translation),
        );
        let chunks = timing::clip_to(chunks, length);
        let track = SubtitleTrack::from_chunks(config.frame.width, config.frame.height, &config.subtitles, &chunks);
        if let Err(e) = track.validate() {
            warn!("Subtitle track is inconsistent: {}", e);
        }
        let subtitles = scratch.file(SUBTITLES);
        track
            .write_to_ass(&subtitles)
            .map_err(|e| GenerationError::File(format!("{:#}", e)))?;

        // Background
        checkpoint!(progress, cancel, 60, RunStage::BackgroundPrep);
        let background = scratch.file(BACKGROUND);
        BackgroundResolver::new(&self.tool, FrameSpec::from(&config.frame))
            .render(&background_plan, length, &background)
            .await?;

        // Composing
        checkpoint!(progress, cancel, 70, RunStage::Composing);
        let composed = scratch.file(COMPOSED);
        let subtitles_burned = Composer::new(&self.tool, &config.encoding)
            .compose(CompositionInputs {
                video: &background,
                audio: &merged,
                subtitles: &subtitles,
                duration: length,
                output: &composed,
            })
            .await?;
        checkpoint!(progress, cancel, 95, RunStage::Composing);

        let output_path = match &request.output_name {
            Some(name) => {
                let name = FileManager::sanitize_file_name(name);
                if name.is_empty() {
                    return Err(GenerationError::InvalidRequest("output file name is empty".to_string()));
                }
                config.output_dir.join(FileManager::with_video_extension(&name))
            }
            None => FileManager::unique_path(&config.output_dir, &output_file_name(&realized, &request.voice)),
        };
        promote(&composed, &output_path)?;

        Ok(GenerationOutcome::Completed(GenerationResult {
            output_path,
            duration: length,
            range: realized,
            voice: request.voice.clone(),
            subtitles_burned,
        }))
    }
}

fn promote(composed: &Path, output_path: &Path) -> Result<(), GenerationError> {
    FileManager::promote_file(composed, output_path).map_err(|e| GenerationError::File(format!("{:#}", e)))
}
