use log::{debug, info, warn};
use std::path::Path;

use crate::errors::{GenerationError, MediaToolError};
use crate::media::MediaTool;
use crate::providers::ContentProvider;
use super::budget::TimelineBudget;
use super::models::{ContentUnit, DownloadedUnit};

/// Audio kept for a run
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    /// Retained prefix of the input, in order
    pub units: Vec<DownloadedUnit>,
    /// How many units were retained
    pub retained: usize,
    /// Sum of the retained durations
    pub total_duration: f64,
}

/// Downloads unit audio until the duration budget is spent
pub struct BudgetedDownloader<'a, P: ContentProvider + ?Sized, M: MediaTool + ?Sized> {
    provider: &'a P,
    tool: &'a M,
    scratch_dir: &'a Path,
    probe_fallback: f64,
}

impl<'a, P: ContentProvider + ?Sized, M: MediaTool + ?Sized> BudgetedDownloader<'a, P, M> {
    pub fn new(provider: &'a P, tool: &'a M, scratch_dir: &'a Path, probe_fallback: f64) -> Self {
        Self {
            provider,
            tool,
            scratch_dir,
            probe_fallback,
        }
    }

    /// File name of the i-th audio artifact
    pub fn artifact_name(index: usize) -> String {
        format!("audio_{}.mp3", index)
    }

    /// Download units in order, recording each duration in `budget`
    ///
    /// The first unit is always kept. Any later unit that pushes the total past
    /// the download budget is deleted and ends the download. A unit whose
    /// duration cannot be probed is kept with the fallback duration.
    pub async fn download(
        &self,
        units: &[ContentUnit],
        budget: &mut TimelineBudget,
    ) -> Result<DownloadOutcome, GenerationError> {
        let mut kept: Vec<DownloadedUnit> = Vec::new();
        info!("Downloading audio for up to {} units (budget {:.1}s)", units.len(), budget.download_budget());

        for (index, unit) in units.iter().enumerate() {
            let bytes = self.provider.fetch_audio(&unit.audio_url).await?;
            let audio_path = self.scratch_dir.join(Self::artifact_name(index));
            tokio::fs::write(&audio_path, &bytes).await.map_err(MediaToolError::from)?;

            let (duration, measured) = match self.tool.probe_duration(&audio_path).await {
                Ok(duration) => (duration, true),
                Err(e) => {
                    warn!("Could not measure unit {}, assuming {:.1}s: {}", unit.number, self.probe_fallback, e);
                    (self.probe_fallback, false)
                }
            };

            if measured && index > 0 && budget.would_exceed(duration) {
                debug!(
                    "Unit {} would bring the total to {:.1}s, over the {:.1}s budget",
                    unit.number, budget.current() + duration, budget.download_budget()
                );
                if let Err(e) = tokio::fs::remove_file(&audio_path).await {
                    warn!("Failed to remove {:?}: {}", audio_path, e);
                }
                break;
            }

            budget.record(duration);
            debug!("Unit {}: {:.2}s (total {:.2}s)", unit.number, duration, budget.current());
            kept.push(DownloadedUnit {
                unit: unit.clone(),
                audio_path,
                duration,
                measured,
            });
        }

        let total_duration = kept.iter().map(|u| u.duration).sum();
        info!("Kept {} of {} units, {:.1}s of audio", kept.len(), units.len(), total_duration);

        Ok(DownloadOutcome {
            retained: kept.len(),
            units: kept,
            total_duration,
        })
    }
}
