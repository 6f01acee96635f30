use log::{info, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::{Path, PathBuf};

use crate::errors::GenerationError;
use crate::file_utils::FileManager;
use crate::media::{FrameSpec, MediaTool};
use super::models::BackgroundSource;

/// Concrete background chosen for a run
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundPlan {
    SolidColor,
    Clip(PathBuf),
}

/// Decide what the background will be
///
/// An explicit clip must exist. A library with no usable clips falls back to
/// solid colour.
pub fn plan_background<R: Rng + ?Sized>(source: &BackgroundSource, rng: &mut R) -> Result<BackgroundPlan, GenerationError> {
    match source {
        BackgroundSource::SolidColor => Ok(BackgroundPlan::SolidColor),
        BackgroundSource::Clip(path) => {
            if !FileManager::file_exists(path) {
                return Err(GenerationError::InvalidRequest(format!(
                    "background clip not found: {}", path.display()
                )));
            }
            Ok(BackgroundPlan::Clip(path.clone()))
        }
        BackgroundSource::Library(dir) => Ok(pick_from_library(dir, rng)),
    }
}

fn pick_from_library<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> BackgroundPlan {
    if !dir.is_dir() {
        warn!("Background directory {:?} does not exist, using solid colour", dir);
        return BackgroundPlan::SolidColor;
    }

    let clips = match FileManager::find_video_files(dir) {
        Ok(clips) => clips,
        Err(e) => {
            warn!("Failed to scan background directory {:?}: {}, using solid colour", dir, e);
            return BackgroundPlan::SolidColor;
        }
    };

    match clips.choose(rng) {
        Some(clip) => BackgroundPlan::Clip(clip.clone()),
        None => {
            warn!("No background clips in {:?}, using solid colour", dir);
            BackgroundPlan::SolidColor
        }
    }
}

/// Turns a background source into a video track of the output frame
pub struct BackgroundResolver<'a, M: MediaTool + ?Sized> {
    tool: &'a M,
    frame: FrameSpec,
}

impl<'a, M: MediaTool + ?Sized> BackgroundResolver<'a, M> {
    pub fn new(tool: &'a M, frame: FrameSpec) -> Self {
        Self { tool, frame }
    }

    /// Render the planned background at exactly `duration` seconds into `output`
    pub async fn render(&self, plan: &BackgroundPlan, duration: f64, output: &Path) -> Result<(), GenerationError> {
        match plan {
            BackgroundPlan::SolidColor => {
                info!("Background: solid colour {} for {:.1}s", self.frame.color, duration);
                self.tool.solid_color(&self.frame, duration, output).await?;
            }
            BackgroundPlan::Clip(clip) => {
                info!("Background: {:?} for {:.1}s", clip, duration);
                self.tool.fit_clip(clip, &self.frame, duration, output).await?;
            }
        }
        Ok(())
    }
}
