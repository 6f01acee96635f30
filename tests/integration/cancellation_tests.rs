/*!
 * Cancellation at every checkpoint of a run
 */

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use versereel::generation::{GenerationOutcome, GenerationRequest, Pipeline, RunStage, UnitRange};
use crate::common::{self, CancelAt, RecordingProgress};
use crate::common::mock_providers::{MockContentProvider, MockMediaTool};

const CHECKPOINTS: [(u8, RunStage); 7] = [
    (5, RunStage::Fetching),
    (10, RunStage::Downloading),
    (40, RunStage::Merging),
    (50, RunStage::Timing),
    (60, RunStage::BackgroundPrep),
    (70, RunStage::Composing),
    (95, RunStage::Composing),
];

fn request() -> GenerationRequest {
    GenerationRequest::explicit(UnitRange::new(1, 1, 4), "ar.alafasy", "en")
}

/// Cancelling at any checkpoint ends the run there with no output and no scratch left
#[tokio::test]
async fn test_run_withCancellationAtEachCheckpoint_shouldStopCleanly() -> Result<()> {
    for (percent, stage) in CHECKPOINTS {
        let root = common::create_temp_dir()?;
        let config = common::test_config(root.path());
        let pipeline = Pipeline::new(MockContentProvider::with_durations(&[6.0; 4]), MockMediaTool::new());
        let token = CancellationToken::new();
        let sink = CancelAt { percent, token: token.clone() };

        let outcome = pipeline.run(&config, &request(), &sink, &token).await?;

        assert_eq!(outcome, GenerationOutcome::Cancelled { stage }, "checkpoint {}", percent);
        assert!(outcome.result().is_none());
        assert_eq!(common::count_entries(&config.output_dir), 0, "checkpoint {}", percent);
        assert_eq!(common::count_entries(root.path().join("scratch").as_path()), 0, "checkpoint {}", percent);
    }
    Ok(())
}

/// Work after the cancelled checkpoint never starts
#[tokio::test]
async fn test_run_withCancellationBeforeDownload_shouldNotFetchAudio() -> Result<()> {
    let root = common::create_temp_dir()?;
    let config = common::test_config(root.path());
    let pipeline = Pipeline::new(MockContentProvider::with_durations(&[6.0; 4]), MockMediaTool::new());
    let token = CancellationToken::new();
    let sink = CancelAt { percent: 10, token: token.clone() };

    let outcome = pipeline.run(&config, &request(), &sink, &token).await?;

    assert!(outcome.is_cancelled());
    let tracker = pipeline.provider().tracker();
    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.lookups.len(), 4);
    assert!(tracker.audio_fetches.is_empty());
    Ok(())
}

/// A token cancelled before the run starts stops at the first checkpoint
#[tokio::test]
async fn test_run_withPreCancelledToken_shouldStopAtFirstCheckpoint() -> Result<()> {
    let root = common::create_temp_dir()?;
    let config = common::test_config(root.path());
    let pipeline = Pipeline::new(MockContentProvider::with_durations(&[6.0]), MockMediaTool::new());
    let token = CancellationToken::new();
    token.cancel();
    let progress = RecordingProgress::default();

    let outcome = pipeline.run(&config, &request(), &progress, &token).await?;

    assert_eq!(outcome, GenerationOutcome::Cancelled { stage: RunStage::Fetching });
    assert!(pipeline.provider().tracker().lock().unwrap().lookups.is_empty());

    // The checkpoint is reported, then the terminal stage at the same percentage
    let stages: Vec<(u8, RunStage)> =
        progress.updates.lock().unwrap().iter().map(|p| (p.percent, p.stage)).collect();
    assert_eq!(stages, vec![(5, RunStage::Fetching), (5, RunStage::Cancelled)]);
    Ok(())
}

/// Cancelling after composition discards the finished video
#[tokio::test]
async fn test_run_withCancellationAfterCompose_shouldDiscardVideo() -> Result<()> {
    let root = common::create_temp_dir()?;
    let config = common::test_config(root.path());
    let pipeline = Pipeline::new(MockContentProvider::with_durations(&[6.0; 2]), MockMediaTool::new());
    let token = CancellationToken::new();
    let sink = CancelAt { percent: 95, token: token.clone() };

    let outcome = pipeline.run(&config, &request(), &sink, &token).await?;

    assert!(outcome.is_cancelled());
    assert_eq!(pipeline.tool().tracker().lock().unwrap().compose_calls.len(), 1);
    assert!(!config.output_dir.exists() || common::count_entries(&config.output_dir) == 0);
    Ok(())
}
