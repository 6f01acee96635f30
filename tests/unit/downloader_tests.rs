/*!
 * Tests for the duration-budgeted audio download
 */

use anyhow::Result;
use versereel::errors::GenerationError;
use versereel::generation::downloader::BudgetedDownloader;
use versereel::generation::fetcher::ContentFetcher;
use versereel::generation::{ContentUnit, TimelineBudget, UnitRange};
use crate::common;
use crate::common::mock_providers::{MockContentProvider, MockMediaTool};

async fn fetch_all(provider: &MockContentProvider, count: u32) -> Vec<ContentUnit> {
    ContentFetcher::new(provider)
        .fetch(UnitRange::new(1, 1, count), "ar.alafasy", "en")
        .await
        .unwrap()
}

/// Seven ten-second units against a fifty-second budget keep exactly five
#[tokio::test]
async fn test_download_withSevenTenSecondUnits_shouldKeepFive() -> Result<()> {
    let scratch = common::create_temp_dir()?;
    let provider = MockContentProvider::with_durations(&[10.0; 7]);
    let tool = MockMediaTool::new();
    let units = fetch_all(&provider, 7).await;

    let mut budget = TimelineBudget::new(50.0, 50.0, 1.0);
    let outcome = BudgetedDownloader::new(&provider, &tool, scratch.path(), 5.0)
        .download(&units, &mut budget)
        .await?;

    assert_eq!(outcome.retained, 5);
    assert_eq!(outcome.total_duration, 50.0);
    assert_eq!(budget.current(), 50.0);
    let numbers: Vec<u32> = outcome.units.iter().map(|u| u.unit.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);

    // The rejected sixth artifact is gone, the seventh was never fetched
    assert!(!scratch.path().join("audio_5.mp3").exists());
    assert!(!scratch.path().join("audio_6.mp3").exists());
    assert_eq!(provider.tracker().lock().unwrap().audio_fetches.len(), 6);
    Ok(())
}

/// A single unit longer than the whole budget is still kept
#[tokio::test]
async fn test_download_withOneHugeUnit_shouldKeepIt() -> Result<()> {
    let scratch = common::create_temp_dir()?;
    let provider = MockContentProvider::with_durations(&[9999.0]);
    let tool = MockMediaTool::new();
    let units = fetch_all(&provider, 1).await;

    let mut budget = TimelineBudget::new(10.0, 10.0, 1.0);
    let outcome = BudgetedDownloader::new(&provider, &tool, scratch.path(), 5.0)
        .download(&units, &mut budget)
        .await?;

    assert_eq!(outcome.retained, 1);
    assert_eq!(outcome.total_duration, 9999.0);
    assert!(outcome.units[0].audio_path.exists());
    Ok(())
}

/// Whatever the durations, the first unit is kept and a stopped download stays within budget
#[tokio::test]
async fn test_download_withVariedDurations_shouldRespectBudget() -> Result<()> {
    let cases: [(&[f64], f64); 4] = [
        (&[30.0, 30.0, 30.0, 30.0], 95.0),
        (&[120.0, 1.0, 1.0], 95.0),
        (&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 12.0),
        (&[5.0, 5.0], 100.0),
    ];

    for (durations, budget_secs) in cases {
        let scratch = common::create_temp_dir()?;
        let provider = MockContentProvider::with_durations(durations);
        let tool = MockMediaTool::new();
        let units = fetch_all(&provider, durations.len() as u32).await;

        let mut budget = TimelineBudget::new(budget_secs, budget_secs, 1.0);
        let outcome = BudgetedDownloader::new(&provider, &tool, scratch.path(), 5.0)
            .download(&units, &mut budget)
            .await?;

        assert!(outcome.retained >= 1);
        if outcome.retained < durations.len() && outcome.retained > 1 {
            assert!(outcome.total_duration <= budget_secs);
        }
        let expected: f64 = durations[..outcome.retained].iter().sum();
        assert_eq!(outcome.total_duration, expected);
    }
    Ok(())
}

/// An unprobeable unit is kept with the fallback duration and never stops the download
#[tokio::test]
async fn test_download_withProbeFailure_shouldUseFallback() -> Result<()> {
    let scratch = common::create_temp_dir()?;
    let provider = MockContentProvider::new()
        .with_unit(1, "a", "a", "10")
        .with_unit(2, "b", "b", "not audio")
        .with_unit(3, "c", "c", "10");
    let tool = MockMediaTool::new();
    let units = fetch_all(&provider, 3).await;

    let mut budget = TimelineBudget::new(20.0, 20.0, 1.0);
    let outcome = BudgetedDownloader::new(&provider, &tool, scratch.path(), 5.0)
        .download(&units, &mut budget)
        .await?;

    assert_eq!(outcome.retained, 2);
    assert!(outcome.units[0].measured);
    assert!(!outcome.units[1].measured);
    assert_eq!(outcome.units[1].duration, 5.0);
    assert_eq!(outcome.total_duration, 15.0);
    Ok(())
}

/// A failed audio download fails the stage
#[tokio::test]
async fn test_download_withAudioFailure_shouldFailWithUpstreamError() -> Result<()> {
    let scratch = common::create_temp_dir()?;
    let provider = MockContentProvider::with_durations(&[1.0, 1.0]).with_audio_failure(2);
    let tool = MockMediaTool::new();
    let units = fetch_all(&provider, 2).await;

    let mut budget = TimelineBudget::new(90.0, 100.0, 0.95);
    let result = BudgetedDownloader::new(&provider, &tool, scratch.path(), 5.0)
        .download(&units, &mut budget)
        .await;

    assert!(matches!(result, Err(GenerationError::Upstream(_))));
    Ok(())
}
