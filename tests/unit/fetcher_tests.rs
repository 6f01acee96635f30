/*!
 * Tests for content lookup and the unit skipping rules
 */

use versereel::errors::GenerationError;
use versereel::generation::fetcher::{normalize_text, ContentFetcher};
use versereel::generation::UnitRange;
use crate::common::mock_providers::MockContentProvider;

#[tokio::test]
async fn test_fetch_withAllUnitsAvailable_shouldReturnInOrder() {
    let provider = MockContentProvider::with_durations(&[3.0, 4.0, 5.0]);
    let fetcher = ContentFetcher::new(&provider);

    let units = fetcher.fetch(UnitRange::new(1, 1, 3), "ar.alafasy", "en").await.unwrap();

    let numbers: Vec<u32> = units.iter().map(|u| u.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(units[1].text, "primary text of unit 2");
    assert_eq!(units[1].translation, "translation of unit 2");
    assert_eq!(units[0].collection, 1);
}

/// Units without audio, with an error status or with an unparseable body are skipped
#[tokio::test]
async fn test_fetch_withProblemUnits_shouldSkipThem() {
    let provider = MockContentProvider::with_durations(&[1.0, 1.0, 1.0, 1.0, 1.0])
        .without_audio(2)
        .with_status(3, 404)
        .with_parse_error(4);
    let fetcher = ContentFetcher::new(&provider);

    let units = fetcher.fetch(UnitRange::new(1, 1, 5), "ar.alafasy", "en").await.unwrap();

    let numbers: Vec<u32> = units.iter().map(|u| u.number).collect();
    assert_eq!(numbers, vec![1, 5]);
    assert_eq!(provider.tracker().lock().unwrap().lookups.len(), 5);
}

#[tokio::test]
async fn test_fetch_withEveryUnitSkipped_shouldFailWithNoContent() {
    let provider = MockContentProvider::with_durations(&[1.0, 1.0]).without_audio(1).without_audio(2);
    let fetcher = ContentFetcher::new(&provider);

    let result = fetcher.fetch(UnitRange::new(9, 1, 2), "ar.alafasy", "en").await;

    assert!(matches!(result, Err(GenerationError::NoContent { collection: 9, start: 1, end: 2 })));
}

/// An unreachable service fails the fetch instead of skipping
#[tokio::test]
async fn test_fetch_withUnreachableService_shouldFailWithUpstreamError() {
    let provider = MockContentProvider::with_durations(&[1.0, 1.0]).unreachable();
    let fetcher = ContentFetcher::new(&provider);

    let result = fetcher.fetch(UnitRange::new(1, 1, 2), "ar.alafasy", "en").await;

    assert!(matches!(result, Err(GenerationError::Upstream(_))));
    assert_eq!(provider.tracker().lock().unwrap().lookups.len(), 1);
}

/// Requests name the voice edition first and the mapped translation edition second
#[tokio::test]
async fn test_fetch_withMappedLanguage_shouldRequestBothEditions() {
    let provider = MockContentProvider::with_durations(&[1.0]);
    ContentFetcher::new(&provider)
        .fetch(UnitRange::new(1, 1, 1), "ar.husary", "fr")
        .await
        .unwrap();

    let tracker = provider.tracker();
    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.lookups[0].2, vec!["ar.husary".to_string(), "fr.hamidullah".to_string()]);
}

/// An unknown translation language uses the default edition without failing
#[tokio::test]
async fn test_fetch_withUnknownLanguage_shouldUseDefaultEdition() {
    let provider = MockContentProvider::with_durations(&[1.0]);
    let units = ContentFetcher::new(&provider)
        .fetch(UnitRange::new(1, 1, 1), "ar.alafasy", "tlh")
        .await
        .unwrap();

    assert_eq!(units.len(), 1);
    let tracker = provider.tracker();
    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.lookups[0].2[1], "en.sahih");
}

#[tokio::test]
async fn test_fetch_withMultilineText_shouldNormalize() {
    let provider = MockContentProvider::new().with_unit(1, "  first line\nsecond line \n", "a\r\nb", "2");
    let units = ContentFetcher::new(&provider)
        .fetch(UnitRange::new(1, 1, 1), "ar.alafasy", "en")
        .await
        .unwrap();

    assert_eq!(units[0].text, "first line second line");
    assert_eq!(units[0].translation, "a b");
}

#[test]
fn test_normalize_text_withLineBreaks_shouldJoinWithSpaces() {
    assert_eq!(normalize_text("a\nb\r\nc\r"), "a b c");
    assert_eq!(normalize_text("   "), "");
}
