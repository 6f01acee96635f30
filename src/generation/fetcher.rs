use log::{debug, info, warn};

use crate::errors::{GenerationError, UpstreamError};
use crate::language_utils;
use crate::providers::ContentProvider;
use super::models::{ContentUnit, UnitRange};

/// Looks up the text, translation and audio reference of every unit in a range
#[derive(Debug)]
pub struct ContentFetcher<'a, P: ContentProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: ContentProvider + ?Sized> ContentFetcher<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Fetch the units of `range` in order
    ///
    /// Units without audio for `voice`, units the service reports an error for,
    /// and units whose response cannot be parsed are skipped. An unreachable
    /// service fails the whole fetch, as does a range where every unit was skipped.
    pub async fn fetch(
        &self,
        range: UnitRange,
        voice: &str,
        translation_language: &str,
    ) -> Result<Vec<ContentUnit>, GenerationError> {
        let translation = language_utils::translation_edition(translation_language);
        let editions = [voice, translation];
        info!("Fetching units {} (voice {}, translation {})", range, voice, translation);

        let mut units = Vec::with_capacity(range.len() as usize);

        for number in range.start..=range.end {
            let response = match self.provider.fetch_unit(range.collection, number, &editions).await {
                Ok(response) => response,
                Err(e) if e.is_unreachable() => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unit {}:{}: {}", range.collection, number, e);
                    continue;
                }
            };

            if !response.is_success() {
                warn!("Skipping unit {}:{}: service returned status {}", range.collection, number, response.code);
                continue;
            }

            match Self::to_unit(range.collection, number, response.records) {
                Ok(Some(unit)) => units.push(unit),
                Ok(None) => warn!("Skipping unit {}:{}: no audio for voice {}", range.collection, number, voice),
                Err(e) => warn!("Skipping unit {}:{}: {}", range.collection, number, e),
            }
        }

        if units.is_empty() {
            return Err(GenerationError::NoContent {
                collection: range.collection,
                start: range.start,
                end: range.end,
            });
        }

        debug!("Fetched {} of {} units", units.len(), range.len());
        Ok(units)
    }

    fn to_unit(
        collection: u32,
        number: u32,
        records: Vec<crate::providers::EditionRecord>,
    ) -> Result<Option<ContentUnit>, UpstreamError> {
        let mut records = records.into_iter();
        let voice_record = records
            .next()
            .ok_or_else(|| UpstreamError::ParseError("response has no voice edition record".to_string()))?;
        let translation = records.next().map(|r| normalize_text(&r.text)).unwrap_or_default();

        Ok(voice_record.audio.map(|audio_url| ContentUnit {
            collection,
            number,
            text: normalize_text(&voice_record.text),
            translation,
            audio_url,
        }))
    }
}

/// Replace embedded line breaks with spaces and trim
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}
