//! Language utilities for translation-edition lookup
//!
//! This module validates ISO 639-1 (2-letter) and ISO 639-2 (3-letter) codes and
//! maps a language to the lookup service's translation edition. The mapping is a
//! static table; languages it does not know fall back to the default edition.

use anyhow::{Result, anyhow};
use isolang::Language;
use log::debug;

/// Edition used when a language has no entry in the mapping
pub const DEFAULT_TRANSLATION_EDITION: &str = "en.sahih";

// @const: ISO 639-1 code -> translation edition identifier
static TRANSLATION_EDITIONS: [(&str, &str); 10] = [
    ("en", "en.sahih"),
    ("fr", "fr.hamidullah"),
    ("ur", "ur.jalandhry"),
    ("tr", "tr.diyanet"),
    ("id", "id.indonesian"),
    ("bn", "bn.bengali"),
    ("es", "es.cortes"),
    ("ru", "ru.kuliev"),
    ("de", "de.bubenheim"),
    ("zh", "zh.jian"),
];

/// Normalize a language code to ISO 639-1 (2-letter) format
///
/// Three-letter codes are accepted in both their 639-2/T and 639-2/B forms.
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        let part2t = match normalized_code.as_str() {
            "fre" => "fra",
            "ger" => "deu",
            "chi" => "zho",
            "per" => "fas",
            "may" => "msa",
            "dut" => "nld",
            "gre" => "ell",
            _ => normalized_code.as_str(),
        };

        if let Some(code_639_1) = Language::from_639_3(part2t).and_then(|lang| lang.to_639_1()) {
            return Ok(code_639_1.to_string());
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let part1 = normalize_to_part1(code)?;
    let lang = Language::from_639_1(&part1)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part1))?;

    Ok(lang.to_name().to_string())
}

/// Resolve the translation edition for a language code
///
/// Never fails: unknown or invalid codes resolve to [`DEFAULT_TRANSLATION_EDITION`].
pub fn translation_edition(code: &str) -> &'static str {
    let key = normalize_to_part1(code).unwrap_or_else(|_| code.trim().to_lowercase());

    match TRANSLATION_EDITIONS.iter().find(|(lang, _)| *lang == key) {
        Some((_, edition)) => edition,
        None => {
            debug!("No translation edition for '{}', using {}", code, DEFAULT_TRANSLATION_EDITION);
            DEFAULT_TRANSLATION_EDITION
        }
    }
}

/// Language codes that have a dedicated translation edition
pub fn supported_translation_languages() -> Vec<&'static str> {
    TRANSLATION_EDITIONS.iter().map(|(lang, _)| *lang).collect()
}
