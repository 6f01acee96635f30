/*!
 * Tests for language code handling and translation editions
 */

use versereel::language_utils::{self, DEFAULT_TRANSLATION_EDITION};

#[test]
fn test_normalize_to_part1_withThreeLetterCodes_shouldConvert() {
    assert_eq!(language_utils::normalize_to_part1("fra").unwrap(), "fr");
    assert_eq!(language_utils::normalize_to_part1("fre").unwrap(), "fr");
    assert_eq!(language_utils::normalize_to_part1(" EN ").unwrap(), "en");
    assert!(language_utils::normalize_to_part1("xyz1").is_err());
}

#[test]
fn test_get_language_name_withValidCode_shouldReturnEnglishName() {
    assert_eq!(language_utils::get_language_name("ur").unwrap(), "Urdu");
    assert!(language_utils::get_language_name("zz").is_err());
}

#[test]
fn test_translation_edition_withMappedLanguage_shouldReturnEdition() {
    assert_eq!(language_utils::translation_edition("fr"), "fr.hamidullah");
    assert_eq!(language_utils::translation_edition("deu"), "de.bubenheim");
    assert_eq!(language_utils::translation_edition("en"), DEFAULT_TRANSLATION_EDITION);
}

/// Unknown codes never fail, they use the default edition
#[test]
fn test_translation_edition_withUnknownCode_shouldUseDefault() {
    assert_eq!(language_utils::translation_edition("ja"), DEFAULT_TRANSLATION_EDITION);
    assert_eq!(language_utils::translation_edition("klingon"), DEFAULT_TRANSLATION_EDITION);
    assert_eq!(language_utils::translation_edition(""), DEFAULT_TRANSLATION_EDITION);
}

#[test]
fn test_supported_translation_languages_shouldListTen() {
    let languages = language_utils::supported_translation_languages();
    assert_eq!(languages.len(), 10);
    assert!(languages.contains(&"en"));
    assert!(languages.contains(&"zh"));
}
