/*!
 * Tests for language name resolution
 */

use subtran::language_utils::{get_language_name, language_from_code, resolve_language_name};

#[test]
fn test_languageFromCode_shouldAcceptAllCodeStyles() {
    assert!(language_from_code("de").is_some());
    assert!(language_from_code("deu").is_some());
    assert!(language_from_code("ger").is_some());
    assert!(language_from_code("DE").is_some());
    assert!(language_from_code("deutsch").is_none());
}

#[test]
fn test_getLanguageName_shouldReturnEnglishNames() {
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert_eq!(get_language_name("por").unwrap(), "Portuguese");
}

#[test]
fn test_resolveLanguageName_withCapitalizedName_shouldNotTreatItAsCode() {
    assert_eq!(resolve_language_name("Ido", "English"), "Ido");
    assert_eq!(resolve_language_name("ido", "English"), "Ido");
}
