//! Language utilities for prompt language names
//!
//! Prompts name languages in plain words. Users may pass either a display
//! name ("Español neutro") or an ISO 639-1 / 639-2 code ("es", "fra", "ger"),
//! which is expanded to its English name.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Map an ISO 639-2/B code to its ISO 639-2/T equivalent
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    let part2t = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(part2t)
}

/// Look up an ISO 639-1 or 639-2 code
pub fn language_from_code(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t: &str = match bibliographic_to_terminology(&normalized) {
                Some(code) => code,
                None => &normalized,
            };
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Get the English language name for an ISO code
pub fn get_language_name(code: &str) -> Result<String> {
    language_from_code(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Turn user input into the name used in prompts
///
/// ISO codes become English names, anything else is kept as typed. Blank
/// input yields `fallback`.
pub fn resolve_language_name(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    // Only all-lowercase input is treated as a code, so "Ewe" or "Ido" stay names
    if trimmed.chars().all(|c| c.is_ascii_lowercase()) {
        if let Ok(name) = get_language_name(trimmed) {
            return name;
        }
    }

    trimmed.to_string()
}
