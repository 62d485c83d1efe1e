/*!
 * Maps raw model output back onto the captions it was asked to translate.
 */

use crate::subtitle_processor::SubtitleEntry;

/// Align a model response with the captions that produced it
///
/// Response line `i` replaces the text of `originals[i]`. Missing or blank
/// lines keep the original text, extra lines are dropped. A blank response
/// aligns to nothing.
pub fn align_response(raw: &str, originals: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
    let response = raw.trim();
    if response.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = response.lines().map(str::trim).collect();

    originals
        .iter()
        .enumerate()
        .map(|(i, original)| match lines.get(i) {
            Some(line) if !line.is_empty() => original.with_lines(vec![line.to_string()]),
            _ => original.clone(),
        })
        .collect()
}
