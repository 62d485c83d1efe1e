/*!
 * Sliding window of previously translated captions.
 *
 * The window is rebuilt for every caption from the already filled part of
 * the target collection, so it always reflects what was actually written,
 * including verbatim fallbacks.
 */

use crate::subtitle_processor::SubtitleEntry;

/// Default number of previous captions offered as context
pub const DEFAULT_CONTEXT_SIZE: usize = 3;

/// Context handed to the primary prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextWindow {
    entries: Vec<String>,
}

impl ContextWindow {
    /// Build the window for the caption at `index`
    ///
    /// Looks at target entries `[index - size, index)` where
    /// `size = min(index, max_size)`. Each entry contributes its lines joined
    /// with `\n`; entries with no text are skipped.
    pub fn from_translated(target_entries: &[SubtitleEntry], index: usize, max_size: usize) -> Self {
        let end = index.min(target_entries.len());
        let size = end.min(max_size);

        let entries = target_entries[end - size..end]
            .iter()
            .map(SubtitleEntry::text)
            .filter(|text| !text.is_empty())
            .collect();

        Self { entries }
    }

    /// Context lines, oldest first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
