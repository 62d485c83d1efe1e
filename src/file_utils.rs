use std::path::{Path, PathBuf};

// @module: File and path utilities

/// Suffix added to the source file stem to name the translation
pub const TRANSLATED_SUFFIX: &str = "_translated";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @generates: Default output path for a translated subtitle
    // @example: movie.srt -> movie_translated.srt, show.ass -> show_translated.ass
    pub fn default_target_path<P: AsRef<Path>>(source: P) -> PathBuf {
        let source = source.as_ref();
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();

        let file_name = match source.extension() {
            Some(ext) => format!("{}{}.{}", stem, TRANSLATED_SUFFIX, ext.to_string_lossy()),
            None => format!("{}{}.srt", stem, TRANSLATED_SUFFIX),
        };

        source.with_file_name(file_name)
    }
}
