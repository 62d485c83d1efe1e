/*!
 * Tests for subtitle loading and saving
 */

use anyhow::Result;

use crate::common;
use subtran::errors::SubtitleError;
use subtran::subtitle_processor::{SubtitleCollection, SubtitleEntry, SubtitleFormat};

#[test]
fn test_load_withSrtFile_shouldReadEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let collection = SubtitleCollection::load(&path)?;

    assert_eq!(collection.format, SubtitleFormat::Srt);
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.entries[0].lines, vec!["Hello"]);
    assert_eq!(collection.entries[1].start_time_ms, 3000);
    assert_eq!(collection.entries[1].end_time_ms, 4200);
    Ok(())
}

#[test]
fn test_load_withBomAndCrlf_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = format!("\u{feff}{}", common::HELLO_WORLD_SRT.replace('\n', "\r\n"));
    let path = common::create_test_file(temp_dir.path(), "windows.srt", &content)?;

    let collection = SubtitleCollection::load(&path)?;

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.entries[0].seq_num, 1);
    assert_eq!(collection.entries[1].lines, vec!["World"]);
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldReturnNotFound() {
    let result = SubtitleCollection::load("/definitely/not/here.srt");
    assert!(matches!(result, Err(SubtitleError::NotFound(_))));
}

#[test]
fn test_load_withUnknownContent_shouldReturnUnknownFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "notes.txt", "just some words\n")?;

    let result = SubtitleCollection::load(&path);

    assert!(matches!(result, Err(SubtitleError::UnknownFormat(_))));
    Ok(())
}

#[test]
fn test_load_withEmptySrt_shouldLoadZeroEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    let collection = SubtitleCollection::load(&path)?;

    assert!(collection.is_empty());
    Ok(())
}

#[test]
fn test_saveAndLoad_withSrt_shouldKeepTimingAndText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut collection = SubtitleCollection::new(temp_dir.path().join("source.srt"));
    collection.entries.push(SubtitleEntry::new(1, 0, 5000, "First subtitle"));
    collection.entries.push(SubtitleEntry::new(2, 5500, 10000, "Second\nsubtitle"));

    let path = temp_dir.path().join("out").join("saved.srt");
    collection.save(&path)?;
    let reloaded = SubtitleCollection::load(&path)?;

    assert_eq!(reloaded.entries, collection.entries);
    Ok(())
}

#[test]
fn test_saveAndLoad_withAss_shouldKeepHeaderAndEventFields() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "show.ass", common::HELLO_WORLD_ASS)?;

    let mut collection = SubtitleCollection::load(&path)?;
    assert_eq!(collection.format, SubtitleFormat::Ssa);
    collection.entries[0] = collection.entries[0].with_lines(vec!["Hola".to_string()]);

    let out = temp_dir.path().join("show_translated.ass");
    collection.save(&out)?;
    let saved = std::fs::read_to_string(&out)?;

    assert!(saved.starts_with("[Script Info]\nTitle: Test\n"));
    assert!(saved.contains("Style: Default,Arial,20"));
    assert!(saved.contains("Dialogue: 0,0:00:01.00,0:00:02.50,Default,Ann,0,0,0,,Hola\n"));
    assert!(saved.contains("Dialogue: 0,0:00:03.00,0:00:04.20,Default,Bob,0,0,0,,World\n"));
    Ok(())
}

#[test]
fn test_timestamps_shouldFormatBothStyles() {
    assert_eq!(SubtitleEntry::format_timestamp(3_723_456), "01:02:03,456");
    assert_eq!(SubtitleEntry::format_ssa_timestamp(3_723_450), "1:02:03.45");
    assert_eq!(SubtitleEntry::parse_ssa_timestamp("1:02:03.45"), Some(3_723_450));
}

#[test]
fn test_load_withTextlessSrtCaption_shouldKeepFollowingTimings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n\n3\n00:00:05,000 --> 00:00:06,000\nBye\n";
    let path = common::create_test_file(temp_dir.path(), "gap.srt", content)?;

    let collection = SubtitleCollection::load(&path)?;
    let out = temp_dir.path().join("gap_translated.srt");
    collection.save(&out)?;

    assert_eq!(
        std::fs::read_to_string(&out)?,
        "2\n00:00:03,000 --> 00:00:04,000\nWorld\n\n3\n00:00:05,000 --> 00:00:06,000\nBye\n\n"
    );
    Ok(())
}
