/*!
 * Tests for prompt building, context windows and response alignment
 */

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

use crate::common;
use subtran::providers::mock::{MockProvider, MockReply};
use subtran::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use subtran::translation::alignment::align_response;
use subtran::translation::prompts::{build_alternative_prompt, build_primary_prompt};
use subtran::translation::{
    AlternativeStrategy, ContextWindow, ProgressSnapshot, PromptLanguages, PromptStrategy, STRATEGY_LADDER,
    SequentialTranslator,
};

fn languages() -> PromptLanguages {
    PromptLanguages::new("English", "Español neutro")
}

fn collection(texts: &[&str]) -> SubtitleCollection {
    let mut collection = SubtitleCollection::new(PathBuf::from("source.srt"));
    collection.entries = texts
        .iter()
        .enumerate()
        .map(|(i, text)| SubtitleEntry::new(i + 1, 2000 * i as u64, 2000 * i as u64 + 1500, text))
        .collect();
    collection
}

#[test]
fn test_primaryPrompt_shouldJoinCaptionLinesWithSpaces() {
    let caption = SubtitleEntry::new(1, 0, 1000, "Where are\nyou going?");
    let prompt = build_primary_prompt(&languages(), &caption, &[]);

    assert!(prompt.contains("from English to Español neutro"));
    assert!(prompt.ends_with("Line to translate: Where are you going?\n"));
}

#[test]
fn test_alternativePrompt_withSingleCaption_shouldListOnlyThatCaption() {
    let caption = SubtitleEntry::new(1, 0, 1000, "Hello\nthere");
    let prompt = build_alternative_prompt(&languages(), AlternativeStrategy::Numbered, std::slice::from_ref(&caption));

    assert_eq!(prompt, "Translate each of these lines from English to Español neutro:\n\n1. Hello there\n");
}

#[test]
fn test_strategyLadder_shouldFollowFixedOrder() {
    let order: Vec<PromptStrategy> = STRATEGY_LADDER.iter().map(|d| d.strategy).collect();
    assert_eq!(
        order,
        vec![
            PromptStrategy::Primary,
            PromptStrategy::Alternative(AlternativeStrategy::Numbered),
            PromptStrategy::Alternative(AlternativeStrategy::PlainLines),
            PromptStrategy::Alternative(AlternativeStrategy::Professional)
        ]
    );
}

#[test]
fn test_contextWindow_shouldReadFromTranslatedEntries() {
    let target = collection(&["Hola", "", "Mundo", "Adiós"]);

    let window = ContextWindow::from_translated(&target.entries, 3, 3);

    assert_eq!(window.entries(), &["Hola", "Mundo"]);
}

#[test]
fn test_alignResponse_withMultipleOriginals_shouldMapByIndex() {
    let originals = collection(&["One", "Two", "Three"]).entries;

    let aligned = align_response("Uno\nDos", &originals);

    assert_eq!(aligned.len(), 3);
    assert_eq!(aligned[0].lines, vec!["Uno"]);
    assert_eq!(aligned[1].lines, vec!["Dos"]);
    assert_eq!(aligned[2], originals[2]);
}

#[tokio::test]
async fn test_translator_withExhaustedLadder_shouldPublishProgressForEveryLine() {
    let translator = SequentialTranslator::new(MockProvider::failing(), languages()).with_retry_pause(Duration::ZERO);
    let source = collection(&["One", "Two", "Three"]);
    let (tx, mut rx) = watch::channel(ProgressSnapshot::default());

    let target = translator.translate(&source, PathBuf::from("out.srt"), &tx).await;

    assert_eq!(target.entries, source.entries);
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), ProgressSnapshot { completed: 3, total: 3 });
}

#[tokio::test]
async fn test_translator_withFallbackLine_shouldUseItAsContext() {
    // First caption exhausts the ladder, second succeeds on its primary prompt
    let provider = MockProvider::scripted(vec![
        MockReply::Error,
        MockReply::Error,
        MockReply::Error,
        MockReply::Error,
        MockReply::Content(MockProvider::structured("Mundo")),
    ]);
    let translator = SequentialTranslator::new(provider, languages()).with_retry_pause(Duration::ZERO);
    let source = collection(&["Hello", "World"]);
    let (tx, _rx) = watch::channel(ProgressSnapshot::default());

    let target = translator.translate(&source, PathBuf::from("out.srt"), &tx).await;

    assert_eq!(target.entries[0].lines, vec!["Hello"]);
    assert_eq!(target.entries[1].lines, vec!["Mundo"]);
    assert!(translator.provider().prompts()[4].contains("Line 1: Hello\n"));
}

#[tokio::test]
async fn test_translator_withZeroContextSize_shouldNeverSendContext() {
    let provider = MockProvider::working().with_responder(common::hello_world_responder);
    let translator = SequentialTranslator::new(provider, languages()).with_context_size(0);
    let source = collection(&["Hello", "World"]);
    let (tx, _rx) = watch::channel(ProgressSnapshot::default());

    translator.translate(&source, PathBuf::from("out.srt"), &tx).await;

    assert!(translator.provider().prompts().iter().all(|p| !p.contains("for context")));
}

#[test]
fn test_translator_shouldRunUnderBlockingExecutor() {
    let translator = SequentialTranslator::new(
        MockProvider::working().with_responder(common::hello_world_responder),
        languages(),
    );
    let caption = SubtitleEntry::new(1, 0, 1000, "Hello");

    let entry = tokio_test::block_on(translator.translate_caption(0, &caption, &ContextWindow::default()));

    assert_eq!(entry.lines, vec!["Hola"]);
}
