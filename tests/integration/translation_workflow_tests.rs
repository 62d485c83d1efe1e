/*!
 * Integration tests for complete translation runs
 */

use anyhow::Result;
use std::time::Duration;

use crate::common;
use subtran::app_config::Config;
use subtran::errors::AppError;
use subtran::file_utils::FileManager;
use subtran::providers::mock::MockProvider;
use subtran::subtitle_processor::{SubtitleCollection, SubtitleFormat};

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test]
async fn test_run_withHelloWorld_shouldWriteSpanishTranslation() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let target = FileManager::default_target_path(&source);
    let controller = common::quiet_controller(common::fast_config());
    let provider = MockProvider::working().with_responder(common::hello_world_responder);

    let summary = controller.run_with_provider(provider, &source, &target, never()).await?;

    assert_eq!(summary.captions, 2);
    assert_eq!(summary.target_path, temp_dir.path().join("movie_translated.srt"));
    let written = std::fs::read_to_string(&target)?;
    assert_eq!(
        written,
        "1\n00:00:01,000 --> 00:00:02,500\nHola\n\n2\n00:00:03,000 --> 00:00:04,200\nMundo\n\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withAssSource_shouldKeepFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "show.ass", common::HELLO_WORLD_ASS)?;
    let target = FileManager::default_target_path(&source);
    let controller = common::quiet_controller(common::fast_config());
    let provider = MockProvider::working().with_responder(common::hello_world_responder);

    controller.run_with_provider(provider, &source, &target, never()).await?;

    let translated = SubtitleCollection::load(&target)?;
    assert_eq!(translated.format, SubtitleFormat::Ssa);
    assert_eq!(translated.entries[0].lines, vec!["Hola"]);
    assert_eq!(translated.entries[1].lines, vec!["Mundo"]);
    assert_eq!(translated.entries[1].ssa_event.as_ref().unwrap().fields[4], "Bob");
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldWriteSourceUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let target = temp_dir.path().join("out.srt");
    let controller = common::quiet_controller(common::fast_config());

    controller.run_with_provider(MockProvider::failing(), &source, &target, never()).await?;

    let original = SubtitleCollection::load(&source)?;
    let translated = SubtitleCollection::load(&target)?;
    assert_eq!(translated.entries, original.entries);
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingSource_shouldFailBeforeContactingModel() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("missing.srt");
    let controller = common::quiet_controller(common::fast_config());
    let provider = MockProvider::working();

    let result = controller
        .run_with_provider(provider.clone(), &source, &temp_dir.path().join("out.srt"), never())
        .await;

    assert!(matches!(result, Err(AppError::SourceNotFound(_))));
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withNoCaptions_shouldReturnNoCaptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "empty.srt", "\n\n")?;
    let controller = common::quiet_controller(common::fast_config());

    let result = controller
        .run_with_provider(MockProvider::working(), &source, &temp_dir.path().join("out.srt"), never())
        .await;

    assert!(matches!(result, Err(AppError::NoCaptions(_))));
    Ok(())
}

#[tokio::test]
async fn test_run_withUnavailableModel_shouldReturnModelUnavailable() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::quiet_controller(common::fast_config());
    let provider = MockProvider::working().with_missing_model();

    let result = controller
        .run_with_provider(provider, &source, &temp_dir.path().join("out.srt"), never())
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, AppError::ModelUnavailable(_)));
    assert_eq!(error.exit_code(), 5);
    Ok(())
}

#[tokio::test]
async fn test_run_whenCancelled_shouldNotWritePartialOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let target = temp_dir.path().join("out.srt");
    let controller = common::quiet_controller(common::fast_config());

    let cancel = tokio::time::sleep(Duration::from_millis(50));
    let result = controller
        .run_with_provider(MockProvider::slow(10_000), &source, &target, cancel)
        .await;

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert!(!target.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_whenRunTimeoutExpires_shouldNotWritePartialOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let target = temp_dir.path().join("out.srt");
    let config = Config {
        run_timeout_secs: 1,
        ..common::fast_config()
    };
    let controller = common::quiet_controller(config);

    let result = controller
        .run_with_provider(MockProvider::slow(10_000), &source, &target, never())
        .await;

    assert!(matches!(result, Err(AppError::Timeout(d)) if d == Duration::from_secs(1)));
    assert!(!target.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_whenModelCheckStalls_shouldHitRunTimeout() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let target = temp_dir.path().join("out.srt");
    let config = Config {
        run_timeout_secs: 1,
        ..common::fast_config()
    };
    let controller = common::quiet_controller(config);
    let provider = MockProvider::working().with_model_check_delay(10_000);

    let result = controller
        .run_with_provider(provider.clone(), &source, &target, never())
        .await;

    assert!(matches!(result, Err(AppError::Timeout(d)) if d == Duration::from_secs(1)));
    assert_eq!(provider.request_count(), 0);
    assert!(!target.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_whenCancelledDuringModelCheck_shouldReturnCancelled() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let target = temp_dir.path().join("out.srt");
    let controller = common::quiet_controller(common::fast_config());
    let provider = MockProvider::working().with_model_check_delay(10_000);

    let cancel = tokio::time::sleep(Duration::from_millis(50));
    let result = controller.run_with_provider(provider, &source, &target, cancel).await;

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert!(!target.exists());
    Ok(())
}
