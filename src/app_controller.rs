use log::{debug, info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::app_config::Config;
use crate::errors::{AppError, SubtitleError};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::ollama::Ollama;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{ProgressReporter, ProgressSnapshot, PromptLanguages, SequentialTranslator};

// @module: Application controller for subtitle translation

/// Fallback name when no source language is given
const DEFAULT_SOURCE_LANGUAGE: &str = "English";

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Where the translation was written
    pub target_path: PathBuf,
    /// Number of captions written
    pub captions: usize,
    /// Wall time of the translation loop
    pub duration: Duration,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Resolved language names for prompts
    languages: PromptLanguages,
    // @field: Whether the progress bar is drawn
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;

        let languages = PromptLanguages::new(
            language_utils::resolve_language_name(&config.source_language, DEFAULT_SOURCE_LANGUAGE),
            language_utils::resolve_language_name(&config.target_language, &config.target_language),
        );

        Ok(Self {
            config,
            languages,
            show_progress: true,
        })
    }

    /// Enable or disable the progress bar
    pub fn with_progress_display(mut self, visible: bool) -> Self {
        self.show_progress = visible;
        self
    }

    pub fn languages(&self) -> &PromptLanguages {
        &self.languages
    }

    /// Build the Ollama client described by the configuration
    pub fn create_provider(&self) -> Ollama {
        let provider = Ollama::new(&self.config.endpoint, &self.config.model, self.config.request_timeout());
        match self.config.temperature {
            Some(temperature) => provider.with_temperature(temperature),
            None => provider,
        }
    }

    /// Translate `source` into `target` with the configured Ollama model
    ///
    /// Ctrl-C cancels the run. Nothing is written unless every caption was
    /// processed.
    pub async fn run(&self, source: PathBuf, target: Option<PathBuf>) -> Result<RunSummary, AppError> {
        let target = target.unwrap_or_else(|| FileManager::default_target_path(&source));
        let provider = self.create_provider();
        self.run_with_provider(provider, &source, &target, shutdown_signal()).await
    }

    /// Run the whole workflow against any provider
    ///
    /// `cancel` completing aborts the run with `AppError::Cancelled`. The run
    /// timeout covers the model check as well as the translation.
    pub async fn run_with_provider<P, C>(
        &self,
        provider: P,
        source: &Path,
        target: &Path,
        cancel: C,
    ) -> Result<RunSummary, AppError>
    where
        P: Provider,
        C: Future<Output = ()>,
    {
        if !FileManager::file_exists(source) {
            return Err(AppError::SourceNotFound(source.to_path_buf()));
        }

        info!(
            "Translating {:?} from {} to {} with model {}",
            source,
            self.languages.source,
            self.languages.target,
            provider.model()
        );

        let run_timeout = self.config.run_timeout();
        let deadline = tokio::time::Instant::now() + run_timeout;
        tokio::pin!(cancel);

        tokio::select! {
            result = tokio::time::timeout_at(deadline, provider.ensure_model_available()) => match result {
                Ok(checked) => checked.map_err(AppError::ModelUnavailable)?,
                Err(_) => return Err(AppError::Timeout(run_timeout)),
            },
            _ = &mut cancel => return Err(AppError::Cancelled),
        }

        let subtitles = SubtitleCollection::load(source).map_err(|e| match e {
            SubtitleError::NotFound(path) => AppError::SourceNotFound(path),
            other => AppError::Load(other),
        })?;
        if subtitles.is_empty() {
            return Err(AppError::NoCaptions(source.to_path_buf()));
        }
        debug!("Loaded {} {} captions", subtitles.len(), subtitles.format);

        let translator = SequentialTranslator::new(provider, self.languages.clone())
            .with_request_timeout(self.config.request_timeout())
            .with_retry_pause(self.config.retry_pause())
            .with_context_size(self.config.context_window_size);

        let (progress_tx, progress_rx) = watch::channel(ProgressSnapshot::start(subtitles.len()));
        let reporter = ProgressReporter::spawn(progress_rx, self.config.progress_interval(), self.show_progress);

        let start_time = Instant::now();
        let outcome = tokio::select! {
            result = tokio::time::timeout_at(
                deadline,
                translator.translate(&subtitles, target.to_path_buf(), &progress_tx),
            ) => result.map_err(|_| AppError::Timeout(run_timeout)),
            _ = &mut cancel => Err(AppError::Cancelled),
        };
        drop(progress_tx);
        let last = reporter.finish().await;
        let duration = start_time.elapsed();

        let translated = match outcome {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Stopped after {}/{} lines, no output written", last.completed, last.total);
                return Err(e);
            }
        };

        translated.save(target).map_err(AppError::Save)?;

        info!(
            "Translated {} lines in {}, saved to {:?}",
            translated.len(),
            Self::format_duration(duration),
            target
        );

        Ok(RunSummary {
            target_path: target.to_path_buf(),
            captions: translated.len(),
            duration,
        })
    }

    /// Human readable duration
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
