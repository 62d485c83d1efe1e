/*!
 * Sequential caption translator.
 *
 * Captions are translated one at a time. Each caption walks the strategy
 * ladder until an attempt produces an aligned translation; when every
 * strategy fails the original text is kept so the output always has one
 * entry per source caption.
 */

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::translation::alignment::align_response;
use crate::translation::context::{ContextWindow, DEFAULT_CONTEXT_SIZE};
use crate::translation::progress::ProgressSnapshot;
use crate::translation::prompts::{
    PromptLanguages, STRATEGY_LADDER, StrategyDescriptor, build_prompt, translation_output_schema,
};

/// Default timeout for one model call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default pause after a failed alternate attempt
pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_millis(500);

/// Structured model output
#[derive(Debug, Deserialize)]
struct TranslationOutput {
    translation: String,
}

/// Translates a caption collection line by line through one provider
#[derive(Debug)]
pub struct SequentialTranslator<P: Provider> {
    /// Model backend
    provider: P,
    /// Language names used in prompts
    languages: PromptLanguages,
    /// Timeout applied to each model call
    request_timeout: Duration,
    /// Pause after each failed alternate attempt
    retry_pause: Duration,
    /// Maximum number of previous captions given as context
    context_size: usize,
    /// Schema sent with every request
    output_schema: Value,
}

impl<P: Provider> SequentialTranslator<P> {
    /// Create a translator with default timing and context settings
    pub fn new(provider: P, languages: PromptLanguages) -> Self {
        Self {
            provider,
            languages,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_pause: DEFAULT_RETRY_PAUSE,
            context_size: DEFAULT_CONTEXT_SIZE,
            output_schema: translation_output_schema(),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_retry_pause(mut self, retry_pause: Duration) -> Self {
        self.retry_pause = retry_pause;
        self
    }

    pub fn with_context_size(mut self, context_size: usize) -> Self {
        self.context_size = context_size;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn languages(&self) -> &PromptLanguages {
        &self.languages
    }

    /// Translate every caption of `source` into a new collection
    ///
    /// The result has the same length, timing and format as `source` and is
    /// bound to `target_path`. Progress is published after each caption.
    /// Dropping the returned future abandons the run; nothing is written.
    pub async fn translate(
        &self,
        source: &SubtitleCollection,
        target_path: PathBuf,
        progress: &watch::Sender<ProgressSnapshot>,
    ) -> SubtitleCollection {
        let total = source.len();
        let mut target = source.empty_like(target_path);
        progress.send_replace(ProgressSnapshot::start(total));

        for (index, caption) in source.entries.iter().enumerate() {
            let context = ContextWindow::from_translated(&target.entries, index, self.context_size);
            let translated = self.translate_caption(index, caption, &context).await;
            target.entries.push(translated);

            progress.send_replace(ProgressSnapshot {
                completed: index + 1,
                total,
            });
        }

        target
    }

    /// Translate one caption, falling back to its original text
    pub async fn translate_caption(&self, index: usize, caption: &SubtitleEntry, context: &ContextWindow) -> SubtitleEntry {
        for (rung, descriptor) in STRATEGY_LADDER.iter().enumerate() {
            match self.attempt(*descriptor, caption, context.entries()).await {
                Ok(aligned) => {
                    if let Some(entry) = aligned.into_iter().next() {
                        debug!("Line {}: translated with {} strategy", index + 1, descriptor.strategy);
                        return entry;
                    }
                }
                Err(e) => {
                    warn!("Line {}: {} strategy failed: {}", index + 1, descriptor.strategy, e);
                    if rung > 0 && !self.retry_pause.is_zero() {
                        tokio::time::sleep(self.retry_pause).await;
                    }
                }
            }
        }

        info!("Line {}: every strategy failed, keeping the original text", index + 1);
        caption.clone()
    }

    /// Run one strategy against one caption
    pub async fn attempt(
        &self,
        descriptor: StrategyDescriptor,
        caption: &SubtitleEntry,
        context: &[String],
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let prompt = build_prompt(&self.languages, descriptor, caption, context);

        let response = tokio::time::timeout(self.request_timeout, self.provider.chat(&prompt, Some(&self.output_schema)))
            .await
            .map_err(|_| TranslationError::Timeout(self.request_timeout))??;

        let translation = Self::decode_translation(&response)?;
        let aligned = align_response(&translation, std::slice::from_ref(caption));
        if aligned.is_empty() {
            return Err(TranslationError::NoAlignedLines);
        }

        Ok(aligned)
    }

    /// Extract the translation text from a structured response
    fn decode_translation(response: &str) -> Result<String, TranslationError> {
        match serde_json::from_str::<TranslationOutput>(response.trim()) {
            Ok(output) if !output.translation.trim().is_empty() => Ok(output.translation),
            Ok(_) => Err(TranslationError::EmptyResponse),
            Err(e) => {
                debug!("Undecodable model response ({}): {}", e, response.chars().take(200).collect::<String>());
                Err(TranslationError::EmptyResponse)
            }
        }
    }
}
