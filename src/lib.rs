/*!
 * # subtran - Sequential subtitle translation with a local LLM
 *
 * A Rust library for translating subtitle files one caption at a time
 * through an Ollama model.
 *
 * ## Features
 *
 * - SRT and SSA/ASS loading and saving with timings preserved
 * - Context from the three previous translations in the primary prompt
 * - Fallback through three alternative prompt phrasings, then the original text
 * - Structured `{"translation": ...}` output requested from the model
 * - Periodic progress display
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle file handling
 * - `translation`: Caption translation:
 *   - `translation::core`: Sequential translator and retry ladder
 *   - `translation::prompts`: Prompt phrasings
 *   - `translation::context`: Previous-translation window
 *   - `translation::alignment`: Model output alignment
 *   - `translation::progress`: Progress snapshots and display
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Model backends:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use language_utils::{get_language_name, resolve_language_name};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::SequentialTranslator;
