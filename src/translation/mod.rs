/*!
 * Subtitle translation through a language model.
 *
 * - `core`: Sequential translator and its strategy ladder
 * - `prompts`: Prompt phrasings and the ladder definition
 * - `context`: Sliding window of previous translations
 * - `alignment`: Mapping of model output onto captions
 * - `progress`: Progress snapshots and their display
 */

// Re-export main types for easier usage
pub use self::context::ContextWindow;
pub use self::core::SequentialTranslator;
pub use self::progress::{ProgressReporter, ProgressSnapshot};
pub use self::prompts::{AlternativeStrategy, PromptLanguages, PromptStrategy, STRATEGY_LADDER, StrategyDescriptor};

// Submodules
pub mod alignment;
pub mod context;
pub mod core;
pub mod progress;
pub mod prompts;
