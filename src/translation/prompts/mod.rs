/*!
 * Prompt builders for subtitle translation.
 *
 * Four phrasings are available. The primary one carries previously
 * translated lines as context; the alternates are context-free rewordings
 * tried in order when the primary attempt yields nothing usable.
 */

use serde_json::{Value, json};
use std::fmt;

use crate::subtitle_processor::SubtitleEntry;

/// Source and target language names used in prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLanguages {
    /// Display name of the language being translated from
    pub source: String,
    /// Display name of the language being translated to
    pub target: String,
}

impl PromptLanguages {
    /// Create a language pair
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Context-free rewording tried after the primary prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeStrategy {
    /// Numbered list of lines
    Numbered,
    /// Bare lines with a strict output instruction
    PlainLines,
    /// Professional translator persona with dashed lines
    Professional,
}

/// Prompt phrasing used for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStrategy {
    /// Context-aware single line prompt
    Primary,
    Alternative(AlternativeStrategy),
}

impl fmt::Display for AlternativeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numbered => "alternative 1 (numbered)",
            Self::PlainLines => "alternative 2 (plain lines)",
            Self::Professional => "alternative 3 (professional)",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Alternative(alternative) => alternative.fmt(f),
        }
    }
}

/// One rung of the retry ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDescriptor {
    pub strategy: PromptStrategy,
    /// Whether the context window is passed to the prompt
    pub uses_context: bool,
}

/// Strategies in the order they are attempted for each caption
pub const STRATEGY_LADDER: [StrategyDescriptor; 4] = [
    StrategyDescriptor {
        strategy: PromptStrategy::Primary,
        uses_context: true,
    },
    StrategyDescriptor {
        strategy: PromptStrategy::Alternative(AlternativeStrategy::Numbered),
        uses_context: false,
    },
    StrategyDescriptor {
        strategy: PromptStrategy::Alternative(AlternativeStrategy::PlainLines),
        uses_context: false,
    },
    StrategyDescriptor {
        strategy: PromptStrategy::Alternative(AlternativeStrategy::Professional),
        uses_context: false,
    },
];

/// JSON schema the model must follow: `{"translation": "..."}`
pub fn translation_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "translation": {
                "type": "string",
                "description": "Translation"
            }
        },
        "required": ["translation"]
    })
}

/// Build the context-aware prompt for one caption
///
/// # Arguments
/// * `languages` - Source and target language names
/// * `caption` - The caption to translate; its lines are joined with spaces
/// * `context` - Previously translated captions, oldest first
pub fn build_primary_prompt(languages: &PromptLanguages, caption: &SubtitleEntry, context: &[String]) -> String {
    let mut prompt = String::new();

    if context.is_empty() {
        prompt.push_str(&format!(
            "Translate the following subtitle line from {} to {}.\n",
            languages.source, languages.target
        ));
        prompt.push_str("Use natural and fluent language while maintaining the original style and tone.\n\n");
    } else {
        prompt.push_str(&format!(
            "Previous successfully translated lines in {} (for context):\n",
            languages.target
        ));
        for (i, line) in context.iter().enumerate() {
            prompt.push_str(&format!("Line {}: {}\n", i + 1, line));
        }
        prompt.push('\n');
        prompt.push_str(&format!(
            "Based on the above context, translate the following subtitle line from {} to {}.\n",
            languages.source, languages.target
        ));
        prompt.push_str(
            "Maintain consistency with previous translations, same style and tone, ensuring the translation flows naturally.\n\n",
        );
    }

    prompt.push_str(&format!("Line to translate: {}\n", caption.single_line_text()));
    prompt
}

/// Build a context-free prompt listing every caption
pub fn build_alternative_prompt(
    languages: &PromptLanguages,
    strategy: AlternativeStrategy,
    captions: &[SubtitleEntry],
) -> String {
    let mut prompt = match strategy {
        AlternativeStrategy::Numbered => format!(
            "Translate each of these lines from {} to {}:\n\n",
            languages.source, languages.target
        ),
        AlternativeStrategy::PlainLines => format!(
            "Translate the following {} text to {}. Return ONLY the translated text, one subtitle per line:\n\n",
            languages.source, languages.target
        ),
        AlternativeStrategy::Professional => format!(
            "You are a professional subtitle translator. Translate the following {} subtitles to {}. \
             Your response should contain ONLY the translated subtitles, one per line:\n\n",
            languages.source, languages.target
        ),
    };

    for (i, caption) in captions.iter().enumerate() {
        let text = caption.single_line_text();
        let line = match strategy {
            AlternativeStrategy::Numbered => format!("{}. {}\n", i + 1, text),
            AlternativeStrategy::PlainLines => format!("{}\n", text),
            AlternativeStrategy::Professional => format!("- {}\n", text),
        };
        prompt.push_str(&line);
    }

    prompt
}

/// Build the prompt for one rung of the ladder
pub fn build_prompt(
    languages: &PromptLanguages,
    descriptor: StrategyDescriptor,
    caption: &SubtitleEntry,
    context: &[String],
) -> String {
    match descriptor.strategy {
        PromptStrategy::Primary => {
            let context = if descriptor.uses_context { context } else { &[] };
            build_primary_prompt(languages, caption, context)
        }
        PromptStrategy::Alternative(strategy) => {
            build_alternative_prompt(languages, strategy, std::slice::from_ref(caption))
        }
    }
}
