use super::keyword_regex;

use std::sync::OnceLock;

use regex::Regex;

const EXAMPLE_KEYWORDS: &str = "example|instance|case|sample|demonstrate";
const STEP_KEYWORDS: &str = "process|procedure|method|approach|steps|how";

/// Prompts longer than this many words get the examples line regardless.
const LONG_PROMPT_WORDS: usize = 15;

static EXAMPLE_REGEX: OnceLock<Regex> = OnceLock::new();
static STEP_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Complexity {
    pub needs_examples: bool,
    pub needs_steps: bool,
}

pub fn assess(prompt: &str) -> Complexity {
    let examples = EXAMPLE_REGEX.get_or_init(|| keyword_regex(EXAMPLE_KEYWORDS));
    let steps = STEP_REGEX.get_or_init(|| keyword_regex(STEP_KEYWORDS));

    Complexity {
        needs_examples: examples.is_match(prompt)
            || prompt.split_whitespace().count() > LONG_PROMPT_WORDS,
        needs_steps: steps.is_match(prompt),
    }
}
