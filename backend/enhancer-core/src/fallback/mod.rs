//! Deterministic, offline enhancement used when the backend deployment
//! cannot get an answer from the provider.
//!
//! The prompt is classified by whole-word keyword tables (domain, then
//! intent), then a fixed section template is filled from the matching
//! profiles. Classification never fails: unmatched prompts use the general
//! profiles.

pub mod complexity;
pub mod domain;
pub mod intent;

pub use complexity::Complexity;
pub use domain::DomainProfile;
pub use intent::IntentProfile;

use std::fmt::Write;

use regex::Regex;

const QUALITY_STANDARDS: [&str; 4] = [
    "Provide comprehensive, accurate information",
    "Use clear, professional language",
    "Include relevant examples or details",
    "Ensure practical, actionable insights",
];
const EXAMPLES_STANDARD: &str = "Include specific examples to illustrate key points";
const STEPS_STANDARD: &str = "Break down complex processes into clear steps";

/// Render the structured fallback prompt for `prompt`.
pub fn generate(prompt: &str) -> String {
    let domain = domain::classify(prompt);
    let intent = intent::classify(prompt);
    let complexity = complexity::assess(prompt);

    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        out,
        "**ROLE**: You are {} with deep expertise in {}.\n\n",
        domain.expert_role, domain.domain
    );
    let _ = write!(out, "**OBJECTIVE**: {}\n\n", intent.objective);

    out.push_str("**REQUIREMENTS**:\n");
    push_bullets(&mut out, &intent.requirements);
    out.push('\n');

    let _ = write!(out, "**TASK**: {}\n\n", intent.task(prompt));

    out.push_str("**OUTPUT FORMAT**:\n");
    push_bullets(&mut out, &domain.output_specs);
    out.push('\n');

    out.push_str("**QUALITY STANDARDS**:\n");
    push_bullets(&mut out, &QUALITY_STANDARDS);
    if complexity.needs_examples {
        push_bullets(&mut out, &[EXAMPLES_STANDARD]);
    }
    if complexity.needs_steps {
        push_bullets(&mut out, &[STEPS_STANDARD]);
    }

    out
}

fn push_bullets(out: &mut String, lines: &[&str]) {
    for line in lines {
        out.push_str("• ");
        out.push_str(line);
        out.push('\n');
    }
}

/// Case-insensitive whole-word alternation over `keywords` (`a|b|c`).
fn keyword_regex(keywords: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{keywords})\b")).expect("valid regex pattern")
}

fn compile_rules(tables: &[&str]) -> Vec<Regex> {
    tables.iter().map(|keywords| keyword_regex(keywords)).collect()
}

fn first_match<T>(
    prompt: &str,
    rules: &[Regex],
    profiles: &'static [T],
    default: &'static T,
) -> &'static T {
    rules
        .iter()
        .zip(profiles)
        .find(|(rule, _)| rule.is_match(prompt))
        .map(|(_, profile)| profile)
        .unwrap_or(default)
}
