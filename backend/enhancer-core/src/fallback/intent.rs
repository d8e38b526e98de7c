use super::{compile_rules, first_match};

use std::sync::OnceLock;

use regex::Regex;

/// What the user is trying to get done, and how to ask for it.
#[derive(Debug, PartialEq, Eq)]
pub struct IntentProfile {
    pub name: &'static str,
    pub objective: &'static str,
    /// Lead-in for the TASK line; the quoted prompt follows it.
    pub task_lead: &'static str,
    pub requirements: [&'static str; 5],
}

impl IntentProfile {
    pub fn task(&self, prompt: &str) -> String {
        format!("{}: \"{prompt}\"", self.task_lead)
    }
}

const INTENT_KEYWORDS: [&str; 4] = [
    "how to|how do|tutorial|guide|steps|learn|teach",
    "explain|what is|why|analyze|compare|difference|understand",
    "create|generate|make|build|develop|design|write",
    "solve|fix|troubleshoot|debug|resolve|issue|problem",
];

static INTENT_PROFILES: [IntentProfile; 4] = [
    IntentProfile {
        name: "how-to",
        objective: "Provide comprehensive guidance and step-by-step instructions",
        task_lead: "Create a detailed, actionable guide that addresses",
        requirements: [
            "Break down the process into clear, sequential steps",
            "Explain the reasoning behind each step",
            "Include prerequisites and preparation needed",
            "Provide troubleshooting tips for common issues",
            "Suggest additional resources for further learning",
        ],
    },
    IntentProfile {
        name: "explanation",
        objective: "Provide comprehensive explanation and analytical insights",
        task_lead: "Deliver a thorough, well-structured explanation of",
        requirements: [
            "Define key concepts and terminology clearly",
            "Provide relevant background and context",
            "Use examples to illustrate complex points",
            "Address common misconceptions or confusion",
            "Connect to broader implications or applications",
        ],
    },
    IntentProfile {
        name: "creation",
        objective: "Create original, high-quality content or solutions",
        task_lead: "Develop comprehensive, original material for",
        requirements: [
            "Ensure originality and creativity in the approach",
            "Consider multiple perspectives or alternatives",
            "Include detailed specifications and requirements",
            "Provide rationale for design/creative decisions",
            "Suggest ways to iterate and improve the output",
        ],
    },
    IntentProfile {
        name: "problem-solving",
        objective: "Provide systematic problem-solving approach and solutions",
        task_lead: "Systematically address and resolve",
        requirements: [
            "Identify the root cause of the issue",
            "Provide multiple potential solutions",
            "Rank solutions by effectiveness and feasibility",
            "Include prevention strategies for the future",
            "Explain the logic behind recommended approaches",
        ],
    },
];

pub static GENERAL_INTENT: IntentProfile = IntentProfile {
    name: "general",
    objective: "Provide comprehensive, professional assistance",
    task_lead: "Address comprehensively",
    requirements: [
        "Provide thorough, accurate information",
        "Structure the response logically",
        "Include relevant examples and context",
        "Ensure practical applicability",
        "Maintain professional quality throughout",
    ],
};

static INTENT_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

pub fn classify(prompt: &str) -> &'static IntentProfile {
    let rules = INTENT_REGEXES.get_or_init(|| compile_rules(&INTENT_KEYWORDS));
    first_match(prompt, rules, &INTENT_PROFILES, &GENERAL_INTENT)
}
