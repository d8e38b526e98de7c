use super::{compile_rules, first_match};

use std::sync::OnceLock;

use regex::Regex;

/// Expert persona used when the prompt falls into a subject area.
#[derive(Debug, PartialEq, Eq)]
pub struct DomainProfile {
    pub name: &'static str,
    pub expert_role: &'static str,
    pub domain: &'static str,
    pub output_specs: [&'static str; 4],
}

/// Scanned in order; the first table whose keywords hit wins.
const DOMAIN_KEYWORDS: [&str; 5] = [
    "code|program|script|function|algorithm|debug|software|app|website|database",
    "write|article|blog|content|essay|story|copy|marketing|email",
    "business|strategy|plan|analysis|market|revenue|growth|management",
    "design|ui|ux|creative|visual|graphics|layout|brand",
    "data|analytics|statistics|analysis|research|insights|metrics",
];

static DOMAIN_PROFILES: [DomainProfile; 5] = [
    DomainProfile {
        name: "programming",
        expert_role: "a senior software engineer and technical architect",
        domain: "software development, programming, and technical solutions",
        output_specs: [
            "Provide clean, well-commented code examples",
            "Explain the logic and approach clearly",
            "Include best practices and potential optimizations",
            "Mention relevant tools, libraries, or frameworks",
        ],
    },
    DomainProfile {
        name: "writing",
        expert_role: "a professional content strategist and skilled writer",
        domain: "content creation, communication, and audience engagement",
        output_specs: [
            "Structure content with clear headings and flow",
            "Use engaging, audience-appropriate tone",
            "Include compelling hooks and calls-to-action",
            "Optimize for readability and impact",
        ],
    },
    DomainProfile {
        name: "business",
        expert_role: "a seasoned business consultant and strategic advisor",
        domain: "business strategy, operations, and organizational development",
        output_specs: [
            "Provide data-driven insights and recommendations",
            "Include actionable next steps",
            "Consider market dynamics and competitive factors",
            "Address potential risks and mitigation strategies",
        ],
    },
    DomainProfile {
        name: "design",
        expert_role: "a creative design director and user experience specialist",
        domain: "design thinking, visual communication, and user experience",
        output_specs: [
            "Focus on user-centered design principles",
            "Consider visual hierarchy and accessibility",
            "Provide specific design recommendations",
            "Include relevant design trends and best practices",
        ],
    },
    DomainProfile {
        name: "data",
        expert_role: "a data scientist and analytics expert",
        domain: "data analysis, statistical modeling, and business intelligence",
        output_specs: [
            "Use data-driven approaches and methodologies",
            "Provide statistical context and significance",
            "Include visualization recommendations",
            "Explain analytical assumptions and limitations",
        ],
    },
];

pub static GENERAL_DOMAIN: DomainProfile = DomainProfile {
    name: "general",
    expert_role: "a knowledgeable professional consultant",
    domain: "cross-functional expertise and problem-solving",
    output_specs: [
        "Provide comprehensive, well-researched information",
        "Use clear, professional communication",
        "Include practical examples and applications",
        "Ensure accuracy and relevance",
    ],
};

static DOMAIN_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

pub fn classify(prompt: &str) -> &'static DomainProfile {
    let rules = DOMAIN_REGEXES.get_or_init(|| compile_rules(&DOMAIN_KEYWORDS));
    first_match(prompt, rules, &DOMAIN_PROFILES, &GENERAL_DOMAIN)
}
