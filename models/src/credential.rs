use common::RedactedSecret;

use std::sync::OnceLock;

use regex::Regex;

/// Redemption codes minted by the backend: short, upper-case alphanumeric.
const REDEMPTION_CODE_PATTERN: &str = r"^[A-Z0-9]{6,12}$";

static REDEMPTION_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn redemption_code_regex() -> &'static Regex {
    REDEMPTION_CODE_REGEX
        .get_or_init(|| Regex::new(REDEMPTION_CODE_PATTERN).expect("valid regex pattern"))
}

/// What the caller presents to be allowed to enhance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Vendor-issued bearer token, sent straight to the provider.
    ApiKey(RedactedSecret),
    /// Backend-issued code tied to a credit balance.
    RedemptionCode(RedactedSecret),
}

impl Credential {
    /// Classify user input from the "API key or code" field.
    ///
    /// Returns `None` for blank input.
    pub fn parse(input: &str) -> Option<Credential> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if redemption_code_regex().is_match(trimmed) {
            Some(Credential::RedemptionCode(RedactedSecret::new(trimmed)))
        } else {
            Some(Credential::ApiKey(RedactedSecret::new(trimmed)))
        }
    }

    pub fn secret(&self) -> &RedactedSecret {
        match self {
            Credential::ApiKey(secret) | Credential::RedemptionCode(secret) => secret,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
            Credential::RedemptionCode(_) => "redemption_code",
        }
    }

    pub fn is_redemption_code(&self) -> bool {
        matches!(self, Credential::RedemptionCode(_))
    }
}
