use crate::ModelError;

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Role used in the rendered template when the user left the field empty.
pub const DEFAULT_ROLE_FALLBACK: &str = "AI Assistant";

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// Generates `as_str`, `Display` and a strict `FromStr` for a settings enum.
macro_rules! settings_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            #[track_caller]
            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == normalized)
                    .ok_or_else(|| ModelError::Validation {
                        message: format!("Invalid {}: {value}", $label),
                        location: ErrorLocation::from(Location::caller()),
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Description {
    Detailed,
    Summary,
    Creative,
}

impl Default for Description {
    fn default() -> Self {
        Description::Detailed
    }
}

settings_enum!(Description, "description", {
    Detailed => "detailed",
    Summary => "summary",
    Creative => "creative",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    Medium,
    Long,
}

impl Default for Length {
    fn default() -> Self {
        Length::Medium
    }
}

settings_enum!(Length, "length", {
    Short => "short",
    Medium => "medium",
    Long => "long",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Structured,
    Paragraph,
    StepByStep,
    Creative,
}

impl Default for Format {
    fn default() -> Self {
        Format::Structured
    }
}

settings_enum!(Format, "format", {
    Structured => "structured",
    Paragraph => "paragraph",
    StepByStep => "stepbystep",
    Creative => "creative",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Helpful,
    Professional,
    Casual,
    Technical,
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Helpful
    }
}

settings_enum!(Tone, "tone", {
    Helpful => "helpful",
    Professional => "professional",
    Casual => "casual",
    Technical => "technical",
});

// ============================================
// SETTINGS
// ============================================

/// The five enhancement parameters persisted across sessions.
///
/// Container-level `serde(default)` merges a partially stored object with
/// the defaults, so a read never yields a missing field. A stored value
/// outside the known set also reads as the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnhancementSettings {
    #[serde(deserialize_with = "default_if_unknown")]
    pub role: String,
    #[serde(deserialize_with = "default_if_unknown")]
    pub description: Description,
    #[serde(deserialize_with = "default_if_unknown")]
    pub length: Length,
    #[serde(deserialize_with = "default_if_unknown")]
    pub format: Format,
    #[serde(deserialize_with = "default_if_unknown")]
    pub tone: Tone,
}

fn default_if_unknown<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Stored::deserialize(deserializer)? {
        Stored::Text(text) => text.parse().unwrap_or_default(),
        Stored::Other(_) => T::default(),
    })
}

impl EnhancementSettings {
    /// Role text for the template, falling back to [`DEFAULT_ROLE_FALLBACK`].
    pub fn role_or_default(&self) -> &str {
        let role = self.role.trim();
        if role.is_empty() {
            DEFAULT_ROLE_FALLBACK
        } else {
            role
        }
    }
}
