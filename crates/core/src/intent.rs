//! Intent labels and the capabilities they route to.

use serde::{Deserialize, Serialize};

/// One of the two things a capability agent can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Register a new customer
    Create,
    /// List / filter existing customers
    Query,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Query => "query",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified purpose of a turn.
///
/// `Unknown` means the classifier answered with something other than a
/// recognised label; `Error` means classification itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Create,
    Query,
    Unknown,
    Error,
}

impl Intent {
    /// Decode a raw classifier answer.
    ///
    /// The text is trimmed and case-folded; both the English labels and the
    /// Spanish ones (`crear`, `consultar`) are accepted. Anything else is
    /// `Unknown`.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "create" | "crear" => Intent::Create,
            "query" | "consultar" => Intent::Query,
            _ => Intent::Unknown,
        }
    }

    /// The capability this intent dispatches to, if any.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Intent::Create => Some(Capability::Create),
            Intent::Query => Some(Capability::Query),
            Intent::Unknown | Intent::Error => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Query => "query",
            Intent::Unknown => "unknown",
            Intent::Error => "error",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language used for prompts, enrichment labels and fixed replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Locale::Es),
            "en" | "english" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}' (use 'es' or 'en')")),
        }
    }
}
