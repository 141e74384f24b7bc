use serde::{Deserialize, Serialize};

/// Deployment tier of a host.
///
/// The [Display](std::fmt::Display) form is the label shown on the dashboard.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[display("production")]
    Production,
    #[display("staging")]
    Staging,
    #[display("testing")]
    Testing,
    #[display("development")]
    Development,
    #[display("unknown")]
    Unknown,
}

impl Environment {
    pub const ALL: [Environment; 5] = [
        Environment::Production,
        Environment::Staging,
        Environment::Testing,
        Environment::Development,
        Environment::Unknown,
    ];

    /// Match the three letter tag used in host names.
    ///
    /// Any tag other than `prd`, `stg`, `tst` or `dev` is [Environment::Unknown].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "prd" => Environment::Production,
            "stg" => Environment::Staging,
            "tst" => Environment::Testing,
            "dev" => Environment::Development,
            _ => Environment::Unknown,
        }
    }

    /// The tag used in host names, [None] for [Environment::Unknown]
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Environment::Production => Some("prd"),
            Environment::Staging => Some("stg"),
            Environment::Testing => Some("tst"),
            Environment::Development => Some("dev"),
            Environment::Unknown => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Environment::Production => Severity::Danger,
            Environment::Staging => Severity::Warning,
            Environment::Testing => Severity::Info,
            Environment::Development => Severity::Success,
            Environment::Unknown => Severity::Default,
        }
    }
}

/// Severity style of an environment badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[display("danger")]
    Danger,
    #[display("warning")]
    Warning,
    #[display("info")]
    Info,
    #[display("success")]
    Success,
    #[display("default")]
    Default,
}
